use crate::ast::{ExpressionStatement, LetStatement, ReturnStatement, Statement};
use crate::lexer::TokenKind;
use crate::parser::expressions::{parse_expression, Precedence};
use crate::parser::{ParseError, Parser};

pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    match parser.peek().kind {
        TokenKind::Let => Ok(Statement::Let(parse_let_statement(parser)?)),
        TokenKind::Return => Ok(Statement::Return(parse_return_statement(parser)?)),
        _ => Ok(Statement::Expression(parse_expression_statement(parser)?)),
    }
}

fn parse_let_statement(parser: &mut Parser) -> Result<LetStatement, ParseError> {
    let token = parser.expect_token(TokenKind::Let)?;
    let identifier = parser.parse_ident()?;
    parser.expect_token(TokenKind::Assign)?;
    let value = parse_expression(parser, Precedence::Lowest)?;
    parser.next_if(TokenKind::SemiColon);

    Ok(LetStatement {
        token,
        identifier,
        value,
    })
}

// Anything between the value and the terminating `;` is discarded.
fn parse_return_statement(parser: &mut Parser) -> Result<ReturnStatement, ParseError> {
    let token = parser.expect_token(TokenKind::Return)?;
    let value = parse_expression(parser, Precedence::Lowest)?;

    loop {
        match parser.peek().kind {
            TokenKind::RBrace | TokenKind::Eof => break,
            TokenKind::SemiColon => {
                parser.next_token();
                break;
            }
            _ => {
                parser.next_token();
            }
        }
    }

    Ok(ReturnStatement { token, value })
}

fn parse_expression_statement(parser: &mut Parser) -> Result<ExpressionStatement, ParseError> {
    let token = parser.peek().clone();
    let expression = parse_expression(parser, Precedence::Lowest)?;
    parser.next_if(TokenKind::SemiColon);

    Ok(ExpressionStatement { token, expression })
}
