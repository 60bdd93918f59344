use super::error::ParseError;
use super::statements::parse_statement;
use crate::ast::{
    ArrayLiteral, BlockStatement, BooleanLiteral, BreakExpression, CallExpression,
    ContinueExpression, Expression, ForExpression, FunctionLiteral, HashLiteral, Identifier,
    IfExpression, IndexExpression, InfixExpression, InfixOperationKind, IntegerLiteral,
    MacroLiteral, PrefixExpression, PrefixOperationKind, StringLiteral, UseExpression,
};
use crate::lexer::{Token, TokenKind};
use crate::parser::Parser;
use crate::stack::ensure_sufficient_stack;

#[derive(PartialOrd, PartialEq, Debug, Clone, Copy)]
pub enum Precedence {
    Lowest = 0,
    Logical,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

pub fn precedence_of(token: TokenKind) -> Precedence {
    match token {
        TokenKind::And => Precedence::Logical,
        TokenKind::Or => Precedence::Logical,
        TokenKind::Equal => Precedence::Equals,
        TokenKind::NotEqual => Precedence::Equals,
        TokenKind::LessThan => Precedence::LessGreater,
        TokenKind::GreaterThan => Precedence::LessGreater,
        TokenKind::Plus => Precedence::Sum,
        TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk => Precedence::Product,
        TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

pub fn parse_expression(
    parser: &mut Parser,
    precedence: Precedence,
) -> Result<Expression, ParseError> {
    ensure_sufficient_stack(|| -> Result<Expression, ParseError> {
        let token = parser.next_token();
        let mut left_expression = prefix_parsing(token, parser)?;

        loop {
            let next_kind = parser.peek().kind;
            if next_kind == TokenKind::SemiColon || precedence >= precedence_of(next_kind) {
                break;
            }

            let Some(infix_parse_function) = infix_parsing_function(next_kind) else {
                break;
            };
            let token = parser.next_token();
            left_expression = infix_parse_function(left_expression, token, parser)?;
        }

        Ok(left_expression)
    })
}

fn parse_prefix_operation(
    token: Token,
    operator: PrefixOperationKind,
    parser: &mut Parser,
) -> Result<Expression, ParseError> {
    Ok(Expression::Prefix(PrefixExpression {
        token,
        operator,
        right: Box::new(parse_expression(parser, Precedence::Prefix)?),
    }))
}

fn parse_grouped_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expression = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RParen)?;

    Ok(expression)
}

/// Comma separated elements up to and including `terminator`.
fn parse_sequence<T>(
    parser: &mut Parser,
    mut parse_element: impl FnMut(&mut Parser) -> Result<T, ParseError>,
    terminator: TokenKind,
) -> Result<Vec<T>, ParseError> {
    let mut elements = Vec::new();
    if parser.next_if(terminator).is_some() {
        return Ok(elements);
    }

    elements.push(parse_element(parser)?);
    while parser.next_if(TokenKind::Comma).is_some() {
        elements.push(parse_element(parser)?);
    }
    parser.expect_token(terminator)?;

    Ok(elements)
}

fn parse_expression_list(
    parser: &mut Parser,
    terminator: TokenKind,
) -> Result<Vec<Expression>, ParseError> {
    parse_sequence(
        parser,
        |parser| parse_expression(parser, Precedence::Lowest),
        terminator,
    )
}

fn parse_hash_literal(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    let pairs = parse_sequence(
        parser,
        |parser| {
            let key = parse_expression(parser, Precedence::Lowest)?;
            parser.expect_token(TokenKind::Colon)?;
            let value = parse_expression(parser, Precedence::Lowest)?;
            Ok((key, value))
        },
        TokenKind::RBrace,
    )?;
    Ok(Expression::Hash(HashLiteral { token, pairs }))
}

fn parse_if_expression(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect_token(TokenKind::LParen)?;
    let condition = Box::new(parse_grouped_expression(parser)?);

    let consequence = parse_block_statement(parser)?;

    let alternative = if parser.next_if(TokenKind::Else).is_some() {
        Some(parse_block_statement(parser)?)
    } else {
        None
    };

    Ok(Expression::If(IfExpression {
        token,
        condition,
        consequence,
        alternative,
    }))
}

/// Reads statements after a `{` until the matching `}` or the end of input.
fn parse_block_statement(parser: &mut Parser) -> Result<BlockStatement, ParseError> {
    let token = parser.expect_token(TokenKind::LBrace)?;

    let mut statements = Vec::new();
    while !parser.peek_is(TokenKind::RBrace) && !parser.peek_is(TokenKind::Eof) {
        statements.push(parse_statement(parser)?);
    }
    parser.next_if(TokenKind::RBrace);

    Ok(BlockStatement { token, statements })
}

fn parse_parameters(parser: &mut Parser) -> Result<Vec<Identifier>, ParseError> {
    parser.expect_token(TokenKind::LParen)?;
    parse_sequence(parser, |parser| parser.parse_ident(), TokenKind::RParen)
}

fn parse_function_literal(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    let parameters = parse_parameters(parser)?;
    let body = parse_block_statement(parser)?;

    Ok(Expression::Function(FunctionLiteral {
        token,
        parameters,
        body,
    }))
}

fn parse_macro_literal(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    let parameters = parse_parameters(parser)?;
    let body = parse_block_statement(parser)?;

    Ok(Expression::Macro(MacroLiteral {
        token,
        parameters,
        body,
    }))
}

fn parse_use_expression(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    let path = parser.expect_token(TokenKind::String)?.literal;

    Ok(Expression::Use(UseExpression { token, path }))
}

fn parse_for_expression(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect_token(TokenKind::LParen)?;
    let condition = Box::new(parse_grouped_expression(parser)?);
    let body = parse_block_statement(parser)?;

    Ok(Expression::For(ForExpression {
        token,
        condition,
        body,
    }))
}

fn parse_integer_literal(token: Token) -> Result<Expression, ParseError> {
    match token.literal.parse() {
        Ok(value) => Ok(Expression::IntegerLiteral(IntegerLiteral { token, value })),
        Err(_) => Err(ParseError::InvalidInteger(token)),
    }
}

pub fn prefix_parsing(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    match token.kind {
        TokenKind::Ident => Ok(Expression::Identifier(Identifier {
            name: token.literal.clone(),
            token,
        })),
        TokenKind::Int => parse_integer_literal(token),
        TokenKind::String => Ok(Expression::StringLiteral(StringLiteral {
            value: token.literal.clone(),
            token,
        })),
        TokenKind::True => Ok(Expression::Boolean(BooleanLiteral { token, value: true })),
        TokenKind::False => Ok(Expression::Boolean(BooleanLiteral {
            token,
            value: false,
        })),
        TokenKind::Bang => parse_prefix_operation(token, PrefixOperationKind::Bang, parser),
        TokenKind::Minus => parse_prefix_operation(token, PrefixOperationKind::Minus, parser),
        TokenKind::LParen => parse_grouped_expression(parser),
        TokenKind::LBracket => Ok(Expression::Array(ArrayLiteral {
            elements: parse_expression_list(parser, TokenKind::RBracket)?,
            token,
        })),
        TokenKind::LBrace => parse_hash_literal(token, parser),
        TokenKind::If => parse_if_expression(token, parser),
        TokenKind::Function => parse_function_literal(token, parser),
        TokenKind::Macro => parse_macro_literal(token, parser),
        TokenKind::Use => parse_use_expression(token, parser),
        TokenKind::For => parse_for_expression(token, parser),
        TokenKind::Break => Ok(Expression::Break(BreakExpression { token })),
        TokenKind::Continue => Ok(Expression::Continue(ContinueExpression { token })),
        _ => Err(ParseError::NoPrefixFunction(token)),
    }
}

type InfixFunction = fn(Expression, Token, &mut Parser) -> Result<Expression, ParseError>;

fn infix_operator(kind: TokenKind) -> Option<InfixOperationKind> {
    use InfixOperationKind::*;
    match kind {
        TokenKind::Plus => Some(Plus),
        TokenKind::Minus => Some(Minus),
        TokenKind::LessThan => Some(LessThan),
        TokenKind::GreaterThan => Some(GreaterThan),
        TokenKind::Equal => Some(Equal),
        TokenKind::NotEqual => Some(NotEqual),
        TokenKind::Asterisk => Some(Multiply),
        TokenKind::Slash => Some(Divide),
        TokenKind::And => Some(And),
        TokenKind::Or => Some(Or),
        _ => None,
    }
}

fn parse_infix_operation(
    left: Expression,
    token: Token,
    parser: &mut Parser,
) -> Result<Expression, ParseError> {
    let Some(operator) = infix_operator(token.kind) else {
        return Err(ParseError::NoPrefixFunction(token));
    };
    let right = parse_expression(parser, precedence_of(token.kind))?;

    Ok(Expression::Infix(InfixExpression {
        token,
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

fn parse_call_expression(
    left: Expression,
    token: Token,
    parser: &mut Parser,
) -> Result<Expression, ParseError> {
    let arguments = parse_expression_list(parser, TokenKind::RParen)?;

    Ok(Expression::Call(CallExpression {
        token,
        function: Box::new(left),
        arguments,
    }))
}

fn parse_index_expression(
    left: Expression,
    token: Token,
    parser: &mut Parser,
) -> Result<Expression, ParseError> {
    let index = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RBracket)?;

    Ok(Expression::Index(IndexExpression {
        token,
        left: Box::new(left),
        index: Box::new(index),
    }))
}

pub fn infix_parsing_function(token: TokenKind) -> Option<InfixFunction> {
    match token {
        TokenKind::LParen => Some(parse_call_expression as InfixFunction),
        TokenKind::LBracket => Some(parse_index_expression as InfixFunction),
        kind if infix_operator(kind).is_some() => Some(parse_infix_operation as InfixFunction),
        _ => None,
    }
}
