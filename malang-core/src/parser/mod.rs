pub mod error;
pub mod expressions;
pub mod statements;

use crate::ast::{Identifier, Program};
use crate::lexer::{Token, TokenKind, Tokenizer};
pub use error::ParseError;
use statements::parse_statement;

/// Pratt parser over a [`Tokenizer`]. Comment tokens never reach the grammar.
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    peeked: Token,
    last_consumed: Option<TokenKind>,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokenizer: Tokenizer<'a>) -> Self {
        let peeked = Self::next_significant(&mut tokenizer);
        Self {
            tokenizer,
            peeked,
            last_consumed: None,
        }
    }

    fn next_significant(tokenizer: &mut Tokenizer<'a>) -> Token {
        loop {
            let token = tokenizer.next_token();
            if token.kind != TokenKind::Comment {
                return token;
            }
        }
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.peeked
    }

    pub(crate) fn peek_is(&self, kind: TokenKind) -> bool {
        self.peeked.kind == kind
    }

    /// Consumes the lookahead token. At the end of input this keeps returning
    /// `EOF`.
    pub(crate) fn next_token(&mut self) -> Token {
        let next = Self::next_significant(&mut self.tokenizer);
        let token = std::mem::replace(&mut self.peeked, next);
        self.last_consumed = Some(token.kind);
        token
    }

    pub(crate) fn next_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.peek_is(kind) {
            Some(self.next_token())
        } else {
            None
        }
    }

    /// Consumes the next token if it has the given kind. The token is left in
    /// place otherwise.
    pub(crate) fn expect_token(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.next_if(kind) {
            Some(token) => Ok(token),
            None => Err(ParseError::unexpected_token(kind, self.peeked.clone())),
        }
    }

    pub(crate) fn parse_ident(&mut self) -> Result<Identifier, ParseError> {
        let token = self.expect_token(TokenKind::Ident)?;
        Ok(Identifier {
            name: token.literal.clone(),
            token,
        })
    }

    // Drops tokens up to and including the next `;`, unless the failed
    // statement already ended on one.
    fn synchronize(&mut self) {
        if self.last_consumed == Some(TokenKind::SemiColon) {
            return;
        }
        loop {
            match self.peeked.kind {
                TokenKind::Eof => return,
                TokenKind::SemiColon => {
                    self.next_token();
                    return;
                }
                _ => {
                    self.next_token();
                }
            }
        }
    }

    /// Parses the whole input, collecting every error on the way. The program
    /// holds the statements that did parse.
    pub fn parse_program_recovering(&mut self) -> (Program, Vec<ParseError>) {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while !self.peek_is(TokenKind::Eof) {
            match parse_statement(self) {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    tracing::debug!(%error, start = error.token().start, "parse error");
                    errors.push(error);
                    self.synchronize();
                }
            }
        }

        (Program { statements }, errors)
    }

    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let (program, errors) = self.parse_program_recovering();
        if errors.is_empty() {
            Ok(program)
        } else {
            Err(errors)
        }
    }
}

/// Lexes and parses `input` in one go.
pub fn parse(input: &str) -> Result<Program, Vec<ParseError>> {
    Parser::new(Tokenizer::new(input)).parse_program()
}
