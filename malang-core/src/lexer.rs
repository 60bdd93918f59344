use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,
    Comment,

    Ident,
    Int,
    String,

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    And,
    Or,

    Equal,
    NotEqual,

    GreaterThan,
    LessThan,

    Comma,
    Colon,
    SemiColon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Keywords
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
    Use,
    For,
    Break,
    Continue,
    Macro,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Illegal => "ILLEGAL",
            Eof => "EOF",
            Comment => "//",
            Ident => "IDENT",
            Int => "INT",
            String => "STRING",
            Assign => "=",
            Plus => "+",
            Minus => "-",
            Bang => "!",
            Asterisk => "*",
            Slash => "/",
            And => "&&",
            Or => "||",
            Equal => "==",
            NotEqual => "!=",
            GreaterThan => ">",
            LessThan => "<",
            Comma => ",",
            Colon => ":",
            SemiColon => ";",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Function => "FUNCTION",
            Let => "LET",
            True => "TRUE",
            False => "FALSE",
            If => "IF",
            Else => "ELSE",
            Return => "RETURN",
            Use => "USE",
            For => "FOR",
            Break => "BREAK",
            Continue => "CONTINUE",
            Macro => "MACRO",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexical token. `start..end` is the byte range the token covers in the
/// input; `literal` is the text it stands for (string contents without the
/// quotes, comment text without the leading `//`).
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: Rc<str>,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<Rc<str>>, start: usize, end: usize) -> Self {
        Token {
            kind,
            literal: literal.into(),
            start,
            end,
        }
    }

    /// A token that does not come from any source text, used for nodes built
    /// by macro expansion.
    pub fn synthetic(kind: TokenKind, literal: impl Into<Rc<str>>) -> Self {
        Token::new(kind, literal, 0, 0)
    }
}

fn keywords(ident: &str) -> Option<TokenKind> {
    match ident {
        "fn" => Some(TokenKind::Function),
        "let" => Some(TokenKind::Let),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "return" => Some(TokenKind::Return),
        "use" => Some(TokenKind::Use),
        "for" => Some(TokenKind::For),
        "break" => Some(TokenKind::Break),
        "continue" => Some(TokenKind::Continue),
        "macro" => Some(TokenKind::Macro),
        _ => None,
    }
}

#[derive(Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = input.char_indices().peekable();
        Self { input, iter }
    }

    fn is_letter(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn is_whitespace(ch: char) -> bool {
        matches!(ch, ' ' | '\t' | '\n' | '\r')
    }

    /// Returns the next token. Once the input is exhausted every call returns
    /// an `EOF` token.
    pub fn next_token(&mut self) -> Token {
        while self.iter.next_if(|(_, ch)| Self::is_whitespace(*ch)).is_some() {}

        let Some((idx, ch)) = self.iter.next() else {
            let end = self.input.len();
            return Token::new(TokenKind::Eof, "", end, end);
        };

        match ch {
            '=' => {
                if self.iter.next_if(|(_, ch)| *ch == '=').is_some() {
                    self.token(TokenKind::Equal, idx)
                } else {
                    self.token(TokenKind::Assign, idx)
                }
            }
            '!' => {
                if self.iter.next_if(|(_, ch)| *ch == '=').is_some() {
                    self.token(TokenKind::NotEqual, idx)
                } else {
                    self.token(TokenKind::Bang, idx)
                }
            }
            '&' => {
                if self.iter.next_if(|(_, ch)| *ch == '&').is_some() {
                    self.token(TokenKind::And, idx)
                } else {
                    self.token(TokenKind::Illegal, idx)
                }
            }
            '|' => {
                if self.iter.next_if(|(_, ch)| *ch == '|').is_some() {
                    self.token(TokenKind::Or, idx)
                } else {
                    self.token(TokenKind::Illegal, idx)
                }
            }
            '/' => {
                if self.iter.next_if(|(_, ch)| *ch == '/').is_some() {
                    self.read_comment(idx)
                } else {
                    self.token(TokenKind::Slash, idx)
                }
            }
            '+' => self.token(TokenKind::Plus, idx),
            '-' => self.token(TokenKind::Minus, idx),
            '*' => self.token(TokenKind::Asterisk, idx),
            '<' => self.token(TokenKind::LessThan, idx),
            '>' => self.token(TokenKind::GreaterThan, idx),
            ',' => self.token(TokenKind::Comma, idx),
            ':' => self.token(TokenKind::Colon, idx),
            ';' => self.token(TokenKind::SemiColon, idx),
            '(' => self.token(TokenKind::LParen, idx),
            ')' => self.token(TokenKind::RParen, idx),
            '{' => self.token(TokenKind::LBrace, idx),
            '}' => self.token(TokenKind::RBrace, idx),
            '[' => self.token(TokenKind::LBracket, idx),
            ']' => self.token(TokenKind::RBracket, idx),
            '"' => self.read_string(idx),
            c if Tokenizer::is_letter(c) => self.read_identifier(idx),
            c if c.is_ascii_digit() => self.read_number(idx),
            _ => self.token(TokenKind::Illegal, idx),
        }
    }

    fn token(&mut self, kind: TokenKind, start: usize) -> Token {
        let end = self.next_idx();
        Token::new(kind, &self.input[start..end], start, end)
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while self.iter.next_if(|(_, ch)| Self::is_letter(*ch)).is_some() {}

        let end = self.next_idx();
        let ident = &self.input[start..end];
        Token::new(
            keywords(ident).unwrap_or(TokenKind::Ident),
            ident,
            start,
            end,
        )
    }

    fn read_number(&mut self, start: usize) -> Token {
        while self.iter.next_if(|(_, ch)| ch.is_ascii_digit()).is_some() {}

        self.token(TokenKind::Int, start)
    }

    // No escape sequences; a missing closing quote takes the rest of the input.
    fn read_string(&mut self, start: usize) -> Token {
        let content_start = start + 1;
        let content_end = loop {
            match self.iter.next() {
                Some((idx, '"')) => break idx,
                Some(_) => {}
                None => break self.input.len(),
            }
        };

        Token::new(
            TokenKind::String,
            &self.input[content_start..content_end],
            start,
            self.next_idx(),
        )
    }

    fn read_comment(&mut self, start: usize) -> Token {
        let content_start = start + 2;
        while self.iter.next_if(|(_, ch)| *ch != '\n').is_some() {}

        let end = self.next_idx();
        Token::new(
            TokenKind::Comment,
            &self.input[content_start..end],
            start,
            end,
        )
    }

    fn next_idx(&mut self) -> usize {
        self.iter
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
