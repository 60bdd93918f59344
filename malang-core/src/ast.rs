use std::fmt::Display;
use std::rc::Rc;

use crate::lexer::{Token, TokenKind};

mod modify;

pub use modify::{modify, try_modify};

/// Any node of the tree. This is the unit `modify` rewrites and what a quoted
/// value holds.
#[derive(Debug, PartialEq, Clone)]
pub enum Node {
    Program(Program),
    Statement(Statement),
    Block(BlockStatement),
    Expression(Expression),
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(ExpressionStatement),
}

#[derive(Debug, PartialEq, Clone)]
pub struct LetStatement {
    pub token: Token,
    pub identifier: Identifier,
    pub value: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ReturnStatement {
    pub token: Token,
    pub value: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ExpressionStatement {
    pub token: Token,
    pub expression: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral(IntegerLiteral),
    StringLiteral(StringLiteral),
    Boolean(BooleanLiteral),
    Prefix(PrefixExpression),
    Infix(InfixExpression),
    If(IfExpression),
    Function(FunctionLiteral),
    Call(CallExpression),
    Array(ArrayLiteral),
    Hash(HashLiteral),
    Index(IndexExpression),
    Use(UseExpression),
    Macro(MacroLiteral),
    For(ForExpression),
    Break(BreakExpression),
    Continue(ContinueExpression),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Identifier {
    pub token: Token,
    pub name: Rc<str>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct IntegerLiteral {
    pub token: Token,
    pub value: i64,
}

#[derive(Debug, PartialEq, Clone)]
pub struct StringLiteral {
    pub token: Token,
    pub value: Rc<str>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct BooleanLiteral {
    pub token: Token,
    pub value: bool,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PrefixOperationKind {
    Minus,
    Bang,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum InfixOperationKind {
    Plus,
    Minus,
    LessThan,
    GreaterThan,
    Equal,
    NotEqual,
    Multiply,
    Divide,
    And,
    Or,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PrefixExpression {
    pub token: Token,
    pub operator: PrefixOperationKind,
    pub right: Box<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct InfixExpression {
    pub token: Token,
    pub operator: InfixOperationKind,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct IfExpression {
    pub token: Token,
    pub condition: Box<Expression>,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionLiteral {
    pub token: Token,
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
}

#[derive(Debug, PartialEq, Clone)]
pub struct CallExpression {
    pub token: Token,
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ArrayLiteral {
    pub token: Token,
    pub elements: Vec<Expression>,
}

/// Pairs stay in source order; keys are plain expressions until evaluation.
#[derive(Debug, PartialEq, Clone)]
pub struct HashLiteral {
    pub token: Token,
    pub pairs: Vec<(Expression, Expression)>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct IndexExpression {
    pub token: Token,
    pub left: Box<Expression>,
    pub index: Box<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct UseExpression {
    pub token: Token,
    pub path: Rc<str>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MacroLiteral {
    pub token: Token,
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ForExpression {
    pub token: Token,
    pub condition: Box<Expression>,
    pub body: BlockStatement,
}

#[derive(Debug, PartialEq, Clone)]
pub struct BreakExpression {
    pub token: Token,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ContinueExpression {
    pub token: Token,
}

impl Identifier {
    pub fn new(name: &str) -> Self {
        Identifier {
            token: Token::synthetic(TokenKind::Ident, name),
            name: name.into(),
        }
    }
}

impl Expression {
    pub fn integer(value: i64) -> Self {
        Expression::IntegerLiteral(IntegerLiteral {
            token: Token::synthetic(TokenKind::Int, value.to_string()),
            value,
        })
    }

    pub fn boolean(value: bool) -> Self {
        let kind = if value {
            TokenKind::True
        } else {
            TokenKind::False
        };
        Expression::Boolean(BooleanLiteral {
            token: Token::synthetic(kind, value.to_string()),
            value,
        })
    }

    pub fn string(value: &str) -> Self {
        Expression::StringLiteral(StringLiteral {
            token: Token::synthetic(TokenKind::String, value),
            value: value.into(),
        })
    }

    pub fn array(elements: Vec<Expression>) -> Self {
        Expression::Array(ArrayLiteral {
            token: Token::synthetic(TokenKind::LBracket, "["),
            elements,
        })
    }

    pub fn hash(pairs: Vec<(Expression, Expression)>) -> Self {
        Expression::Hash(HashLiteral {
            token: Token::synthetic(TokenKind::LBrace, "{"),
            pairs,
        })
    }

    pub fn prefix(operator: PrefixOperationKind, right: Expression) -> Self {
        Expression::Prefix(PrefixExpression {
            token: Token::synthetic(operator.token_kind(), operator.to_str()),
            operator,
            right: Box::new(right),
        })
    }

    pub fn infix(left: Expression, operator: InfixOperationKind, right: Expression) -> Self {
        Expression::Infix(InfixExpression {
            token: Token::synthetic(operator.token_kind(), operator.to_str()),
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// The token that introduced this expression.
    pub fn token(&self) -> &Token {
        use Expression::*;
        match self {
            Identifier(node) => &node.token,
            IntegerLiteral(node) => &node.token,
            StringLiteral(node) => &node.token,
            Boolean(node) => &node.token,
            Prefix(node) => &node.token,
            Infix(node) => &node.token,
            If(node) => &node.token,
            Function(node) => &node.token,
            Call(node) => &node.token,
            Array(node) => &node.token,
            Hash(node) => &node.token,
            Index(node) => &node.token,
            Use(node) => &node.token,
            Macro(node) => &node.token,
            For(node) => &node.token,
            Break(node) => &node.token,
            Continue(node) => &node.token,
        }
    }

    pub fn token_literal(&self) -> &str {
        &self.token().literal
    }

    fn token_mut(&mut self) -> &mut Token {
        use Expression::*;
        match self {
            Identifier(node) => &mut node.token,
            IntegerLiteral(node) => &mut node.token,
            StringLiteral(node) => &mut node.token,
            Boolean(node) => &mut node.token,
            Prefix(node) => &mut node.token,
            Infix(node) => &mut node.token,
            If(node) => &mut node.token,
            Function(node) => &mut node.token,
            Call(node) => &mut node.token,
            Array(node) => &mut node.token,
            Hash(node) => &mut node.token,
            Index(node) => &mut node.token,
            Use(node) => &mut node.token,
            Macro(node) => &mut node.token,
            For(node) => &mut node.token,
            Break(node) => &mut node.token,
            Continue(node) => &mut node.token,
        }
    }
}

impl Statement {
    pub fn token(&self) -> &Token {
        match self {
            Statement::Let(statement) => &statement.token,
            Statement::Return(statement) => &statement.token,
            Statement::Expression(statement) => &statement.token,
        }
    }

    pub fn token_literal(&self) -> &str {
        &self.token().literal
    }
}

impl From<Expression> for Statement {
    fn from(expression: Expression) -> Self {
        Statement::Expression(ExpressionStatement {
            token: expression.token().clone(),
            expression,
        })
    }
}

impl Program {
    pub fn token_literal(&self) -> &str {
        self.statements
            .first()
            .map(Statement::token_literal)
            .unwrap_or("")
    }
}

impl Node {
    pub fn token_literal(&self) -> &str {
        match self {
            Node::Program(program) => program.token_literal(),
            Node::Statement(statement) => statement.token_literal(),
            Node::Block(block) => &block.token.literal,
            Node::Expression(expression) => expression.token_literal(),
        }
    }

    /// The same tree with every token blanked, so that trees parsed from
    /// different text compare equal when only their shape matches.
    pub fn without_tokens(self) -> Node {
        let blank = || Token::synthetic(TokenKind::Illegal, "");
        modify(self, |node| match node {
            Node::Program(program) => Node::Program(program),
            Node::Statement(Statement::Let(mut statement)) => {
                statement.token = blank();
                statement.identifier.token = blank();
                Node::Statement(Statement::Let(statement))
            }
            Node::Statement(Statement::Return(mut statement)) => {
                statement.token = blank();
                Node::Statement(Statement::Return(statement))
            }
            Node::Statement(Statement::Expression(mut statement)) => {
                statement.token = blank();
                Node::Statement(Statement::Expression(statement))
            }
            Node::Block(mut block) => {
                block.token = blank();
                Node::Block(block)
            }
            Node::Expression(mut expression) => {
                *expression.token_mut() = blank();
                Node::Expression(expression)
            }
        })
    }
}

impl PrefixOperationKind {
    fn token_kind(&self) -> TokenKind {
        match self {
            PrefixOperationKind::Minus => TokenKind::Minus,
            PrefixOperationKind::Bang => TokenKind::Bang,
        }
    }

    pub fn to_str(&self) -> &'static str {
        use PrefixOperationKind::*;
        match self {
            Minus => "-",
            Bang => "!",
        }
    }
}

impl InfixOperationKind {
    fn token_kind(&self) -> TokenKind {
        use InfixOperationKind::*;
        match self {
            Plus => TokenKind::Plus,
            Minus => TokenKind::Minus,
            LessThan => TokenKind::LessThan,
            GreaterThan => TokenKind::GreaterThan,
            Equal => TokenKind::Equal,
            NotEqual => TokenKind::NotEqual,
            Multiply => TokenKind::Asterisk,
            Divide => TokenKind::Slash,
            And => TokenKind::And,
            Or => TokenKind::Or,
        }
    }

    pub fn to_str(&self) -> &'static str {
        use InfixOperationKind::*;
        match self {
            Plus => "+",
            Minus => "-",
            LessThan => "<",
            GreaterThan => ">",
            Equal => "==",
            NotEqual => "!=",
            Multiply => "*",
            Divide => "/",
            And => "&&",
            Or => "||",
        }
    }
}

fn write_separated<T: Display>(
    f: &mut std::fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> std::fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Display for LetStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "let {} = {};", self.identifier, self.value)
    }
}

impl Display for ReturnStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "return {};", self.value)
    }
}

impl Display for ExpressionStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{};", self.expression)
    }
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        write!(f, "}}")
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;
        match self {
            Identifier(ident) => write!(f, "{}", ident),
            IntegerLiteral(literal) => write!(f, "{}", literal.value),
            StringLiteral(literal) => write!(f, "\"{}\"", literal.value),
            Boolean(literal) => write!(f, "{}", literal.value),
            Prefix(prefix) => write!(f, "({}{})", prefix.operator.to_str(), prefix.right),
            Infix(infix) => write!(
                f,
                "({} {} {})",
                infix.left,
                infix.operator.to_str(),
                infix.right
            ),
            If(if_expression) => {
                write!(
                    f,
                    "if ({}) {}",
                    if_expression.condition, if_expression.consequence
                )?;
                if let Some(alternative) = &if_expression.alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            Function(function) => {
                write!(f, "fn(")?;
                write_separated(f, &function.parameters)?;
                write!(f, ") {}", function.body)
            }
            Macro(macro_literal) => {
                write!(f, "macro(")?;
                write_separated(f, &macro_literal.parameters)?;
                write!(f, ") {}", macro_literal.body)
            }
            Call(call) => {
                write!(f, "{}(", call.function)?;
                write_separated(f, &call.arguments)?;
                write!(f, ")")
            }
            Array(array) => {
                write!(f, "[")?;
                write_separated(f, &array.elements)?;
                write!(f, "]")
            }
            Hash(hash) => {
                write!(f, "{{")?;
                write_separated(
                    f,
                    hash.pairs
                        .iter()
                        .map(|(key, value)| format!("{}: {}", key, value)),
                )?;
                write!(f, "}}")
            }
            Index(index) => write!(f, "({}[{}])", index.left, index.index),
            Use(use_expression) => write!(f, "use \"{}\"", use_expression.path),
            For(for_expression) => write!(
                f,
                "for ({}) {}",
                for_expression.condition, for_expression.body
            ),
            Break(_) => write!(f, "break"),
            Continue(_) => write!(f, "continue"),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;
        match self {
            Let(statement) => write!(f, "{}", statement),
            Return(statement) => write!(f, "{}", statement),
            Expression(statement) => write!(f, "{}", statement),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Program(program) => write!(f, "{}", program),
            Node::Statement(statement) => write!(f, "{}", statement),
            Node::Block(block) => write!(f, "{}", block),
            Node::Expression(expression) => write!(f, "{}", expression),
        }
    }
}
