//! Post-order rewriting of a syntax tree.
//!
//! Every owned child is rewritten before its parent, and the parent (with the
//! rewritten children already in place) is then handed to the modifier. The
//! modifier must return a node of the category it was given; an expression is
//! accepted where a statement is expected and an expression statement where an
//! expression is expected. Any other substitution panics.

use std::convert::Infallible;

use super::*;

pub fn modify(node: Node, mut modifier: impl FnMut(Node) -> Node) -> Node {
    let result: Result<Node, Infallible> = try_modify(node, &mut |node| Ok(modifier(node)));
    match result {
        Ok(node) => node,
        Err(never) => match never {},
    }
}

/// Like [`modify`], but stops at the first error the modifier returns.
pub fn try_modify<E, F>(node: Node, modifier: &mut F) -> Result<Node, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    let node = match node {
        Node::Program(program) => Node::Program(Program {
            statements: modify_statements(program.statements, modifier)?,
        }),
        Node::Statement(statement) => Node::Statement(modify_statement_children(statement, modifier)?),
        Node::Block(block) => Node::Block(modify_block_children(block, modifier)?),
        Node::Expression(expression) => {
            Node::Expression(modify_expression_children(expression, modifier)?)
        }
    };

    modifier(node)
}

fn modify_statements<E, F>(statements: Vec<Statement>, modifier: &mut F) -> Result<Vec<Statement>, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    statements
        .into_iter()
        .map(|statement| Ok(into_statement(try_modify(Node::Statement(statement), modifier)?)))
        .collect()
}

fn modify_statement_children<E, F>(statement: Statement, modifier: &mut F) -> Result<Statement, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    Ok(match statement {
        Statement::Let(statement) => Statement::Let(LetStatement {
            value: modify_expression(statement.value, modifier)?,
            ..statement
        }),
        Statement::Return(statement) => Statement::Return(ReturnStatement {
            value: modify_expression(statement.value, modifier)?,
            ..statement
        }),
        Statement::Expression(statement) => Statement::Expression(ExpressionStatement {
            expression: modify_expression(statement.expression, modifier)?,
            ..statement
        }),
    })
}

fn modify_block_children<E, F>(block: BlockStatement, modifier: &mut F) -> Result<BlockStatement, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    Ok(BlockStatement {
        statements: modify_statements(block.statements, modifier)?,
        ..block
    })
}

fn modify_expression<E, F>(expression: Expression, modifier: &mut F) -> Result<Expression, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    Ok(into_expression(try_modify(Node::Expression(expression), modifier)?))
}

fn modify_boxed<E, F>(expression: Box<Expression>, modifier: &mut F) -> Result<Box<Expression>, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    Ok(Box::new(modify_expression(*expression, modifier)?))
}

fn modify_expressions<E, F>(expressions: Vec<Expression>, modifier: &mut F) -> Result<Vec<Expression>, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    expressions
        .into_iter()
        .map(|expression| modify_expression(expression, modifier))
        .collect()
}

fn modify_block<E, F>(block: BlockStatement, modifier: &mut F) -> Result<BlockStatement, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    match try_modify(Node::Block(block), modifier)? {
        Node::Block(block) => Ok(block),
        other => panic!("modifier replaced a block with `{}`", other),
    }
}

// A parameter rewritten into something other than an identifier is dropped.
fn modify_parameters<E, F>(parameters: Vec<Identifier>, modifier: &mut F) -> Result<Vec<Identifier>, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    let mut rewritten = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        if let Expression::Identifier(identifier) =
            modify_expression(Expression::Identifier(parameter), modifier)?
        {
            rewritten.push(identifier);
        }
    }
    Ok(rewritten)
}

fn modify_expression_children<E, F>(expression: Expression, modifier: &mut F) -> Result<Expression, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    use Expression::*;
    Ok(match expression {
        Identifier(_) | IntegerLiteral(_) | StringLiteral(_) | Boolean(_) | Use(_) | Break(_)
        | Continue(_) => expression,
        Prefix(prefix) => Prefix(PrefixExpression {
            right: modify_boxed(prefix.right, modifier)?,
            ..prefix
        }),
        Infix(infix) => {
            let left = modify_boxed(infix.left, modifier)?;
            let right = modify_boxed(infix.right, modifier)?;
            Infix(InfixExpression {
                left,
                right,
                ..infix
            })
        }
        Index(index) => {
            let left = modify_boxed(index.left, modifier)?;
            let index_expression = modify_boxed(index.index, modifier)?;
            Index(IndexExpression {
                left,
                index: index_expression,
                ..index
            })
        }
        If(if_expression) => {
            let condition = modify_boxed(if_expression.condition, modifier)?;
            let consequence = modify_block(if_expression.consequence, modifier)?;
            let alternative = match if_expression.alternative {
                Some(alternative) => Some(modify_block(alternative, modifier)?),
                None => None,
            };
            If(IfExpression {
                token: if_expression.token,
                condition,
                consequence,
                alternative,
            })
        }
        Function(function) => {
            let parameters = modify_parameters(function.parameters, modifier)?;
            let body = modify_block(function.body, modifier)?;
            Function(FunctionLiteral {
                token: function.token,
                parameters,
                body,
            })
        }
        Macro(macro_literal) => {
            let parameters = modify_parameters(macro_literal.parameters, modifier)?;
            let body = modify_block(macro_literal.body, modifier)?;
            Macro(MacroLiteral {
                token: macro_literal.token,
                parameters,
                body,
            })
        }
        Call(call) => {
            let function = modify_boxed(call.function, modifier)?;
            let arguments = modify_expressions(call.arguments, modifier)?;
            Call(CallExpression {
                token: call.token,
                function,
                arguments,
            })
        }
        Array(array) => Array(ArrayLiteral {
            elements: modify_expressions(array.elements, modifier)?,
            ..array
        }),
        Hash(hash) => {
            let mut pairs = Vec::with_capacity(hash.pairs.len());
            for (key, value) in hash.pairs {
                let key = modify_expression(key, modifier)?;
                let value = modify_expression(value, modifier)?;
                pairs.push((key, value));
            }
            Hash(HashLiteral {
                token: hash.token,
                pairs,
            })
        }
        For(for_expression) => {
            let condition = modify_boxed(for_expression.condition, modifier)?;
            let body = modify_block(for_expression.body, modifier)?;
            For(ForExpression {
                token: for_expression.token,
                condition,
                body,
            })
        }
    })
}

fn into_expression(node: Node) -> Expression {
    match node {
        Node::Expression(expression) => expression,
        Node::Statement(Statement::Expression(statement)) => statement.expression,
        other => panic!("modifier replaced an expression with `{}`", other),
    }
}

fn into_statement(node: Node) -> Statement {
    match node {
        Node::Statement(statement) => statement,
        Node::Expression(expression) => Statement::from(expression),
        other => panic!("modifier replaced a statement with `{}`", other),
    }
}
