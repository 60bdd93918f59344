use std::rc::Rc;

use malang_core::ast::{
    self, try_modify, Expression, InfixOperationKind, Node, PrefixOperationKind,
};

use super::{eval_expression, EvalContext};
use crate::environment::Environment;
use crate::object::{EvaluationError, Object, QuickReturn};

fn is_call_to(call: &ast::CallExpression, name: &str) -> bool {
    matches!(call.function.as_ref(), Expression::Identifier(identifier) if identifier.name.as_ref() == name)
}

pub(super) fn is_quote_call(call: &ast::CallExpression) -> bool {
    is_call_to(call, "quote")
}

fn single_argument(arguments: &[Expression]) -> Result<&Expression, EvaluationError> {
    match arguments {
        [argument] => Ok(argument),
        _ => Err(EvaluationError::WrongArgumentCount {
            got: arguments.len(),
            want: 1,
        }),
    }
}

/// `quote(<expr>)`: the argument is kept as syntax, except that every
/// `unquote(<e>)` inside it is replaced by the value of `<e>`.
pub(super) fn quote(
    arguments: &[Expression],
    environment: &Environment,
    context: &EvalContext,
) -> Result<Rc<Object>, QuickReturn> {
    let argument = single_argument(arguments)?;
    let mut unquote = |node: Node| -> Result<Node, QuickReturn> {
        match node {
            Node::Expression(Expression::Call(call)) if is_call_to(&call, "unquote") => {
                let argument = single_argument(&call.arguments)?;
                let value = eval_expression(argument, environment, context)?;
                Ok(Node::Expression(object_to_expression(&value)?))
            }
            other => Ok(other),
        }
    };
    let node = try_modify(Node::Expression(argument.clone()), &mut unquote)?;

    Ok(Object::quote(node))
}

fn object_to_expression(object: &Object) -> Result<Expression, EvaluationError> {
    match object {
        Object::Integer(value) => Ok(integer_expression(*value)),
        Object::Boolean(value) => Ok(Expression::boolean(*value)),
        Object::String(value) => Ok(Expression::string(value)),
        Object::Quote(Node::Expression(expression)) => Ok(expression.clone()),
        Object::Array(elements) => Ok(Expression::array(
            elements
                .iter()
                .map(|element| object_to_expression(element))
                .collect::<Result<_, _>>()?,
        )),
        Object::Hash(pairs) => Ok(Expression::hash(
            pairs
                .values()
                .map(|(key, value)| Ok((object_to_expression(key)?, object_to_expression(value)?)))
                .collect::<Result<_, EvaluationError>>()?,
        )),
        other => Err(EvaluationError::CannotUnquote(other.type_name())),
    }
}

// Integer literals are never negative in parsed source, so negative values
// are spelled the way the parser would read them back.
fn integer_expression(value: i64) -> Expression {
    if value >= 0 {
        return Expression::integer(value);
    }
    match value.checked_neg() {
        Some(magnitude) => {
            Expression::prefix(PrefixOperationKind::Minus, Expression::integer(magnitude))
        }
        None => Expression::infix(
            Expression::prefix(PrefixOperationKind::Minus, Expression::integer(i64::MAX)),
            InfixOperationKind::Minus,
            Expression::integer(1),
        ),
    }
}
