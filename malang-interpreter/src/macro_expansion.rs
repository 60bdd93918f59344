use malang_core::ast::{self, try_modify, Expression, Node, Program, Statement};
use tracing::debug;

use crate::environment::Environment;
use crate::evaluator::{call_function, EvalContext};
use crate::object::{EvaluationError, Function, Object};

fn as_macro_definition(statement: &Statement) -> Option<(&ast::Identifier, &ast::MacroLiteral)> {
    match statement {
        Statement::Let(ast::LetStatement {
            identifier,
            value: Expression::Macro(macro_literal),
            ..
        }) => Some((identifier, macro_literal)),
        _ => None,
    }
}

/// Moves every top-level `let <name> = macro(...) {...};` out of `program`
/// and into `environment`. Nested definitions are left alone.
pub fn define_macros(program: &mut Program, environment: &Environment) {
    program.statements.retain(|statement| {
        let Some((identifier, macro_literal)) = as_macro_definition(statement) else {
            return true;
        };
        debug!(name = %identifier.name, "defining macro");
        environment.set(
            identifier.name.clone(),
            Object::macro_object(
                macro_literal.parameters.clone(),
                macro_literal.body.clone(),
                environment.clone(),
            ),
        );
        false
    });
}

fn macro_callee(call: &ast::CallExpression, environment: &Environment) -> Option<Function> {
    let Expression::Identifier(identifier) = call.function.as_ref() else {
        return None;
    };
    match environment.get(&identifier.name)?.as_ref() {
        Object::Macro(function) => Some(function.clone()),
        _ => None,
    }
}

/// Replaces every call to a macro bound in `environment` with the expression
/// the macro builds from its unevaluated arguments.
pub fn expand_macros(
    program: Program,
    environment: &Environment,
    context: &EvalContext,
) -> Result<Program, EvaluationError> {
    let mut expand = |node: Node| -> Result<Node, EvaluationError> {
        let call = match node {
            Node::Expression(Expression::Call(call)) => call,
            other => return Ok(other),
        };
        let Some(function) = macro_callee(&call, environment) else {
            return Ok(Node::Expression(Expression::Call(call)));
        };
        debug!(callee = %call.function, arguments = call.arguments.len(), "expanding macro");

        let arguments = call
            .arguments
            .into_iter()
            .map(|argument| Object::quote(Node::Expression(argument)))
            .collect();
        let result = call_function(&function, arguments, context)?;

        match result.as_ref() {
            Object::Quote(Node::Expression(expression)) => Ok(Node::Expression(expression.clone())),
            other => Err(EvaluationError::InvalidMacroResult(other.type_name())),
        }
    };

    match try_modify(Node::Program(program), &mut expand)? {
        Node::Program(program) => Ok(program),
        _ => unreachable!("a program is only ever rewritten into a program"),
    }
}
