mod quote;

use std::cell::Cell;
use std::rc::Rc;

use indexmap::IndexMap;
use malang_core::ast;
use malang_core::ast::{Expression, InfixOperationKind, PrefixOperationKind};
use malang_core::stack::ensure_sufficient_stack;

use crate::builtins::map_builtins;
use crate::environment::Environment;
use crate::loader::{FileLoader, SourceLoader};
use crate::macro_expansion::{define_macros, expand_macros};
use crate::object::{EvaluationError, Function, HashKey, Object, QuickReturn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Nested function calls (and `use` loads) allowed before evaluation fails.
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 1000,
        }
    }
}

/// What evaluation needs besides the tree and the environment: where `use`
/// finds its sources, the limits to enforce and the current call depth.
pub struct EvalContext {
    loader: Box<dyn SourceLoader>,
    config: EvalConfig,
    depth: Cell<usize>,
}

impl EvalContext {
    pub fn new(loader: impl SourceLoader + 'static, config: EvalConfig) -> Self {
        Self {
            loader: Box::new(loader),
            config,
            depth: Cell::new(0),
        }
    }

    fn enter_call(&self) -> Result<CallGuard<'_>, EvaluationError> {
        let depth = self.depth.get();
        if depth >= self.config.max_call_depth {
            return Err(EvaluationError::CallDepthExceeded);
        }
        self.depth.set(depth + 1);
        Ok(CallGuard { depth: &self.depth })
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new(FileLoader::default(), EvalConfig::default())
    }
}

struct CallGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Evaluates `program` in `environment`. The result is the value of the last
/// statement, or of the first top-level `return`; `None` when that statement
/// was a `let` or the program is empty.
pub fn eval_program(
    program: &ast::Program,
    environment: &Environment,
    context: &EvalContext,
) -> Result<Option<Rc<Object>>, EvaluationError> {
    let mut output = None;
    for statement in &program.statements {
        match eval_statement(statement, environment, context) {
            Ok(object) => output = object,
            Err(QuickReturn::Return(value)) => return Ok(Some(value)),
            Err(QuickReturn::Error(error)) => return Err(error),
            Err(QuickReturn::Break) => return Err(EvaluationError::BreakOutsideLoop),
            Err(QuickReturn::Continue) => return Err(EvaluationError::ContinueOutsideLoop),
        }
    }
    Ok(output)
}

fn eval_statement(
    statement: &ast::Statement,
    environment: &Environment,
    context: &EvalContext,
) -> Result<Option<Rc<Object>>, QuickReturn> {
    match statement {
        ast::Statement::Expression(statement) => {
            eval_expression(&statement.expression, environment, context).map(Some)
        }
        ast::Statement::Return(statement) => {
            let value = eval_expression(&statement.value, environment, context)?;
            Err(QuickReturn::Return(value))
        }
        ast::Statement::Let(statement) => {
            let value = eval_expression(&statement.value, environment, context)?;
            environment.set(statement.identifier.name.clone(), value);
            Ok(None)
        }
    }
}

fn eval_block_statement(
    block: &ast::BlockStatement,
    environment: &Environment,
    context: &EvalContext,
) -> Result<Rc<Object>, QuickReturn> {
    let mut result = Object::null();
    for statement in &block.statements {
        result = eval_statement(statement, environment, context)?.unwrap_or_else(Object::null);
    }
    Ok(result)
}

pub(crate) fn eval_expression(
    expression: &Expression,
    environment: &Environment,
    context: &EvalContext,
) -> Result<Rc<Object>, QuickReturn> {
    ensure_sufficient_stack(|| eval_expression_node(expression, environment, context))
}

fn eval_expression_node(
    expression: &Expression,
    environment: &Environment,
    context: &EvalContext,
) -> Result<Rc<Object>, QuickReturn> {
    match expression {
        Expression::IntegerLiteral(literal) => Ok(Object::integer(literal.value)),
        Expression::Boolean(literal) => Ok(Object::boolean(literal.value)),
        Expression::StringLiteral(literal) => Ok(Object::string(literal.value.to_string())),
        Expression::Identifier(identifier) => eval_identifier(identifier, environment),
        Expression::Array(array) => Ok(Object::array(eval_expressions(
            &array.elements,
            environment,
            context,
        )?)),
        Expression::Hash(hash) => {
            let mut pairs = IndexMap::new();
            for (key, value) in &hash.pairs {
                let key = eval_expression(key, environment, context)?;
                let hashed_key = HashKey::try_from(key.as_ref())?;
                let value = eval_expression(value, environment, context)?;
                pairs.insert(hashed_key, (key, value));
            }
            Ok(Object::hash(pairs))
        }
        Expression::Prefix(prefix) => {
            let right = eval_expression(&prefix.right, environment, context)?;
            eval_prefix_operation(prefix.operator, right)
        }
        Expression::Infix(infix) => {
            let left = eval_expression(&infix.left, environment, context)?;
            let right = eval_expression(&infix.right, environment, context)?;
            eval_infix_operation(infix.operator, left, right)
        }
        Expression::If(if_expression) => {
            let condition = eval_expression(&if_expression.condition, environment, context)?;
            if condition.is_truthy() {
                eval_block_statement(&if_expression.consequence, environment, context)
            } else if let Some(alternative) = &if_expression.alternative {
                eval_block_statement(alternative, environment, context)
            } else {
                Ok(Object::null())
            }
        }
        Expression::Function(function) => Ok(Object::function(
            function.parameters.clone(),
            function.body.clone(),
            environment.clone(),
        )),
        Expression::Macro(macro_literal) => Ok(Object::macro_object(
            macro_literal.parameters.clone(),
            macro_literal.body.clone(),
            environment.clone(),
        )),
        Expression::Call(call) => {
            if quote::is_quote_call(call) {
                return quote::quote(&call.arguments, environment, context);
            }
            let function = eval_expression(&call.function, environment, context)?;
            let arguments = eval_expressions(&call.arguments, environment, context)?;
            apply_function(&function, arguments, context)
        }
        Expression::Index(index) => {
            let left = eval_expression(&index.left, environment, context)?;
            let index = eval_expression(&index.index, environment, context)?;
            eval_index_expression(left, index)
        }
        Expression::Use(use_expression) => {
            eval_use_expression(&use_expression.path, environment, context)
        }
        Expression::For(for_expression) => {
            eval_for_expression(for_expression, environment, context)
        }
        Expression::Break(_) => Err(QuickReturn::Break),
        Expression::Continue(_) => Err(QuickReturn::Continue),
    }
}

fn eval_identifier(
    identifier: &ast::Identifier,
    environment: &Environment,
) -> Result<Rc<Object>, QuickReturn> {
    if let Some(value) = environment.get(&identifier.name) {
        return Ok(value);
    }
    match map_builtins(&identifier.name) {
        Some(builtin) => Ok(Object::builtin_function(builtin)),
        None => Err(QuickReturn::Error(EvaluationError::UnknownIdentifier(
            identifier.name.clone(),
        ))),
    }
}

/// Left to right, stopping at the first failure.
fn eval_expressions(
    expressions: &[Expression],
    environment: &Environment,
    context: &EvalContext,
) -> Result<Vec<Rc<Object>>, QuickReturn> {
    let mut result = Vec::with_capacity(expressions.len());
    for expression in expressions {
        result.push(eval_expression(expression, environment, context)?);
    }
    Ok(result)
}

#[tracing::instrument(level = "trace", skip_all, fields(function = function.type_name(), arguments = arguments.len()))]
fn apply_function(
    function: &Object,
    arguments: Vec<Rc<Object>>,
    context: &EvalContext,
) -> Result<Rc<Object>, QuickReturn> {
    match function {
        Object::Function(function) => Ok(call_function(function, arguments, context)?),
        Object::BuiltinFunction(builtin) => (builtin.func)(arguments),
        other => Err(QuickReturn::Error(EvaluationError::NotAFunction(
            other.type_name(),
        ))),
    }
}

/// Runs the body of a function (or macro) in a fresh scope enclosed by the one
/// it captured, binding the parameters positionally.
pub(crate) fn call_function(
    function: &Function,
    arguments: Vec<Rc<Object>>,
    context: &EvalContext,
) -> Result<Rc<Object>, EvaluationError> {
    if function.parameters.len() != arguments.len() {
        return Err(EvaluationError::WrongArgumentCount {
            got: arguments.len(),
            want: function.parameters.len(),
        });
    }
    let _guard = context.enter_call()?;

    let environment = Environment::new_enclosed(function.env.clone());
    for (parameter, argument) in function.parameters.iter().zip(arguments) {
        environment.set(parameter.name.clone(), argument);
    }

    match eval_block_statement(&function.body, &environment, context) {
        Ok(value) | Err(QuickReturn::Return(value)) => Ok(value),
        Err(QuickReturn::Error(error)) => Err(error),
        Err(QuickReturn::Break) => Err(EvaluationError::BreakOutsideLoop),
        Err(QuickReturn::Continue) => Err(EvaluationError::ContinueOutsideLoop),
    }
}

fn eval_prefix_operation(
    operator: PrefixOperationKind,
    right: Rc<Object>,
) -> Result<Rc<Object>, QuickReturn> {
    match (operator, right.as_ref()) {
        (PrefixOperationKind::Bang, object) => Ok(Object::boolean(!object.is_truthy())),
        (PrefixOperationKind::Minus, Object::Integer(value)) => {
            Ok(Object::integer(value.wrapping_neg()))
        }
        (PrefixOperationKind::Minus, object) => Err(QuickReturn::Error(
            EvaluationError::UnknownPrefixOperator {
                operator,
                right: object.type_name(),
            },
        )),
    }
}

fn eval_integer_infix_operation(
    operator: InfixOperationKind,
    left: i64,
    right: i64,
) -> Result<Rc<Object>, QuickReturn> {
    use InfixOperationKind::*;
    match operator {
        Plus => Ok(Object::integer(left.wrapping_add(right))),
        Minus => Ok(Object::integer(left.wrapping_sub(right))),
        Multiply => Ok(Object::integer(left.wrapping_mul(right))),
        Divide if right == 0 => Err(QuickReturn::Error(EvaluationError::DivisionByZero)),
        Divide => Ok(Object::integer(left.wrapping_div(right))),
        LessThan => Ok(Object::boolean(left < right)),
        GreaterThan => Ok(Object::boolean(left > right)),
        Equal => Ok(Object::boolean(left == right)),
        NotEqual => Ok(Object::boolean(left != right)),
        And | Or => Err(QuickReturn::Error(EvaluationError::UnknownInfixOperator {
            left: "INTEGER",
            operator,
            right: "INTEGER",
        })),
    }
}

// Integers compare by value; every other `==`/`!=` compares identity, which
// is value equality for the shared booleans and null.
fn eval_infix_operation(
    operator: InfixOperationKind,
    left: Rc<Object>,
    right: Rc<Object>,
) -> Result<Rc<Object>, QuickReturn> {
    match (operator, left.as_ref(), right.as_ref()) {
        (_, Object::Integer(left), Object::Integer(right)) => {
            eval_integer_infix_operation(operator, *left, *right)
        }
        (InfixOperationKind::Equal, _, _) => Ok(Object::boolean(Rc::ptr_eq(&left, &right))),
        (InfixOperationKind::NotEqual, _, _) => Ok(Object::boolean(!Rc::ptr_eq(&left, &right))),
        (InfixOperationKind::And, Object::Boolean(left), Object::Boolean(right)) => {
            Ok(Object::boolean(*left && *right))
        }
        (InfixOperationKind::Or, Object::Boolean(left), Object::Boolean(right)) => {
            Ok(Object::boolean(*left || *right))
        }
        (InfixOperationKind::Plus, Object::String(left), Object::String(right)) => {
            Ok(Object::string(format!("{}{}", left, right)))
        }
        (operator, left, right) if left.type_name() != right.type_name() => Err(
            QuickReturn::Error(EvaluationError::TypeMismatch {
                left: left.type_name(),
                operator,
                right: right.type_name(),
            }),
        ),
        (operator, left, right) => Err(QuickReturn::Error(
            EvaluationError::UnknownInfixOperator {
                left: left.type_name(),
                operator,
                right: right.type_name(),
            },
        )),
    }
}

fn eval_index_expression(left: Rc<Object>, index: Rc<Object>) -> Result<Rc<Object>, QuickReturn> {
    match (left.as_ref(), index.as_ref()) {
        (Object::Array(array), Object::Integer(index)) => Ok(usize::try_from(*index)
            .ok()
            .and_then(|index| array.get(index))
            .cloned()
            .unwrap_or_else(Object::null)),
        (Object::Hash(hash), index) => {
            let hashed_index = HashKey::try_from(index)?;
            Ok(hash
                .get(&hashed_index)
                .map(|(_, value)| value.clone())
                .unwrap_or_else(Object::null))
        }
        (left, _) => Err(QuickReturn::Error(EvaluationError::IndexNotSupported(
            left.type_name(),
        ))),
    }
}

// The body runs in the enclosing scope, so its `let`s stay visible after the
// loop.
fn eval_for_expression(
    for_expression: &ast::ForExpression,
    environment: &Environment,
    context: &EvalContext,
) -> Result<Rc<Object>, QuickReturn> {
    loop {
        let condition = eval_expression(&for_expression.condition, environment, context)?;
        if !condition.is_truthy() {
            break;
        }
        match eval_block_statement(&for_expression.body, environment, context) {
            Ok(_) | Err(QuickReturn::Continue) => {}
            Err(QuickReturn::Break) => break,
            Err(other) => return Err(other),
        }
    }
    Ok(Object::null())
}

/// Evaluates another source in the current environment, as if its text were
/// written in place of the `use`.
#[tracing::instrument(level = "debug", skip(environment, context))]
fn eval_use_expression(
    path: &Rc<str>,
    environment: &Environment,
    context: &EvalContext,
) -> Result<Rc<Object>, QuickReturn> {
    let _guard = context.enter_call()?;
    let mut program = context
        .loader
        .load(path)
        .map_err(|source| EvaluationError::Load {
            path: path.clone(),
            source,
        })?;
    tracing::debug!(statements = program.statements.len(), "loaded");

    define_macros(&mut program, environment);
    let program = expand_macros(program, environment, context)?;
    let result = eval_program(&program, environment, context)?;

    Ok(result.unwrap_or_else(Object::null))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::rc::Rc;

    use malang_core::ast::Program;
    use malang_core::parser::parse;
    use pretty_assertions::assert_eq;

    use super::{eval_program, EvalConfig, EvalContext};
    use crate::environment::Environment;
    use crate::loader::{LoadError, SourceLoader};
    use crate::object::{EvaluationError, Object};

    struct MapLoader(HashMap<&'static str, &'static str>);

    impl SourceLoader for MapLoader {
        fn load(&self, path: &str) -> Result<Program, LoadError> {
            let source = self
                .0
                .get(path)
                .ok_or_else(|| LoadError::Io("no such file".to_owned()))?;
            parse(source).map_err(LoadError::Parse)
        }
    }

    fn run_with(input: &str, context: &EvalContext) -> Result<Option<Rc<Object>>, EvaluationError> {
        let program = parse(input).unwrap();
        eval_program(&program, &Environment::new(), context)
    }

    fn test_evaluation(inputs: Vec<(&str, Result<Rc<Object>, EvaluationError>)>) {
        let context = EvalContext::default();
        for (input, output) in inputs {
            let result = run_with(input, &context).map(|value| value.unwrap_or_else(Object::null));

            assert_eq!(result, output, "input: {}", input);
        }
    }

    fn test_errors(inputs: Vec<(&str, &str)>) {
        let context = EvalContext::default();
        for (input, message) in inputs {
            let error = run_with(input, &context).unwrap_err();

            assert_eq!(error.to_string(), message, "input: {}", input);
        }
    }

    #[test]
    fn test_literal() {
        test_evaluation(vec![
            ("5;", Ok(Object::integer(5))),
            ("true;", Ok(Object::boolean(true))),
            ("false;", Ok(Object::boolean(false))),
            ("\"hello\";", Ok(Object::string("hello".to_owned()))),
        ]);
    }

    #[test]
    fn test_integer_expressions() {
        test_evaluation(vec![
            ("--5;", Ok(Object::integer(5))),
            ("-10;", Ok(Object::integer(-10))),
            ("5 + 5 + 5 + 5 - 10", Ok(Object::integer(10))),
            ("2 * 2 * 2 * 2 * 2", Ok(Object::integer(32))),
            ("5 + 2 * 10", Ok(Object::integer(25))),
            ("50 / 2 * 2 + 10", Ok(Object::integer(60))),
            ("7 / 2", Ok(Object::integer(3))),
            ("-7 / 2", Ok(Object::integer(-3))),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", Ok(Object::integer(50))),
            ("9223372036854775807 + 1", Ok(Object::integer(i64::MIN))),
        ]);
    }

    #[test]
    fn test_boolean_expressions() {
        test_evaluation(vec![
            ("1 < 2", Ok(Object::boolean(true))),
            ("1 > 2", Ok(Object::boolean(false))),
            ("1 == 1", Ok(Object::boolean(true))),
            ("1 != 1", Ok(Object::boolean(false))),
            ("true == true", Ok(Object::boolean(true))),
            ("true != false", Ok(Object::boolean(true))),
            ("(1 < 2) == true", Ok(Object::boolean(true))),
            ("(1 < 2) == false", Ok(Object::boolean(false))),
            ("1 == true", Ok(Object::boolean(false))),
            ("\"a\" == \"a\"", Ok(Object::boolean(false))),
            ("let s = \"a\"; s == s", Ok(Object::boolean(true))),
            ("true && false", Ok(Object::boolean(false))),
            ("false || true", Ok(Object::boolean(true))),
            ("1 < 2 && 2 < 3", Ok(Object::boolean(true))),
        ]);
    }

    #[test]
    fn test_bang_operator() {
        test_evaluation(vec![
            ("!true", Ok(Object::boolean(false))),
            ("!false", Ok(Object::boolean(true))),
            ("!5", Ok(Object::boolean(false))),
            ("!!true", Ok(Object::boolean(true))),
            ("!!5", Ok(Object::boolean(true))),
            ("!0", Ok(Object::boolean(false))),
            ("![]", Ok(Object::boolean(false))),
        ]);
    }

    #[test]
    fn test_if_else_expressions() {
        test_evaluation(vec![
            ("if (true) { 10 }", Ok(Object::integer(10))),
            ("if (false) { 10 }", Ok(Object::null())),
            ("if (1) { 10 }", Ok(Object::integer(10))),
            ("if (0) { 10 }", Ok(Object::integer(10))),
            ("if (1 < 2) { 10 }", Ok(Object::integer(10))),
            ("if (1 > 2) { 10 } else { 20 }", Ok(Object::integer(20))),
            ("if (1 < 2) { let a = 1; }", Ok(Object::null())),
        ]);
    }

    #[test]
    fn test_return_statements() {
        test_evaluation(vec![
            ("return 10;", Ok(Object::integer(10))),
            ("return 10; 9;", Ok(Object::integer(10))),
            ("return 2 * 5; 9;", Ok(Object::integer(10))),
            ("9; return 2 * 5; 9;", Ok(Object::integer(10))),
            (
                "if (10 > 1) { if (10 > 1) { return 10; } return 1; }",
                Ok(Object::integer(10)),
            ),
        ]);
    }

    #[test]
    fn test_error_handling() {
        test_errors(vec![
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "if (10 > 1) { true + false; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            (
                "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "identifier not found: foobar"),
            ("\"Hello\" - \"World\"", "unknown operator: STRING - STRING"),
            ("1 && true", "type mismatch: INTEGER && BOOLEAN"),
            ("1 || 2", "unknown operator: INTEGER || INTEGER"),
            ("1 / 0", "division by zero"),
            ("5(1)", "not a function: INTEGER"),
            ("[1, foo, bar]", "identifier not found: foo"),
            ("len(1, missing)", "identifier not found: missing"),
        ]);
    }

    #[test]
    fn test_let_statements() {
        test_evaluation(vec![
            ("let a = 5; a;", Ok(Object::integer(5))),
            ("let a = 5 * 5; a;", Ok(Object::integer(25))),
            ("let a = 5; let b = a; b;", Ok(Object::integer(5))),
            (
                "let a = 5; let b = a; let c = a + b + 5; c;",
                Ok(Object::integer(15)),
            ),
        ]);

        let context = EvalContext::default();
        assert_eq!(run_with("let a = 5;", &context), Ok(None));
        assert_eq!(run_with("", &context), Ok(None));
    }

    #[test]
    fn test_function_application() {
        test_evaluation(vec![
            (
                "let identity = fn(x) { x; }; identity(5);",
                Ok(Object::integer(5)),
            ),
            (
                "let identity = fn(x) { return x; }; identity(5);",
                Ok(Object::integer(5)),
            ),
            (
                "let double = fn(x) { x * 2; }; double(5);",
                Ok(Object::integer(10)),
            ),
            (
                "let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));",
                Ok(Object::integer(20)),
            ),
            ("fn(x) { x; }(5)", Ok(Object::integer(5))),
            (
                "let factorial = fn(n) { if (n < 2) { 1 } else { factorial(n - 1) * n } }; factorial(5)",
                Ok(Object::integer(120)),
            ),
        ]);
    }

    #[test]
    fn test_function_errors() {
        test_errors(vec![
            (
                "let f = fn(x) { x }; f(1, 2)",
                "wrong number of arguments. got=2, want=1",
            ),
            ("let f = fn(x, y) { x }; f(1)", "wrong number of arguments. got=1, want=2"),
            ("let f = fn() { break; }; for (true) { f() }", "break outside of a loop"),
            ("continue", "continue outside of a loop"),
        ]);
    }

    #[test]
    fn test_closures() {
        test_evaluation(vec![
            (
                "let newAdder = fn(x) { fn(y) { x + y } }; let addTwo = newAdder(2); addTwo(3);",
                Ok(Object::integer(5)),
            ),
            (
                r#"
            let fa = fn() {
                let x = 5;
                let fb = fn() { fn() { x } };
                fb
            };
            let temp = fa();
            let temp_ = temp();
            temp_()"#,
                Ok(Object::integer(5)),
            ),
            (
                r#"
            let fa = fn() {
                let is_even = fn(x) { if (x == 0) { true } else { is_odd(x - 1) } };
                let is_odd = fn(x) { if (x == 0) { false } else { is_even(x - 1) } };
                is_even
            };
            let temp = fa();
            temp(3);"#,
                Ok(Object::boolean(false)),
            ),
            (
                "let x = 1; let f = fn() { x }; let g = fn() { let x = 2; f() }; g()",
                Ok(Object::integer(1)),
            ),
        ]);
    }

    #[test]
    fn test_strings_and_builtins() {
        test_evaluation(vec![
            (
                "\"Hello\" + \" \" + \"World!\"",
                Ok(Object::string("Hello World!".to_owned())),
            ),
            ("len(\"\")", Ok(Object::integer(0))),
            ("len(\"four\")", Ok(Object::integer(4))),
            ("len([1, 2, 3])", Ok(Object::integer(3))),
            ("let len = fn(x) { 42 }; len(\"four\")", Ok(Object::integer(42))),
            ("rest(push([1], 2))", Ok(Object::array(vec![Object::integer(2)]))),
        ]);
        test_errors(vec![
            ("len(1)", "argument to `len` not supported. got INTEGER"),
            ("len(\"one\", \"two\")", "wrong number of arguments. got=2, want=1"),
            ("first(1)", "argument to `first` must be ARRAY, got INTEGER"),
        ]);
    }

    #[test]
    fn test_arrays() {
        test_evaluation(vec![
            (
                "[1, 2 * 2, 3 + 3]",
                Ok(Object::array(vec![
                    Object::integer(1),
                    Object::integer(4),
                    Object::integer(6),
                ])),
            ),
            ("[1, 2, 3][0]", Ok(Object::integer(1))),
            ("[1, 2, 3][1 + 1]", Ok(Object::integer(3))),
            ("let i = 0; [1][i]", Ok(Object::integer(1))),
            ("let myArray = [1, 2, 3]; myArray[2]", Ok(Object::integer(3))),
            ("[1, 2, 3][3]", Ok(Object::null())),
            ("[1, 2, 3][-1]", Ok(Object::null())),
        ]);
        test_errors(vec![
            ("1[0]", "index operator not supported: INTEGER"),
            ("[1][\"a\"]", "index operator not supported: ARRAY"),
        ]);
    }

    #[test]
    fn test_hashes() {
        let context = EvalContext::default();
        let result = run_with(
            r#"let two = "two";
            {"one": 10 - 9, two: 1 + 1, "thr" + "ee": 6 / 2, 4: 4, true: 5, false: 6}"#,
            &context,
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            result.to_string(),
            "{\"one\": 1, \"two\": 2, \"three\": 3, 4: 4, true: 5, false: 6}"
        );

        test_evaluation(vec![
            ("{\"foo\": 5}[\"foo\"]", Ok(Object::integer(5))),
            ("{\"foo\": 5}[\"bar\"]", Ok(Object::null())),
            ("let key = \"foo\"; {\"foo\": 5}[key]", Ok(Object::integer(5))),
            ("{}[\"foo\"]", Ok(Object::null())),
            ("{5: 5}[5]", Ok(Object::integer(5))),
            ("{true: 5}[true]", Ok(Object::integer(5))),
            ("{1: 1, 1: 2}[1]", Ok(Object::integer(2))),
        ]);
        test_errors(vec![
            (
                "{\"name\": \"Monkey\"}[fn(x) { x }];",
                "unusable as hash key: FUNCTION",
            ),
            ("{fn(x) { x }: 1}", "unusable as hash key: FUNCTION"),
        ]);
    }

    #[test]
    fn test_for_loops() {
        test_evaluation(vec![
            (
                "let i = 0; let sum = 0; for (i < 5) { let i = i + 1; let sum = sum + i; }; sum",
                Ok(Object::integer(15)),
            ),
            (
                "let i = 0; for (true) { let i = i + 1; if (i == 3) { break; } }; i",
                Ok(Object::integer(3)),
            ),
            (
                "let i = 0; let odd = 0; for (i < 6) { let i = i + 1; if (i / 2 * 2 == i) { continue; } let odd = odd + 1; }; odd",
                Ok(Object::integer(3)),
            ),
            ("for (false) { 1 }", Ok(Object::null())),
            (
                "let f = fn() { let n = 0; for (true) { let n = n + 1; if (n == 4) { return n; } } }; f()",
                Ok(Object::integer(4)),
            ),
        ]);
    }

    #[test]
    fn test_macro_literal_is_not_callable() {
        test_errors(vec![(
            "let m = macro(x) { x }; m(1)",
            "not a function: MACRO",
        )]);
    }

    #[test]
    fn test_call_depth() {
        let context = EvalContext::new(
            MapLoader(HashMap::new()),
            EvalConfig { max_call_depth: 16 },
        );

        assert_eq!(
            run_with("let f = fn(n) { f(n + 1) }; f(0)", &context),
            Err(EvaluationError::CallDepthExceeded)
        );
        assert_eq!(
            run_with(
                "let f = fn(n) { if (n == 0) { 0 } else { f(n - 1) } }; f(15)",
                &context
            ),
            Ok(Some(Object::integer(0)))
        );
    }

    #[test]
    fn test_call_depth_with_nested_bodies() {
        let max = EvalConfig::default().max_call_depth;
        let function = "let f = fn(n) { if (n == 0) { 0 } else { if (true) { for (true) { return [1 + [f(n - 1)][0]][0]; } } } };";
        let context = EvalContext::default();

        assert_eq!(
            run_with(&format!("{} f({})", function, max - 10), &context),
            Ok(Some(Object::integer((max - 10) as i64)))
        );
        assert_eq!(
            run_with(&format!("{} f({})", function, max), &context),
            Err(EvaluationError::CallDepthExceeded)
        );
        assert_eq!(
            run_with(&format!("{} f(3)", function), &context),
            Ok(Some(Object::integer(3)))
        );
    }

    #[test]
    fn test_use() {
        let context = EvalContext::new(
            MapLoader(HashMap::from([
                ("math.ma", "let double = fn(x) { x * 2 }; 7"),
                ("self.ma", "use \"self.ma\""),
                ("broken.ma", "let = 1;"),
                (
                    "macros.ma",
                    "let twice = macro(e) { quote(unquote(e) + unquote(e)) };",
                ),
            ])),
            EvalConfig { max_call_depth: 32 },
        );

        assert_eq!(
            run_with("use \"math.ma\"; double(4)", &context),
            Ok(Some(Object::integer(8)))
        );
        assert_eq!(
            run_with("use \"math.ma\"", &context),
            Ok(Some(Object::integer(7)))
        );
        assert_eq!(
            run_with("use \"macros.ma\"; use \"math.ma\"", &context),
            Ok(Some(Object::integer(7)))
        );
        assert_eq!(
            run_with("use \"self.ma\"", &context),
            Err(EvaluationError::CallDepthExceeded)
        );
        assert_eq!(
            run_with("use \"missing.ma\"", &context)
                .unwrap_err()
                .to_string(),
            "could not load missing.ma: no such file"
        );
        assert_eq!(
            run_with("use \"broken.ma\"", &context)
                .unwrap_err()
                .to_string(),
            "could not load broken.ma: expected next token to be IDENT, got = instead"
        );
    }
}
