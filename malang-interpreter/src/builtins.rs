use std::rc::Rc;

use crate::object::{BuiltinFn, BuiltinFunction, EvaluationError, Object, QuickReturn};

fn check_argument_count(args: &[Rc<Object>], want: usize) -> Result<(), QuickReturn> {
    if args.len() != want {
        return Err(QuickReturn::Error(EvaluationError::WrongArgumentCount {
            got: args.len(),
            want,
        }));
    }
    Ok(())
}

fn expected_array(function: &'static str, got: &Object) -> QuickReturn {
    QuickReturn::Error(EvaluationError::ExpectedArray {
        function,
        got: got.type_name(),
    })
}

fn builtin_len(args: Vec<Rc<Object>>) -> Result<Rc<Object>, QuickReturn> {
    check_argument_count(&args, 1)?;
    match args[0].as_ref() {
        Object::String(s) => Ok(Object::integer(s.len() as i64)),
        Object::Array(arr) => Ok(Object::integer(arr.len() as i64)),
        other => Err(QuickReturn::Error(EvaluationError::UnsupportedArgument {
            function: "len",
            got: other.type_name(),
        })),
    }
}

fn builtin_first(args: Vec<Rc<Object>>) -> Result<Rc<Object>, QuickReturn> {
    check_argument_count(&args, 1)?;
    match args[0].as_ref() {
        Object::Array(arr) => Ok(arr.first().cloned().unwrap_or_else(Object::null)),
        other => Err(expected_array("first", other)),
    }
}

fn builtin_last(args: Vec<Rc<Object>>) -> Result<Rc<Object>, QuickReturn> {
    check_argument_count(&args, 1)?;
    match args[0].as_ref() {
        Object::Array(arr) => Ok(arr.last().cloned().unwrap_or_else(Object::null)),
        other => Err(expected_array("last", other)),
    }
}

fn builtin_rest(args: Vec<Rc<Object>>) -> Result<Rc<Object>, QuickReturn> {
    check_argument_count(&args, 1)?;
    match args[0].as_ref() {
        Object::Array(arr) if arr.is_empty() => Ok(Object::null()),
        Object::Array(arr) => Ok(Object::array(arr[1..].to_owned())),
        other => Err(expected_array("rest", other)),
    }
}

fn builtin_push(args: Vec<Rc<Object>>) -> Result<Rc<Object>, QuickReturn> {
    check_argument_count(&args, 2)?;
    match args[0].as_ref() {
        Object::Array(arr) => {
            let mut new_arr = arr.clone();
            new_arr.push(args[1].clone());
            Ok(Object::array(new_arr))
        }
        other => Err(expected_array("push", other)),
    }
}

fn builtin_puts(args: Vec<Rc<Object>>) -> Result<Rc<Object>, QuickReturn> {
    for arg in &args {
        println!("{}", arg);
    }
    Ok(Object::null())
}

const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("len", builtin_len as BuiltinFn),
    ("first", builtin_first as BuiltinFn),
    ("last", builtin_last as BuiltinFn),
    ("rest", builtin_rest as BuiltinFn),
    ("push", builtin_push as BuiltinFn),
    ("puts", builtin_puts as BuiltinFn),
];

/// The built-in consulted when a name is not bound in any environment.
pub fn map_builtins(name: &str) -> Option<BuiltinFunction> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|&(name, func)| BuiltinFunction { name, func })
}
