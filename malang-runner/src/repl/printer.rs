use std::rc::Rc;

use malang_interpreter::object::{EvaluationError, Object};

pub trait Printer {
    type Object;

    fn print(&mut self, object: Self::Object);
}

pub struct InterpreterPrinter {}

impl Printer for InterpreterPrinter {
    type Object = Result<Option<Rc<Object>>, EvaluationError>;

    fn print(&mut self, object: Self::Object) {
        match object {
            Ok(Some(object)) => println!("{}", object),
            Ok(None) => {}
            Err(err) => println!("ERROR: {}", err),
        }
    }
}
