use std::rc::Rc;

use malang_core::ast::Program;
use malang_interpreter::object::{EvaluationError, Object};

use crate::runner::Session;

pub trait Evaluator {
    type Object;

    fn evaluate(&mut self, program: Program) -> Self::Object;
}

/// Evaluates every line in one session, so bindings and macros carry over.
pub struct InterpreterEvaluator {
    session: Session,
}

impl InterpreterEvaluator {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

impl Evaluator for InterpreterEvaluator {
    type Object = Result<Option<Rc<Object>>, EvaluationError>;

    fn evaluate(&mut self, program: Program) -> Self::Object {
        self.session.evaluate(program)
    }
}
