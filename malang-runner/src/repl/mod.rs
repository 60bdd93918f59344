mod evaluator;
mod printer;
mod reader;

use std::ops::ControlFlow;

use rustyline::DefaultEditor;

use crate::runner::Session;
use evaluator::{Evaluator, InterpreterEvaluator};
use printer::{InterpreterPrinter, Printer};
use reader::{ReadOutput, Reader};

struct Repl<E: Evaluator, P: Printer> {
    reader: Reader,
    evaluator: E,
    printer: P,
}

impl<O, E: Evaluator<Object = O>, P: Printer<Object = O>> Repl<E, P> {
    fn run(mut self) {
        loop {
            match self.reader.read() {
                ReadOutput::ControlFlow(ControlFlow::Break(())) => break,
                ReadOutput::ControlFlow(ControlFlow::Continue(())) => continue,
                ReadOutput::Value(program) => {
                    let result = self.evaluator.evaluate(program);
                    self.printer.print(result)
                }
            }
        }
    }
}

/// Reads lines until end of input, evaluating each in `session`.
pub fn start(session: Session) -> anyhow::Result<()> {
    let rl = DefaultEditor::new()?;

    Repl {
        reader: Reader::new(rl),
        evaluator: InterpreterEvaluator::new(session),
        printer: InterpreterPrinter {},
    }
    .run();

    Ok(())
}
