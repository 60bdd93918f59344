use std::ops::ControlFlow;

use malang_core::ast::Program;
use malang_core::parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::runner::print_parse_errors;

const PROMPT: &str = ">> ";

pub enum ReadOutput {
    ControlFlow(ControlFlow<()>),
    Value(Program),
}

pub struct Reader {
    rl: DefaultEditor,
}

impl Reader {
    pub fn new(rl: DefaultEditor) -> Self {
        Self { rl }
    }

    /// Reads one line and parses it. Parse errors are reported here and the
    /// line is skipped.
    pub fn read(&mut self) -> ReadOutput {
        let line = match self.rl.readline(PROMPT) {
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                return ReadOutput::ControlFlow(ControlFlow::Continue(()));
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                return ReadOutput::ControlFlow(ControlFlow::Break(()));
            }
            Err(err) => {
                println!("Error: {}", err);
                return ReadOutput::ControlFlow(ControlFlow::Break(()));
            }
            Ok(line) => line,
        };

        if line.trim().is_empty() {
            return ReadOutput::ControlFlow(ControlFlow::Continue(()));
        }
        if let Err(err) = self.rl.add_history_entry(line.as_str()) {
            tracing::warn!(%err, "could not record history");
        }

        match parser::parse(&line) {
            Ok(program) => ReadOutput::Value(program),
            Err(errors) => {
                print_parse_errors(&errors);
                ReadOutput::ControlFlow(ControlFlow::Continue(()))
            }
        }
    }
}
