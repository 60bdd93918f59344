use std::path::Path;
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{anyhow, Context};
use malang_core::ast::Program;
use malang_core::parser::{self, ParseError};
use malang_interpreter::environment::Environment;
use malang_interpreter::evaluator::{eval_program, EvalConfig, EvalContext};
use malang_interpreter::loader::SourceLoader;
use malang_interpreter::macro_expansion::{define_macros, expand_macros};
use malang_interpreter::object::{EvaluationError, Object};

/// One global environment plus the context every evaluation in it shares.
pub struct Session {
    environment: Environment,
    context: EvalContext,
}

impl Session {
    pub fn new(loader: impl SourceLoader + 'static, config: EvalConfig) -> Self {
        Self {
            environment: Environment::new(),
            context: EvalContext::new(loader, config),
        }
    }

    /// Defines the program's macros, expands their calls and evaluates what is
    /// left.
    pub fn evaluate(&self, mut program: Program) -> Result<Option<Rc<Object>>, EvaluationError> {
        define_macros(&mut program, &self.environment);
        let program = expand_macros(program, &self.environment, &self.context)?;
        eval_program(&program, &self.environment, &self.context)
    }

    pub fn load_prelude(&self, path: &Path) -> anyhow::Result<()> {
        let source = std::fs::read_to_string(path).context("could not read file")?;
        let program = parser::parse(&source).map_err(|errors| {
            let messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
            anyhow!("parser errors: {}", messages.join("; "))
        })?;
        self.evaluate(program)
            .map_err(|error| anyhow!("ERROR: {}", error))?;
        Ok(())
    }
}

pub fn print_parse_errors(errors: &[ParseError]) {
    println!("parser errors:");
    for error in errors {
        println!("\t{}", error);
    }
}

#[derive(Debug, PartialEq)]
pub enum ScriptError {
    Parse(Vec<ParseError>),
    Evaluation(EvaluationError),
}

pub fn run_script(session: &Session, source: &str) -> Result<Option<Rc<Object>>, ScriptError> {
    let program = parser::parse(source).map_err(ScriptError::Parse)?;
    session.evaluate(program).map_err(ScriptError::Evaluation)
}

/// Runs a whole script, printing its final value or what went wrong.
pub fn execute(session: &Session, source: &str) -> ExitCode {
    match run_script(session, source) {
        Ok(value) => {
            if let Some(value) = value {
                println!("{}", value);
            }
            ExitCode::SUCCESS
        }
        Err(ScriptError::Parse(errors)) => {
            print_parse_errors(&errors);
            ExitCode::FAILURE
        }
        Err(ScriptError::Evaluation(error)) => {
            println!("ERROR: {}", error);
            ExitCode::FAILURE
        }
    }
}
