use std::path::PathBuf;

use malang_core::ast::Program;
use malang_core::parser::{self, ParseError};
use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum LoadError {
    #[error("{0}")]
    Io(String),
    #[error("{}", join_messages(.0))]
    Parse(Vec<ParseError>),
}

fn join_messages(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Supplies the programs named by `use` expressions.
pub trait SourceLoader {
    fn load(&self, path: &str) -> Result<Program, LoadError>;
}

/// Reads sources from disk, resolving relative paths against `root`.
///
/// Every `use` resolves against the same root, including one inside a loaded
/// file: `use "helper.ma"` in `lib/inner.ma` reads `<root>/helper.ma`, not
/// `<root>/lib/helper.ma`.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileLoader { root: root.into() }
    }
}

impl SourceLoader for FileLoader {
    fn load(&self, path: &str) -> Result<Program, LoadError> {
        let full_path = self.root.join(path);
        let source =
            std::fs::read_to_string(&full_path).map_err(|err| LoadError::Io(err.to_string()))?;
        parser::parse(&source).map_err(LoadError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::evaluator::{eval_program, EvalConfig, EvalContext};
    use crate::object::{EvaluationError, Object};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file() {
        let loader = FileLoader::new(std::env::temp_dir());
        let result = loader.load("malang-loader-test-does-not-exist.ma");

        assert!(matches!(result, Err(LoadError::Io(_))));
    }

    #[test]
    fn test_loads_and_parses() {
        let dir = std::env::temp_dir().join(format!("malang-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("good.ma"), "let answer = 42;").unwrap();
        std::fs::write(dir.join("bad.ma"), "let = 1;").unwrap();

        let loader = FileLoader::new(&dir);
        let program = loader.load("good.ma").unwrap();
        assert_eq!(program.to_string(), "let answer = 42;\n");

        let error = loader.load("bad.ma").unwrap_err();
        assert_eq!(
            error.to_string(),
            "expected next token to be IDENT, got = instead"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_nested_use_resolves_against_root() {
        let dir = std::env::temp_dir().join(format!("malang-nested-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("lib")).unwrap();
        std::fs::write(dir.join("lib/helper.ma"), "let helper = 1;").unwrap();
        std::fs::write(dir.join("lib/inner.ma"), "use \"lib/helper.ma\"; helper + 1").unwrap();
        std::fs::write(dir.join("lib/relative.ma"), "use \"helper.ma\"").unwrap();

        let context = EvalContext::new(FileLoader::new(&dir), EvalConfig::default());
        let run = |source: &str| {
            eval_program(&parser::parse(source).unwrap(), &Environment::new(), &context)
        };

        assert_eq!(run("use \"lib/inner.ma\""), Ok(Some(Object::integer(2))));
        assert!(matches!(
            run("use \"lib/relative.ma\""),
            Err(EvaluationError::Load { path, source: LoadError::Io(_) }) if path.as_ref() == "helper.ma"
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
