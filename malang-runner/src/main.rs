mod repl;
mod runner;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use malang_interpreter::evaluator::EvalConfig;
use malang_interpreter::loader::FileLoader;

use runner::Session;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Script to run. Starts a REPL when omitted.
    path: Option<PathBuf>,
    /// Source evaluated before the script or REPL, in the same environment.
    #[arg(long)]
    prelude: Option<PathBuf>,
    #[arg(long, default_value_t = EvalConfig::default().max_call_depth)]
    max_call_depth: usize,
}

// Stays silent unless RUST_LOG is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let config = EvalConfig {
        max_call_depth: cli.max_call_depth,
    };

    // `use` paths resolve against the script's directory, or the working
    // directory for the REPL.
    let root = match &cli.path {
        Some(path) => path.parent().unwrap_or(Path::new("")).to_owned(),
        None => PathBuf::new(),
    };
    let session = Session::new(FileLoader::new(root), config);

    if let Some(prelude) = &cli.prelude {
        session
            .load_prelude(prelude)
            .with_context(|| format!("failed to load prelude {}", prelude.display()))?;
    }

    match cli.path {
        None => {
            repl::start(session)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(path) => {
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("could not read {}", path.display()))?;
            Ok(runner::execute(&session, &source))
        }
    }
}
