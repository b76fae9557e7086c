//! CLI entry point for the docexport tool.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};

mod app;
mod cli;

use cli::Args;

/// How the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every node was exported or skipped.
    Success,
    /// Some nodes failed, others succeeded.
    Partial,
    /// Nothing succeeded, or the run could not start.
    Failure,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
            Self::Failure => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        ExitCode::from(exit.code())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let log_file = match args.log_dir.as_deref().map(app::logging::create_log_file) {
        Some(Ok((path, file))) => Some((path, file)),
        Some(Err(e)) => {
            eprintln!("error: {e:#}");
            return ProcessExit::Failure.into();
        }
        None => None,
    };
    let (log_path, log_file) = log_file.unzip();
    app::logging::init_tracing(args.default_log_level(), log_file);

    debug!(?args, "CLI arguments parsed");
    if let Some(path) = log_path {
        info!(path = %path.display(), "writing log file");
    }

    match app::runtime::run_export(&args).await {
        Ok(exit) => exit.into(),
        Err(e) => {
            error!("{e:#}");
            ProcessExit::Failure.into()
        }
    }
}
