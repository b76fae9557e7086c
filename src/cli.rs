//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use docexport_core::config::ConfigOverrides;

/// Bulk export a remote document folder tree into local files.
///
/// Every folder listed in the configuration file is walked depth-first and
/// each document is saved in a format matching its type (docx, xlsx, pptx,
/// md, xmind, or the original upload).
#[derive(Parser, Debug)]
#[command(name = "docexport")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Local export root (overrides `path` in the config file)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Delay between consecutive nodes in milliseconds (0 to disable, max 60000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub pacing_ms: Option<u64>,

    /// Retries per file after the first attempt (0-10)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub max_retries: Option<u32>,

    /// Write a JSON report of the run to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Also write logs to a timestamped file in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Command-line values that override the configuration file.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            output_dir: self.output_dir.clone(),
            pacing_ms: self.pacing_ms,
            max_retries: self.max_retries,
        }
    }

    /// Default log level from the verbosity flags.
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
