//! Traversal-and-export orchestration.
//!
//! # Architecture
//!
//! - [`FolderWalker`] - Paced depth-first traversal of one remote folder tree
//! - [`RetryController`] - Bounded, fixed-delay retries per file
//! - [`ExportDispatcher`] - Maps a file type to an [`ExportStrategy`] and downloads the result
//! - [`ExportRun`] - Drives every configured top-level folder through one walker
//! - [`ExportReport`] - Counters and failed nodes for the whole run
//!
//! Control flow: walker → catalog listing → for each child either descend or
//! retry controller → dispatcher → catalog URL resolution → download sink.

mod dispatcher;
mod error;
mod retry;
mod run;
mod stats;
mod walker;

pub use crate::catalog::FormatToken;
pub use dispatcher::{ExportDispatcher, ExportOutcome, ExportStrategy, FileExporter};
pub use error::ExportError;
pub use retry::{
    AttemptReport, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, ExportStatus, RetryController,
    RetryDecision, RetryPolicy,
};
pub use run::ExportRun;
pub use stats::{ExportReport, ExportStats, FailureRecord, NodeKind};
pub use walker::FolderWalker;
