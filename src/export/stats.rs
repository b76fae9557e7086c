//! Run statistics and the failure report.

use std::path::PathBuf;

use serde::Serialize;

/// Counters accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStats {
    /// Folders whose children were listed, top-level folders included.
    pub folders_visited: usize,
    /// Folders whose metadata or listing failed.
    pub folders_failed: usize,
    /// Files written to disk.
    pub files_exported: usize,
    /// Files skipped because their type cannot be exported.
    pub files_skipped: usize,
    /// Files whose retries were exhausted.
    pub files_failed: usize,
    /// Retries performed across all files.
    pub retries: u64,
    /// Total bytes written.
    pub bytes_written: u64,
    /// Exported files that overwrote a file written earlier in the same run.
    pub name_collisions: usize,
}

impl ExportStats {
    /// Nodes that ended in a usable state (exported or deliberately skipped).
    #[must_use]
    pub fn completed(&self) -> usize {
        self.files_exported + self.files_skipped
    }

    /// Nodes that failed: exhausted files plus unlistable folders.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.files_failed + self.folders_failed
    }
}

/// What kind of node a failure record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A folder whose subtree was abandoned.
    Folder,
    /// A file whose export was abandoned.
    File,
}

/// One node that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    /// Remote identifier.
    pub guid: String,
    /// Display name.
    pub name: String,
    /// File or folder.
    pub kind: NodeKind,
    /// Local path the node would have been written to.
    pub path: PathBuf,
    /// Rendered error chain head.
    pub error: String,
}

/// Summary of a run: counters plus every failed node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    /// Run counters.
    pub stats: ExportStats,
    /// Failed nodes in the order they were encountered.
    pub failures: Vec<FailureRecord>,
}

impl ExportReport {
    /// Records a failed node.
    pub fn record_failure(
        &mut self,
        kind: NodeKind,
        guid: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        error: &dyn std::error::Error,
    ) {
        match kind {
            NodeKind::Folder => self.stats.folders_failed += 1,
            NodeKind::File => self.stats.files_failed += 1,
        }
        self.failures.push(FailureRecord {
            guid: guid.into(),
            name: name.into(),
            kind,
            path: path.into(),
            error: error.to_string(),
        });
    }

    /// Returns true if no node failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
