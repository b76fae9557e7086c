//! Multi-folder driver for one invocation.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use super::dispatcher::ExportDispatcher;
use super::retry::{RetryController, RetryPolicy};
use super::stats::{ExportReport, NodeKind};
use super::walker::FolderWalker;
use crate::catalog::Catalog;
use crate::config::RunSettings;
use crate::download::{DownloadSink, Pacer};

/// Exports every configured top-level folder, in order, with one walker.
///
/// The walker (and therefore its retry counters and pacer) is shared by all
/// folders of the run. A top-level folder that cannot be listed is recorded
/// as a failure and the run moves on to the next one.
#[derive(Debug)]
pub struct ExportRun {
    walker: FolderWalker,
    output_root: PathBuf,
    folder_ids: Vec<String>,
}

impl ExportRun {
    /// Creates a run from an already-assembled walker.
    #[must_use]
    pub fn new(walker: FolderWalker, output_root: impl Into<PathBuf>, folder_ids: Vec<String>) -> Self {
        Self {
            walker,
            output_root: output_root.into(),
            folder_ids,
        }
    }

    /// Assembles dispatcher, pacer and retry controller from resolved settings.
    #[must_use]
    pub fn from_settings(
        settings: &RunSettings,
        catalog: Arc<dyn Catalog>,
        sink: Arc<dyn DownloadSink>,
    ) -> Self {
        let exporter = Arc::new(ExportDispatcher::new(catalog.clone(), sink));
        let walker = FolderWalker::new(
            catalog,
            exporter,
            Pacer::new(settings.pacing),
            RetryController::new(RetryPolicy::new(settings.max_retries, settings.retry_delay)),
        );
        Self::new(walker, &settings.root_path, settings.folder_ids.clone())
    }

    /// Walks every folder and returns the combined report.
    pub async fn execute(mut self) -> ExportReport {
        info!(
            folders = self.folder_ids.len(),
            output = %self.output_root.display(),
            "export run starting"
        );

        for folder_id in &self.folder_ids {
            match self.walker.walk(folder_id, &self.output_root).await {
                Ok(dir) => info!(folder_id = %folder_id, path = %dir.display(), "folder finished"),
                Err(e) => {
                    error!(folder_id = %folder_id, error = %e, "top-level folder failed");
                    self.walker.report_mut().record_failure(
                        NodeKind::Folder,
                        folder_id,
                        folder_id,
                        &self.output_root,
                        &e,
                    );
                }
            }
        }

        self.walker.into_report()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tempfile::TempDir;

    use crate::catalog::{FileNode, FileType};
    use crate::test_support::fakes::{CallLog, FakeCatalog, RecordingSink};

    fn settings(root: &std::path::Path, folder_ids: &[&str]) -> RunSettings {
        RunSettings {
            root_path: root.to_path_buf(),
            folder_ids: folder_ids.iter().map(ToString::to_string).collect(),
            pacing: Duration::ZERO,
            retry_delay: Duration::ZERO,
            max_retries: 3,
            ..RunSettings::default()
        }
    }

    #[tokio::test]
    async fn test_failed_top_level_folder_does_not_stop_run() {
        let temp_dir = TempDir::new().unwrap();
        let log = CallLog::default();
        let catalog = FakeCatalog::new(&log).folder(
            "GOOD",
            "Team",
            vec![FileNode::file("G1", "Doc1", FileType::Newdoc)],
        );

        let run = ExportRun::from_settings(
            &settings(temp_dir.path(), &["MISSING", "GOOD"]),
            Arc::new(catalog),
            Arc::new(RecordingSink::new(&log)),
        );
        let report = run.execute().await;

        assert_eq!(report.stats.folders_failed, 1);
        assert_eq!(report.stats.files_exported, 1);
        assert_eq!(report.failures[0].guid, "MISSING");
        assert_eq!(
            log.fetches()[0].1,
            temp_dir.path().join("Team").join("Doc1.md")
        );
    }

    #[tokio::test]
    async fn test_retry_budget_spans_top_level_folders() {
        let temp_dir = TempDir::new().unwrap();
        let log = CallLog::default();
        let shared = FileNode::file("G1", "Doc1", FileType::Modoc);
        let catalog = FakeCatalog::new(&log)
            .folder("A", "A", vec![shared.clone()])
            .folder("B", "B", vec![shared])
            .failing_export("G1", 100);

        let run = ExportRun::from_settings(
            &settings(temp_dir.path(), &["A", "B"]),
            Arc::new(catalog),
            Arc::new(RecordingSink::new(&log)),
        );
        let report = run.execute().await;

        // Four attempts in A, then a single attempt in B.
        assert_eq!(log.export_calls(), 5);
        assert_eq!(report.stats.files_failed, 2);
    }
}
