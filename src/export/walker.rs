//! Depth-first traversal of a remote folder tree.
//!
//! The walker lists a folder, waits on the [`Pacer`] before each child, and
//! either descends into subfolders or hands files to the retry controller.
//! Descent uses an explicit stack of frames, each holding one folder's
//! remaining children, so a subfolder is finished before its next sibling
//! starts and native stack depth does not grow with remote nesting.
//!
//! Failures below the root are recorded in the [`ExportReport`] and never
//! abort the walk.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use super::dispatcher::{ExportOutcome, FileExporter};
use super::error::ExportError;
use super::retry::{ExportStatus, RetryController};
use super::stats::{ExportReport, ExportStats, NodeKind};
use crate::catalog::{Catalog, FileNode};
use crate::download::{Pacer, sanitize_filename};

/// One folder on the descent stack.
struct Frame {
    dir: PathBuf,
    remaining: VecDeque<FileNode>,
}

/// Sequential, paced, depth-first exporter of remote folder trees.
///
/// A walker is meant to live for one run: its retry counters, pacer and
/// report span every folder walked with it.
pub struct FolderWalker {
    catalog: Arc<dyn Catalog>,
    exporter: Arc<dyn FileExporter>,
    pacer: Pacer,
    retry: RetryController,
    report: ExportReport,
    written: HashSet<PathBuf>,
}

impl std::fmt::Debug for FolderWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderWalker")
            .field("pacer", &self.pacer)
            .field("retry", &self.retry)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl FolderWalker {
    /// Creates a walker.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn Catalog>,
        exporter: Arc<dyn FileExporter>,
        pacer: Pacer,
        retry: RetryController,
    ) -> Self {
        Self {
            catalog,
            exporter,
            pacer,
            retry,
            report: ExportReport::default(),
            written: HashSet::new(),
        }
    }

    /// Returns the counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> &ExportStats {
        &self.report.stats
    }

    /// Returns the report accumulated so far.
    #[must_use]
    pub fn report(&self) -> &ExportReport {
        &self.report
    }

    /// Mutable access to the report, for failures detected outside the walk.
    pub fn report_mut(&mut self) -> &mut ExportReport {
        &mut self.report
    }

    /// Consumes the walker and returns its report.
    #[must_use]
    pub fn into_report(self) -> ExportReport {
        self.report
    }

    /// Exports the remote folder `folder_id` into `local_dir/<folder name>`.
    ///
    /// Returns the local directory the folder was exported to.
    ///
    /// # Errors
    ///
    /// Fails only when the root folder's metadata or listing cannot be
    /// fetched, or its local directory cannot be created. Failures of
    /// descendants are recorded in the report instead.
    #[instrument(skip(self, local_dir), fields(local_dir = %local_dir.display()))]
    pub async fn walk(&mut self, folder_id: &str, local_dir: &Path) -> Result<PathBuf, ExportError> {
        let info = self.catalog.folder_info(folder_id).await?;
        let root_dir = local_dir.join(sanitize_filename(&info.name));
        let children = self.open_folder(folder_id, &root_dir).await?;
        info!(
            path = %root_dir.display(),
            children = children.len(),
            "exporting folder"
        );

        let mut stack = vec![Frame {
            dir: root_dir.clone(),
            remaining: children.into(),
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(child) = frame.remaining.pop_front() else {
                stack.pop();
                continue;
            };
            let dir = frame.dir.clone();

            self.pacer.acquire().await;

            if child.is_folder {
                let sub_dir = dir.join(sanitize_filename(&child.name));
                match self.open_folder(&child.guid, &sub_dir).await {
                    Ok(grandchildren) => {
                        info!(path = %sub_dir.display(), children = grandchildren.len(), "entering folder");
                        stack.push(Frame {
                            dir: sub_dir,
                            remaining: grandchildren.into(),
                        });
                    }
                    Err(e) => {
                        error!(guid = %child.guid, path = %sub_dir.display(), error = %e, "folder failed, skipping subtree");
                        self.report.record_failure(
                            NodeKind::Folder,
                            &child.guid,
                            &child.name,
                            sub_dir,
                            &e,
                        );
                    }
                }
            } else {
                self.export_child(&child, &dir).await;
            }
        }

        Ok(root_dir)
    }

    async fn open_folder(&mut self, folder_id: &str, dir: &Path) -> Result<Vec<FileNode>, ExportError> {
        let children = self.catalog.list_children(folder_id).await?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ExportError::io(dir, e))?;
        self.report.stats.folders_visited += 1;
        Ok(children)
    }

    async fn export_child(&mut self, file: &FileNode, dir: &Path) {
        let attempt = self.retry.attempt(self.exporter.as_ref(), file, dir).await;
        self.report.stats.retries += u64::from(attempt.attempts.saturating_sub(1));

        match attempt.status {
            ExportStatus::Succeeded(ExportOutcome::Exported { path, bytes }) => {
                self.report.stats.files_exported += 1;
                self.report.stats.bytes_written += bytes;
                if self.written.insert(path.clone()) {
                    info!(path = %path.display(), bytes, "exported");
                } else {
                    self.report.stats.name_collisions += 1;
                    warn!(path = %path.display(), guid = %file.guid, "exported over a file written earlier in this run");
                }
            }
            ExportStatus::Succeeded(ExportOutcome::Skipped { file_type }) => {
                self.report.stats.files_skipped += 1;
                debug!(path = %dir.join(&file.name).display(), file_type = %file_type, "skipped");
            }
            ExportStatus::Exhausted(e) => {
                self.report.record_failure(
                    NodeKind::File,
                    &file.guid,
                    &file.name,
                    dir.join(sanitize_filename(&file.name)),
                    &e,
                );
            }
        }
    }
}
