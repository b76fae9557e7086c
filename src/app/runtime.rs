//! Top-level export flow: config → clients → run → report → exit outcome.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use docexport_core::{ExportConfig, ExportReport, ExportRun, HttpCatalog, HttpClient};
use tracing::{debug, info, warn};

use super::exit_handler::determine_exit_outcome;
use crate::ProcessExit;
use crate::cli::Args;

pub(crate) async fn run_export(args: &Args) -> Result<ProcessExit> {
    let config = ExportConfig::load(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;
    debug!(?config, "configuration loaded");

    let settings = config
        .resolve(&args.overrides())
        .context("invalid configuration")?;

    let catalog = HttpCatalog::new(settings.endpoints.clone(), &settings.session, settings.timeout)
        .context("failed to build catalog client")?;
    let sink = HttpClient::new(&settings.session, settings.timeout)
        .context("failed to build download client")?;

    info!(
        output = %settings.root_path.display(),
        folders = settings.folder_ids.len(),
        pacing_ms = settings.pacing.as_millis(),
        max_retries = settings.max_retries,
        "docexport starting"
    );

    let started = Instant::now();
    let report = ExportRun::from_settings(&settings, Arc::new(catalog), Arc::new(sink))
        .execute()
        .await;
    log_summary(&report, started);

    if let Some(path) = &args.report {
        write_report(path, &report)?;
        info!(path = %path.display(), "report written");
    }

    Ok(determine_exit_outcome(
        report.stats.completed(),
        report.stats.failed(),
    ))
}

fn log_summary(report: &ExportReport, started: Instant) {
    let stats = &report.stats;
    info!(
        folders = stats.folders_visited,
        exported = stats.files_exported,
        skipped = stats.files_skipped,
        failed = stats.failed(),
        retries = stats.retries,
        bytes = stats.bytes_written,
        elapsed_secs = started.elapsed().as_secs(),
        "export finished"
    );
    for failure in &report.failures {
        warn!(
            guid = %failure.guid,
            path = %failure.path.display(),
            error = %failure.error,
            "not exported"
        );
    }
}

fn write_report(path: &Path, report: &ExportReport) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create report directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("cannot serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("cannot write report to {}", path.display()))?;
    Ok(())
}
