//! Bounded retry with a fixed delay for single-file exports.
//!
//! This module provides the [`RetryPolicy`] and [`RetryController`] types.
//!
//! # Overview
//!
//! Every failed export attempt bumps a per-file failure counter keyed by the
//! file's GUID. While the counter is below the policy's maximum, the
//! controller waits the fixed delay and tries again; once the maximum is
//! reached the last error is wrapped in [`ExportError::RetryExhausted`] and
//! returned as a report, never raised.
//!
//! Counters live for the whole run and are never reset, so a GUID that
//! appears twice in one run shares a single retry budget.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use docexport_core::export::{RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//!
//! match policy.should_retry(0) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         assert_eq!(delay, Duration::from_secs(1));
//!         assert_eq!(attempt, 2);
//!     }
//!     RetryDecision::DoNotRetry { reason } => panic!("unexpected: {reason}"),
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, error, instrument, warn};

use super::dispatcher::{ExportOutcome, FileExporter};
use super::error::ExportError;
use crate::catalog::FileNode;

/// Default maximum number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default fixed delay between attempts (1 second).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Decision on whether to retry a failed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the export after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the export.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Retry limits: how many retries a file gets and how long to wait between them.
///
/// # Default Values
///
/// - `max_retries`: 3 (so at most 4 attempts)
/// - `delay`: 1 second, fixed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy.
    #[must_use]
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Returns the maximum number of retries.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the fixed delay between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Determines whether to retry given the failures already counted for a file.
    ///
    /// `failures` is the counter value *before* the failure being handled is
    /// recorded, so a fresh file passes `0`.
    #[must_use]
    pub fn should_retry(&self, failures: u32) -> RetryDecision {
        if failures >= self.max_retries {
            return RetryDecision::DoNotRetry {
                reason: format!("max retries ({}) exhausted", self.max_retries),
            };
        }

        RetryDecision::Retry {
            delay: self.delay,
            attempt: failures + 2,
        }
    }
}

/// Outcome of a file export after retries.
#[derive(Debug)]
pub enum ExportStatus {
    /// One of the attempts succeeded.
    Succeeded(ExportOutcome),
    /// Every allowed attempt failed; always [`ExportError::RetryExhausted`].
    Exhausted(ExportError),
}

/// Attempts made for one file and how it ended.
#[derive(Debug)]
pub struct AttemptReport {
    /// Attempts made during this call, including the first.
    pub attempts: u32,
    /// Final status.
    pub status: ExportStatus,
}

impl AttemptReport {
    /// Returns true if the export eventually succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, ExportStatus::Succeeded(_))
    }
}

/// Wraps single-file exports with bounded, fixed-delay retries.
///
/// One controller is owned by one run; its failure counters are never shared
/// with another run.
#[derive(Debug, Default)]
pub struct RetryController {
    policy: RetryPolicy,
    failures: HashMap<String, u32>,
}

impl RetryController {
    /// Creates a controller with the given policy and no recorded failures.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            failures: HashMap::new(),
        }
    }

    /// Returns the policy in effect.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the failures counted so far for `guid`.
    #[must_use]
    pub fn failures(&self, guid: &str) -> u32 {
        self.failures.get(guid).copied().unwrap_or(0)
    }

    /// Exports `file` into `dir`, retrying failed attempts per the policy.
    ///
    /// Never returns an error: exhaustion is reported in the returned status.
    #[instrument(skip(self, exporter, file, dir), fields(guid = %file.guid, name = %file.name))]
    pub async fn attempt(
        &mut self,
        exporter: &dyn FileExporter,
        file: &FileNode,
        dir: &Path,
    ) -> AttemptReport {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let error = match exporter.export_file(file, dir).await {
                Ok(outcome) => {
                    debug!(attempts, "export succeeded");
                    return AttemptReport {
                        attempts,
                        status: ExportStatus::Succeeded(outcome),
                    };
                }
                Err(error) => error,
            };

            let failures = self.failures.entry(file.guid.clone()).or_insert(0);
            match self.policy.should_retry(*failures) {
                RetryDecision::Retry { delay, attempt } => {
                    *failures += 1;
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "export failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::DoNotRetry { reason } => {
                    error!(attempts, reason = %reason, error = %error, "export failed");
                    return AttemptReport {
                        attempts,
                        status: ExportStatus::Exhausted(ExportError::retry_exhausted(
                            &file.guid, &file.name, attempts, error,
                        )),
                    };
                }
            }
        }
    }
}
