//! Tracing subscriber setup: stderr always, plus an optional per-run log file.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Builds the per-run log file name, `docexport.<unix-ms>.log`.
pub(crate) fn log_file_name(now: SystemTime) -> String {
    let millis = now
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    format!("docexport.{millis}.log")
}

/// Creates `dir` if needed and opens a fresh log file inside it.
pub(crate) fn create_log_file(dir: &Path) -> Result<(PathBuf, File)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    let path = dir.join(log_file_name(SystemTime::now()));
    let file = File::create(&path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    Ok((path, file))
}

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. The file layer, when
/// present, never carries ANSI escapes.
pub(crate) fn init_tracing(default_level: &str, log_file: Option<File>) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);
    let file_layer = log_file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[test]
    fn test_log_file_name_uses_unix_millis() {
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(log_file_name(at), "docexport.1700000000123.log");
    }

    #[test]
    fn test_create_log_file_creates_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = temp_dir.path().join("log");

        let (path, _file) = create_log_file(&dir).unwrap();

        assert!(path.starts_with(&dir));
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("docexport.") && name.ends_with(".log"));
    }
}
