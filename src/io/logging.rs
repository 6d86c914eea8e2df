use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "taskdeck=info";
const VERBOSE_FILTER: &str = "taskdeck=debug";

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to a file (the TUI owns the terminal)
    File(PathBuf),
    Stderr,
    /// No subscriber at all
    Off,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("could not open log file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("logging was already initialized")]
    AlreadyInitialized,
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    })
}

fn open_append(path: &Path) -> Result<std::fs::File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Install the global tracing subscriber.
pub fn init(target: &LogTarget, verbose: bool) -> Result<(), LoggingError> {
    let installed = match target {
        LogTarget::Off => return Ok(()),
        LogTarget::File(path) => {
            let file = open_append(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter(verbose))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter(verbose))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init(),
    };
    installed.map_err(|_| LoggingError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_target_receives_events() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("td.log");
        init(&LogTarget::File(path.clone()), true).unwrap();

        tracing::warn!(task = "42", "close failed");

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("close failed"), "{written}");
        assert!(written.contains("task=\"42\""), "{written}");

        // A second subscriber cannot replace the first
        assert!(matches!(
            init(&LogTarget::Stderr, false),
            Err(LoggingError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_open_append_reports_path() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("no-such-dir").join("td.log");
        let err = open_append(&missing).unwrap_err();
        assert!(err.to_string().contains("no-such-dir"));
    }

    #[test]
    fn test_off_installs_nothing() {
        assert!(init(&LogTarget::Off, false).is_ok());
    }
}
