use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cloze")
}

/// Route tracing output to `<data_local_dir>/cloze/cloze.log`; the terminal
/// belongs to the UI. `RUST_LOG` wins over the configured filter.
/// Keep the returned guard alive or buffered lines are lost on exit.
///
/// Failure is not fatal: the app runs on without file logging.
pub fn init(default_filter: &str) -> Option<WorkerGuard> {
    match init_in(&log_dir(), default_filter) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: file logging disabled: {err:#}");
            None
        }
    }
}

fn init_in(dir: &Path, default_filter: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, "cloze.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unusable_log_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let err = init_in(&blocker.join("cloze"), "debug").unwrap_err();
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }
}
