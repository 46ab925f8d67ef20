use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use agentchat_core::config::{Config, DEFAULT_LOG_FILTER};
use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE: &str = "agentchat.log";

/// Route `tracing` output to a file in the config directory.
///
/// stderr belongs to the terminal UI, so nothing is logged when there is no
/// config directory. Returns the log file path when logging is active.
pub fn init(filter: &str) -> Result<Option<PathBuf>> {
    let Ok(dir) = Config::config_dir() else {
        return Ok(None);
    };
    let (file, path) = open_log_file(&dir)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()?;

    Ok(Some(path))
}

/// Create `dir` if needed and open its log file for appending.
fn open_log_file(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;

    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    Ok((file, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("agentchat");
        let (_file, path) = open_log_file(&log_dir).unwrap();
        assert_eq!(path, log_dir.join("agentchat.log"));
        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_reports_unusable_directory() {
        let dir = tempdir().unwrap();
        let not_a_dir = dir.path().join("agentchat");
        fs::write(&not_a_dir, "").unwrap();

        let err = open_log_file(&not_a_dir).unwrap_err();
        assert!(err.to_string().contains("cannot create"));
    }
}
