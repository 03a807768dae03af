use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Append-only log of model output that could not be recovered.
#[derive(Debug, Clone)]
pub struct RawOutputLog {
    path: PathBuf,
}

impl RawOutputLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write failures are logged and otherwise ignored.
    pub fn record(&self, link: &str, raw: &str) {
        let result = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| write!(file, "\n\n=== {link} ===\n{raw}\n"));

        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "diagnostics: failed to record raw output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_block_per_failure() {
        let dir = tempfile::tempdir().unwrap();
        let log = RawOutputLog::new(dir.path().join("raw.txt"));

        log.record("https://a", "not json");
        log.record("https://b", "still not json");

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            content,
            "\n\n=== https://a ===\nnot json\n\n\n=== https://b ===\nstill not json\n"
        );
    }

    #[test]
    fn unwritable_path_is_not_fatal() {
        let log = RawOutputLog::new("/nonexistent-dir/raw.txt");
        log.record("https://a", "x");
    }
}
