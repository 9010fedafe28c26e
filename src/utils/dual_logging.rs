use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::utils::logging::LogEntry;

/// Global file logger instance
static DUAL_LOGGER: OnceLock<Option<DualLogger>> = OnceLock::new();

/// Timestamped log file plus a `latest.log` pointer next to it
pub struct DualLogger {
    log_file: Mutex<File>,
    log_path: PathBuf,
}

impl DualLogger {
    pub fn new(log_dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(log_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("candidate-grid_{}.log", timestamp));
        let log_file = OpenOptions::new().create(true).append(true).open(&log_path)?;

        let latest_path = log_dir.join("latest.log");

        #[cfg(unix)]
        {
            // Replace the previous symlink
            let _ = std::fs::remove_file(&latest_path);
            let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
        }

        #[cfg(windows)]
        {
            // Symlinks need elevated rights on Windows; write a pointer file instead
            let _ = std::fs::write(&latest_path, format!("Current log file: {}\n", log_path.display()));
        }

        Ok(Self {
            log_file: Mutex::new(log_file),
            log_path,
        })
    }

    pub fn write_entry(&self, entry: &LogEntry) {
        if let Ok(mut file) = self.log_file.lock() {
            let line = format!(
                "[{}] {} [{}] {}\n",
                entry.timestamp, entry.level, entry.target, entry.message
            );
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn flush(&self) {
        if let Ok(mut file) = self.log_file.lock() {
            let _ = file.flush();
        }
    }
}

/// Initialize the global file logger once; later calls return the first result
pub fn init_dual_logger(log_dir: &Path) -> Option<&'static DualLogger> {
    DUAL_LOGGER
        .get_or_init(|| match DualLogger::new(log_dir) {
            Ok(logger) => Some(logger),
            Err(e) => {
                eprintln!("Warning: could not open log file in {}: {}", log_dir.display(), e);
                None
            }
        })
        .as_ref()
}

/// Get the global file logger
pub fn get_dual_logger() -> Option<&'static DualLogger> {
    DUAL_LOGGER.get().and_then(Option::as_ref)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_and_latest_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let logger = DualLogger::new(dir.path()).unwrap();
        logger.write_entry(&LogEntry::new(tracing::Level::INFO, "fetch", "hello".to_string()));
        logger.flush();

        let contents = std::fs::read_to_string(logger.log_path()).unwrap();
        assert!(contents.contains("INFO [fetch] hello"));
        assert!(dir.path().join("latest.log").exists());
    }
}
