use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::availability::AvailabilityStore;
use crate::store::preferences::PreferencesStore;
use crate::store::templates::TemplateStore;

/// File locations under the data directory
#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Create the data directory if it is missing
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Cannot create data directory {}", self.data_dir.display()))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn templates_file(&self) -> PathBuf {
        self.data_dir.join(TemplateStore::FILE_NAME)
    }

    pub fn availability_file(&self) -> PathBuf {
        self.data_dir.join(AvailabilityStore::FILE_NAME)
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.data_dir.join(PreferencesStore::FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path().join("data"));
        paths.ensure().unwrap();
        assert!(paths.data_dir().is_dir());
        assert_eq!(paths.templates_file(), dir.path().join("data").join("templates.json"));
        assert!(paths.log_dir().ends_with("logs"));
    }
}
