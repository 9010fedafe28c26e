//! Local persistence for templates, availability and preferences
//!
//! Each store owns one JSON document on disk. The whole document is read on
//! open and rewritten on every change.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod availability;
pub mod preferences;
pub mod templates;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A template titled '{title}' already exists")]
    Duplicate { title: String },

    #[error("Template title is empty")]
    EmptyTitle,

    #[error("No entry with id {0}")]
    NotFound(u64),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed store file {path}: {source}")]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn serde(path: &Path, source: serde_json::Error) -> Self {
        StoreError::Serde {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }
}

/// Read a JSON document, falling back to the default when the file is absent
pub(crate) fn load_json<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let contents = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    if contents.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&contents).map_err(|e| StoreError::serde(path, e))
}

/// Write a JSON document through a temporary sibling file and a rename
pub(crate) fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::serde(path, e))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))?;
    Ok(())
}
