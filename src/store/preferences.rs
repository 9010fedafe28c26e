use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{load_json, save_json, StoreError};
use crate::session::UserPreferences;

/// Preferences for every user seen on this machine, keyed by uid
pub struct PreferencesStore {
    path: PathBuf,
    entries: BTreeMap<String, UserPreferences>,
}

impl PreferencesStore {
    pub const FILE_NAME: &'static str = "preferences.json";

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = load_json(&path)?;
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored preferences, or defaults for an unknown user
    pub fn load(&self, uid: &str) -> UserPreferences {
        self.entries.get(uid).cloned().unwrap_or_default()
    }

    pub fn save(&mut self, uid: &str, preferences: &UserPreferences) -> Result<(), StoreError> {
        self.entries.insert(uid.to_string(), preferences.clone());
        save_json(&self.path, &self.entries)?;
        tracing::debug!(target: "session", "Saved preferences for {}", uid);
        Ok(())
    }
}
