use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{load_json, save_json, StoreError};

pub const SAVE_FAILED_MESSAGE: &str = "Failed to save availability";

/// One person's saved availability, keyed by (id, email)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityEntry {
    pub id: u64,
    pub email: String,
    pub name: String,
    pub role: Option<String>,
    /// Serialized availability document
    pub availability: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(u64),
    Updated(u64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityFile {
    entries: Vec<AvailabilityEntry>,
    next_id: u64,
}

impl Default for AvailabilityFile {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

pub struct AvailabilityStore {
    path: PathBuf,
    data: AvailabilityFile,
}

impl AvailabilityStore {
    pub const FILE_NAME: &'static str = "availability.json";

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = load_json(&path)?;
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn find_by_email(&self, email: &str) -> Option<&AvailabilityEntry> {
        self.data.entries.iter().find(|e| e.email == email)
    }

    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }

    /// Update the entry for `email` in place, or create one with the next id.
    /// A blank role is stored as no role.
    pub fn upsert(
        &mut self,
        email: &str,
        name: &str,
        availability: &str,
        role: Option<&str>,
    ) -> Result<UpsertOutcome, StoreError> {
        let role = role.map(str::trim).filter(|r| !r.is_empty()).map(str::to_string);

        let existing = self
            .find_by_email(email)
            .map(|e| (e.id, e.email.clone()));

        let outcome = match existing {
            Some((id, key_email)) => {
                let entry = self
                    .data
                    .entries
                    .iter_mut()
                    .find(|e| e.id == id && e.email == key_email)
                    .ok_or(StoreError::NotFound(id))?;
                entry.name = name.to_string();
                entry.role = role;
                entry.availability = availability.to_string();
                UpsertOutcome::Updated(id)
            }
            None => {
                let id = self.data.next_id;
                self.data.entries.push(AvailabilityEntry {
                    id,
                    email: email.to_string(),
                    name: name.to_string(),
                    role,
                    availability: availability.to_string(),
                });
                self.data.next_id += 1;
                UpsertOutcome::Created(id)
            }
        };

        save_json(&self.path, &self.data)?;
        tracing::info!(target: "store", "Availability for {}: {:?}", email, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_creates_then_updates() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AvailabilityStore::open(dir.path().join(AvailabilityStore::FILE_NAME)).unwrap();

        let created = store.upsert("a@x.com", "Ann", "{}", Some("Engineer")).unwrap();
        assert_eq!(created, UpsertOutcome::Created(1));

        let updated = store.upsert("a@x.com", "Ann B", "{\"totalSlots\":0}", Some("  ")).unwrap();
        assert_eq!(updated, UpsertOutcome::Updated(1));
        assert_eq!(store.len(), 1);

        let entry = store.find_by_email("a@x.com").unwrap();
        assert_eq!(entry.name, "Ann B");
        assert_eq!(entry.role, None);

        assert_eq!(store.upsert("b@x.com", "Bo", "{}", None).unwrap(), UpsertOutcome::Created(2));
    }
}
