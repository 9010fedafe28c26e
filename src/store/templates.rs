use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{load_json, save_json, StoreError};

pub const EMPTY_TITLE_MESSAGE: &str = "Please enter a title for the email template";
pub const DUPLICATE_TITLE_MESSAGE: &str = "A template with this title already exists";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save email template";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplate {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateFile {
    templates: Vec<EmailTemplate>,
    next_id: u64,
}

impl Default for TemplateFile {
    fn default() -> Self {
        Self {
            templates: Vec::new(),
            next_id: 1,
        }
    }
}

/// User-facing text for a failed template save
pub fn save_error_message(err: &StoreError) -> &'static str {
    match err {
        StoreError::Duplicate { .. } => DUPLICATE_TITLE_MESSAGE,
        StoreError::EmptyTitle => EMPTY_TITLE_MESSAGE,
        _ => SAVE_FAILED_MESSAGE,
    }
}

pub struct TemplateStore {
    path: PathBuf,
    data: TemplateFile,
}

impl TemplateStore {
    pub const FILE_NAME: &'static str = "templates.json";

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = load_json(&path)?;
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Templates, newest first
    pub fn list(&self) -> Vec<&EmailTemplate> {
        let mut templates: Vec<&EmailTemplate> = self.data.templates.iter().collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        templates
    }

    pub fn get(&self, id: u64) -> Option<&EmailTemplate> {
        self.data.templates.iter().find(|t| t.id == id)
    }

    fn title_taken(&self, title: &str, except: Option<u64>) -> bool {
        self.data
            .templates
            .iter()
            .any(|t| t.title == title && Some(t.id) != except)
    }

    /// Create an empty template. The title is trimmed and must be unique.
    pub fn create(&mut self, title: &str, author: &str) -> Result<EmailTemplate, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        if self.title_taken(title, None) {
            tracing::warn!(target: "store", "Duplicate template title '{}'", title);
            return Err(StoreError::Duplicate {
                title: title.to_string(),
            });
        }

        let template = EmailTemplate {
            id: self.data.next_id,
            title: title.to_string(),
            content: String::new(),
            author: author.to_string(),
            created_at: Utc::now(),
        };
        self.data.templates.push(template.clone());
        self.data.next_id += 1;
        self.persist()?;

        tracing::info!(target: "store", "Created template {} '{}'", template.id, template.title);
        Ok(template)
    }

    /// Replace title and content; the timestamp is refreshed on every update
    pub fn update(&mut self, id: u64, title: &str, content: &str) -> Result<EmailTemplate, StoreError> {
        if self.title_taken(title, Some(id)) {
            return Err(StoreError::Duplicate {
                title: title.to_string(),
            });
        }
        let template = self
            .data
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;

        template.title = title.to_string();
        template.content = content.to_string();
        template.created_at = Utc::now();
        let updated = template.clone();
        self.persist()?;

        tracing::info!(target: "store", "Updated template {}", id);
        Ok(updated)
    }

    fn persist(&self) -> Result<(), StoreError> {
        save_json(&self.path, &self.data)
    }
}
