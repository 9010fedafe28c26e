use serde_json::Value;

use crate::data::cell_format::{format_cell, truncate_chars, CellContent, FormatContext, MAX_CELL_CHARS};

/// Display description of one grid column, derived from a field name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column id, identical to the field name
    pub id: String,
    /// Compact header label (at most 15 characters plus an ellipsis)
    pub display_label: String,
    /// Untruncated humanized label, shown as the header tooltip
    pub full_label: String,
    pub sortable: bool,
}

impl ColumnDescriptor {
    pub fn from_field(field: &str) -> Self {
        let full_label = humanize_label(field);
        Self {
            id: field.to_string(),
            display_label: truncate_chars(&full_label, MAX_CELL_CHARS),
            full_label,
            sortable: true,
        }
    }

    /// Format this column's value for a record's field map
    pub fn format(&self, value: Option<&Value>, ctx: FormatContext) -> CellContent {
        format_cell(&self.id, value, ctx)
    }
}

/// Turn a field name into a header label.
///
/// Words break before every ASCII uppercase letter and at spaces,
/// underscores and hyphens. Each word gets an uppercase first character
/// and lowercase remainder; empty words are dropped.
pub fn humanize_label(field: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in field.chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            words.push(std::mem::take(&mut current));
            continue;
        }
        if ch.is_ascii_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    words.push(current);

    words
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| capitalize(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.as_str().to_lowercase();
            first.to_uppercase().chain(rest.chars()).collect()
        }
        None => String::new(),
    }
}

/// Build one descriptor per field name, preserving input order
pub fn synthesize_columns(fields: &[String]) -> Vec<ColumnDescriptor> {
    let columns: Vec<ColumnDescriptor> = fields.iter().map(|f| ColumnDescriptor::from_field(f)).collect();
    tracing::debug!(target: "table", "Generated {} columns", columns.len());
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_rules() {
        assert_eq!(humanize_label("firstName"), "First Name");
        assert_eq!(humanize_label("Last Name"), "Last Name");
        assert_eq!(humanize_label("email_address"), "Email Address");
        assert_eq!(humanize_label("start-date"), "Start Date");
        assert_eq!(humanize_label("ID"), "I D");
        assert_eq!(humanize_label("UPPER case"), "U P P E R Case");
        assert_eq!(humanize_label("a__b"), "A B");
    }

    #[test]
    fn test_long_label_truncated_with_full_kept() {
        let col = ColumnDescriptor::from_field("Why do you want to join");
        assert_eq!(col.full_label, "Why Do You Want To Join");
        assert_eq!(col.display_label, "Why Do You Want...");
        assert_eq!(col.id, "Why do you want to join");
        assert!(col.sortable);
    }

    #[test]
    fn test_synthesize_preserves_order() {
        let fields = vec!["Email".to_string(), "Name".to_string()];
        let cols = synthesize_columns(&fields);
        let ids: Vec<&str> = cols.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["Email", "Name"]);
    }
}
