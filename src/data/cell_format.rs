// Cell formatting policy shared by the grid and the detail view.
// The two contexts intentionally differ for empty arrays and objects.

use serde_json::Value;

/// Maximum visible characters in a compact (grid/header) label
pub const MAX_CELL_CHARS: usize = 15;
pub const ELLIPSIS: &str = "...";

/// Placeholder shown in the grid for null/missing values
pub const GRID_EMPTY_PLACEHOLDER: &str = "—";
/// Placeholder shown in the detail view for null/missing values
pub const MODAL_EMPTY_PLACEHOLDER: &str = "Not provided";
/// Detail view text for an empty array
pub const MODAL_EMPTY_ARRAY: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatContext {
    /// Compact, truncated rendering inside a grid cell
    Grid,
    /// Full rendering inside the detail view
    Modal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Null or missing value, rendered as an explicit placeholder
    Empty,
    /// Plain text; `full` is the untruncated value kept for tooltips
    Text { display: String, full: String },
    /// Tag/badge rendering (used for the priority field)
    Badge { display: String, full: String },
}

impl CellContent {
    fn text(display: String, full: String) -> Self {
        CellContent::Text { display, full }
    }

    /// Text to draw, with the context's placeholder for empty values
    pub fn display(&self, ctx: FormatContext) -> &str {
        match self {
            CellContent::Empty => match ctx {
                FormatContext::Grid => GRID_EMPTY_PLACEHOLDER,
                FormatContext::Modal => MODAL_EMPTY_PLACEHOLDER,
            },
            CellContent::Text { display, .. } | CellContent::Badge { display, .. } => display,
        }
    }

    /// Untruncated value, if any
    pub fn full(&self) -> Option<&str> {
        match self {
            CellContent::Empty => None,
            CellContent::Text { full, .. } | CellContent::Badge { full, .. } => Some(full),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }

    pub fn is_badge(&self) -> bool {
        matches!(self, CellContent::Badge { .. })
    }
}

/// Truncate to `max` characters, appending an ellipsis when anything was cut
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

pub fn is_priority_field(field: &str) -> bool {
    field.eq_ignore_ascii_case("priority")
}

/// Render an array element the way a join would: strings unquoted,
/// null as nothing, nested structures as compact JSON.
fn join_element(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

pub fn join_array(items: &[Value]) -> String {
    items.iter().map(join_element).collect::<Vec<_>>().join(", ")
}

/// Untruncated single-line text for a value; used for sorting keys,
/// filtering and export. Null becomes an empty string.
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::Array(items) => join_array(items),
        other => join_element(other),
    }
}

/// Format one field value for the given context
pub fn format_cell(field: &str, value: Option<&Value>, ctx: FormatContext) -> CellContent {
    let value = match value {
        None | Some(Value::Null) => return CellContent::Empty,
        Some(v) => v,
    };

    match (value, ctx) {
        (Value::Array(items), FormatContext::Grid) => {
            if items.is_empty() {
                CellContent::Empty
            } else {
                let joined = join_array(items);
                CellContent::text(truncate_chars(&joined, MAX_CELL_CHARS), joined)
            }
        }
        (Value::Array(items), FormatContext::Modal) => {
            if items.is_empty() {
                let none = MODAL_EMPTY_ARRAY.to_string();
                CellContent::text(none.clone(), none)
            } else {
                let joined = join_array(items);
                CellContent::text(joined.clone(), joined)
            }
        }
        (Value::Object(_), FormatContext::Grid) => {
            let compact = value.to_string();
            CellContent::text(truncate_chars(&compact, MAX_CELL_CHARS), compact)
        }
        (Value::Object(_), FormatContext::Modal) => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            CellContent::text(pretty.clone(), pretty)
        }
        (Value::String(s), FormatContext::Grid) if is_priority_field(field) => CellContent::Badge {
            display: truncate_chars(s, MAX_CELL_CHARS),
            full: s.clone(),
        },
        (Value::String(s), FormatContext::Modal) if is_priority_field(field) => CellContent::Badge {
            display: s.clone(),
            full: s.clone(),
        },
        (other, FormatContext::Grid) => {
            let text = join_element(other);
            CellContent::text(truncate_chars(&text, MAX_CELL_CHARS), text)
        }
        (other, FormatContext::Modal) => {
            let text = join_element(other);
            CellContent::text(text.clone(), text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_missing_are_placeholders() {
        assert_eq!(format_cell("Name", None, FormatContext::Grid), CellContent::Empty);
        let null = json!(null);
        let cell = format_cell("Name", Some(&null), FormatContext::Grid);
        assert_eq!(cell.display(FormatContext::Grid), GRID_EMPTY_PLACEHOLDER);
        assert_eq!(cell.display(FormatContext::Modal), MODAL_EMPTY_PLACEHOLDER);
    }

    #[test]
    fn test_empty_string_is_not_placeholder() {
        let empty = json!("");
        let cell = format_cell("Notes", Some(&empty), FormatContext::Grid);
        assert!(!cell.is_empty());
        assert_eq!(cell.display(FormatContext::Grid), "");
    }

    #[test]
    fn test_empty_array_differs_by_context() {
        let tags = json!([]);
        assert!(format_cell("Tags", Some(&tags), FormatContext::Grid).is_empty());
        let modal = format_cell("Tags", Some(&tags), FormatContext::Modal);
        assert_eq!(modal.display(FormatContext::Modal), "None");
    }

    #[test]
    fn test_array_join_and_truncate() {
        let tags = json!(["Rust", "Go", "Python", "Haskell"]);
        let cell = format_cell("Tags", Some(&tags), FormatContext::Grid);
        assert_eq!(cell.display(FormatContext::Grid), "Rust, Go, Pytho...");
        assert_eq!(cell.full(), Some("Rust, Go, Python, Haskell"));
    }

    #[test]
    fn test_object_compact_vs_pretty() {
        let obj = json!({"a": 1});
        let grid = format_cell("Meta", Some(&obj), FormatContext::Grid);
        assert_eq!(grid.display(FormatContext::Grid), r#"{"a":1}"#);
        let modal = format_cell("Meta", Some(&obj), FormatContext::Modal);
        assert_eq!(modal.display(FormatContext::Modal), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_priority_badge_only_for_strings() {
        let high = json!("High");
        assert!(format_cell("PRIORITY", Some(&high), FormatContext::Grid).is_badge());
        assert!(format_cell("priority", Some(&high), FormatContext::Modal).is_badge());
        let num = json!(3);
        assert!(!format_cell("Priority", Some(&num), FormatContext::Grid).is_badge());
        assert!(!format_cell("Priority Notes", Some(&high), FormatContext::Grid).is_badge());
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate_chars("ééééééééééééééééé", 15).chars().count(), 18);
        assert_eq!(truncate_chars("short", 15), "short");
    }
}
