use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::data::cell_format::plain_text;
use crate::data::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Which column the rows are sorted by, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<String>,
    pub order: Option<SortOrder>,
}

impl SortState {
    /// Header interaction: unsorted -> ascending, ascending -> descending,
    /// descending -> ascending. Switching columns starts at ascending.
    pub fn toggle(&mut self, column_id: &str) {
        let next = match (&self.column, self.order) {
            (Some(current), Some(SortOrder::Ascending)) if current == column_id => {
                SortOrder::Descending
            }
            _ => SortOrder::Ascending,
        };
        self.column = Some(column_id.to_string());
        self.order = Some(next);
    }

    pub fn clear(&mut self) {
        self.column = None;
        self.order = None;
    }

    pub fn order_for(&self, column_id: &str) -> Option<SortOrder> {
        match &self.column {
            Some(c) if c == column_id => self.order,
            _ => None,
        }
    }
}

/// Rank of a value's kind; values of different kinds compare by rank
fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}

/// Natural ordering of two present (non-null) values
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            plain_text(a).cmp(&plain_text(b))
        }
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// How the filter text is matched against cell values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    /// Case-insensitive substring match
    Contains(String),
    /// Skim fuzzy match
    Fuzzy(String),
}

impl RowFilter {
    /// Parse filter input; a leading `~` selects fuzzy matching.
    /// Blank input means no filter.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if let Some(pattern) = trimmed.strip_prefix('~') {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                None
            } else {
                Some(RowFilter::Fuzzy(pattern.to_string()))
            }
        } else if trimmed.is_empty() {
            None
        } else {
            Some(RowFilter::Contains(trimmed.to_lowercase()))
        }
    }

    pub fn pattern(&self) -> &str {
        match self {
            RowFilter::Contains(p) | RowFilter::Fuzzy(p) => p,
        }
    }
}

/// A view over a record set that can filter and sort
/// without modifying the underlying records
#[derive(Clone)]
pub struct RecordView {
    source: Arc<Vec<Record>>,
    /// Indices into `source` in display order
    visible_rows: Vec<usize>,
    sort: SortState,
    filter: Option<RowFilter>,
}

impl RecordView {
    pub fn new(source: Arc<Vec<Record>>) -> Self {
        let visible_rows = (0..source.len()).collect();
        Self {
            source,
            visible_rows,
            sort: SortState::default(),
            filter: None,
        }
    }

    pub fn source(&self) -> &[Record] {
        &self.source
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn filter(&self) -> Option<&RowFilter> {
        self.filter.as_ref()
    }

    /// Toggle sorting on a column and re-apply
    pub fn toggle_sort(&mut self, column_id: &str) {
        self.sort.toggle(column_id);
        tracing::debug!(target: "table", "Sort toggled: {:?}", self.sort);
        self.refresh();
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
        self.refresh();
    }

    pub fn set_filter(&mut self, filter: Option<RowFilter>) {
        self.filter = filter;
        self.refresh();
    }

    /// Rebuild visible rows from the source: filter first, then a stable sort
    fn refresh(&mut self) {
        let matcher = SkimMatcherV2::default().ignore_case();
        let source = &self.source;
        let filter = self.filter.as_ref();

        let mut rows: Vec<usize> = (0..source.len())
            .filter(|&idx| match filter {
                Some(f) => Self::record_matches(&source[idx], f, &matcher),
                None => true,
            })
            .collect();

        if let (Some(column), Some(order)) = (&self.sort.column, self.sort.order) {
            rows.sort_by(|&a, &b| {
                let va = present(source[a].get(column));
                let vb = present(source[b].get(column));
                match (va, vb) {
                    (Some(x), Some(y)) => {
                        let cmp = compare_values(x, y);
                        match order {
                            SortOrder::Ascending => cmp,
                            SortOrder::Descending => cmp.reverse(),
                        }
                    }
                    // Absent values trail in either direction
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }

        self.visible_rows = rows;
    }

    fn record_matches(record: &Record, filter: &RowFilter, matcher: &SkimMatcherV2) -> bool {
        record.fields.values().any(|value| {
            let text = plain_text(value);
            match filter {
                RowFilter::Contains(pattern) => text.to_lowercase().contains(pattern.as_str()),
                RowFilter::Fuzzy(pattern) => matcher
                    .fuzzy_match(&text, pattern)
                    .map(|score| score > 0)
                    .unwrap_or(false),
            }
        })
    }

    pub fn row_count(&self) -> usize {
        self.visible_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_rows.is_empty()
    }

    /// Record at a display position
    pub fn get_row(&self, index: usize) -> Option<&Record> {
        self.visible_rows.get(index).map(|&idx| &self.source[idx])
    }

    pub fn rows(&self) -> impl Iterator<Item = &Record> {
        self.visible_rows.iter().map(move |&idx| &self.source[idx])
    }
}
