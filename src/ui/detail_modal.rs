// Detail popup for a single record.
//
// Shows every field that carries content as a label/value pair. Empty
// values are filtered out here, while the grid shows placeholders for them.

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::collections::HashMap;

use crate::data::cell_format::{format_cell, CellContent, FormatContext};
use crate::data::columns::humanize_label;
use crate::data::record::{is_empty_value, Record};
use crate::ui::table_renderer::badge_style;
use crate::ui::ui_layout_utils::centered_rect;

/// Optional label overrides keyed by field name
pub type ColumnNames = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct DetailEntry {
    pub field: String,
    pub label: String,
    pub content: CellContent,
}

/// Label/value pairs for every non-empty field of a record
pub fn detail_entries(record: &Record, column_names: Option<&ColumnNames>) -> Vec<DetailEntry> {
    record
        .fields
        .iter()
        .filter(|(_, value)| !is_empty_value(value))
        .map(|(field, value)| DetailEntry {
            field: field.clone(),
            label: column_names
                .and_then(|names| names.get(field))
                .cloned()
                .unwrap_or_else(|| humanize_label(field)),
            content: format_cell(field, Some(value), FormatContext::Modal),
        })
        .collect()
}

/// `Closed` or showing exactly one record
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModalState {
    #[default]
    Closed,
    Open(Record),
}

#[derive(Debug, Default)]
pub struct DetailModal {
    state: ModalState,
    scroll: u16,
}

impl DetailModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, record: Record) {
        tracing::debug!(target: "table", "Opening detail view for {}", record.id);
        self.state = ModalState::Open(record);
        self.scroll = 0;
    }

    pub fn close(&mut self) {
        self.state = ModalState::Closed;
        self.scroll = 0;
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ModalState::Open(_))
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn record(&self) -> Option<&Record> {
        match &self.state {
            ModalState::Open(record) => Some(record),
            ModalState::Closed => None,
        }
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll = (i32::from(self.scroll) + delta).clamp(0, i32::from(u16::MAX)) as u16;
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Draw the popup over whatever is on screen; does nothing when closed
    pub fn render(&self, f: &mut Frame, column_names: Option<&ColumnNames>) {
        let Some(record) = self.record() else {
            return;
        };
        let area = centered_rect(70, 80, f.area());
        f.render_widget(Clear, area);

        let separator_width = area.width.saturating_sub(4) as usize;
        let lines = detail_lines(&detail_entries(record, column_names), separator_width);

        let popup = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Candidate Details ({})", record.id))
                    .title_bottom(" ↑↓ scroll · Esc close "),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        f.render_widget(popup, area);
    }
}

/// Lines for the popup body: label, value, then a separator between entries
pub fn detail_lines(entries: &[DetailEntry], separator_width: usize) -> Vec<Line<'static>> {
    if entries.is_empty() {
        return vec![Line::from(Span::styled(
            "No details available.",
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let mut lines = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(Span::styled(
                "─".repeat(separator_width),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::from(Span::styled(
            entry.label.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        match &entry.content {
            CellContent::Badge { display, .. } => {
                lines.push(Line::from(Span::styled(format!(" {} ", display), badge_style(display))));
            }
            content => {
                for text in content.display(FormatContext::Modal).lines() {
                    lines.push(Line::from(text.to_string()));
                }
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_only_priority_survives() {
        let record = Record::from_json("r1", json!({"Notes": "", "Tags": [], "Priority": "High"}));
        let entries = detail_entries(&record, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "Priority");
        assert!(entries[0].content.is_badge());
        assert_eq!(entries[0].content.display(FormatContext::Modal), "High");
    }

    #[test]
    fn test_label_override() {
        let record = Record::from_json("r1", json!({"fldEmail": "a@b.c"}));
        let names = ColumnNames::from([("fldEmail".to_string(), "Contact".to_string())]);
        assert_eq!(detail_entries(&record, Some(&names))[0].label, "Contact");
        assert_eq!(detail_entries(&record, None)[0].label, "Fld Email");
    }

    #[test]
    fn test_state_machine() {
        let mut modal = DetailModal::new();
        assert_eq!(modal.state(), &ModalState::Closed);
        modal.open(Record::from_json("r9", json!({"Name": "Ann"})));
        assert!(modal.is_open());
        modal.scroll_by(3);
        assert_eq!(modal.scroll(), 3);
        modal.scroll_by(-10);
        assert_eq!(modal.scroll(), 0);
        modal.close();
        assert!(!modal.is_open());
        modal.close();
        assert_eq!(modal.state(), &ModalState::Closed);
    }

    #[test]
    fn test_lines_have_separators_between_entries() {
        let record = Record::from_json("r1", json!({"A": "x", "B": {"k": 1}}));
        let lines = detail_lines(&detail_entries(&record, None), 5);
        // A, x, sep, B, {, "k": 1, }
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[2].to_string(), "─────");
    }
}
