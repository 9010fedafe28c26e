use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

use crate::data::columns::ColumnDescriptor;
use crate::ui::pin_manager::PinManager;
use crate::ui::ui_layout_utils::centered_rect;

/// Checkbox list for choosing frozen columns
#[derive(Debug, Default)]
pub struct PinPicker {
    visible: bool,
    state: ListState,
}

impl PinPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, column_count: usize) {
        self.visible = true;
        self.state.select(if column_count == 0 { None } else { Some(0) });
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn move_by(&mut self, delta: isize, column_count: usize) {
        if column_count == 0 {
            return;
        }
        let current = self.state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(column_count as isize) as usize;
        self.state.select(Some(next));
    }

    /// Toggle the highlighted column. Columns are listed in their original
    /// (unpinned) order so entries do not jump around while toggling.
    pub fn toggle_selected(&self, columns: &[ColumnDescriptor], pins: &mut PinManager) -> Option<bool> {
        let column = columns.get(self.state.selected()?)?;
        Some(pins.toggle(&column.id))
    }

    pub fn title(pins: &PinManager) -> String {
        format!("Pin Columns ({})", pins.frozen_count())
    }

    pub fn render(&mut self, f: &mut Frame, columns: &[ColumnDescriptor], pins: &PinManager, pin_icon: &str) {
        if !self.visible {
            return;
        }
        let area = centered_rect(50, 70, f.area());
        f.render_widget(Clear, area);

        let items: Vec<ListItem> = columns
            .iter()
            .map(|col| {
                let frozen = pins.is_frozen(&col.id);
                let mark = if frozen { "[x]" } else { "[ ]" };
                let suffix = if frozen { format!(" {}", pin_icon) } else { String::new() };
                let style = if frozen {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(format!("{} {}{}", mark, col.display_label, suffix)).style(style)
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Self::title(pins))
                    .title_bottom(" Space toggle · Esc close "),
            )
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        f.render_stateful_widget(list, area, &mut self.state);
    }
}
