//! UI layout calculation utilities
//!
//! Pure functions for screen regions and scrolling, decoupled from app state.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Height of the filter input line
pub const FILTER_BAR_HEIGHT: u16 = 3;
/// Height of the status bar
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Screen regions of the main view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainLayout {
    pub filter: Rect,
    pub grid: Rect,
    pub status: Rect,
}

pub fn main_layout(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FILTER_BAR_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    MainLayout {
        filter: chunks[0],
        grid: chunks[1],
        status: chunks[2],
    }
}

/// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// New first-visible index so that `selected` stays inside a window of `visible` items
pub fn scroll_to_show(offset: usize, selected: usize, visible: usize) -> usize {
    if visible == 0 {
        return selected;
    }
    if selected < offset {
        selected
    } else if selected >= offset + visible {
        selected + 1 - visible
    } else {
        offset
    }
}
