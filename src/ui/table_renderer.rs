// Pure grid rendering function that depends only on TableRenderContext.
// Cells are written straight into the frame buffer at the positions the
// context resolved, so frozen columns can sit at their sticky offsets.

use ratatui::{
    buffer::Buffer,
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

use crate::data::cell_format::{CellContent, FormatContext};
use crate::ui::table_render_context::{ColumnLayout, TableRenderContext, HEADER_HEIGHT, NO_RESULTS};

/// Separator characters drawn after each column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGlyphs {
    pub separator: &'static str,
    /// Heavier border after the last frozen column
    pub frozen_border: &'static str,
}

impl GridGlyphs {
    pub fn unicode() -> Self {
        Self {
            separator: "│",
            frozen_border: "┃",
        }
    }

    pub fn ascii() -> Self {
        Self {
            separator: "|",
            frozen_border: "#",
        }
    }

    pub fn for_config(use_glyphs: bool) -> Self {
        if use_glyphs {
            Self::unicode()
        } else {
            Self::ascii()
        }
    }
}

/// The block every grid is drawn in
pub fn grid_block(title: &str) -> Block<'_> {
    Block::default().borders(Borders::ALL).title(title)
}

/// Area left for the grid inside its block
pub fn grid_inner_area(area: Rect) -> Rect {
    grid_block("").inner(area)
}

/// Render the grid using only the provided context
pub fn render_table(f: &mut Frame, area: Rect, ctx: &TableRenderContext, title: &str, glyphs: GridGlyphs) {
    let block = grid_block(title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    render_grid(f.buffer_mut(), inner, ctx, glyphs);
}

/// Draw header and rows into `inner` (already excluding borders)
pub fn render_grid(buf: &mut Buffer, inner: Rect, ctx: &TableRenderContext, glyphs: GridGlyphs) {
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let origin = inner.x + ctx.viewport.gutter;

    if ctx.viewport.gutter > 0 {
        put(buf, inner, inner.x, inner.y, ctx.viewport.gutter, "#", header_gutter_style());
    }

    // Scrollable columns first so frozen ones are drawn on top
    let draw_order = ctx
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.frozen)
        .chain(ctx.columns.iter().enumerate().filter(|(_, c)| c.frozen));

    for (pos, col) in draw_order {
        let x = origin + col.x;
        render_header_cell(buf, inner, x, ctx, col, glyphs);

        for (line, row) in ctx.rows.iter().enumerate() {
            let y = inner.y + HEADER_HEIGHT + line as u16;
            if y >= inner.bottom() {
                break;
            }
            let selected = ctx.is_selected_row(row.view_index);
            render_body_cell(buf, inner, x, y, col, &row.cells[pos], selected, glyphs);
        }
    }

    if ctx.viewport.gutter > 0 {
        for (line, row) in ctx.rows.iter().enumerate() {
            let y = inner.y + HEADER_HEIGHT + line as u16;
            if y >= inner.bottom() {
                break;
            }
            let number = format!("{:>width$}", row.view_index + 1, width = ctx.viewport.gutter as usize - 1);
            put(buf, inner, inner.x, y, ctx.viewport.gutter, &number, Style::default().fg(Color::DarkGray));
        }
    }

    if ctx.is_empty() && inner.height > HEADER_HEIGHT {
        put(
            buf,
            inner,
            origin,
            inner.y + HEADER_HEIGHT,
            inner.width.saturating_sub(ctx.viewport.gutter),
            NO_RESULTS,
            Style::default().fg(Color::Yellow),
        );
    }
}

fn render_header_cell(
    buf: &mut Buffer,
    inner: Rect,
    x: u16,
    ctx: &TableRenderContext,
    col: &ColumnLayout,
    glyphs: GridGlyphs,
) {
    let mut style = if col.frozen {
        // Pinned columns get special styling
        Style::default()
            .bg(Color::Rgb(40, 40, 80))
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };
    if ctx.is_selected_column(&col.id) {
        style = style.fg(Color::Yellow).add_modifier(Modifier::UNDERLINED);
    }

    let text = format!(" {}{}", col.header, TableRenderContext::sort_indicator(col.sort));
    put(buf, inner, x, inner.y, col.content_width(), &text, style);
    render_separator(buf, inner, x, inner.y, col, glyphs);
}

#[allow(clippy::too_many_arguments)]
fn render_body_cell(
    buf: &mut Buffer,
    inner: Rect,
    x: u16,
    y: u16,
    col: &ColumnLayout,
    cell: &CellContent,
    selected: bool,
    glyphs: GridGlyphs,
) {
    let mut base = if col.frozen {
        Style::default().bg(Color::Rgb(20, 20, 40))
    } else {
        Style::default()
    };
    if selected {
        base = base.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
    }

    // Clear the cell first so a frozen column fully covers what is under it
    put(buf, inner, x, y, col.content_width(), "", base);

    match cell {
        CellContent::Empty => {
            put(buf, inner, x + 1, y, col.content_width().saturating_sub(1), cell.display(FormatContext::Grid), base.fg(Color::DarkGray));
        }
        CellContent::Badge { display, .. } => {
            let badge = format!(" {} ", display);
            put(buf, inner, x + 1, y, col.content_width().saturating_sub(1), &badge, badge_style(display));
        }
        CellContent::Text { display, .. } => {
            put(buf, inner, x + 1, y, col.content_width().saturating_sub(1), display, base);
        }
    }
    render_separator(buf, inner, x, y, col, glyphs);
}

fn render_separator(buf: &mut Buffer, inner: Rect, x: u16, y: u16, col: &ColumnLayout, glyphs: GridGlyphs) {
    let (symbol, style) = if col.last_frozen {
        (glyphs.frozen_border, Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD))
    } else {
        (glyphs.separator, Style::default().fg(Color::DarkGray))
    };
    put(buf, inner, x + col.content_width(), y, 1, symbol, style);
}

/// Badge colors by priority level
pub fn badge_style(value: &str) -> Style {
    let bg = match value.to_ascii_lowercase().as_str() {
        "high" | "urgent" => Color::Red,
        "medium" => Color::Yellow,
        "low" => Color::Green,
        _ => Color::Blue,
    };
    Style::default().bg(bg).fg(Color::Black).add_modifier(Modifier::BOLD)
}

fn header_gutter_style() -> Style {
    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
}

/// Fill `width` cells at (x, y) with `style`, then write `text` clipped to
/// both the width and the right edge of `inner`
fn put(buf: &mut Buffer, inner: Rect, x: u16, y: u16, width: u16, text: &str, style: Style) {
    if x >= inner.right() || y >= inner.bottom() {
        return;
    }
    let width = width.min(inner.right() - x) as usize;
    if width == 0 {
        return;
    }
    buf.set_stringn(x, y, " ".repeat(width), width, style);
    buf.set_stringn(x, y, text, width, style);
}
