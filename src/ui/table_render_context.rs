// Table rendering context that encapsulates all data needed for rendering.
// Built from the ordered columns, the record view and the pin state; the
// renderer only reads from it.

use ratatui::text::Span;
use std::ops::Range;

use crate::data::cell_format::{CellContent, FormatContext};
use crate::data::columns::ColumnDescriptor;
use crate::data::record::Record;
use crate::data::record_view::{RecordView, SortOrder};
use crate::ui::pin_manager::PinManager;

pub const MIN_COL_WIDTH: u16 = 4;
pub const COLUMN_PADDING: u16 = 2;
/// Every column is followed by a one-cell separator (heavier after the last frozen one)
pub const SEPARATOR_WIDTH: u16 = 1;
/// Header row height inside the table area
pub const HEADER_HEIGHT: u16 = 1;
pub const NO_RESULTS: &str = "No results.";

/// One column as placed on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub id: String,
    pub header: String,
    pub full_label: String,
    /// Index in the ordered column list
    pub display_index: usize,
    /// Left edge relative to the grid origin (after the gutter)
    pub x: u16,
    /// Width including the trailing separator
    pub width: u16,
    pub frozen: bool,
    pub last_frozen: bool,
    pub sort: Option<SortOrder>,
}

impl ColumnLayout {
    /// Width available for text, excluding the separator
    pub fn content_width(&self) -> u16 {
        self.width.saturating_sub(SEPARATOR_WIDTH)
    }
}

#[derive(Debug, Clone)]
pub struct RenderedRow {
    /// Position of the row in the record view
    pub view_index: usize,
    /// Cells aligned with `TableRenderContext::columns`
    pub cells: Vec<CellContent>,
}

/// Scroll position and size of the grid area
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridViewport {
    /// First visible row (view index)
    pub row_offset: usize,
    /// Number of scrollable (unfrozen) columns scrolled past
    pub column_offset: usize,
    pub width: u16,
    pub height: u16,
    /// Cells reserved on the left for row numbers
    pub gutter: u16,
}

impl GridViewport {
    /// Rows that fit under the header
    pub fn body_height(&self) -> usize {
        self.height.saturating_sub(HEADER_HEIGHT) as usize
    }

    /// Width left for columns once the gutter is taken
    pub fn grid_width(&self) -> u16 {
        self.width.saturating_sub(self.gutter)
    }
}

/// Gutter wide enough for the largest row number plus a space
pub fn row_number_gutter(row_count: usize) -> u16 {
    row_count.max(1).to_string().len() as u16 + 1
}

/// Where a click inside the table area landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    /// Header cell; toggles sorting and never opens a record
    Header { column_id: String },
    /// Body row, identified by its record view index
    Row { view_index: usize },
}

/// What a click on the grid means for the application
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    SortToggled { column_id: String },
    /// Carries the complete record, not just the visible cells
    RowClicked { view_index: usize, record: Record },
}

/// All the data needed to render the grid, collected in one place
#[derive(Debug, Clone)]
pub struct TableRenderContext {
    /// Visible columns, frozen ones first, with resolved positions
    pub columns: Vec<ColumnLayout>,
    /// Resolved width of every ordered column (visible or not)
    pub resolved_widths: Vec<(String, u16)>,
    pub rows: Vec<RenderedRow>,
    /// Total number of rows in the view (after filtering)
    pub row_count: usize,
    pub row_viewport: Range<usize>,
    pub selected_row: usize,
    /// Selected column id, if any column exists
    pub selected_column: Option<String>,
    pub frozen_count: usize,
    /// Number of scrollable columns that fit after the frozen region
    pub visible_scrollable: usize,
    pub viewport: GridViewport,
}

/// Rows sampled when measuring column widths
pub const WIDTH_SAMPLE_ROWS: usize = 100;

/// View positions used for width measurement: every nth row so that at
/// most `WIDTH_SAMPLE_ROWS` are taken, plus the first and last row.
/// Sampling the whole view (not the viewport) keeps widths stable while
/// scrolling vertically.
pub fn sample_rows(row_count: usize) -> Vec<usize> {
    if row_count == 0 {
        return Vec::new();
    }
    let sample_size = WIDTH_SAMPLE_ROWS.min(row_count);
    let step = if row_count > sample_size { row_count / sample_size } else { 1 };
    let mut rows: Vec<usize> = (0..row_count).step_by(step).collect();
    if rows.last() != Some(&(row_count - 1)) {
        rows.push(row_count - 1);
    }
    rows
}

/// Measure a column's natural width from its header and a sample of rows
fn natural_width(column: &ColumnDescriptor, view: &RecordView, rows: &[usize], sorted: bool) -> u16 {
    let indicator = if sorted { 2 } else { 0 };
    let header = Span::raw(column.display_label.as_str()).width() as u16 + indicator;
    let widest_cell = rows
        .iter()
        .filter_map(|&i| view.get_row(i))
        .map(|record| cell_width(&column.format(record.get(&column.id), FormatContext::Grid)))
        .max()
        .unwrap_or(0);
    (header.max(widest_cell) + COLUMN_PADDING).max(MIN_COL_WIDTH) + SEPARATOR_WIDTH
}

/// Natural width of every ordered column. Independent of scroll position,
/// so one call serves every layout of a frame.
pub fn resolve_widths(ordered: &[ColumnDescriptor], view: &RecordView) -> Vec<(String, u16)> {
    let rows = sample_rows(view.row_count());
    let sort = view.sort_state();
    ordered
        .iter()
        .map(|c| {
            let sorted = sort.order_for(&c.id).is_some();
            (c.id.clone(), natural_width(c, view, &rows, sorted))
        })
        .collect()
}

/// Width a cell occupies when drawn; badges get a space on each side
pub fn cell_width(cell: &CellContent) -> u16 {
    let text = Span::raw(cell.display(FormatContext::Grid)).width() as u16;
    if cell.is_badge() {
        text + 2
    } else {
        text
    }
}

impl TableRenderContext {
    /// Lay out the grid. `ordered` must already be in display order
    /// (frozen first) and the pin manager must hold offsets for it.
    pub fn build(
        ordered: &[ColumnDescriptor],
        view: &RecordView,
        pins: &PinManager,
        viewport: GridViewport,
        selected_row: usize,
        selected_column: Option<&str>,
    ) -> Self {
        let widths = resolve_widths(ordered, view);
        Self::build_with_widths(ordered, view, pins, viewport, selected_row, selected_column, widths)
    }

    /// Same as `build`, reusing widths from `resolve_widths`
    #[allow(clippy::too_many_arguments)]
    pub fn build_with_widths(
        ordered: &[ColumnDescriptor],
        view: &RecordView,
        pins: &PinManager,
        viewport: GridViewport,
        selected_row: usize,
        selected_column: Option<&str>,
        resolved_widths: Vec<(String, u16)>,
    ) -> Self {
        let sort = view.sort_state();
        let frozen_count = ordered.iter().filter(|c| pins.is_frozen(&c.id)).count();
        let width_of = |idx: usize| resolved_widths.get(idx).map_or(MIN_COL_WIDTH + SEPARATOR_WIDTH, |w| w.1);
        let mut columns = Vec::new();
        let mut frozen_end = 0u16;

        // Frozen columns sit at their sticky offsets
        for (idx, col) in ordered.iter().enumerate().take(frozen_count) {
            let offset = pins.offset_of(&col.id).unwrap_or(0);
            let x = u16::try_from(offset).unwrap_or(u16::MAX);
            let width = width_of(idx);
            frozen_end = frozen_end.max(x.saturating_add(width));
            if x >= viewport.grid_width() {
                continue;
            }
            columns.push(Self::layout(col, idx, x, width, true, idx + 1 == frozen_count, sort.order_for(&col.id)));
        }

        // Scrollable columns follow the frozen region, shifted by the column offset
        let mut x = frozen_end;
        let mut visible_scrollable = 0;
        for (idx, col) in ordered
            .iter()
            .enumerate()
            .skip(frozen_count + viewport.column_offset)
        {
            if x >= viewport.grid_width() {
                break;
            }
            let width = width_of(idx);
            columns.push(Self::layout(col, idx, x, width, false, false, sort.order_for(&col.id)));
            visible_scrollable += 1;
            x = x.saturating_add(width);
        }

        let row_count = view.row_count();
        let start = viewport.row_offset.min(row_count);
        let end = (start + viewport.body_height()).min(row_count);
        let rows = (start..end)
            .filter_map(|view_index| {
                view.get_row(view_index).map(|record| RenderedRow {
                    view_index,
                    cells: columns
                        .iter()
                        .map(|c| {
                            crate::data::cell_format::format_cell(&c.id, record.get(&c.id), FormatContext::Grid)
                        })
                        .collect(),
                })
            })
            .collect();

        Self {
            columns,
            resolved_widths,
            rows,
            row_count,
            row_viewport: start..end,
            selected_row,
            selected_column: selected_column.map(str::to_string),
            frozen_count,
            visible_scrollable,
            viewport,
        }
    }

    fn layout(
        col: &ColumnDescriptor,
        display_index: usize,
        x: u16,
        width: u16,
        frozen: bool,
        last_frozen: bool,
        sort: Option<SortOrder>,
    ) -> ColumnLayout {
        ColumnLayout {
            id: col.id.clone(),
            header: col.display_label.clone(),
            full_label: col.full_label.clone(),
            display_index,
            x,
            width,
            frozen,
            last_frozen,
            sort,
        }
    }

    /// Widths to feed back into the pin manager after a render
    pub fn measurements(&self) -> Vec<(String, u32)> {
        self.resolved_widths
            .iter()
            .map(|(id, w)| (id.clone(), u32::from(*w)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn is_selected_row(&self, view_index: usize) -> bool {
        view_index == self.selected_row
    }

    pub fn is_selected_column(&self, column_id: &str) -> bool {
        self.selected_column.as_deref() == Some(column_id)
    }

    /// Sort indicator appended to a header
    pub fn sort_indicator(order: Option<SortOrder>) -> &'static str {
        match order {
            Some(SortOrder::Ascending) => " ↑",
            Some(SortOrder::Descending) => " ↓",
            None => "",
        }
    }

    /// Column drawn at a table-relative x. Frozen columns are drawn on top,
    /// so they win when a scrollable column is partially covered.
    pub fn column_at(&self, x: u16) -> Option<&ColumnLayout> {
        let contains = |c: &&ColumnLayout| x >= c.x && x < c.x.saturating_add(c.width);
        self.columns
            .iter()
            .filter(|c| c.frozen)
            .find(contains)
            .or_else(|| self.columns.iter().filter(|c| !c.frozen).find(contains))
    }

    /// Resolve a click at table-relative coordinates (gutter included)
    pub fn hit_test(&self, x: u16, y: u16) -> Option<HitTarget> {
        if y < HEADER_HEIGHT {
            let x = x.checked_sub(self.viewport.gutter)?;
            return self.column_at(x).map(|c| HitTarget::Header {
                column_id: c.id.clone(),
            });
        }
        if self.is_empty() {
            return None;
        }
        let row = self.row_viewport.start + (y - HEADER_HEIGHT) as usize;
        if row < self.row_viewport.end {
            Some(HitTarget::Row { view_index: row })
        } else {
            None
        }
    }

    /// Translate a click into a table event
    pub fn event_at(&self, x: u16, y: u16, view: &RecordView) -> Option<TableEvent> {
        match self.hit_test(x, y)? {
            HitTarget::Header { column_id } => Some(TableEvent::SortToggled { column_id }),
            HitTarget::Row { view_index } => view.get_row(view_index).map(|record| TableEvent::RowClicked {
                view_index,
                record: record.clone(),
            }),
        }
    }

    /// True when the column is drawn without being cut off at the right edge.
    /// The first scrollable column counts as visible even when it is wider
    /// than the screen.
    pub fn is_column_fully_visible(&self, column_id: &str) -> bool {
        let first_scrollable = self.columns.iter().find(|c| !c.frozen).map(|c| c.id.as_str());
        self.columns.iter().any(|c| {
            c.id == column_id
                && (c.frozen
                    || Some(c.id.as_str()) == first_scrollable
                    || c.x.saturating_add(c.width) <= self.viewport.grid_width())
        })
    }
}
