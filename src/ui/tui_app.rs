use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::config::config::Config;
use crate::data::cell_format::FormatContext;
use crate::data::columns::{synthesize_columns, ColumnDescriptor};
use crate::data::field_collector::collect_fields;
use crate::data::record::Record;
use crate::data::record_view::{RecordView, RowFilter, SortState};
use crate::session::Session;
use crate::store::preferences::PreferencesStore;
use crate::table_display::export_to_csv_file;
use crate::ui::detail_modal::DetailModal;
use crate::ui::pin_manager::PinManager;
use crate::ui::pin_picker::PinPicker;
use crate::ui::role_survey::RoleSurvey;
use crate::ui::table_render_context::{
    resolve_widths, row_number_gutter, GridViewport, TableEvent, TableRenderContext,
};
use crate::ui::table_renderer::{grid_inner_area, render_table, GridGlyphs};
use crate::ui::ui_layout_utils::{centered_rect, main_layout, scroll_to_show};
use crate::utils::logging::LogRingBuffer;

/// Upper bound on layout passes per frame (provisional + measured)
const MAX_LAYOUT_PASSES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Grid,
    Filter,
    PinPicker,
    Detail,
    RoleSurvey,
    Help,
    Logs,
}

pub struct GridApp {
    columns: Vec<ColumnDescriptor>,
    view: RecordView,
    pins: PinManager,
    detail: DetailModal,
    picker: PinPicker,
    survey: RoleSurvey,
    session: Session,
    preferences: Option<PreferencesStore>,
    filter_input: Input,
    mode: AppMode,
    selected_row: usize,
    /// Index into the current display order
    selected_col: usize,
    viewport: GridViewport,
    status_message: String,
    /// Persistent configuration warning shown in the status line
    warning: Option<String>,
    glyphs: GridGlyphs,
    show_row_numbers: bool,
    pin_icon: String,
    warning_icon: String,
    export_dir: PathBuf,
    log_buffer: Option<LogRingBuffer>,
    last_context: Option<TableRenderContext>,
    /// Inner grid area of the last frame, for mouse hit-testing
    grid_area: Rect,
    should_quit: bool,
}

impl GridApp {
    pub fn new(records: Vec<Record>, config: &Config, session: Session) -> Self {
        let fields = collect_fields(&records);
        let columns = synthesize_columns(&fields);
        let mut pins = PinManager::with_default_width(config.table.default_frozen_width);
        if config.table.auto_pin {
            pins.auto_pin(&columns);
        }

        let mode = if session.needs_role_survey() {
            AppMode::RoleSurvey
        } else {
            AppMode::Grid
        };
        let status_message = format!("Loaded {} records, {} columns", records.len(), columns.len());

        Self {
            columns,
            view: RecordView::new(Arc::new(records)),
            pins,
            detail: DetailModal::new(),
            picker: PinPicker::new(),
            survey: RoleSurvey::new(),
            session,
            preferences: None,
            filter_input: Input::default(),
            mode,
            selected_row: 0,
            selected_col: 0,
            viewport: GridViewport::default(),
            status_message,
            warning: None,
            glyphs: GridGlyphs::for_config(config.display.use_glyphs),
            show_row_numbers: config.display.show_row_numbers,
            pin_icon: config.display.icons.pin.clone(),
            warning_icon: config.display.icons.warning.clone(),
            export_dir: PathBuf::from("."),
            log_buffer: None,
            last_context: None,
            grid_area: Rect::default(),
            should_quit: false,
        }
    }

    pub fn with_preferences(mut self, store: PreferencesStore) -> Self {
        self.preferences = Some(store);
        self
    }

    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }

    pub fn with_log_buffer(mut self, buffer: LogRingBuffer) -> Self {
        self.log_buffer = Some(buffer);
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn view(&self) -> &RecordView {
        &self.view
    }

    pub fn pins(&self) -> &PinManager {
        &self.pins
    }

    pub fn detail(&self) -> &DetailModal {
        &self.detail
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn selected_row(&self) -> usize {
        self.selected_row
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn last_context(&self) -> Option<&TableRenderContext> {
        self.last_context.as_ref()
    }

    /// Columns in display order (frozen first)
    pub fn ordered_columns(&self) -> Vec<ColumnDescriptor> {
        self.pins.reorder(&self.columns)
    }

    fn selected_column(&self) -> Option<ColumnDescriptor> {
        self.ordered_columns().into_iter().nth(self.selected_col)
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            self.draw(terminal)?;
            if self.should_quit {
                break;
            }

            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                _ => {}
            }
        }
        Ok(())
    }

    /// Draw a frame. Offsets of frozen columns depend on the widths measured
    /// while laying out, so a second pass runs when they changed.
    pub fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        for pass in 0..MAX_LAYOUT_PASSES {
            terminal.draw(|f| self.ui(f))?;
            let Some(ctx) = &self.last_context else {
                break;
            };
            if !self.pins.apply_measurements(ctx.measurements()) {
                break;
            }
            tracing::trace!(target: "pins", "Offsets changed after pass {}, redrawing", pass + 1);
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match self.mode {
            AppMode::Grid => self.handle_grid_key(key),
            AppMode::Filter => self.handle_filter_key(key),
            AppMode::PinPicker => self.handle_picker_key(key),
            AppMode::Detail => self.handle_detail_key(key),
            AppMode::RoleSurvey => self.handle_survey_key(key),
            AppMode::Help | AppMode::Logs => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::F(1) | KeyCode::F(5)) {
                    self.mode = AppMode::Grid;
                }
            }
        }
    }

    fn handle_grid_key(&mut self, key: KeyEvent) {
        let page = self.viewport.body_height().max(1);
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                if self.view.filter().is_some() {
                    self.filter_input.reset();
                    self.apply_filter();
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_row(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_row(-1),
            KeyCode::PageDown => self.move_row(page as isize),
            KeyCode::PageUp => self.move_row(-(page as isize)),
            KeyCode::Home | KeyCode::Char('g') => self.selected_row = 0,
            KeyCode::End | KeyCode::Char('G') => self.selected_row = self.view.row_count().saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => self.move_col(1),
            KeyCode::Left | KeyCode::Char('h') => self.move_col(-1),
            KeyCode::Enter => self.open_selected_row(),
            KeyCode::Char('s') => {
                if let Some(col) = self.selected_column() {
                    self.toggle_sort(&col.id);
                }
            }
            KeyCode::Char('S') => {
                self.view.set_sort(SortState::default());
                self.status_message = "Sort cleared".to_string();
            }
            KeyCode::Char('f') => {
                if let Some(col) = self.selected_column() {
                    let frozen = self.pins.toggle(&col.id);
                    self.follow_column(&col.id);
                    self.status_message = format!(
                        "{} {}",
                        if frozen { "Pinned" } else { "Unpinned" },
                        col.full_label
                    );
                }
            }
            KeyCode::Char('p') => {
                self.picker.open(self.columns.len());
                self.mode = AppMode::PinPicker;
            }
            KeyCode::Char('/') => self.mode = AppMode::Filter,
            KeyCode::Char('x') => self.export_visible(),
            KeyCode::F(1) => self.mode = AppMode::Help,
            KeyCode::F(5) => self.mode = AppMode::Logs,
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.mode = AppMode::Grid,
            KeyCode::Esc => {
                self.filter_input.reset();
                self.apply_filter();
                self.mode = AppMode::Grid;
            }
            _ => {
                self.filter_input.handle_event(&Event::Key(key));
                self.apply_filter();
            }
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('p') => {
                self.picker.close();
                self.mode = AppMode::Grid;
            }
            KeyCode::Down | KeyCode::Char('j') => self.picker.move_by(1, self.columns.len()),
            KeyCode::Up | KeyCode::Char('k') => self.picker.move_by(-1, self.columns.len()),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(frozen) = self.picker.toggle_selected(&self.columns, &mut self.pins) {
                    self.status_message = format!("Pinned columns: {}", self.pins.frozen_count());
                    tracing::debug!(target: "pins", "Picker toggle -> {}", frozen);
                }
                self.clamp_selection();
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => {
                self.detail.close();
                self.mode = AppMode::Grid;
            }
            KeyCode::Down | KeyCode::Char('j') => self.detail.scroll_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.detail.scroll_by(-1),
            KeyCode::PageDown => self.detail.scroll_by(10),
            KeyCode::PageUp => self.detail.scroll_by(-10),
            _ => {}
        }
    }

    fn handle_survey_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => self.survey.move_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.survey.move_by(-1),
            KeyCode::Enter => {
                match self.survey.confirm(&mut self.session, self.preferences.as_mut()) {
                    Ok(role) => self.status_message = format!("Role set to {}", role),
                    Err(e) => {
                        tracing::error!(target: "session", "Saving preferences failed: {}", e);
                        self.status_message = "Failed to save your role".to_string();
                    }
                }
                self.mode = AppMode::Grid;
            }
            KeyCode::Esc => self.mode = AppMode::Grid,
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match (self.mode, mouse.kind) {
            (AppMode::Grid, MouseEventKind::Down(MouseButton::Left)) => {
                let area = self.grid_area;
                let inside = mouse.column >= area.x
                    && mouse.row >= area.y
                    && mouse.column < area.right()
                    && mouse.row < area.bottom();
                if !inside {
                    return;
                }
                let event = self
                    .last_context
                    .as_ref()
                    .and_then(|ctx| ctx.event_at(mouse.column - area.x, mouse.row - area.y, &self.view));
                if let Some(event) = event {
                    self.handle_table_event(event);
                }
            }
            (AppMode::Grid, MouseEventKind::ScrollDown) => self.move_row(3),
            (AppMode::Grid, MouseEventKind::ScrollUp) => self.move_row(-3),
            (AppMode::Detail, MouseEventKind::ScrollDown) => self.detail.scroll_by(3),
            (AppMode::Detail, MouseEventKind::ScrollUp) => self.detail.scroll_by(-3),
            (AppMode::Detail, MouseEventKind::Down(MouseButton::Left)) => {
                self.detail.close();
                self.mode = AppMode::Grid;
            }
            _ => {}
        }
    }

    pub fn handle_table_event(&mut self, event: TableEvent) {
        match event {
            TableEvent::SortToggled { column_id } => {
                if let Some(pos) = self.ordered_columns().iter().position(|c| c.id == column_id) {
                    self.selected_col = pos;
                }
                self.toggle_sort(&column_id);
            }
            TableEvent::RowClicked { view_index, record } => {
                self.selected_row = view_index;
                self.detail.open(record);
                self.mode = AppMode::Detail;
            }
        }
    }

    fn toggle_sort(&mut self, column_id: &str) {
        self.view.toggle_sort(column_id);
        let arrow = TableRenderContext::sort_indicator(self.view.sort_state().order_for(column_id));
        self.status_message = format!("Sorted by {}{}", column_id, arrow);
    }

    fn open_selected_row(&mut self) {
        if let Some(record) = self.view.get_row(self.selected_row).cloned() {
            self.handle_table_event(TableEvent::RowClicked {
                view_index: self.selected_row,
                record,
            });
        }
    }

    fn apply_filter(&mut self) {
        self.view.set_filter(RowFilter::parse(self.filter_input.value()));
        self.selected_row = 0;
        self.viewport.row_offset = 0;
        self.status_message = format!("{} of {} rows", self.view.row_count(), self.view.source().len());
    }

    fn move_row(&mut self, delta: isize) {
        let count = self.view.row_count();
        if count == 0 {
            self.selected_row = 0;
            return;
        }
        let next = (self.selected_row as isize + delta).clamp(0, count as isize - 1);
        self.selected_row = next as usize;
    }

    fn move_col(&mut self, delta: isize) {
        let count = self.columns.len();
        if count == 0 {
            return;
        }
        let next = (self.selected_col as isize + delta).clamp(0, count as isize - 1);
        self.selected_col = next as usize;
    }

    /// Keep the same column selected after the display order changed
    fn follow_column(&mut self, column_id: &str) {
        if let Some(pos) = self.ordered_columns().iter().position(|c| c.id == column_id) {
            self.selected_col = pos;
        }
    }

    fn clamp_selection(&mut self) {
        self.selected_col = self.selected_col.min(self.columns.len().saturating_sub(1));
        self.selected_row = self.selected_row.min(self.view.row_count().saturating_sub(1));
    }

    fn export_visible(&mut self) {
        let path = self
            .export_dir
            .join(format!("candidates_{}.csv", Local::now().format("%Y%m%d_%H%M%S")));
        let ordered = self.ordered_columns();
        self.status_message = match export_to_csv_file(&path, &ordered, &self.view) {
            Ok(rows) => format!("Exported {} rows to {}", rows, path.display()),
            Err(e) => {
                tracing::error!(target: "table", "Export failed: {:#}", e);
                format!("Export failed: {}", e)
            }
        };
    }

    fn ui(&mut self, f: &mut Frame) {
        let layout = main_layout(f.area());

        self.render_filter_bar(f, layout.filter);
        self.render_grid(f, layout.grid);
        self.render_status(f, layout.status);

        match self.mode {
            AppMode::Detail => self.detail.render(f, None),
            AppMode::PinPicker => self.picker.render(f, &self.columns, &self.pins, &self.pin_icon),
            AppMode::RoleSurvey => self.survey.render(f),
            AppMode::Help => render_help_popup(f),
            AppMode::Logs => self.render_log_popup(f),
            AppMode::Grid | AppMode::Filter => {}
        }
    }

    fn render_filter_bar(&self, f: &mut Frame, area: Rect) {
        let active = self.mode == AppMode::Filter;
        let style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let title = match self.view.filter() {
            Some(RowFilter::Fuzzy(_)) => "Filter (fuzzy)",
            _ => "Filter (/ to edit, ~ prefix for fuzzy)",
        };
        let paragraph = Paragraph::new(self.filter_input.value())
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(style);
        f.render_widget(paragraph, area);

        if active {
            f.set_cursor_position((area.x + self.filter_input.visual_cursor() as u16 + 1, area.y + 1));
        }
    }

    fn render_grid(&mut self, f: &mut Frame, area: Rect) {
        let ordered = self.ordered_columns();
        let ids: Vec<&str> = ordered.iter().map(|c| c.id.as_str()).collect();
        self.pins.begin_layout(&ids);

        let inner = grid_inner_area(area);
        self.grid_area = inner;
        self.viewport.width = inner.width;
        self.viewport.height = inner.height;
        self.viewport.gutter = if self.show_row_numbers {
            row_number_gutter(self.view.row_count())
        } else {
            0
        };
        self.viewport.row_offset = scroll_to_show(self.viewport.row_offset, self.selected_row, self.viewport.body_height());

        let frozen_count = self.pins.frozen_count();
        let selected_id = ordered.get(self.selected_col).map(|c| c.id.clone());
        if self.selected_col >= frozen_count {
            let scroll_index = self.selected_col - frozen_count;
            self.viewport.column_offset = self.viewport.column_offset.min(scroll_index);
        }

        let widths = resolve_widths(&ordered, &self.view);
        let mut ctx = self.build_context(&ordered, selected_id.as_deref(), &widths);
        if let Some(id) = selected_id.as_deref() {
            // Scroll right until the selected column is fully on screen
            while self.selected_col >= frozen_count && !ctx.is_column_fully_visible(id) {
                if self.viewport.column_offset + frozen_count >= self.selected_col {
                    break;
                }
                self.viewport.column_offset += 1;
                ctx = self.build_context(&ordered, Some(id), &widths);
            }
        }

        let title = format!(
            "Candidates ({} of {} rows, {} pinned)",
            self.view.row_count(),
            self.view.source().len(),
            self.pins.frozen_count()
        );
        render_table(f, area, &ctx, &title, self.glyphs);
        self.last_context = Some(ctx);
    }

    fn build_context(
        &self,
        ordered: &[ColumnDescriptor],
        selected_id: Option<&str>,
        widths: &[(String, u16)],
    ) -> TableRenderContext {
        TableRenderContext::build_with_widths(
            ordered,
            &self.view,
            &self.pins,
            self.viewport,
            self.selected_row,
            selected_id,
            widths.to_vec(),
        )
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        if let Some(warning) = &self.warning {
            spans.push(Span::styled(
                format!("{} {} ", self.warning_icon, warning),
                Style::default().fg(Color::Black).bg(Color::Yellow),
            ));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(self.status_message.clone(), Style::default().fg(Color::White)));

        // Tooltip: full header label and untruncated cell value
        if let Some(col) = self.selected_column() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                col.full_label.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ));
            if let Some(record) = self.view.get_row(self.selected_row) {
                let cell = col.format(record.get(&col.id), FormatContext::Grid);
                if let Some(full) = cell.full() {
                    spans.push(Span::raw(": "));
                    spans.push(Span::raw(full.replace('\n', " ")));
                }
            }
        }
        spans.push(Span::raw(" | F1=Help"));

        let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
        f.render_widget(status, area);
    }

    fn render_log_popup(&self, f: &mut Frame) {
        let area = centered_rect(90, 80, f.area());
        f.render_widget(Clear, area);

        let visible = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = match &self.log_buffer {
            Some(buffer) => buffer
                .get_recent(visible)
                .into_iter()
                .map(|entry| {
                    let color = match entry.level.as_str() {
                        "ERROR" => Color::Red,
                        "WARN" => Color::Yellow,
                        "DEBUG" | "TRACE" => Color::DarkGray,
                        _ => Color::White,
                    };
                    Line::from(Span::styled(entry.format_for_display(), Style::default().fg(color)))
                })
                .collect(),
            None => vec![Line::from("Logging is not initialized")],
        };

        let popup = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Logs (F5)"));
        f.render_widget(popup, area);
    }
}

fn render_help_popup(f: &mut Frame) {
    let area = centered_rect(70, 70, f.area());
    f.render_widget(Clear, area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)))
    };
    let help_text = vec![
        heading("Candidate Grid Help"),
        Line::from(""),
        heading("Navigation"),
        Line::from("  ↑↓ / j k     - Move between rows"),
        Line::from("  ←→ / h l     - Move between columns"),
        Line::from("  PgUp / PgDn  - Page through rows"),
        Line::from("  g / G        - First / last row"),
        Line::from(""),
        heading("Table"),
        Line::from("  Enter, click - Open candidate details"),
        Line::from("  s, click hdr - Sort by column (asc ↔ desc)"),
        Line::from("  S            - Clear sort"),
        Line::from("  f            - Pin / unpin current column"),
        Line::from("  p            - Pick pinned columns"),
        Line::from("  /            - Filter rows (~text for fuzzy)"),
        Line::from("  x            - Export visible rows to CSV"),
        Line::from(""),
        heading("Global"),
        Line::from("  F1           - Toggle this help"),
        Line::from("  F5           - Show logs"),
        Line::from("  q / Esc      - Quit (Esc clears an active filter first)"),
    ];

    let help_popup = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: false });
    f.render_widget(help_popup, area);
}

/// Set up the terminal, run the app and restore the terminal afterwards
pub fn run_tui(app: &mut GridApp) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}
