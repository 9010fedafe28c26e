// Frozen (pinned) column state and sticky offset computation.
//
// Offsets depend on rendered widths, which are only known after a layout
// pass. Layout therefore runs in two phases: `begin_layout` computes
// provisional offsets from whatever has been measured so far, and
// `apply_measurements` feeds back the widths the renderer resolved and
// reports whether another render is needed.

use std::collections::HashMap;

use crate::data::columns::ColumnDescriptor;

/// Width assumed for a frozen column that has not been measured yet
pub const DEFAULT_FROZEN_WIDTH: u32 = 150;

/// Columns whose id contains this (case-insensitive) are pinned on first load
pub const AUTO_PIN_PATTERN: &str = "name";

/// Frozen column id -> cumulative width of the frozen columns to its left
pub type OffsetTable = HashMap<String, u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPhase {
    /// Offsets may rely on default widths
    Provisional,
    /// Offsets were computed from the widths of the last render
    Settled,
}

/// Frozen columns first (in frozen-set order), then the rest in original order
pub fn reorder_columns(columns: &[ColumnDescriptor], frozen: &[String]) -> Vec<ColumnDescriptor> {
    let mut ordered: Vec<ColumnDescriptor> = frozen
        .iter()
        .filter_map(|id| columns.iter().find(|c| &c.id == id))
        .cloned()
        .collect();
    ordered.extend(columns.iter().filter(|c| !frozen.contains(&c.id)).cloned());
    ordered
}

/// Walk the ordered columns and assign each frozen one the running total of
/// the frozen widths before it. Unfrozen columns neither get an offset nor
/// advance the total.
pub fn compute_offsets<S: AsRef<str>>(
    ordered_ids: &[S],
    frozen: &[String],
    widths: &HashMap<String, u32>,
    default_width: u32,
) -> OffsetTable {
    let mut offsets = OffsetTable::new();
    let mut running = 0u32;

    for id in ordered_ids {
        let id = id.as_ref();
        if !frozen.iter().any(|f| f == id) {
            continue;
        }
        offsets.insert(id.to_string(), running);
        let width = widths
            .get(id)
            .copied()
            .filter(|&w| w > 0)
            .unwrap_or(default_width);
        running = running.saturating_add(width);
    }

    offsets
}

pub struct PinManager {
    /// Frozen column ids in insertion order
    frozen: Vec<String>,
    /// Last measured render width per column id
    widths: HashMap<String, u32>,
    offsets: OffsetTable,
    /// Column order used by the last layout pass
    layout_order: Vec<String>,
    phase: LayoutPhase,
    auto_pin_done: bool,
    default_width: u32,
}

impl Default for PinManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PinManager {
    pub fn new() -> Self {
        Self::with_default_width(DEFAULT_FROZEN_WIDTH)
    }

    pub fn with_default_width(default_width: u32) -> Self {
        Self {
            frozen: Vec::new(),
            widths: HashMap::new(),
            offsets: OffsetTable::new(),
            layout_order: Vec::new(),
            phase: LayoutPhase::Provisional,
            auto_pin_done: false,
            default_width,
        }
    }

    pub fn frozen_ids(&self) -> &[String] {
        &self.frozen
    }

    pub fn frozen_count(&self) -> usize {
        self.frozen.len()
    }

    pub fn is_frozen(&self, id: &str) -> bool {
        self.frozen.iter().any(|f| f == id)
    }

    pub fn phase(&self) -> LayoutPhase {
        self.phase
    }

    /// Add the column if absent, remove it if present. Returns the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        let now_frozen = if let Some(pos) = self.frozen.iter().position(|f| f == id) {
            self.frozen.remove(pos);
            false
        } else {
            self.frozen.push(id.to_string());
            true
        };
        self.phase = LayoutPhase::Provisional;
        tracing::debug!(target: "pins", "Toggled {} -> frozen={} ({:?})", id, now_frozen, self.frozen);
        now_frozen
    }

    /// Pre-pin every column whose id contains "name". Runs once per
    /// instance; an empty column list does not use up the one shot.
    /// Returns true when this call performed the auto-pin.
    pub fn auto_pin(&mut self, columns: &[ColumnDescriptor]) -> bool {
        if self.auto_pin_done || columns.is_empty() {
            return false;
        }
        self.auto_pin_done = true;

        for column in columns {
            if column.id.to_lowercase().contains(AUTO_PIN_PATTERN) && !self.is_frozen(&column.id) {
                self.frozen.push(column.id.clone());
            }
        }
        self.phase = LayoutPhase::Provisional;
        tracing::info!(target: "pins", "Auto-pinned columns: {:?}", self.frozen);
        true
    }

    /// Current display order for the given columns
    pub fn reorder(&self, columns: &[ColumnDescriptor]) -> Vec<ColumnDescriptor> {
        reorder_columns(columns, &self.frozen)
    }

    /// Phase 1: compute provisional offsets for this column order
    pub fn begin_layout<S: AsRef<str>>(&mut self, ordered_ids: &[S]) -> &OffsetTable {
        self.layout_order = ordered_ids.iter().map(|s| s.as_ref().to_string()).collect();
        self.offsets = compute_offsets(&self.layout_order, &self.frozen, &self.widths, self.default_width);
        self.phase = LayoutPhase::Provisional;
        &self.offsets
    }

    /// Phase 2: record measured widths and recompute. Returns true when the
    /// offsets changed, meaning the grid must be drawn again. Calling this
    /// again with the same widths returns false.
    pub fn apply_measurements<I>(&mut self, measured: I) -> bool
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        for (id, width) in measured {
            if width > 0 {
                self.widths.insert(id, width);
            }
        }

        let offsets = compute_offsets(&self.layout_order, &self.frozen, &self.widths, self.default_width);
        let changed = offsets != self.offsets;
        if changed {
            tracing::trace!(target: "pins", "Offsets settled: {:?}", offsets);
        }
        self.offsets = offsets;
        self.phase = LayoutPhase::Settled;
        changed
    }

    pub fn record_width(&mut self, id: &str, width: u32) {
        if width > 0 {
            self.widths.insert(id.to_string(), width);
        }
    }

    pub fn offset_of(&self, id: &str) -> Option<u32> {
        self.offsets.get(id).copied()
    }
}
