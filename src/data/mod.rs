//! Data layer
//!
//! Records as delivered by the data service, the columns derived from them
//! and a sortable, filterable view over a record set.

pub mod cell_format;
pub mod columns;
pub mod field_collector;
pub mod record;
pub mod record_view;
