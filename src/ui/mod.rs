//! User interface layer
//!
//! The grid TUI and the components it is assembled from.

pub mod detail_modal;
pub mod pin_manager;
pub mod pin_picker;
pub mod role_survey;
pub mod table_render_context;
pub mod table_renderer;
pub mod tui_app;
pub mod ui_layout_utils;
