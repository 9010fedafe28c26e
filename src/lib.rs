pub mod api_client;
pub mod config;
pub mod data;
pub mod session;
pub mod store;
pub mod table_display;
pub mod ui;
pub mod utils;
pub mod weekly_schedule;
