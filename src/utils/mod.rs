//! Utility functions and helpers
//!
//! Paths under the data directory and the logging setup.

pub mod app_paths;
pub mod dual_logging;
pub mod logging;
