//! Configuration module
//!
//! Settings file loading, defaults and environment overrides.

pub mod config;
