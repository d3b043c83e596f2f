//! Platform glue, timing, configuration and formatting shared by the dashboard.

pub mod config;
pub mod error;
pub mod format;
pub mod platform;
pub mod timing;
