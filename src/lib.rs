//! Flutter Plugin Detective Library
//!
//! Command implementations and report renderers behind the
//! `plugin-detective` binary. The diagnosis itself lives in the
//! `detective-app` and `detective-scan` crates.

pub mod commands;
pub mod report;

pub use commands::{run_monitor, run_scan, MonitorOptions, ScanOptions};
pub use report::ReportFormat;
