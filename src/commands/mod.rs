//! Subcommand implementations behind the `plugin-detective` binary
//!
//! - `scan` - One-shot diagnosis of a project, rendered as a report
//! - `monitor` - Streams issues from a live log feed as NDJSON

pub mod monitor;
pub mod scan;
pub mod signals;

pub use monitor::{run_monitor, MonitorEvent, MonitorOptions};
pub use scan::{run_scan, ScanOptions};
