//! # detective-core - Issue Model and Project Inputs
//!
//! Foundation crate for Flutter Plugin Detective. Provides the shared issue
//! vocabulary, the aggregated result type, manifest parsing, error handling
//! and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, serde_yaml, chrono, thiserror, regex, tracing).
//!
//! ## Public API
//!
//! ### Vocabulary (`types`)
//! - [`Platform`] - Target platform tags plus the `all`/`unknown` sentinels
//! - [`Severity`] - Four-level triage ranking (critical > high > medium > low)
//! - [`IssueType`] - Closed set of problem categories
//!
//! ### Findings (`issue`, `result`)
//! - [`Issue`] - One detected problem
//! - [`ResolutionStep`], [`StepAction`] - Remediation guidance attached to an issue
//! - [`deduplicate()`] - First-wins deduplication on `(plugin, type, description)`
//! - [`DiagnosticResult`], [`ScanStatus`] - Aggregated scan outcome
//!
//! ### Project Inputs (`manifest`, `text`)
//! - [`Manifest`] - Parsed `pubspec.yaml`
//! - [`validate_flutter_project()`] - Project validity check
//! - [`clean_log_line()`], [`is_stack_frame_line()`] - Log text helpers
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! ```rust
//! use detective_core::prelude::*;
//! ```

pub mod error;
pub mod issue;
pub mod logging;
pub mod manifest;
pub mod result;
pub mod text;
pub mod types;

/// Prelude for common imports used throughout all detective crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

pub use error::{Error, Result, ResultExt};
pub use issue::{
    count_by_severity, deduplicate, group_by_plugin, group_by_severity, DedupKey, Issue,
    ResolutionStep, StepAction,
};
pub use manifest::{
    get_project_name, get_project_type, lock_file_path, manifest_path, platform_directories,
    validate_flutter_project, Manifest, ProjectType, LOCK_FILE, MANIFEST_FILE,
};
pub use result::{
    scan_failure_issue, DiagnosticResult, ScanMetadata, ScanStatus, SCAN_FAILURE_PLUGIN,
    UNKNOWN_VERSION,
};
pub use text::{clean_log_line, is_stack_frame_line, strip_ansi_codes};
pub use types::{IssueType, Platform, Severity};
