//! # detective-scan - Static and Runtime Detection
//!
//! The two detection sub-pipelines, the resolution guide generator and the
//! toolchain probe. Everything here produces [`detective_core::Issue`] values;
//! aggregation lives in `detective-app`.
//!
//! ## Static analysis
//! - [`ManifestAnalyzer`] - Declared plugins vs. generated registrants, build files, lock file
//! - [`registrant`] - Per-platform registrant locations and name extraction
//! - [`build_config`] - Gradle, Podfile and `web/index.html` checks
//!
//! ## Runtime detection
//! - [`LogDetector`] - Batch scan of captured log files
//! - [`SignatureScanner`] - The three line signatures shared by batch and live modes
//! - [`RuntimeMonitor`], [`IssueSubscription`] - Broadcast stream of live issues
//!
//! ## Guidance and metadata
//! - [`generate_guide()`] - Ordered remediation steps per issue
//! - [`ToolchainProbe`] - `flutter --version --machine` seam

pub mod analyzer;
pub mod build_config;
pub mod detector;
pub mod knowledge;
pub mod monitor;
pub mod registrant;
pub mod resolution;
pub mod signatures;
pub mod toolchain;

pub use analyzer::ManifestAnalyzer;
pub use detector::{DetectorOptions, LogDetector, DEFAULT_LOG_DIRECTORIES, PERFORMANCE_FILE_LIMIT};
pub use monitor::{CancelHandle, IssueSubscription, RuntimeMonitor, MONITOR_CAPACITY};
pub use resolution::{attach_guides, generate_guide};
pub use signatures::SignatureScanner;
pub use toolchain::{FlutterCliProbe, StaticProbe, ToolchainProbe, ToolchainVersions};
