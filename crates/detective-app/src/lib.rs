//! # detective-app - Scan Orchestration
//!
//! Ties the detection pipelines together behind two entry points:
//!
//! - [`Detective::diagnose`] - One full scan producing a [`detective_core::DiagnosticResult`]
//! - [`Detective::monitor_runtime`] - A live [`detective_scan::IssueSubscription`]
//!
//! Configuration comes from [`load_settings`] (`.detective/config.toml`) with
//! builder overrides on [`DetectiveConfig`].

pub mod config;
pub mod detective;

pub use config::{load_settings, settings_path, DetectiveConfig, ProjectSettings};
pub use detective::{Detective, ScanPhase, RUNTIME_SENTINEL};
