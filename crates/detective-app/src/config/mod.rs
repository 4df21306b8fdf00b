//! Configuration for Flutter Plugin Detective
//!
//! Supports:
//! - `.detective/config.toml` - Per-project scan settings (`[scan]` table)
//! - Builder overrides applied on top by the CLI

pub mod settings;
pub mod types;

pub use settings::{load_settings, settings_path};
pub use types::{DetectiveConfig, ProjectSettings};
