//! Settings loader for `.detective/config.toml`

use std::path::{Path, PathBuf};

use detective_core::prelude::*;

use super::types::{DetectiveConfig, ProjectSettings};

const CONFIG_FILENAME: &str = "config.toml";
const DETECTIVE_DIR: &str = ".detective";

/// Location of the project settings file
pub fn settings_path(project_path: &Path) -> PathBuf {
    project_path.join(DETECTIVE_DIR).join(CONFIG_FILENAME)
}

/// Load scan settings for a project.
///
/// A missing, unreadable or malformed file yields the defaults.
pub fn load_settings(project_path: &Path) -> DetectiveConfig {
    let config_path = settings_path(project_path);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return DetectiveConfig::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ProjectSettings>(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings.scan
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                DetectiveConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            DetectiveConfig::default()
        }
    }
}
