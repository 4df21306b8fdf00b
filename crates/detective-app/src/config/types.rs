//! Configuration types for Flutter Plugin Detective
//!
//! Defines:
//! - `DetectiveConfig` - The immutable settings threaded through one scan
//! - `ProjectSettings` - Layout of `.detective/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use detective_core::Platform;

/// Settings for one scan.
///
/// Built once (file defaults, then CLI overrides) and shared read-only by the
/// sub-pipelines.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectiveConfig {
    /// Run the manifest/registrant analyzer
    pub enable_static_analysis: bool,

    /// Run the log/pattern detector
    pub enable_runtime_detection: bool,

    /// Attach resolution steps to each issue
    pub generate_resolutions: bool,

    /// Platforms to check; `all` expands to every target
    pub include_platforms: Vec<Platform>,

    /// Plugins that never appear in results
    pub exclude_plugins: Vec<String>,

    /// Fewer log files, no stack traces
    pub performance_mode: bool,

    /// Deadline for the analysis phase; zero disables it
    #[serde(with = "duration_secs")]
    pub max_scan_duration: Duration,

    /// Extra log directories, relative to the project root unless absolute
    pub log_directories: Vec<PathBuf>,

    pub verbose: bool,
}

impl Default for DetectiveConfig {
    fn default() -> Self {
        Self {
            enable_static_analysis: true,
            enable_runtime_detection: true,
            generate_resolutions: true,
            include_platforms: default_platforms(),
            exclude_plugins: Vec::new(),
            performance_mode: false,
            max_scan_duration: default_max_scan_duration(),
            log_directories: Vec::new(),
            verbose: false,
        }
    }
}

fn default_platforms() -> Vec<Platform> {
    vec![Platform::Android, Platform::Ios]
}

fn default_max_scan_duration() -> Duration {
    Duration::from_secs(30)
}

impl DetectiveConfig {
    pub fn with_static_analysis(mut self, enabled: bool) -> Self {
        self.enable_static_analysis = enabled;
        self
    }

    pub fn with_runtime_detection(mut self, enabled: bool) -> Self {
        self.enable_runtime_detection = enabled;
        self
    }

    pub fn with_resolutions(mut self, enabled: bool) -> Self {
        self.generate_resolutions = enabled;
        self
    }

    /// Replace the platform filter. An empty list keeps the current one.
    pub fn with_platforms(mut self, platforms: Vec<Platform>) -> Self {
        if !platforms.is_empty() {
            self.include_platforms = platforms;
        }
        self
    }

    /// Add to the exclusion list
    pub fn excluding(mut self, plugins: impl IntoIterator<Item = String>) -> Self {
        for plugin in plugins {
            if !self.exclude_plugins.contains(&plugin) {
                self.exclude_plugins.push(plugin);
            }
        }
        self
    }

    pub fn with_performance_mode(mut self, enabled: bool) -> Self {
        self.performance_mode = enabled;
        self
    }

    pub fn with_max_scan_duration(mut self, duration: Duration) -> Self {
        self.max_scan_duration = duration;
        self
    }

    pub fn with_log_directories(mut self, directories: Vec<PathBuf>) -> Self {
        self.log_directories.extend(directories);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Target platforms to scan: `all` expands, sentinels and repeats drop out
    pub fn target_platforms(&self) -> Vec<Platform> {
        if self.include_platforms.contains(&Platform::All) {
            return Platform::TARGETS.to_vec();
        }
        let mut platforms: Vec<Platform> = Vec::new();
        for platform in &self.include_platforms {
            if platform.is_target() && !platforms.contains(platform) {
                platforms.push(*platform);
            }
        }
        platforms
    }

    /// `None` when the deadline is disabled
    pub fn scan_deadline(&self) -> Option<Duration> {
        (!self.max_scan_duration.is_zero()).then_some(self.max_scan_duration)
    }
}

/// Project settings file (`.detective/config.toml`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProjectSettings {
    #[serde(default)]
    pub scan: DetectiveConfig,
}

/// Whole seconds on the wire
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectiveConfig::default();
        assert!(config.enable_static_analysis);
        assert!(config.enable_runtime_detection);
        assert!(config.generate_resolutions);
        assert_eq!(config.include_platforms, vec![Platform::Android, Platform::Ios]);
        assert!(config.exclude_plugins.is_empty());
        assert!(!config.performance_mode);
        assert_eq!(config.max_scan_duration, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_overrides() {
        let config = DetectiveConfig::default()
            .with_static_analysis(false)
            .with_platforms(vec![Platform::Web])
            .excluding(["camera".to_string(), "camera".to_string()])
            .with_max_scan_duration(Duration::from_secs(5));

        assert!(!config.enable_static_analysis);
        assert_eq!(config.include_platforms, vec![Platform::Web]);
        assert_eq!(config.exclude_plugins, vec!["camera"]);
        assert_eq!(config.scan_deadline(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_empty_platform_override_keeps_defaults() {
        let config = DetectiveConfig::default().with_platforms(Vec::new());
        assert_eq!(config.include_platforms, vec![Platform::Android, Platform::Ios]);
    }

    #[test]
    fn test_target_platforms() {
        let all = DetectiveConfig::default().with_platforms(vec![Platform::All]);
        assert_eq!(all.target_platforms(), Platform::TARGETS.to_vec());

        let mixed = DetectiveConfig::default().with_platforms(vec![
            Platform::Ios,
            Platform::Unknown,
            Platform::Ios,
            Platform::Web,
        ]);
        assert_eq!(mixed.target_platforms(), vec![Platform::Ios, Platform::Web]);
    }

    #[test]
    fn test_zero_duration_disables_deadline() {
        let config = DetectiveConfig::default().with_max_scan_duration(Duration::ZERO);
        assert_eq!(config.scan_deadline(), None);
    }

    #[test]
    fn test_parse_scan_table() {
        let toml_str = r#"
[scan]
include_platforms = ["android", "web"]
exclude_plugins = ["firebase_core"]
max_scan_duration = 10
performance_mode = true
"#;
        let settings: ProjectSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.scan.include_platforms, vec![Platform::Android, Platform::Web]);
        assert_eq!(settings.scan.exclude_plugins, vec!["firebase_core"]);
        assert_eq!(settings.scan.max_scan_duration, Duration::from_secs(10));
        assert!(settings.scan.performance_mode);
        // Unspecified fields keep their defaults
        assert!(settings.scan.enable_runtime_detection);
    }
}
