//! `pubspec.yaml` parsing and Flutter project validation
//!
//! Reads the dependency manifest to obtain the declared plugin set, and
//! classifies the project directory (application, plugin, package).

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::types::Platform;

/// Dependency manifest file name
pub const MANIFEST_FILE: &str = "pubspec.yaml";

/// Resolved-dependency lock file name
pub const LOCK_FILE: &str = "pubspec.lock";

/// Dependency key that refers to the Flutter SDK itself
const SDK_SELF_REFERENCE: &str = "flutter";

/// Dev dependencies that are plugins even though their names do not say so
pub const KNOWN_DEV_PLUGINS: &[&str] = &[
    "integration_test",
    "patrol",
    "flutter_driver",
    "mockito",
    "golden_toolkit",
];

/// Classification of a pubspec.yaml project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    /// A runnable Flutter application (has flutter dep, platform dirs, not a plugin)
    Application,
    /// A Flutter plugin (has `flutter: plugin:` section)
    Plugin,
    /// A Flutter package (has flutter dep but no platform directories)
    FlutterPackage,
    /// A pure Dart package (no flutter SDK dependency)
    DartPackage,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Application => "application",
            ProjectType::Plugin => "plugin",
            ProjectType::FlutterPackage => "flutter_package",
            ProjectType::DartPackage => "dart_package",
        }
    }
}

/// The parts of `pubspec.yaml` the analyzer cares about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub name: Option<String>,
    /// Keys of `dependencies`, in file order
    pub dependencies: Vec<String>,
    /// Keys of `dev_dependencies`, in file order
    pub dev_dependencies: Vec<String>,
    /// Whether the manifest declares a `flutter: plugin:` section
    pub is_plugin: bool,
}

impl Manifest {
    /// Parse manifest text
    pub fn parse(content: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(content)?;
        let root = match root {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            other => {
                return Err(Error::manifest(format!(
                    "expected a mapping at the top level, found {}",
                    value_kind(&other)
                )))
            }
        };

        let name = root
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let dependencies = section_keys(&root, "dependencies")?;
        let dev_dependencies = section_keys(&root, "dev_dependencies")?;
        let is_plugin = root
            .get("flutter")
            .and_then(Value::as_mapping)
            .is_some_and(|flutter| flutter.contains_key("plugin"));

        Ok(Self {
            name,
            dependencies,
            dev_dependencies,
            is_plugin,
        })
    }

    /// Read and parse `<project>/pubspec.yaml`
    pub fn load(project_path: &Path) -> Result<Self> {
        let path = manifest_path(project_path);
        if !path.is_file() {
            return Err(Error::manifest_not_found(project_path));
        }
        let content = fs::read_to_string(&path)?;
        let manifest = Self::parse(&content)?;
        debug!(
            "Parsed {:?}: {} dependencies, {} dev dependencies",
            path,
            manifest.dependencies.len(),
            manifest.dev_dependencies.len()
        );
        Ok(manifest)
    }

    /// Declared plugin identifiers.
    ///
    /// All runtime dependencies except the SDK self-reference, followed by the
    /// dev dependencies that look like plugins. Order is file order, without
    /// duplicates.
    pub fn declared_plugins(&self) -> Vec<String> {
        let mut plugins: Vec<String> = Vec::new();
        let runtime = self
            .dependencies
            .iter()
            .filter(|name| name.as_str() != SDK_SELF_REFERENCE);
        let dev = self
            .dev_dependencies
            .iter()
            .filter(|name| is_dev_plugin(name));

        for name in runtime.chain(dev) {
            if !plugins.contains(name) {
                plugins.push(name.clone());
            }
        }
        plugins
    }

    /// Declared plugins minus the excluded names
    pub fn plugin_scope(&self, exclude: &[String]) -> Vec<String> {
        self.declared_plugins()
            .into_iter()
            .filter(|name| !exclude.contains(name))
            .collect()
    }
}

/// Name-pattern heuristic for plugin-like dev dependencies
pub fn is_dev_plugin(name: &str) -> bool {
    name.contains("plugin") || name.ends_with("_plugin") || KNOWN_DEV_PLUGINS.contains(&name)
}

fn section_keys(root: &Mapping, section: &str) -> Result<Vec<String>> {
    match root.get(section) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Mapping(entries)) => Ok(entries
            .keys()
            .filter_map(|key| key.as_str().map(str::to_string))
            .collect()),
        Some(other) => Err(Error::manifest(format!(
            "'{}' must be a mapping, found {}",
            section,
            value_kind(other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

pub fn manifest_path(project_path: &Path) -> PathBuf {
    project_path.join(MANIFEST_FILE)
}

pub fn lock_file_path(project_path: &Path) -> PathBuf {
    project_path.join(LOCK_FILE)
}

// ─────────────────────────────────────────────────────────────────────────────
// Project validation
// ─────────────────────────────────────────────────────────────────────────────

/// Confirm the directory holds a manifest that depends on the Flutter SDK
pub fn validate_flutter_project(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(Error::no_project(path));
    }

    let content = match fs::read_to_string(manifest_path(path)) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::manifest_not_found(path))
        }
        Err(e) => return Err(e.into()),
    };

    if !check_has_flutter_dependency(&content) {
        return Err(Error::not_flutter_project(path));
    }

    trace!("Validated Flutter project at {:?}", path);
    Ok(())
}

/// Check if pubspec.yaml has flutter SDK dependency
fn check_has_flutter_dependency(content: &str) -> bool {
    // Look for pattern:
    // dependencies:
    //   flutter:
    //     sdk: flutter
    //
    // "sdk: flutter" is unique enough to stand for the whole block
    content.contains("sdk: flutter")
}

/// Platform directories present in the project, in canonical order
pub fn platform_directories(path: &Path) -> Vec<Platform> {
    Platform::TARGETS
        .into_iter()
        .filter(|platform| path.join(platform.as_str()).is_dir())
        .collect()
}

/// Get the project type for a directory containing pubspec.yaml
pub fn get_project_type(path: &Path) -> Option<ProjectType> {
    let content = fs::read_to_string(manifest_path(path)).ok()?;

    let has_flutter = check_has_flutter_dependency(&content);
    let is_plugin = Manifest::parse(&content)
        .map(|manifest| manifest.is_plugin)
        .unwrap_or(false);
    let has_platforms = !platform_directories(path).is_empty();

    Some(if !has_flutter {
        ProjectType::DartPackage
    } else if is_plugin {
        ProjectType::Plugin
    } else if has_platforms {
        ProjectType::Application
    } else {
        ProjectType::FlutterPackage
    })
}

/// Parse the project name from pubspec.yaml
pub fn get_project_name(project_path: &Path) -> Option<String> {
    let content = fs::read_to_string(manifest_path(project_path)).ok()?;
    Manifest::parse(&content)
        .ok()
        .and_then(|manifest| manifest.name)
        .filter(|name| !name.is_empty())
}
