//! Manifest/registrant analyzer
//!
//! Cross-references the plugins declared in `pubspec.yaml` with the plugins
//! referenced by each platform's generated registrant, and checks the build
//! files and lock file that plugin registration depends on.

use std::fs;
use std::path::Path;

use detective_core::prelude::*;
use detective_core::{lock_file_path, manifest_path, Issue, IssueType, Manifest, Platform, Severity};

use crate::build_config::{check_android_gradle, check_podfile, check_web_index};
use crate::knowledge::requires_registration;
use crate::registrant::{is_registered, registrant_for, RegistrantSpec};

/// Sentinel for a missing `pubspec.yaml`
pub const MANIFEST_SENTINEL: &str = "pubspec_yaml";

/// Sentinel for a missing `pubspec.lock`
pub const LOCK_SENTINEL: &str = "pubspec_lock";

/// Sentinel for an analysis that could not run at all
pub const ANALYSIS_SENTINEL: &str = "static_analysis";

/// Static analyzer over the project's source tree
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestAnalyzer;

impl ManifestAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Run every static check.
    ///
    /// Expected gaps (missing files) become issues. Unexpected failures (I/O,
    /// malformed YAML, a project path that does not exist) are folded into a
    /// single high-severity `initialization-failure` covering `include_platforms`.
    pub fn analyze(
        &self,
        project_path: &Path,
        include_platforms: &[Platform],
        exclude_plugins: &[String],
    ) -> Vec<Issue> {
        let mut issues = match self.try_analyze(project_path, include_platforms, exclude_plugins) {
            Ok(issues) => issues,
            Err(e) => {
                warn!("Static analysis of {:?} failed: {}", project_path, e);
                return vec![analysis_failure(&e, include_platforms)];
            }
        };

        issues.retain(|issue| !exclude_plugins.contains(&issue.plugin_name));
        info!("Static analysis produced {} issue(s)", issues.len());
        issues
    }

    /// Declared plugins minus exclusions; empty if the manifest is unusable
    pub fn plugin_scope(&self, project_path: &Path, exclude_plugins: &[String]) -> Vec<String> {
        Manifest::load(project_path)
            .map(|manifest| manifest.plugin_scope(exclude_plugins))
            .unwrap_or_default()
    }

    fn try_analyze(
        &self,
        project_path: &Path,
        include_platforms: &[Platform],
        exclude_plugins: &[String],
    ) -> Result<Vec<Issue>> {
        if !project_path.is_dir() {
            return Err(Error::no_project(project_path));
        }

        if !manifest_path(project_path).is_file() {
            return Ok(vec![missing_manifest(project_path)]);
        }

        let manifest = Manifest::load(project_path)?;
        let scope = manifest.plugin_scope(exclude_plugins);
        debug!("Analysis scope: {:?}", scope);

        // One buffer per platform, concatenated in request order
        let per_platform = include_platforms
            .iter()
            .map(|platform| check_platform(project_path, *platform, &scope))
            .collect::<Result<Vec<_>>>()?;

        let mut issues: Vec<Issue> = per_platform.into_iter().flatten().collect();

        if include_platforms.contains(&Platform::Android) {
            issues.extend(check_android_gradle(project_path)?);
        }
        if include_platforms.contains(&Platform::Ios) {
            issues.extend(check_podfile(project_path, &scope)?);
        }

        issues.extend(check_lock_file(project_path));
        issues.extend(check_version_mismatches(&manifest, &scope));

        Ok(issues)
    }
}

fn check_platform(project_path: &Path, platform: Platform, scope: &[String]) -> Result<Vec<Issue>> {
    if platform == Platform::Web {
        return check_web_index(project_path, scope);
    }

    match registrant_for(platform) {
        Some(spec) => check_registrant(project_path, spec, scope),
        None => {
            debug!("No static checks for platform tag '{}'", platform);
            Ok(Vec::new())
        }
    }
}

fn check_registrant(
    project_path: &Path,
    spec: &RegistrantSpec,
    scope: &[String],
) -> Result<Vec<Issue>> {
    let path = spec.path_in(project_path);

    if !path.is_file() {
        if scope.is_empty() {
            trace!("No {} registrant, but no plugins declared either", spec.platform);
            return Ok(Vec::new());
        }
        return Ok(vec![Issue::new(
            spec.sentinel,
            IssueType::MissingRegistration,
            Severity::Critical,
            format!(
                "{} plugin registrant not found at {}; none of the {} declared plugin(s) can be registered",
                spec.platform,
                spec.relative_path,
                scope.len()
            ),
        )
        .with_platform(spec.platform)
        .with_context("expectedPath", spec.relative_path)]);
    }

    let content = fs::read_to_string(&path)?;
    let registered = spec.extract_plugin_names(&content);
    debug!(
        "{} registrant references {} plugin(s): {:?}",
        spec.platform,
        registered.len(),
        registered
    );

    Ok(scope
        .iter()
        .filter(|plugin| requires_registration(plugin))
        .filter(|plugin| !is_registered(plugin, &registered))
        .map(|plugin| {
            Issue::new(
                plugin.as_str(),
                IssueType::MissingRegistration,
                Severity::High,
                format!(
                    "Plugin '{}' is declared in pubspec.yaml but is not registered in the {} plugin registrant",
                    plugin, spec.platform
                ),
            )
            .with_platform(spec.platform)
            .with_context("registrantPath", spec.relative_path)
        })
        .collect())
}

fn check_lock_file(project_path: &Path) -> Option<Issue> {
    if lock_file_path(project_path).is_file() {
        return None;
    }
    Some(
        Issue::new(
            LOCK_SENTINEL,
            IssueType::DependenciesMissing,
            Severity::Medium,
            "pubspec.lock not found; dependencies have not been resolved",
        )
        .with_platform(Platform::All),
    )
}

/// Extension point for version-constraint checks. No rules are defined yet,
/// so this never reports anything.
fn check_version_mismatches(_manifest: &Manifest, _scope: &[String]) -> Vec<Issue> {
    Vec::new()
}

fn missing_manifest(project_path: &Path) -> Issue {
    Issue::new(
        MANIFEST_SENTINEL,
        IssueType::InitializationFailure,
        Severity::Critical,
        format!("pubspec.yaml not found in {}", project_path.display()),
    )
    .with_platform(Platform::All)
}

fn analysis_failure(error: &Error, include_platforms: &[Platform]) -> Issue {
    Issue::new(
        ANALYSIS_SENTINEL,
        IssueType::InitializationFailure,
        Severity::High,
        format!("Static analysis could not complete: {}", error),
    )
    .with_platforms(include_platforms.iter().copied())
}
