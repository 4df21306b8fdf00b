//! Build-configuration checks: Gradle, Podfile and the web entry page
//!
//! Each check only fires when its file exists; a missing optional config file
//! is not a finding by itself.

use std::fs;
use std::path::Path;
use tracing::debug;

use detective_core::prelude::*;
use detective_core::{Issue, IssueType, Platform, Severity};

use crate::knowledge::{is_swift_plugin, requires_web_script};

/// Candidate Android app build files, Groovy first
const ANDROID_BUILD_FILES: &[&str] = &["android/app/build.gradle", "android/app/build.gradle.kts"];

const PODFILE: &str = "ios/Podfile";

pub const WEB_INDEX: &str = "web/index.html";

/// Plugin id shared by `apply plugin:`, `id "..."` and `id("...")` forms
const APPLICATION_PLUGIN_ID: &str = "com.android.application";

const FRAMEWORKS_DIRECTIVE: &str = "use_frameworks!";

/// Read a file if it exists; `Ok(None)` when absent
fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }
    Ok(Some(fs::read_to_string(path)?))
}

/// Android app module must apply the application plugin
pub fn check_android_gradle(project_path: &Path) -> Result<Vec<Issue>> {
    for relative in ANDROID_BUILD_FILES {
        let Some(content) = read_optional(&project_path.join(relative))? else {
            continue;
        };

        if has_active_directive(&content, APPLICATION_PLUGIN_ID) {
            return Ok(Vec::new());
        }

        return Ok(vec![Issue::new(
            "android_build_config",
            IssueType::BuildConfigIssue,
            Severity::Medium,
            format!(
                "{} does not apply the 'com.android.application' plugin; \
                 plugins may not be compiled into the app",
                relative
            ),
        )
        .with_platform(Platform::Android)
        .with_context("filePath", *relative)]);
    }

    debug!("No Android app build file found, skipping gradle check");
    Ok(Vec::new())
}

/// Swift plugins need `use_frameworks!` in the Podfile
pub fn check_podfile(project_path: &Path, plugins: &[String]) -> Result<Vec<Issue>> {
    let Some(content) = read_optional(&project_path.join(PODFILE))? else {
        debug!("No Podfile found, skipping frameworks check");
        return Ok(Vec::new());
    };

    if has_active_directive(&content, FRAMEWORKS_DIRECTIVE) {
        return Ok(Vec::new());
    }

    let swift_plugins: Vec<&str> = plugins
        .iter()
        .map(String::as_str)
        .filter(|plugin| is_swift_plugin(plugin))
        .collect();

    if swift_plugins.is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![Issue::new(
        "ios_podfile",
        IssueType::BuildConfigIssue,
        Severity::Medium,
        format!(
            "ios/Podfile has no 'use_frameworks!' directive but Swift plugins are declared: {}",
            swift_plugins.join(", ")
        ),
    )
    .with_platform(Platform::Ios)
    .with_context("filePath", PODFILE)
    .with_context("swiftPlugins", swift_plugins.join(","))])
}

/// Directive present on a line that is not commented out (`#` or `//`)
fn has_active_directive(content: &str, directive: &str) -> bool {
    content
        .lines()
        .map(str::trim_start)
        .filter(|line| !line.starts_with('#') && !line.starts_with("//"))
        .any(|line| line.contains(directive))
}

/// Plugins that need a script tag must be mentioned in `web/index.html`
pub fn check_web_index(project_path: &Path, plugins: &[String]) -> Result<Vec<Issue>> {
    let Some(markup) = read_optional(&project_path.join(WEB_INDEX))? else {
        debug!("No {} found, skipping web script check", WEB_INDEX);
        return Ok(Vec::new());
    };

    Ok(plugins
        .iter()
        .filter(|plugin| requires_web_script(plugin))
        .filter(|plugin| !markup.contains(plugin.as_str()))
        .map(|plugin| {
            Issue::new(
                plugin.as_str(),
                IssueType::PlatformConfigMissing,
                Severity::Medium,
                format!(
                    "'{}' needs a script reference in web/index.html but none was found",
                    plugin
                ),
            )
            .with_platform(Platform::Web)
            .with_context("filePath", WEB_INDEX)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn plugins(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_gradle_with_application_plugin() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "android/app/build.gradle",
            "plugins {\n    id \"com.android.application\"\n    id \"dev.flutter.flutter-gradle-plugin\"\n}\n",
        );
        assert!(check_android_gradle(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_kotlin_gradle_with_application_plugin() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "android/app/build.gradle.kts",
            "plugins {\n    id(\"com.android.application\")\n}\n",
        );
        assert!(check_android_gradle(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_gradle_without_application_plugin() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "android/app/build.gradle", "apply plugin: 'kotlin-android'\n");
        let issues = check_android_gradle(temp.path()).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, IssueType::BuildConfigIssue);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[0].affected_platforms, vec![Platform::Android]);
    }

    #[test]
    fn test_missing_gradle_is_skipped() {
        let temp = TempDir::new().unwrap();
        assert!(check_android_gradle(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_podfile_without_frameworks_and_swift_plugin() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            PODFILE,
            "platform :ios, '12.0'\ntarget 'Runner' do\n  # use_frameworks!\nend\n",
        );
        let issues = check_podfile(temp.path(), &plugins(&["camera", "provider"])).unwrap();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("camera"));
        assert_eq!(issues[0].affected_platforms, vec![Platform::Ios]);
    }

    #[test]
    fn test_podfile_with_frameworks() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            PODFILE,
            "target 'Runner' do\n  use_frameworks!\nend\n",
        );
        assert!(check_podfile(temp.path(), &plugins(&["camera"])).unwrap().is_empty());
    }

    #[test]
    fn test_podfile_without_swift_plugins() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), PODFILE, "target 'Runner' do\nend\n");
        assert!(check_podfile(temp.path(), &plugins(&["provider"])).unwrap().is_empty());
    }

    #[test]
    fn test_web_index_missing_script() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            WEB_INDEX,
            "<html><body><script src=\"google_sign_in.js\"></script></body></html>",
        );
        let issues = check_web_index(
            temp.path(),
            &plugins(&["firebase_core", "google_sign_in", "camera"]),
        )
        .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].plugin_name, "firebase_core");
        assert_eq!(issues[0].issue_type, IssueType::PlatformConfigMissing);
        assert_eq!(issues[0].severity, Severity::Medium);
    }

    #[test]
    fn test_missing_web_index_is_skipped() {
        let temp = TempDir::new().unwrap();
        assert!(check_web_index(temp.path(), &plugins(&["firebase_core"]))
            .unwrap()
            .is_empty());
    }
}
