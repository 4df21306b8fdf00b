//! End-to-end diagnosis of fixture projects
//!
//! Each test builds a small Flutter project in a temp directory and runs the
//! full orchestrator over it with a fixed toolchain probe.

use std::fs;
use std::path::Path;

use detective_app::{Detective, DetectiveConfig};
use detective_core::{
    deduplicate, DiagnosticResult, Issue, IssueType, Platform, ScanStatus, Severity,
    SCAN_FAILURE_PLUGIN,
};
use detective_scan::{generate_guide, StaticProbe};
use flutter_plugin_detective::report::json;
use tempfile::TempDir;

const FLUTTER_ONLY: &str = "name: bare_app\ndependencies:\n  flutter:\n    sdk: flutter\n";

const CAMERA_APP: &str = "name: camera_app
dependencies:
  flutter:
    sdk: flutter
  camera: ^0.11.0
dev_dependencies:
  flutter_test:
    sdk: flutter
";

const ANDROID_REGISTRANT: &str =
    "android/app/src/main/java/io/flutter/plugins/GeneratedPluginRegistrant.java";
const IOS_REGISTRANT: &str = "ios/Runner/GeneratedPluginRegistrant.m";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project(manifest: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "pubspec.yaml", manifest);
    temp
}

async fn diagnose(config: DetectiveConfig, path: &Path, resolutions: bool) -> DiagnosticResult {
    Detective::with_probe(config, StaticProbe::new("3.24.3", "3.5.3"))
        .diagnose(path, resolutions)
        .await
}

#[tokio::test]
async fn test_camera_project_without_artifacts_reports_three_issues() {
    let project = project(CAMERA_APP);
    let result = diagnose(DetectiveConfig::default(), project.path(), true).await;

    assert_eq!(result.status(), ScanStatus::Error);
    assert_eq!(result.scanned_plugins, vec!["camera"]);

    let summary: Vec<(&str, Severity, Vec<Platform>)> = result
        .issues
        .iter()
        .map(|i| (i.plugin_name.as_str(), i.severity, i.affected_platforms.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("android_registrant", Severity::Critical, vec![Platform::Android]),
            ("ios_registrant", Severity::Critical, vec![Platform::Ios]),
            ("pubspec_lock", Severity::Medium, vec![Platform::All]),
        ]
    );
    assert_eq!(result.issues[2].issue_type, IssueType::DependenciesMissing);
}

#[tokio::test]
async fn test_missing_android_registrant_is_critical() {
    let project = project(CAMERA_APP);
    let config = DetectiveConfig::default().with_platforms(vec![Platform::Android]);
    let result = diagnose(config, project.path(), false).await;

    assert!(result.issues.iter().any(|i| {
        i.severity == Severity::Critical
            && i.affects(Platform::Android)
            && (i.plugin_name == "camera" || i.plugin_name == "android_registrant")
    }));
}

#[tokio::test]
async fn test_registrant_without_entry_names_the_plugin() {
    let project = project(CAMERA_APP);
    write(
        project.path(),
        ANDROID_REGISTRANT,
        "public final class GeneratedPluginRegistrant {\n  public static void registerWith() {}\n}\n",
    );
    let config = DetectiveConfig::default().with_platforms(vec![Platform::Android]);
    let result = diagnose(config, project.path(), false).await;

    let issue = result
        .issues
        .iter()
        .find(|i| i.plugin_name == "camera")
        .expect("camera issue");
    assert_eq!(issue.issue_type, IssueType::MissingRegistration);
    assert_eq!(issue.severity, Severity::High);
    assert_eq!(issue.affected_platforms, vec![Platform::Android]);
}

#[tokio::test]
async fn test_project_without_plugins_is_healthy() {
    let project = project(FLUTTER_ONLY);
    write(project.path(), "pubspec.lock", "packages: {}\n");

    let result = diagnose(DetectiveConfig::default(), project.path(), true).await;

    assert!(result.issues.is_empty(), "{:?}", result.issues);
    assert_eq!(result.status(), ScanStatus::Healthy);
    assert_eq!(result.flutter_version, "3.24.3");
}

#[tokio::test]
async fn test_registered_plugin_project_is_healthy() {
    let project = project(CAMERA_APP);
    write(project.path(), "pubspec.lock", "packages: {}\n");
    write(
        project.path(),
        ANDROID_REGISTRANT,
        "flutterEngine.getPlugins().add(new io.flutter.plugins.camera.CameraPlugin());\nio.flutter.plugins.camera.CameraPlugin.registerWith(registry);\n",
    );
    write(
        project.path(),
        IOS_REGISTRANT,
        "@import camera_avfoundation;\n[CameraPlugin registerWithRegistrar:[registry registrarForPlugin:@\"CameraPlugin\"]];\n",
    );

    let result = diagnose(DetectiveConfig::default(), project.path(), false).await;
    assert_eq!(result.status(), ScanStatus::Healthy, "{:?}", result.issues);
}

#[tokio::test]
async fn test_missing_manifest_fails_with_one_issue() {
    let empty = TempDir::new().unwrap();
    let result = diagnose(DetectiveConfig::default(), empty.path(), true).await;

    assert_eq!(result.status(), ScanStatus::Failed);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].plugin_name, SCAN_FAILURE_PLUGIN);
    assert_eq!(result.issues[0].issue_type, IssueType::InitializationFailure);
    assert_eq!(result.issues[0].severity, Severity::Critical);
    assert!(result.scanned_plugins.is_empty());
}

#[tokio::test]
async fn test_excluded_plugin_never_reported_across_runs() {
    let project = project(CAMERA_APP);
    write(
        project.path(),
        ANDROID_REGISTRANT,
        "public final class GeneratedPluginRegistrant {}\n",
    );
    write(
        project.path(),
        "logs/flutter_run.log",
        "E/flutter ( 4242): MissingPluginException(No implementation found for method init on channel camera/methods)\n",
    );

    let config = DetectiveConfig::default()
        .with_platforms(vec![Platform::Android])
        .excluding(["camera".to_string()]);

    for _ in 0..3 {
        let result = diagnose(config.clone(), project.path(), true).await;
        assert!(result.scanned_plugins.is_empty());
        assert!(result.issues.iter().all(|i| i.plugin_name != "camera"));
    }
}

#[tokio::test]
async fn test_log_findings_are_reported_with_their_source() {
    let project = project(FLUTTER_ONLY);
    write(project.path(), "pubspec.lock", "packages: {}\n");
    write(
        project.path(),
        "logs/flutter_run.log",
        "E/flutter ( 4242): MissingPluginException(No implementation found for method read on channel battery/methods)\n",
    );

    let result = diagnose(DetectiveConfig::default(), project.path(), false).await;

    let issue = result
        .issues
        .iter()
        .find(|i| i.plugin_name == "battery")
        .expect("battery issue");
    assert_eq!(issue.issue_type, IssueType::MissingRegistration);
    assert_eq!(issue.severity, Severity::Critical);
    assert!(issue.detected_at.is_some());
    assert!(issue.additional_context.contains_key("logFile"));
}

#[tokio::test]
async fn test_json_round_trip_preserves_result() {
    let project = project(CAMERA_APP);
    write(
        project.path(),
        "logs/flutter_run.log",
        "E/flutter ( 4242): MissingPluginException(No implementation found for method init on channel camera/methods)\n",
    );
    let result = diagnose(DetectiveConfig::default(), project.path(), true).await;

    let parsed = json::parse(&json::render(&result).unwrap()).unwrap();

    assert_eq!(parsed.status(), result.status());
    assert_eq!(parsed.issues, result.issues);
    assert_eq!(parsed.scanned_plugins, result.scanned_plugins);
    assert_eq!(parsed.scan_duration, result.scan_duration);
    assert_eq!(parsed, result);
}

#[test]
fn test_guide_generation_is_deterministic() {
    let issue = Issue::new(
        "camera",
        IssueType::MissingRegistration,
        Severity::High,
        "camera is not registered",
    )
    .with_platforms([Platform::Ios, Platform::Android]);
    let twin = issue.clone();

    assert_eq!(generate_guide(&issue), generate_guide(&twin));
    assert!(!generate_guide(&issue).is_empty());
}

#[test]
fn test_dedup_keeps_first_occurrence_in_place() {
    let first = Issue::new("camera", IssueType::MissingRegistration, Severity::High, "same")
        .with_platform(Platform::Android);
    let other = Issue::new("maps", IssueType::BuildConfigIssue, Severity::Low, "other");
    let repeat = Issue::new("camera", IssueType::MissingRegistration, Severity::Critical, "same")
        .with_platform(Platform::Ios);

    let issues = deduplicate(vec![other.clone(), first.clone(), repeat]);
    assert_eq!(issues, vec![other, first]);
}

#[test]
fn test_status_is_a_function_of_severities() {
    let at = |severity| Issue::new("p", IssueType::VersionMismatch, severity, "d");

    assert_eq!(ScanStatus::from_issues(&[]), ScanStatus::Healthy);
    assert_eq!(
        ScanStatus::from_issues(&[at(Severity::Low), at(Severity::Medium)]),
        ScanStatus::Warning
    );
    for blocking in [Severity::Critical, Severity::High] {
        let issues = [at(Severity::Low), at(blocking)];
        assert_eq!(ScanStatus::from_issues(&issues), ScanStatus::Error);
        assert_eq!(ScanStatus::from_issues(&issues), ScanStatus::from_issues(&issues));
    }
}
