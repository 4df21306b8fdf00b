//! Resolution guides
//!
//! Turns an [`Issue`] into an ordered list of remediation steps. The output
//! depends only on the issue's type, plugin name and affected platforms.

use detective_core::{Issue, IssueType, Platform, ResolutionStep, LOCK_FILE, MANIFEST_FILE};

const ANDROID_MANIFEST: &str = "android/app/src/main/AndroidManifest.xml";
const ANDROID_GRADLE: &str = "android/app/build.gradle";
const IOS_INFO_PLIST: &str = "ios/Runner/Info.plist";
const IOS_PODFILE: &str = "ios/Podfile";
const WEB_INDEX: &str = "web/index.html";

fn package_url(plugin: &str) -> String {
    format!("https://pub.dev/packages/{}", plugin)
}

/// Build the step list for one issue
pub fn generate_guide(issue: &Issue) -> Vec<ResolutionStep> {
    let plugin = issue.plugin_name.as_str();
    let platforms = &issue.affected_platforms;

    match issue.issue_type {
        IssueType::MissingRegistration => missing_registration(platforms),
        IssueType::MissingDeclaration => missing_declaration(plugin),
        IssueType::VersionMismatch => version_mismatch(plugin),
        IssueType::PlatformConfigMissing => platform_config_missing(plugin, platforms),
        IssueType::InitializationFailure => initialization_failure(plugin),
        IssueType::MethodChannelNotFound => method_channel_not_found(plugin),
        IssueType::DependenciesMissing => dependencies_missing(),
        IssueType::BuildConfigIssue => build_config_issue(platforms),
    }
}

/// Attach guides to every issue in place
pub fn attach_guides(issues: &mut [Issue]) {
    for issue in issues.iter_mut() {
        let steps = generate_guide(issue);
        issue.attach_resolution(steps);
    }
}

fn missing_registration(platforms: &[Platform]) -> Vec<ResolutionStep> {
    let mut steps = vec![
        ResolutionStep::run_command(
            "Clean the build",
            "Remove stale build outputs and generated registrants",
            "flutter clean",
        ),
        ResolutionStep::run_command(
            "Fetch dependencies",
            "Resolve packages and regenerate the plugin registrant files",
            "flutter pub get",
        ),
    ];

    steps.extend(platforms.iter().filter_map(|platform| rebuild_step(*platform)));

    steps.push(
        ResolutionStep::run_command(
            "Rebuild from scratch",
            "Stop the running app and start it again; hot reload never registers new plugins",
            "flutter run",
        )
        .optional(),
    );
    steps
}

fn rebuild_step(platform: Platform) -> Option<ResolutionStep> {
    let step = match platform {
        Platform::Android => ResolutionStep::run_command(
            "Rebuild the Android app",
            "Recompile so GeneratedPluginRegistrant.java picks up every plugin",
            "flutter build apk --debug",
        ),
        Platform::Ios => ResolutionStep::run_command(
            "Update iOS pods",
            "Reinstall CocoaPods so native plugin code is linked into Runner",
            "cd ios && pod install",
        ),
        Platform::Macos => ResolutionStep::run_command(
            "Update macOS pods",
            "Reinstall CocoaPods for the macOS runner",
            "cd macos && pod install",
        ),
        Platform::Web => ResolutionStep::run_command(
            "Rebuild for web",
            "Regenerate web_plugin_registrant.dart",
            "flutter build web",
        ),
        Platform::Windows => ResolutionStep::run_command(
            "Rebuild for Windows",
            "Regenerate generated_plugin_registrant.cc and the CMake plugin list",
            "flutter build windows",
        ),
        Platform::Linux => ResolutionStep::run_command(
            "Rebuild for Linux",
            "Regenerate generated_plugin_registrant.cc and the CMake plugin list",
            "flutter build linux",
        ),
        Platform::All | Platform::Unknown => return None,
    };
    Some(step.for_platform(platform))
}

fn missing_declaration(plugin: &str) -> Vec<ResolutionStep> {
    vec![
        ResolutionStep::modify_file(
            format!("Declare {} in {}", plugin, MANIFEST_FILE),
            format!("Add '{}' under the dependencies section", plugin),
            MANIFEST_FILE,
            Some(format!("dependencies:\n  {}: any", plugin)),
        ),
        ResolutionStep::run_command(
            "Fetch dependencies",
            "Resolve the newly declared package",
            "flutter pub get",
        ),
    ]
}

fn version_mismatch(plugin: &str) -> Vec<ResolutionStep> {
    vec![
        ResolutionStep::run_command(
            "List package versions",
            "Compare the resolved, upgradable and latest versions",
            "flutter pub outdated",
        ),
        ResolutionStep::modify_file(
            format!("Update the {} constraint", plugin),
            format!(
                "Change the version constraint of '{}' in {} to a compatible range",
                plugin, MANIFEST_FILE
            ),
            MANIFEST_FILE,
            None,
        ),
        ResolutionStep::run_command(
            "Upgrade all packages",
            "Resolve every package to its newest allowed version",
            "flutter pub upgrade --major-versions",
        ),
    ]
}

fn platform_config_missing(plugin: &str, platforms: &[Platform]) -> Vec<ResolutionStep> {
    platforms
        .iter()
        .flat_map(|platform| match platform {
            Platform::Android => android_config(plugin),
            Platform::Ios => ios_config(plugin),
            Platform::Web => web_config(plugin),
            Platform::Windows | Platform::Macos | Platform::Linux => {
                vec![capability_check(plugin, *platform)]
            }
            Platform::All | Platform::Unknown => Vec::new(),
        })
        .collect()
}

fn android_config(plugin: &str) -> Vec<ResolutionStep> {
    vec![
        ResolutionStep::modify_file(
            format!("Add Android permissions for {}", plugin),
            format!("Declare the <uses-permission> entries {} documents", plugin),
            ANDROID_MANIFEST,
            None,
        )
        .for_platform(Platform::Android),
        ResolutionStep::show_info(
            "Check Gradle settings",
            format!(
                "Confirm minSdkVersion and compileSdkVersion in {} meet the plugin's requirements",
                ANDROID_GRADLE
            ),
        )
        .for_platform(Platform::Android),
    ]
}

fn ios_config(plugin: &str) -> Vec<ResolutionStep> {
    vec![
        ResolutionStep::modify_file(
            format!("Add iOS usage descriptions for {}", plugin),
            format!("Add the NS*UsageDescription keys {} needs", plugin),
            IOS_INFO_PLIST,
            None,
        )
        .for_platform(Platform::Ios),
        ResolutionStep::show_info(
            "Check the Podfile",
            format!("Confirm the platform version and use_frameworks! in {}", IOS_PODFILE),
        )
        .for_platform(Platform::Ios),
    ]
}

fn web_config(plugin: &str) -> Vec<ResolutionStep> {
    vec![ResolutionStep::modify_file(
        format!("Add the {} script to {}", plugin, WEB_INDEX),
        format!(
            "Include the JavaScript SDK that {} loads at runtime, before flutter_bootstrap.js",
            plugin
        ),
        WEB_INDEX,
        None,
    )
    .for_platform(Platform::Web)]
}

fn capability_check(plugin: &str, platform: Platform) -> ResolutionStep {
    ResolutionStep::show_info(
        format!("Check {} support", platform),
        format!(
            "Confirm that {} ships a {} implementation and any required capabilities",
            plugin, platform
        ),
    )
    .for_platform(platform)
}

fn initialization_failure(plugin: &str) -> Vec<ResolutionStep> {
    vec![
        ResolutionStep::open_url(
            format!("Read the {} setup guide", plugin),
            "Follow the platform setup instructions from the package page",
            package_url(plugin),
        ),
        ResolutionStep::show_info(
            "Verify plugin setup",
            "Make sure WidgetsFlutterBinding.ensureInitialized() runs before the plugin is used",
        ),
        ResolutionStep::show_info(
            "Verify permissions",
            "Check that runtime permissions the plugin needs are declared and granted",
        ),
        ResolutionStep::run_command(
            "Restart the app",
            "Stop and relaunch so native initialization runs again",
            "flutter run",
        ),
    ]
}

fn method_channel_not_found(plugin: &str) -> Vec<ResolutionStep> {
    vec![
        ResolutionStep::run_command(
            "Hot restart",
            "Press 'R' in the running session, or relaunch; hot reload keeps stale channel bindings",
            "flutter run",
        ),
        ResolutionStep::show_info(
            "Verify registration",
            "Check that the plugin appears in the platform's GeneratedPluginRegistrant",
        ),
        ResolutionStep::open_url(
            format!("Check {} platform support", plugin),
            "The channel may not be implemented on this platform",
            package_url(plugin),
        ),
    ]
}

fn dependencies_missing() -> Vec<ResolutionStep> {
    vec![
        ResolutionStep::run_command(
            "Install dependencies",
            format!("Resolve packages and write {}", LOCK_FILE),
            "flutter pub get",
        ),
        ResolutionStep::run_command(
            "Check for conflicts",
            "Print the dependency graph to spot incompatible constraints",
            "flutter pub deps",
        ),
        ResolutionStep::show_info(
            "Resolve conflicts manually",
            format!(
                "Relax or pin conflicting constraints in {}, or add dependency_overrides",
                MANIFEST_FILE
            ),
        ),
    ]
}

fn build_config_issue(platforms: &[Platform]) -> Vec<ResolutionStep> {
    platforms
        .iter()
        .filter_map(|platform| match platform {
            Platform::Android => Some(
                ResolutionStep::show_info(
                    "Check Android build configuration",
                    format!("Review {} for the com.android.application plugin", ANDROID_GRADLE),
                )
                .for_platform(Platform::Android),
            ),
            Platform::Ios => Some(
                ResolutionStep::show_info(
                    "Check iOS build configuration",
                    format!("Review {} for use_frameworks! and the deployment target", IOS_PODFILE),
                )
                .for_platform(Platform::Ios),
            ),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use detective_core::{Severity, StepAction};

    fn issue(issue_type: IssueType, platforms: &[Platform]) -> Issue {
        Issue::new("camera", issue_type, Severity::High, "test issue")
            .with_platforms(platforms.iter().copied())
    }

    fn actions(steps: &[ResolutionStep]) -> Vec<&'static str> {
        steps.iter().map(|s| s.action.as_str()).collect()
    }

    #[test]
    fn test_missing_registration_shape() {
        let steps = generate_guide(&issue(
            IssueType::MissingRegistration,
            &[Platform::Android, Platform::Ios],
        ));
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0].command(), Some("flutter clean"));
        assert_eq!(steps[1].command(), Some("flutter pub get"));
        assert_eq!(steps[2].platform, Some(Platform::Android));
        assert_eq!(steps[3].platform, Some(Platform::Ios));
        assert!(steps[4].is_optional);
    }

    #[test]
    fn test_missing_registration_for_all_platforms() {
        let steps = generate_guide(&issue(IssueType::MissingRegistration, &[Platform::All]));
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn test_missing_declaration_is_templated() {
        let steps = generate_guide(&issue(IssueType::MissingDeclaration, &[]));
        assert_eq!(actions(&steps), vec!["modify-file", "run-command"]);
        assert_eq!(steps[0].file_path(), Some("pubspec.yaml"));
        assert!(steps[0].file_content().unwrap().contains("camera: any"));
    }

    #[test]
    fn test_version_mismatch_shape() {
        let steps = generate_guide(&issue(IssueType::VersionMismatch, &[]));
        assert_eq!(actions(&steps), vec!["run-command", "modify-file", "run-command"]);
        assert!(steps[1].title.contains("camera"));
    }

    #[test]
    fn test_platform_config_follows_platform_order() {
        let steps = generate_guide(&issue(
            IssueType::PlatformConfigMissing,
            &[Platform::Web, Platform::Android, Platform::Linux],
        ));
        let platforms: Vec<_> = steps.iter().map(|s| s.platform).collect();
        assert_eq!(
            platforms,
            vec![
                Some(Platform::Web),
                Some(Platform::Android),
                Some(Platform::Android),
                Some(Platform::Linux),
            ]
        );
        assert_eq!(steps[0].file_path(), Some("web/index.html"));
        assert_eq!(steps[3].action, StepAction::ShowInfo);
    }

    #[test]
    fn test_initialization_failure_shape() {
        let steps = generate_guide(&issue(IssueType::InitializationFailure, &[Platform::Ios]));
        assert_eq!(
            actions(&steps),
            vec!["open-url", "show-info", "show-info", "run-command"]
        );
        assert_eq!(steps[0].url(), Some("https://pub.dev/packages/camera"));
    }

    #[test]
    fn test_method_channel_shape() {
        let steps = generate_guide(&issue(IssueType::MethodChannelNotFound, &[]));
        assert_eq!(actions(&steps), vec!["run-command", "show-info", "open-url"]);
    }

    #[test]
    fn test_dependencies_missing_shape() {
        let steps = generate_guide(&issue(IssueType::DependenciesMissing, &[Platform::All]));
        assert_eq!(actions(&steps), vec!["run-command", "run-command", "show-info"]);
        assert_eq!(steps[0].command(), Some("flutter pub get"));
    }

    #[test]
    fn test_build_config_only_mobile() {
        let steps = generate_guide(&issue(
            IssueType::BuildConfigIssue,
            &[Platform::Windows, Platform::Ios, Platform::Android],
        ));
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].platform, Some(Platform::Ios));
        assert_eq!(steps[1].platform, Some(Platform::Android));
    }

    #[test]
    fn test_guides_are_deterministic() {
        for issue_type in [
            IssueType::MissingRegistration,
            IssueType::MissingDeclaration,
            IssueType::VersionMismatch,
            IssueType::PlatformConfigMissing,
            IssueType::InitializationFailure,
            IssueType::MethodChannelNotFound,
            IssueType::DependenciesMissing,
            IssueType::BuildConfigIssue,
        ] {
            let a = issue(issue_type, &Platform::TARGETS);
            let b = a.clone();
            assert_eq!(generate_guide(&a), generate_guide(&b));
        }
    }

    #[test]
    fn test_attach_guides() {
        let mut issues = vec![issue(IssueType::DependenciesMissing, &[Platform::All])];
        attach_guides(&mut issues);
        assert_eq!(issues[0].resolution_steps.as_ref().map(Vec::len), Some(3));
    }
}
