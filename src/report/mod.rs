//! Report rendering for scan results
//!
//! Three formats share one entry point, [`render`]:
//! - `console` - Coloured, human-oriented terminal summary
//! - `json` - Pretty-printed exchange representation of the result
//! - `markdown` - Shareable report with resolution steps

pub mod console;
pub mod json;
pub mod markdown;

use detective_core::{DiagnosticResult, Result, Severity};

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Console,
    Json,
    Markdown,
}

/// Render a result. `color` only affects the console format.
pub fn render(result: &DiagnosticResult, format: ReportFormat, color: bool) -> Result<String> {
    match format {
        ReportFormat::Console => Ok(console::render(result, color)),
        ReportFormat::Json => json::render(result),
        ReportFormat::Markdown => Ok(markdown::render(result)),
    }
}

/// `critical` -> `Critical`
pub(crate) fn severity_title(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical",
        Severity::High => "High",
        Severity::Medium => "Medium",
        Severity::Low => "Low",
    }
}

pub(crate) fn join_platforms(platforms: &[detective_core::Platform]) -> String {
    platforms
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use detective_core::{
        DiagnosticResult, Issue, IssueType, Platform, ResolutionStep, ScanMetadata, Severity,
    };
    use std::time::Duration;

    pub fn metadata() -> ScanMetadata {
        let mut meta = ScanMetadata::new("/work/camera_app");
        meta.scan_timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        meta.scan_duration = Duration::from_millis(42);
        meta.flutter_version = "3.24.3".to_string();
        meta.dart_version = "3.5.3".to_string();
        meta
    }

    pub fn result_with_issues() -> DiagnosticResult {
        let mut registrant = Issue::new(
            "android_registrant",
            IssueType::MissingRegistration,
            Severity::Critical,
            "android plugin registrant not found",
        )
        .with_platform(Platform::Android);
        registrant.attach_resolution(vec![
            ResolutionStep::run_command("Clean the build", "Remove stale outputs", "flutter clean"),
            ResolutionStep::show_info("Check registrant", "Look at the generated file").optional(),
        ]);

        let lock = Issue::new(
            "pubspec_lock",
            IssueType::DependenciesMissing,
            Severity::Medium,
            "pubspec.lock not found",
        )
        .with_platform(Platform::All);

        DiagnosticResult::completed(vec![registrant, lock], vec!["camera".to_string()], metadata())
    }

    pub fn healthy_result() -> DiagnosticResult {
        DiagnosticResult::completed(Vec::new(), vec!["camera".to_string()], metadata())
    }
}
