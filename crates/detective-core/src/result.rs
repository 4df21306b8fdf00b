//! Aggregated scan outcome

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::issue::Issue;
use crate::types::{IssueType, Platform, Severity};

/// Value reported when a toolchain version could not be determined
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Sentinel plugin name of the issue that stands in for an aborted scan
pub const SCAN_FAILURE_PLUGIN: &str = "diagnostic_scan";

/// Overall health of a scanned project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// No issues found
    Healthy,
    /// Only medium/low issues
    Warning,
    /// At least one critical/high issue
    Error,
    /// The scan itself could not be completed
    Failed,
}

impl ScanStatus {
    /// Derive the status of a completed scan from its issues
    pub fn from_issues(issues: &[Issue]) -> Self {
        if issues.is_empty() {
            ScanStatus::Healthy
        } else if issues.iter().any(|issue| issue.severity.is_blocking()) {
            ScanStatus::Error
        } else {
            ScanStatus::Warning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Healthy => "healthy",
            ScanStatus::Warning => "warning",
            ScanStatus::Error => "error",
            ScanStatus::Failed => "failed",
        }
    }

    /// Process exit code by convention: anything but healthy is non-zero
    pub fn exit_code(&self) -> i32 {
        match self {
            ScanStatus::Healthy => 0,
            _ => 1,
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scan metadata supplied by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct ScanMetadata {
    pub project_path: PathBuf,
    pub scan_timestamp: DateTime<Utc>,
    pub scan_duration: Duration,
    pub flutter_version: String,
    pub dart_version: String,
    pub additional_metadata: BTreeMap<String, serde_json::Value>,
}

impl ScanMetadata {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            scan_timestamp: Utc::now(),
            scan_duration: Duration::ZERO,
            flutter_version: UNKNOWN_VERSION.to_string(),
            dart_version: UNKNOWN_VERSION.to_string(),
            additional_metadata: BTreeMap::new(),
        }
    }
}

/// The result of one `diagnose` call.
///
/// `status` is private: it is always derived from the issues, or set to
/// [`ScanStatus::Failed`] by [`DiagnosticResult::failed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    status: ScanStatus,
    pub issues: Vec<Issue>,
    pub scanned_plugins: Vec<String>,
    #[serde(with = "duration_millis", rename = "scanDurationMs")]
    pub scan_duration: Duration,
    pub scan_timestamp: DateTime<Utc>,
    pub project_path: PathBuf,
    pub flutter_version: String,
    pub dart_version: String,
    #[serde(default)]
    pub additional_metadata: BTreeMap<String, serde_json::Value>,
}

impl DiagnosticResult {
    /// Package a completed scan; status is derived from `issues`
    pub fn completed(issues: Vec<Issue>, scanned_plugins: Vec<String>, meta: ScanMetadata) -> Self {
        Self {
            status: ScanStatus::from_issues(&issues),
            issues,
            scanned_plugins,
            scan_duration: truncate_to_millis(meta.scan_duration),
            scan_timestamp: meta.scan_timestamp,
            project_path: meta.project_path,
            flutter_version: meta.flutter_version,
            dart_version: meta.dart_version,
            additional_metadata: meta.additional_metadata,
        }
    }

    /// Package an aborted scan: exactly one synthetic issue, no scanned plugins
    pub fn failed(failure: Issue, meta: ScanMetadata) -> Self {
        Self {
            status: ScanStatus::Failed,
            issues: vec![failure],
            scanned_plugins: Vec::new(),
            scan_duration: truncate_to_millis(meta.scan_duration),
            scan_timestamp: meta.scan_timestamp,
            project_path: meta.project_path,
            flutter_version: meta.flutter_version,
            dart_version: meta.dart_version,
            additional_metadata: meta.additional_metadata,
        }
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ScanStatus::Healthy
    }

    pub fn issues_of_type(&self, issue_type: IssueType) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.issue_type == issue_type)
    }

    pub fn issues_for_platform(&self, platform: Platform) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.affects(platform))
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }
}

/// The synthetic issue carried by a failed scan
pub fn scan_failure_issue(reason: impl Into<String>) -> Issue {
    Issue::new(
        SCAN_FAILURE_PLUGIN,
        IssueType::InitializationFailure,
        Severity::Critical,
        reason,
    )
    .with_platform(Platform::All)
    .detected_now()
}

fn truncate_to_millis(duration: Duration) -> Duration {
    Duration::from_millis(duration.as_millis().min(u64::MAX as u128) as u64)
}

/// Durations travel as whole milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
