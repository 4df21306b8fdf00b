//! Shared vocabulary: platforms, severities and issue categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Platform
// ─────────────────────────────────────────────────────────────────────────────

/// A Flutter target platform, or one of the two sentinel tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Web,
    Windows,
    Macos,
    Linux,
    /// Applies to the whole project regardless of target
    All,
    /// Platform could not be inferred (runtime findings only)
    Unknown,
}

impl Platform {
    /// The six real target platforms, in canonical order
    pub const TARGETS: [Platform; 6] = [
        Platform::Android,
        Platform::Ios,
        Platform::Web,
        Platform::Windows,
        Platform::Macos,
        Platform::Linux,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Web => "web",
            Platform::Windows => "windows",
            Platform::Macos => "macos",
            Platform::Linux => "linux",
            Platform::All => "all",
            Platform::Unknown => "unknown",
        }
    }

    /// Spellings that identify this platform inside free-form log text.
    ///
    /// Matching is case-sensitive, so each accepted casing is listed.
    pub fn log_markers(&self) -> &'static [&'static str] {
        match self {
            Platform::Android => &["android", "Android"],
            Platform::Ios => &["ios", "iOS", "IOS"],
            Platform::Web => &["web", "Web"],
            Platform::Windows => &["windows", "Windows"],
            Platform::Macos => &["macos", "macOS", "MacOS"],
            Platform::Linux => &["linux", "Linux"],
            Platform::All | Platform::Unknown => &[],
        }
    }

    /// Whether this is one of the six real targets
    pub fn is_target(&self) -> bool {
        !matches!(self, Platform::All | Platform::Unknown)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "web" => Ok(Platform::Web),
            "windows" => Ok(Platform::Windows),
            "macos" => Ok(Platform::Macos),
            "linux" => Ok(Platform::Linux),
            "all" => Ok(Platform::All),
            "unknown" => Ok(Platform::Unknown),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Severity
// ─────────────────────────────────────────────────────────────────────────────

/// Triage ranking of an issue.
///
/// Declaration order is the sort order: `Critical` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Critical and high issues make a scan fail
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// IssueType
// ─────────────────────────────────────────────────────────────────────────────

/// Closed set of problem categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    MissingRegistration,
    MissingDeclaration,
    VersionMismatch,
    PlatformConfigMissing,
    InitializationFailure,
    MethodChannelNotFound,
    DependenciesMissing,
    BuildConfigIssue,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::MissingRegistration => "missing-registration",
            IssueType::MissingDeclaration => "missing-declaration",
            IssueType::VersionMismatch => "version-mismatch",
            IssueType::PlatformConfigMissing => "platform-config-missing",
            IssueType::InitializationFailure => "initialization-failure",
            IssueType::MethodChannelNotFound => "method-channel-not-found",
            IssueType::DependenciesMissing => "dependencies-missing",
            IssueType::BuildConfigIssue => "build-config-issue",
        }
    }

    /// Human-readable label for reports
    pub fn label(&self) -> &'static str {
        match self {
            IssueType::MissingRegistration => "Missing registration",
            IssueType::MissingDeclaration => "Missing declaration",
            IssueType::VersionMismatch => "Version mismatch",
            IssueType::PlatformConfigMissing => "Platform configuration missing",
            IssueType::InitializationFailure => "Initialization failure",
            IssueType::MethodChannelNotFound => "Method channel not found",
            IssueType::DependenciesMissing => "Dependencies missing",
            IssueType::BuildConfigIssue => "Build configuration issue",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        let mut severities = vec![
            Severity::Low,
            Severity::Critical,
            Severity::Medium,
            Severity::High,
        ];
        severities.sort();
        assert_eq!(severities, Severity::ALL.to_vec());
    }

    #[test]
    fn test_blocking_severities() {
        assert!(Severity::Critical.is_blocking());
        assert!(Severity::High.is_blocking());
        assert!(!Severity::Medium.is_blocking());
        assert!(!Severity::Low.is_blocking());
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("Android".parse::<Platform>(), Ok(Platform::Android));
        assert_eq!(" macos ".parse::<Platform>(), Ok(Platform::Macos));
        assert!("fuchsia".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_serde_is_lowercase() {
        let json = serde_json::to_string(&Platform::Ios).unwrap();
        assert_eq!(json, "\"ios\"");
    }

    #[test]
    fn test_issue_type_serde_is_kebab_case() {
        let json = serde_json::to_string(&IssueType::MethodChannelNotFound).unwrap();
        assert_eq!(json, "\"method-channel-not-found\"");
        let parsed: IssueType = serde_json::from_str("\"build-config-issue\"").unwrap();
        assert_eq!(parsed, IssueType::BuildConfigIssue);
    }

    #[test]
    fn test_sentinels_are_not_targets() {
        assert!(Platform::TARGETS.iter().all(|p| p.is_target()));
        assert!(!Platform::All.is_target());
        assert!(Platform::Unknown.log_markers().is_empty());
    }
}
