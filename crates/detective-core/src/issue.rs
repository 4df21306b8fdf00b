//! Issue and resolution-step records
//!
//! An [`Issue`] is one detected problem. It is created by the analyzer or the
//! detector during a single scan and is immutable afterwards, except for the
//! lazily attached resolution steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::types::{IssueType, Platform, Severity};

// ─────────────────────────────────────────────────────────────────────────────
// Issue
// ─────────────────────────────────────────────────────────────────────────────

/// A single finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Plugin name, or a sentinel such as `android_registrant` for
    /// project-structure problems
    pub plugin_name: String,

    pub issue_type: IssueType,

    pub severity: Severity,

    /// Self-contained explanation, printed verbatim in reports
    pub description: String,

    /// Ordered, duplicate-free platform tags
    pub affected_platforms: Vec<Platform>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_at: Option<DateTime<Utc>>,

    /// Raw stack trace text (detector findings only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,

    /// Free-form diagnostic metadata, carried for display only
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_context: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_steps: Option<Vec<ResolutionStep>>,
}

/// Deduplication identity of an issue
pub type DedupKey = (String, IssueType, String);

impl Issue {
    pub fn new(
        plugin_name: impl Into<String>,
        issue_type: IssueType,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            issue_type,
            severity,
            description: description.into(),
            affected_platforms: Vec::new(),
            detected_at: None,
            stack_trace: None,
            additional_context: BTreeMap::new(),
            resolution_steps: None,
        }
    }

    /// Add a platform tag, keeping insertion order and dropping repeats
    pub fn with_platform(mut self, platform: Platform) -> Self {
        if !self.affected_platforms.contains(&platform) {
            self.affected_platforms.push(platform);
        }
        self
    }

    pub fn with_platforms(self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        platforms
            .into_iter()
            .fold(self, |issue, platform| issue.with_platform(platform))
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_context.insert(key.into(), value.into());
        self
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    pub fn detected_at(mut self, at: DateTime<Utc>) -> Self {
        self.detected_at = Some(at);
        self
    }

    pub fn detected_now(self) -> Self {
        self.detected_at(Utc::now())
    }

    /// Attach remediation steps (the only mutation after construction)
    pub fn attach_resolution(&mut self, steps: Vec<ResolutionStep>) {
        self.resolution_steps = Some(steps);
    }

    /// `(plugin_name, issue_type, description)`; severity and platforms are
    /// deliberately not part of the key
    pub fn dedup_key(&self) -> DedupKey {
        (
            self.plugin_name.clone(),
            self.issue_type,
            self.description.clone(),
        )
    }

    pub fn affects(&self, platform: Platform) -> bool {
        self.affected_platforms.contains(&platform)
    }
}

/// Drop later duplicates, keeping the first occurrence in its original position
pub fn deduplicate(issues: impl IntoIterator<Item = Issue>) -> Vec<Issue> {
    let mut seen: HashSet<DedupKey> = HashSet::new();
    issues
        .into_iter()
        .filter(|issue| seen.insert(issue.dedup_key()))
        .collect()
}

/// Group issues by severity, most severe first
pub fn group_by_severity(issues: &[Issue]) -> BTreeMap<Severity, Vec<&Issue>> {
    let mut groups: BTreeMap<Severity, Vec<&Issue>> = BTreeMap::new();
    for issue in issues {
        groups.entry(issue.severity).or_default().push(issue);
    }
    groups
}

/// Group issues by plugin name, in alphabetical order
pub fn group_by_plugin(issues: &[Issue]) -> BTreeMap<&str, Vec<&Issue>> {
    let mut groups: BTreeMap<&str, Vec<&Issue>> = BTreeMap::new();
    for issue in issues {
        groups.entry(issue.plugin_name.as_str()).or_default().push(issue);
    }
    groups
}

/// Number of issues at each severity (zero counts included)
pub fn count_by_severity(issues: &[Issue]) -> BTreeMap<Severity, usize> {
    let mut counts: BTreeMap<Severity, usize> =
        Severity::ALL.iter().map(|severity| (*severity, 0)).collect();
    for issue in issues {
        *counts.entry(issue.severity).or_default() += 1;
    }
    counts
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution steps
// ─────────────────────────────────────────────────────────────────────────────

/// What a resolution step asks the user to do, with the data that action needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum StepAction {
    RunCommand {
        command: String,
    },
    CreateFile {
        #[serde(rename = "filePath")]
        file_path: String,
        #[serde(rename = "fileContent")]
        file_content: String,
    },
    ModifyFile {
        #[serde(rename = "filePath")]
        file_path: String,
        #[serde(
            rename = "fileContent",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        file_content: Option<String>,
    },
    DeleteFile {
        #[serde(rename = "filePath")]
        file_path: String,
    },
    ShowInfo,
    OpenUrl {
        url: String,
    },
}

impl StepAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepAction::RunCommand { .. } => "run-command",
            StepAction::CreateFile { .. } => "create-file",
            StepAction::ModifyFile { .. } => "modify-file",
            StepAction::DeleteFile { .. } => "delete-file",
            StepAction::ShowInfo => "show-info",
            StepAction::OpenUrl { .. } => "open-url",
        }
    }
}

/// One remediation action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionStep {
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub action: StepAction,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

impl ResolutionStep {
    fn new(title: impl Into<String>, description: impl Into<String>, action: StepAction) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            action,
            is_optional: false,
            platform: None,
        }
    }

    pub fn run_command(
        title: impl Into<String>,
        description: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self::new(
            title,
            description,
            StepAction::RunCommand {
                command: command.into(),
            },
        )
    }

    pub fn create_file(
        title: impl Into<String>,
        description: impl Into<String>,
        file_path: impl Into<String>,
        file_content: impl Into<String>,
    ) -> Self {
        Self::new(
            title,
            description,
            StepAction::CreateFile {
                file_path: file_path.into(),
                file_content: file_content.into(),
            },
        )
    }

    pub fn modify_file(
        title: impl Into<String>,
        description: impl Into<String>,
        file_path: impl Into<String>,
        file_content: Option<String>,
    ) -> Self {
        Self::new(
            title,
            description,
            StepAction::ModifyFile {
                file_path: file_path.into(),
                file_content,
            },
        )
    }

    pub fn delete_file(
        title: impl Into<String>,
        description: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self::new(
            title,
            description,
            StepAction::DeleteFile {
                file_path: file_path.into(),
            },
        )
    }

    pub fn show_info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, StepAction::ShowInfo)
    }

    pub fn open_url(
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::new(title, description, StepAction::OpenUrl { url: url.into() })
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn for_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Shell command, for `run-command` steps
    pub fn command(&self) -> Option<&str> {
        match &self.action {
            StepAction::RunCommand { command } => Some(command),
            _ => None,
        }
    }

    /// Target file, for file-editing steps
    pub fn file_path(&self) -> Option<&str> {
        match &self.action {
            StepAction::CreateFile { file_path, .. }
            | StepAction::ModifyFile { file_path, .. }
            | StepAction::DeleteFile { file_path } => Some(file_path),
            _ => None,
        }
    }

    pub fn file_content(&self) -> Option<&str> {
        match &self.action {
            StepAction::CreateFile { file_content, .. } => Some(file_content),
            StepAction::ModifyFile { file_content, .. } => file_content.as_deref(),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.action {
            StepAction::OpenUrl { url } => Some(url),
            _ => None,
        }
    }
}
