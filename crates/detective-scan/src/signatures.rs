//! Log-line signatures for plugin failures
//!
//! Three independent signatures are checked on every cleaned line. A single
//! line may trigger more than one of them.

use regex::Regex;
use std::sync::LazyLock;

use detective_core::{clean_log_line, is_stack_frame_line, Issue, IssueType, Platform, Severity};

pub const MISSING_PLUGIN_MARKER: &str = "MissingPluginException";
pub const PLATFORM_EXCEPTION_MARKER: &str = "PlatformException";
pub const NO_IMPLEMENTATION_MARKER: &str = "No implementation found for method";

/// Fallback plugin name when the generic heuristic finds nothing
pub const UNKNOWN_PLUGIN: &str = "unknown_plugin";

/// Frames collected after a `MissingPluginException`
pub const MAX_STACK_FRAMES: usize = 20;

/// Lines searched for the first frame before giving up on a trace
const STACK_LOOKAHEAD: usize = 40;

/// Words that mark a `PlatformException` as plugin-related
const PLUGIN_KEYWORDS: &[&str] = &[
    "plugin",
    "Plugin",
    "channel",
    "method",
    "implementation",
    "registrant",
];

static MISSING_IMPLEMENTATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"No implementation found for method (\S+) on channel ([\w./\-]+)")
        .expect("Invalid MISSING_IMPLEMENTATION_PATTERN")
});

/// Ordered alternatives; the first pattern that matches wins
static PLUGIN_NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\w+)Plugin",
        r"plugin\.(\w+)",
        r"(\w+)_plugin",
        r"com\.(\w+)\.(\w+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid PLUGIN_NAME_PATTERNS regex"))
    .collect()
});

/// Plugin name from a method-channel name.
///
/// `a/b` yields `a`, `a.b.c` yields `c`, anything else is used as is. An
/// empty segment (`a.b.`, `/x`) falls back to the whole channel.
pub fn plugin_from_channel(channel: &str) -> String {
    let segment = if channel.contains('/') {
        channel.split('/').next()
    } else if channel.contains('.') {
        channel.rsplit('.').next()
    } else {
        None
    };

    segment
        .filter(|s| !s.is_empty())
        .unwrap_or(channel)
        .to_string()
}

/// Generic plugin-name heuristic: first matching pattern, first non-empty group
pub fn extract_plugin_name(line: &str) -> Option<String> {
    PLUGIN_NAME_PATTERNS.iter().find_map(|pattern| {
        let captures = pattern.captures(line)?;
        captures
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str())
            .find(|group| !group.is_empty())
            .map(str::to_string)
    })
}

/// Platforms named in a line; `[Unknown]` when none are
pub fn platforms_in(line: &str) -> Vec<Platform> {
    let found: Vec<Platform> = Platform::TARGETS
        .into_iter()
        .filter(|platform| platform.log_markers().iter().any(|m| line.contains(m)))
        .collect();

    if found.is_empty() {
        vec![Platform::Unknown]
    } else {
        found
    }
}

fn is_plugin_related(line: &str) -> bool {
    PLUGIN_KEYWORDS.iter().any(|keyword| line.contains(keyword))
}

/// Frame lines following `start`, up to [`MAX_STACK_FRAMES`]
fn capture_stack(lines: &[String], start: usize) -> Option<String> {
    let mut frames: Vec<&str> = Vec::new();

    for (offset, line) in lines.iter().skip(start + 1).enumerate() {
        if is_stack_frame_line(line) {
            frames.push(line.trim());
            if frames.len() == MAX_STACK_FRAMES {
                break;
            }
        } else if !frames.is_empty() || offset >= STACK_LOOKAHEAD {
            break;
        }
    }

    (!frames.is_empty()).then(|| frames.join("\n"))
}

/// Line-signature scanner over a block of log text
#[derive(Debug, Clone, Copy)]
pub struct SignatureScanner {
    capture_stacks: bool,
}

impl Default for SignatureScanner {
    fn default() -> Self {
        Self {
            capture_stacks: true,
        }
    }
}

impl SignatureScanner {
    pub fn new(capture_stacks: bool) -> Self {
        Self { capture_stacks }
    }

    /// Scan raw log text. Lines are cleaned of colour codes and tool prefixes first.
    pub fn scan_text(&self, text: &str) -> Vec<Issue> {
        let lines: Vec<String> = text.lines().map(clean_log_line).collect();
        self.scan_lines(&lines)
    }

    /// Scan already-cleaned lines
    pub fn scan_lines(&self, lines: &[String]) -> Vec<Issue> {
        let mut issues = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            if line.contains(MISSING_PLUGIN_MARKER) {
                if let Some(issue) = self.missing_plugin(lines, index) {
                    issues.push(issue);
                }
            }

            if line.contains(PLATFORM_EXCEPTION_MARKER) && is_plugin_related(line) {
                issues.push(platform_exception(line));
            }

            if line.contains(NO_IMPLEMENTATION_MARKER) {
                issues.push(method_channel_not_found(line));
            }
        }

        issues
    }

    fn missing_plugin(&self, lines: &[String], index: usize) -> Option<Issue> {
        let line = &lines[index];
        let captures = MISSING_IMPLEMENTATION_PATTERN.captures(line)?;
        let method = captures.get(1)?.as_str();
        let channel = captures.get(2)?.as_str();

        let mut issue = channel_failure_issue(method, channel, platforms_in(line));

        if self.capture_stacks {
            if let Some(stack) = capture_stack(lines, index) {
                issue = issue.with_stack_trace(stack);
            }
        }
        Some(issue)
    }
}

/// Critical `missing-registration` for a method call that reached no native handler
pub fn channel_failure_issue(
    method: &str,
    channel: &str,
    platforms: impl IntoIterator<Item = Platform>,
) -> Issue {
    Issue::new(
        plugin_from_channel(channel),
        IssueType::MissingRegistration,
        Severity::Critical,
        format!(
            "MissingPluginException: no implementation found for method '{}' on channel '{}'",
            method, channel
        ),
    )
    .with_platforms(platforms)
    .with_context("method", method)
    .with_context("channel", channel)
    .detected_now()
}

fn platform_exception(line: &str) -> Issue {
    Issue::new(
        extract_plugin_name(line).unwrap_or_else(|| UNKNOWN_PLUGIN.to_string()),
        IssueType::InitializationFailure,
        Severity::High,
        format!("Plugin raised a PlatformException: {}", line.trim()),
    )
    .with_platforms(platforms_in(line))
    .detected_now()
}

fn method_channel_not_found(line: &str) -> Issue {
    Issue::new(
        extract_plugin_name(line).unwrap_or_else(|| UNKNOWN_PLUGIN.to_string()),
        IssueType::MethodChannelNotFound,
        Severity::High,
        format!("Method channel call has no native handler: {}", line.trim()),
    )
    .with_platforms(platforms_in(line))
    .detected_now()
}
