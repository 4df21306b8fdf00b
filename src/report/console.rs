//! Terminal report

use std::fmt::Write;

use crossterm::style::{Color, Stylize};

use detective_core::{
    count_by_severity, group_by_severity, DiagnosticResult, Issue, ResolutionStep, ScanStatus,
    Severity, StepAction,
};

use super::{join_platforms, severity_title};

const RULE: &str = "────────────────────────────────────────────────────────────";

/// Styling is skipped entirely when `color` is false, so the output is safe
/// to pipe.
struct Painter {
    color: bool,
}

impl Painter {
    fn paint(&self, text: &str, color: Color, bold: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        let styled = text.with(color);
        if bold {
            styled.bold().to_string()
        } else {
            styled.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dim().to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

fn status_color(status: ScanStatus) -> Color {
    match status {
        ScanStatus::Healthy => Color::Green,
        ScanStatus::Warning => Color::Yellow,
        ScanStatus::Error | ScanStatus::Failed => Color::Red,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => Color::Red,
        Severity::High => Color::Magenta,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Blue,
    }
}

pub fn render(result: &DiagnosticResult, color: bool) -> String {
    let painter = Painter { color };
    let status = result.status();
    let mut out = String::new();

    let _ = writeln!(out, "{}", painter.bold("Flutter Plugin Detective"));
    let _ = writeln!(out, "{}", painter.dim(RULE));
    let _ = writeln!(
        out,
        "Status:   {}",
        painter.paint(&status.as_str().to_uppercase(), status_color(status), true)
    );
    let _ = writeln!(out, "Project:  {}", result.project_path.display());
    let _ = writeln!(
        out,
        "Flutter:  {}  Dart: {}",
        result.flutter_version, result.dart_version
    );
    let _ = writeln!(
        out,
        "Plugins:  {}",
        if result.scanned_plugins.is_empty() {
            "none".to_string()
        } else {
            result.scanned_plugins.join(", ")
        }
    );
    let _ = writeln!(out, "Duration: {} ms", result.scan_duration.as_millis());

    let counts = count_by_severity(&result.issues)
        .into_iter()
        .map(|(severity, count)| {
            painter.paint(
                &format!("{} {}", count, severity.as_str()),
                severity_color(severity),
                false,
            )
        })
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "Issues:   {}", counts);

    if result.issues.is_empty() {
        let _ = writeln!(out, "\n{}", painter.paint("No issues found.", Color::Green, false));
        return out;
    }

    for (severity, issues) in group_by_severity(&result.issues) {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}",
            painter.paint(
                &format!("{} ({})", severity_title(severity), issues.len()),
                severity_color(severity),
                true
            )
        );
        for issue in issues {
            write_issue(&mut out, &painter, issue);
        }
    }
    out
}

fn write_issue(out: &mut String, painter: &Painter, issue: &Issue) {
    let _ = writeln!(
        out,
        "  {} {} {}",
        painter.paint("●", severity_color(issue.severity), false),
        painter.bold(&issue.plugin_name),
        painter.dim(&format!("[{}]", issue.issue_type.label()))
    );
    let _ = writeln!(out, "    {}", issue.description);
    let _ = writeln!(
        out,
        "    {}",
        painter.dim(&format!("platforms: {}", join_platforms(&issue.affected_platforms)))
    );

    if let Some(stack) = &issue.stack_trace {
        for frame in stack.lines().take(5) {
            let _ = writeln!(out, "      {}", painter.dim(frame.trim()));
        }
    }

    if let Some(steps) = &issue.resolution_steps {
        for (index, step) in steps.iter().enumerate() {
            write_step(out, painter, index + 1, step);
        }
    }
}

fn write_step(out: &mut String, painter: &Painter, number: usize, step: &ResolutionStep) {
    let optional = if step.is_optional { " (optional)" } else { "" };
    let _ = writeln!(out, "    {}. {}{}", number, step.title, optional);

    let detail = match &step.action {
        StepAction::RunCommand { command } => Some(format!("$ {}", command)),
        StepAction::CreateFile { file_path, .. } => Some(format!("create {}", file_path)),
        StepAction::ModifyFile { file_path, .. } => Some(format!("edit {}", file_path)),
        StepAction::DeleteFile { file_path } => Some(format!("delete {}", file_path)),
        StepAction::OpenUrl { url } => Some(url.clone()),
        StepAction::ShowInfo => None,
    };
    match detail {
        Some(detail) => {
            let _ = writeln!(out, "       {}", painter.paint(&detail, Color::Cyan, false));
        }
        None => {
            let _ = writeln!(out, "       {}", painter.dim(&step.description));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;

    #[test]
    fn test_plain_output_has_no_escape_codes() {
        let report = render(&fixtures::result_with_issues(), false);
        assert!(!report.contains('\x1b'));
        assert!(report.contains("Status:   ERROR"));
        assert!(report.contains("Issues:   1 critical  0 high  1 medium  0 low"));
    }

    #[test]
    fn test_steps_are_numbered() {
        let report = render(&fixtures::result_with_issues(), false);
        assert!(report.contains("    1. Clean the build\n       $ flutter clean\n"));
        assert!(report.contains("    2. Check registrant (optional)\n"));
    }

    #[test]
    fn test_critical_listed_before_medium() {
        let report = render(&fixtures::result_with_issues(), false);
        let critical = report.find("Critical (1)").unwrap();
        let medium = report.find("Medium (1)").unwrap();
        assert!(critical < medium);
    }

    #[test]
    fn test_color_output_styles_status() {
        let report = render(&fixtures::healthy_result(), true);
        assert!(report.contains('\x1b'));
        assert!(report.contains("HEALTHY"));
    }
}
