//! Markdown report

use std::fmt::Write;

use detective_core::{
    count_by_severity, group_by_severity, DiagnosticResult, Issue, ResolutionStep, StepAction,
};

use super::{join_platforms, severity_title};

pub fn render(result: &DiagnosticResult) -> String {
    let mut out = String::new();

    out.push_str("# Flutter Plugin Detective Report\n\n");
    out.push_str(&header(result));
    out.push('\n');
    out.push_str(&summary_table(result));

    if result.issues.is_empty() {
        out.push_str("\nNo issues found.\n");
        return out;
    }

    for (severity, issues) in group_by_severity(&result.issues) {
        let _ = write!(out, "\n## {}\n", severity_title(severity));
        for issue in issues {
            out.push('\n');
            out.push_str(&issue_section(issue));
        }
    }
    out
}

fn header(result: &DiagnosticResult) -> String {
    let plugins = if result.scanned_plugins.is_empty() {
        "none".to_string()
    } else {
        result
            .scanned_plugins
            .iter()
            .map(|p| format!("`{}`", p))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut out = String::new();
    let _ = writeln!(out, "- **Project:** `{}`", result.project_path.display());
    let _ = writeln!(out, "- **Status:** {}", result.status());
    let _ = writeln!(
        out,
        "- **Scanned at:** {}",
        result.scan_timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "- **Duration:** {} ms", result.scan_duration.as_millis());
    let _ = writeln!(
        out,
        "- **Flutter:** {} (Dart {})",
        result.flutter_version, result.dart_version
    );
    let _ = writeln!(out, "- **Plugins:** {}", plugins);
    out
}

/// Severity count table, zero rows included
pub fn summary_table(result: &DiagnosticResult) -> String {
    let mut out = String::from("| Severity | Count |\n|----------|-------|\n");
    for (severity, count) in count_by_severity(&result.issues) {
        let _ = writeln!(out, "| {} | {} |", severity_title(severity), count);
    }
    out
}

fn issue_section(issue: &Issue) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "### `{}`: {}\n", issue.plugin_name, issue.issue_type.label());
    let _ = writeln!(out, "{}\n", issue.description);
    let _ = writeln!(out, "- **Platforms:** {}", join_platforms(&issue.affected_platforms));

    if let Some(stack) = &issue.stack_trace {
        let _ = write!(
            out,
            "\n<details><summary>Stack trace</summary>\n\n```\n{}\n```\n\n</details>\n",
            stack
        );
    }

    if let Some(steps) = issue.resolution_steps.as_ref().filter(|s| !s.is_empty()) {
        out.push_str("\n**Resolution**\n\n");
        for (index, step) in steps.iter().enumerate() {
            out.push_str(&step_item(index + 1, step));
        }
    }
    out
}

fn step_item(number: usize, step: &ResolutionStep) -> String {
    let mut out = String::new();
    let optional = if step.is_optional { " _(optional)_" } else { "" };
    let _ = writeln!(out, "{}. **{}**{}: {}", number, step.title, optional, step.description);

    match &step.action {
        StepAction::RunCommand { command } => {
            let _ = writeln!(out, "   ```sh\n   {}\n   ```", command);
        }
        StepAction::CreateFile { file_path, file_content } => {
            let _ = writeln!(
                out,
                "   Create `{}`:\n   ```\n{}\n   ```",
                file_path,
                indent(file_content)
            );
        }
        StepAction::ModifyFile { file_path, file_content } => {
            let _ = writeln!(out, "   Edit `{}`", file_path);
            if let Some(content) = file_content {
                let _ = writeln!(out, "   ```\n{}\n   ```", indent(content));
            }
        }
        StepAction::DeleteFile { file_path } => {
            let _ = writeln!(out, "   Delete `{}`", file_path);
        }
        StepAction::OpenUrl { url } => {
            let _ = writeln!(out, "   <{}>", url);
        }
        StepAction::ShowInfo => {}
    }
    out
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("   {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
