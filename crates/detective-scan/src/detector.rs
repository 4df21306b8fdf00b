//! Batch log detector
//!
//! Finds captured log files in the project and runs the line signatures from
//! [`crate::signatures`] over each of them.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use detective_core::prelude::*;
use detective_core::{Issue, Platform};

use crate::signatures::SignatureScanner;

/// Conventional log directories, relative to the project root
pub const DEFAULT_LOG_DIRECTORIES: &[&str] = &["logs", "build/logs"];

/// Files read per scan in performance mode (newest first)
pub const PERFORMANCE_FILE_LIMIT: usize = 10;

const LOG_EXTENSIONS: &[&str] = &["log", "txt"];

/// `flutter_01.log` and friends written by the tool into the project root
const ROOT_LOG_PREFIX: &str = "flutter_";

#[derive(Debug, Clone, Default)]
pub struct DetectorOptions {
    /// Searched in addition to [`DEFAULT_LOG_DIRECTORIES`]; relative paths
    /// resolve against the project root
    pub extra_log_directories: Vec<PathBuf>,
    pub performance_mode: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LogDetector {
    options: DetectorOptions,
}

impl LogDetector {
    pub fn new(options: DetectorOptions) -> Self {
        Self { options }
    }

    /// Scan every log file for plugin-failure signatures.
    ///
    /// No log files is not an error. Unreadable files are skipped. Issues are
    /// dropped when their plugin is excluded or when they are attributed only to
    /// platforms outside `include_platforms`.
    pub fn detect(
        &self,
        project_path: &Path,
        include_platforms: &[Platform],
        exclude_plugins: &[String],
    ) -> Result<Vec<Issue>> {
        if !project_path.is_dir() {
            return Err(Error::no_project(project_path));
        }

        let files = self.log_files(project_path)?;
        if files.is_empty() {
            debug!("No log files under {:?}, runtime detection has nothing to scan", project_path);
            return Ok(Vec::new());
        }

        let scanner = SignatureScanner::new(!self.options.performance_mode);
        let mut issues = Vec::new();

        for file in &files {
            let bytes = match fs::read(file) {
                Ok(bytes) => bytes,
                Err(e) => {
                    debug!("Skipping unreadable log file {:?}: {}", file, e);
                    continue;
                }
            };
            let text = String::from_utf8_lossy(&bytes);
            let found = scanner.scan_text(&text);
            trace!("{:?}: {} signature match(es)", file, found.len());

            issues.extend(
                found
                    .into_iter()
                    .filter(|issue| !exclude_plugins.contains(&issue.plugin_name))
                    .filter(|issue| in_platform_scope(issue, include_platforms))
                    .map(|issue| issue.with_context("logFile", file.display().to_string())),
            );
        }

        info!(
            "Runtime detection scanned {} log file(s), {} issue(s)",
            files.len(),
            issues.len()
        );
        Ok(issues)
    }

    /// Directories searched for logs, defaults first
    pub fn log_directories(&self, project_path: &Path) -> Vec<PathBuf> {
        DEFAULT_LOG_DIRECTORIES
            .iter()
            .map(PathBuf::from)
            .chain(self.options.extra_log_directories.iter().cloned())
            .map(|dir| {
                if dir.is_absolute() {
                    dir
                } else {
                    project_path.join(dir)
                }
            })
            .collect()
    }

    /// Log files to scan, newest first
    pub fn log_files(&self, project_path: &Path) -> Result<Vec<PathBuf>> {
        let mut found: Vec<(PathBuf, SystemTime)> = Vec::new();

        for dir in self.log_directories(project_path) {
            if !dir.is_dir() {
                trace!("Log directory {:?} does not exist", dir);
                continue;
            }
            collect_files(&dir, &mut found, has_log_extension)?;
        }
        collect_files(project_path, &mut found, is_root_tool_log)?;

        found.sort_by(|(a_path, a_time), (b_path, b_time)| {
            b_time.cmp(a_time).then_with(|| a_path.cmp(b_path))
        });
        found.dedup_by(|(a, _), (b, _)| a == b);

        if self.options.performance_mode {
            found.truncate(PERFORMANCE_FILE_LIMIT);
        }

        Ok(found.into_iter().map(|(path, _)| path).collect())
    }
}

fn collect_files(
    dir: &Path,
    found: &mut Vec<(PathBuf, SystemTime)>,
    accept: fn(&Path) -> bool,
) -> Result<()> {
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if !path.is_file() || !accept(&path) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        found.push((path, modified));
    }
    Ok(())
}

fn has_log_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| LOG_EXTENSIONS.contains(&ext))
}

fn is_root_tool_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(ROOT_LOG_PREFIX) && name.ends_with(".log"))
}

/// Unattributed issues are always kept
fn in_platform_scope(issue: &Issue, include_platforms: &[Platform]) -> bool {
    include_platforms.is_empty()
        || issue
            .affected_platforms
            .iter()
            .any(|p| !p.is_target() || include_platforms.contains(p))
}
