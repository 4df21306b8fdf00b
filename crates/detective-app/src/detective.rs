//! Scan orchestrator
//!
//! One [`Detective::diagnose`] call walks the phases
//! `NotStarted → Validating → Analyzing → Aggregating → Succeeded | Failed`.
//! Validity errors and the scan deadline end in `Failed`; a failing
//! sub-pipeline only replaces its own output with a single issue.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::Value;

use detective_core::prelude::*;
use detective_core::{
    deduplicate, get_project_name, get_project_type, scan_failure_issue, validate_flutter_project,
    DiagnosticResult, Issue, IssueType, Platform, ScanMetadata, Severity,
};
use detective_scan::analyzer::ANALYSIS_SENTINEL;
use detective_scan::{
    attach_guides, DetectorOptions, FlutterCliProbe, IssueSubscription, LogDetector,
    ManifestAnalyzer, RuntimeMonitor, ToolchainProbe,
};

use crate::config::DetectiveConfig;

/// Sentinel plugin name for a runtime detection that could not run
pub const RUNTIME_SENTINEL: &str = "runtime_detection";

/// Where a scan is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPhase {
    #[default]
    NotStarted,
    Validating,
    Analyzing,
    Aggregating,
    Succeeded,
    Failed,
}

impl ScanPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanPhase::NotStarted => "not-started",
            ScanPhase::Validating => "validating",
            ScanPhase::Analyzing => "analyzing",
            ScanPhase::Aggregating => "aggregating",
            ScanPhase::Succeeded => "succeeded",
            ScanPhase::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanPhase::Succeeded | ScanPhase::Failed)
    }
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
struct PhaseTracker {
    phase: ScanPhase,
}

impl PhaseTracker {
    fn advance(&mut self, next: ScanPhase) {
        info!("Scan phase: {} -> {}", self.phase, next);
        self.phase = next;
    }
}

/// What a successful scan produces before metadata is attached
struct ScanOutput {
    issues: Vec<Issue>,
    scanned_plugins: Vec<String>,
}

/// Runs scans for one configuration
#[derive(Debug)]
pub struct Detective<P = FlutterCliProbe> {
    config: Arc<DetectiveConfig>,
    probe: P,
    monitor: Arc<RuntimeMonitor>,
}

impl Detective {
    /// Uses the installed `flutter` tool for version metadata
    pub fn new(config: DetectiveConfig) -> Self {
        Self::with_probe(config, FlutterCliProbe::new())
    }
}

impl<P: ToolchainProbe> Detective<P> {
    pub fn with_probe(config: DetectiveConfig, probe: P) -> Self {
        let monitor = Arc::new(RuntimeMonitor::new(config.exclude_plugins.clone()));
        Self {
            config: Arc::new(config),
            probe,
            monitor,
        }
    }

    pub fn config(&self) -> &DetectiveConfig {
        &self.config
    }

    /// Shared monitor, for producers feeding live events
    pub fn monitor(&self) -> Arc<RuntimeMonitor> {
        Arc::clone(&self.monitor)
    }

    /// Subscribe to live issues; runs until cancelled or the monitor closes
    pub fn monitor_runtime(&self) -> IssueSubscription {
        self.monitor.subscribe()
    }

    /// Like [`monitor_runtime`](Self::monitor_runtime), but the subscription
    /// also ends after `duration`. Needs a tokio runtime.
    pub fn monitor_runtime_for(&self, duration: Duration) -> IssueSubscription {
        self.monitor.subscribe_for(duration)
    }

    /// Scan a project. Never fails: problems with the scan itself come back
    /// as a [`DiagnosticResult`] with status `failed`.
    pub async fn diagnose(
        &self,
        project_path: &Path,
        include_resolutions: bool,
    ) -> DiagnosticResult {
        let started = Instant::now();
        let timestamp = Utc::now();
        let project = resolve_project_path(project_path);
        let mut phase = PhaseTracker::default();

        info!("Diagnosing {:?}", project);

        let (outcome, versions) = tokio::join!(
            self.run_scan(&project, include_resolutions, &mut phase),
            self.probe.versions()
        );

        let mut meta = ScanMetadata::new(&project);
        meta.scan_timestamp = timestamp;
        meta.flutter_version = versions.flutter_version;
        meta.dart_version = versions.dart_version;
        meta.additional_metadata = self.metadata(&project);
        meta.scan_duration = started.elapsed();

        match outcome {
            Ok(output) => {
                phase.advance(ScanPhase::Succeeded);
                let result =
                    DiagnosticResult::completed(output.issues, output.scanned_plugins, meta);
                info!(
                    "Scan finished: {} ({} issue(s) in {:?})",
                    result.status(),
                    result.issues.len(),
                    result.scan_duration
                );
                result
            }
            Err(e) => {
                phase.advance(ScanPhase::Failed);
                warn!("Scan of {:?} failed: {}", project, e);
                DiagnosticResult::failed(scan_failure_issue(e.to_string()), meta)
            }
        }
    }

    async fn run_scan(
        &self,
        project: &Path,
        include_resolutions: bool,
        phase: &mut PhaseTracker,
    ) -> Result<ScanOutput> {
        phase.advance(ScanPhase::Validating);
        validate_flutter_project(project)?;

        phase.advance(ScanPhase::Analyzing);
        let platforms = self.config.target_platforms();
        let scanned_plugins =
            ManifestAnalyzer::new().plugin_scope(project, &self.config.exclude_plugins);
        let (static_issues, runtime_issues) =
            with_deadline(self.config.scan_deadline(), self.analyze(project, platforms)).await?;

        phase.advance(ScanPhase::Aggregating);
        let mut issues = deduplicate(static_issues.into_iter().chain(runtime_issues));
        if include_resolutions {
            attach_guides(&mut issues);
        }

        Ok(ScanOutput {
            issues,
            scanned_plugins,
        })
    }

    /// Both sub-pipelines on the blocking pool, concurrently
    async fn analyze(&self, project: &Path, platforms: Vec<Platform>) -> (Vec<Issue>, Vec<Issue>) {
        let static_task = self.config.enable_static_analysis.then(|| {
            let project = project.to_path_buf();
            let platforms = platforms.clone();
            let config = Arc::clone(&self.config);
            tokio::task::spawn_blocking(move || {
                ManifestAnalyzer::new().analyze(&project, &platforms, &config.exclude_plugins)
            })
        });

        let runtime_task = self.config.enable_runtime_detection.then(|| {
            let project = project.to_path_buf();
            let platforms = platforms.clone();
            let config = Arc::clone(&self.config);
            let detector = LogDetector::new(DetectorOptions {
                extra_log_directories: config.log_directories.clone(),
                performance_mode: config.performance_mode,
            });
            tokio::task::spawn_blocking(move || {
                detector.detect(&project, &platforms, &config.exclude_plugins)
            })
        });

        let static_issues = async {
            let Some(task) = static_task else {
                debug!("Static analysis disabled");
                return Vec::new();
            };
            match task.await {
                Ok(issues) => issues,
                Err(e) => {
                    warn!("Static analysis task aborted: {}", e);
                    vec![substitute_issue(
                        ANALYSIS_SENTINEL,
                        Severity::High,
                        format!("Static analysis could not complete: {}", e),
                        &platforms,
                    )]
                }
            }
        };

        let runtime_issues = async {
            let Some(task) = runtime_task else {
                debug!("Runtime detection disabled");
                return Vec::new();
            };
            let failure = match task.await {
                Ok(Ok(issues)) => return issues,
                Ok(Err(e)) => e.to_string(),
                Err(e) => format!("Runtime detection task aborted: {}", e),
            };
            warn!("{}", failure);
            vec![substitute_issue(
                RUNTIME_SENTINEL,
                Severity::Medium,
                failure,
                &platforms,
            )]
        };

        tokio::join!(static_issues, runtime_issues)
    }

    fn metadata(&self, project: &Path) -> BTreeMap<String, Value> {
        let mut metadata = BTreeMap::new();

        if let Some(name) = get_project_name(project) {
            metadata.insert("project_name".to_string(), Value::from(name));
        }
        if let Some(project_type) = get_project_type(project) {
            metadata.insert("project_type".to_string(), Value::from(project_type.as_str()));
        }
        let platforms: Vec<&str> = self
            .config
            .target_platforms()
            .iter()
            .map(|p| p.as_str())
            .collect();
        metadata.insert("platforms".to_string(), Value::from(platforms));
        metadata.insert(
            "static_analysis".to_string(),
            Value::from(self.config.enable_static_analysis),
        );
        metadata.insert(
            "runtime_detection".to_string(),
            Value::from(self.config.enable_runtime_detection),
        );
        metadata.insert(
            "performance_mode".to_string(),
            Value::from(self.config.performance_mode),
        );
        metadata
    }
}

/// Run `work` under an optional deadline
async fn with_deadline<T>(deadline: Option<Duration>, work: impl Future<Output = T>) -> Result<T> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, work)
            .await
            .map_err(|_| Error::ScanTimeout { limit }),
        None => Ok(work.await),
    }
}

fn substitute_issue(
    sentinel: &str,
    severity: Severity,
    reason: String,
    platforms: &[Platform],
) -> Issue {
    Issue::new(sentinel, IssueType::InitializationFailure, severity, reason)
        .with_platforms(platforms.iter().copied())
        .detected_now()
}

/// Canonical path without the `\\?\` prefix on Windows; as given if that fails
fn resolve_project_path(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
