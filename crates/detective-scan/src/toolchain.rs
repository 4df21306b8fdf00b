//! Flutter toolchain version probe
//!
//! Fills the informational version fields of a scan result. A probe never
//! fails: anything that goes wrong is reported as `"Unknown"`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

use detective_core::prelude::*;
use detective_core::UNKNOWN_VERSION;

/// Upper bound for `flutter --version`, which may trigger a first-run SDK update
const PROBE_TIMEOUT: Duration = Duration::from_secs(20);

#[cfg(windows)]
const FLUTTER_EXECUTABLE: &str = "flutter.bat";
#[cfg(not(windows))]
const FLUTTER_EXECUTABLE: &str = "flutter";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainVersions {
    pub flutter_version: String,
    pub dart_version: String,
}

impl Default for ToolchainVersions {
    fn default() -> Self {
        Self {
            flutter_version: UNKNOWN_VERSION.to_string(),
            dart_version: UNKNOWN_VERSION.to_string(),
        }
    }
}

/// Output of `flutter --version --machine`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MachineVersion {
    framework_version: Option<String>,
    dart_sdk_version: Option<String>,
}

/// Parse the JSON printed by `flutter --version --machine`
pub fn parse_machine_version(stdout: &str) -> Result<ToolchainVersions> {
    // The tool may print an upgrade banner before the JSON object
    let start = stdout
        .find('{')
        .ok_or_else(|| Error::process("no JSON object in flutter --version output"))?;
    let parsed: MachineVersion = serde_json::from_str(&stdout[start..])?;

    let or_unknown = |value: Option<String>| {
        value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
    };

    Ok(ToolchainVersions {
        flutter_version: or_unknown(parsed.framework_version),
        dart_version: or_unknown(parsed.dart_sdk_version),
    })
}

/// Source of toolchain version strings
#[trait_variant::make(ToolchainProbe: Send)]
pub trait LocalToolchainProbe {
    async fn versions(&self) -> ToolchainVersions;
}

/// Runs the installed `flutter` tool
#[derive(Debug, Clone, Default)]
pub struct FlutterCliProbe {
    executable: Option<PathBuf>,
}

impl FlutterCliProbe {
    /// Locate `flutter` via `FLUTTER_ROOT`, then `PATH`
    pub fn new() -> Self {
        Self {
            executable: locate_flutter(),
        }
    }

    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: Some(executable.into()),
        }
    }

    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    async fn run(&self) -> Result<ToolchainVersions> {
        let executable = self
            .executable
            .as_ref()
            .ok_or_else(|| Error::process("flutter executable not found"))?;

        let output = tokio::time::timeout(
            PROBE_TIMEOUT,
            Command::new(executable)
                .args(["--version", "--machine"])
                .stdin(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            Error::process(format!(
                "flutter --version timed out after {:?}",
                PROBE_TIMEOUT
            ))
        })??;

        if !output.status.success() {
            return Err(Error::process(format!(
                "flutter --version exited with {}",
                output.status
            )));
        }

        parse_machine_version(&String::from_utf8_lossy(&output.stdout))
    }
}

impl ToolchainProbe for FlutterCliProbe {
    async fn versions(&self) -> ToolchainVersions {
        match self.run().await {
            Ok(versions) => {
                debug!(
                    "Flutter {} / Dart {}",
                    versions.flutter_version, versions.dart_version
                );
                versions
            }
            Err(e) => {
                debug!("Toolchain probe failed: {}", e);
                ToolchainVersions::default()
            }
        }
    }
}

/// Fixed answers, for runs with probing disabled and for tests
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    versions: ToolchainVersions,
}

impl StaticProbe {
    pub fn new(flutter_version: impl Into<String>, dart_version: impl Into<String>) -> Self {
        Self {
            versions: ToolchainVersions {
                flutter_version: flutter_version.into(),
                dart_version: dart_version.into(),
            },
        }
    }

    /// Both versions reported as `"Unknown"`
    pub fn unknown() -> Self {
        Self::default()
    }
}

impl ToolchainProbe for StaticProbe {
    async fn versions(&self) -> ToolchainVersions {
        self.versions.clone()
    }
}

fn locate_flutter() -> Option<PathBuf> {
    if let Ok(root) = std::env::var("FLUTTER_ROOT") {
        let candidate = PathBuf::from(root).join("bin").join(FLUTTER_EXECUTABLE);
        if candidate.is_file() {
            return Some(candidate);
        }
        trace!("FLUTTER_ROOT set but {:?} is missing", candidate);
    }

    which::which("flutter")
        .inspect_err(|e| debug!("flutter not on PATH: {}", e))
        .ok()
}
