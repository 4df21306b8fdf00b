//! Error types for the diagnostic pipeline

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types organized by pipeline stage
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ─────────────────────────────────────────────────────────────
    // Project Validity Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Project directory does not exist: {path}")]
    NoProject { path: PathBuf },

    #[error("pubspec.yaml not found in: {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("Not a Flutter project (no flutter SDK dependency): {path}")]
    NotFlutterProject { path: PathBuf },

    #[error("Invalid pubspec.yaml: {message}")]
    Manifest { message: String },

    // ─────────────────────────────────────────────────────────────
    // Sub-pipeline Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Static analysis failed: {message}")]
    Analysis { message: String },

    #[error("Runtime detection failed: {message}")]
    Detection { message: String },

    #[error("Scan exceeded maximum duration of {limit:?}")]
    ScanTimeout { limit: Duration },

    // ─────────────────────────────────────────────────────────────
    // Configuration / Process Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Toolchain process error: {message}")]
    Process { message: String },

    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn no_project(path: impl Into<PathBuf>) -> Self {
        Self::NoProject { path: path.into() }
    }

    pub fn manifest_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ManifestNotFound { path: path.into() }
    }

    pub fn not_flutter_project(path: impl Into<PathBuf>) -> Self {
        Self::NotFlutterProject { path: path.into() }
    }

    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
        }
    }

    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis {
            message: message.into(),
        }
    }

    pub fn detection(message: impl Into<String>) -> Self {
        Self::Detection {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    /// Check if this error terminates the scan (project validity failure)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::NoProject { .. }
                | Error::ManifestNotFound { .. }
                | Error::NotFlutterProject { .. }
                | Error::ScanTimeout { .. }
        )
    }

    /// Check if this error can be folded into a substitute issue
    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
