//! `scan` subcommand: diagnose once, render, write

use std::io::Write;
use std::path::PathBuf;

use crossterm::tty::IsTty;

use detective_app::{Detective, DetectiveConfig};
use detective_core::prelude::*;
use detective_core::{DiagnosticResult, ScanStatus};
use detective_scan::{StaticProbe, ToolchainProbe};

use crate::report::{self, ReportFormat};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub project_path: PathBuf,
    pub format: ReportFormat,
    /// Write the report here instead of stdout
    pub output: Option<PathBuf>,
    pub include_resolutions: bool,
    /// Ask the `flutter` tool for version metadata
    pub probe_toolchain: bool,
    pub config: DetectiveConfig,
}

/// Run a scan and emit the report. Returns the scan status for the exit code.
pub async fn run_scan(options: ScanOptions) -> Result<ScanStatus> {
    let result = if options.probe_toolchain {
        let detective = Detective::new(options.config.clone());
        diagnose(&detective, &options).await
    } else {
        let detective = Detective::with_probe(options.config.clone(), StaticProbe::unknown());
        diagnose(&detective, &options).await
    };

    let status = result.status();
    let color = options.output.is_none() && std::io::stdout().is_tty();
    let rendered = report::render(&result, options.format, color)?;

    match &options.output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!("Report written to {}", path.display());
            eprintln!("Report written to {} ({})", path.display(), status);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(status)
}

async fn diagnose<P: ToolchainProbe>(
    detective: &Detective<P>,
    options: &ScanOptions,
) -> DiagnosticResult {
    detective
        .diagnose(&options.project_path, options.include_resolutions)
        .await
}
