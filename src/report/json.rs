//! JSON report: the exchange representation of a [`DiagnosticResult`]

use detective_core::{DiagnosticResult, Result};

pub fn render(result: &DiagnosticResult) -> Result<String> {
    let mut json = serde_json::to_string_pretty(result)?;
    json.push('\n');
    Ok(json)
}

/// Parse a report produced by [`render`]
pub fn parse(json: &str) -> Result<DiagnosticResult> {
    Ok(serde_json::from_str(json)?)
}
