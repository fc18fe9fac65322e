use crate::errors::CheckerResult;
use crate::models::DiagnosticReport;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PyrightOutput {
    general_diagnostics: Vec<PyrightDiagnostic>,
}

#[derive(Debug, Deserialize)]
struct PyrightDiagnostic {
    #[serde(default)]
    file: String,
    severity: String,
    message: String,
    range: PyrightRange,
    #[serde(default)]
    rule: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PyrightRange {
    start: PyrightPosition,
}

#[derive(Debug, Deserialize)]
struct PyrightPosition {
    line: u64,
    character: u64,
}

impl PyrightDiagnostic {
    fn file_name(&self) -> String {
        Path::new(&self.file)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    fn render(&self, file_name: &str) -> String {
        let rule = self
            .rule
            .as_ref()
            .map(|rule| format!(" ({})", rule))
            .unwrap_or_default();
        format!(
            "{}:{}:{} - {}: {}{}\n",
            file_name,
            self.range.start.line + 1,
            self.range.start.character + 1,
            self.severity,
            self.message,
            rule
        )
    }
}

/// Parses `pyright --outputjson` output. Diagnostics keep the order pyright
/// emitted them in. Output that is not the expected JSON document is an error.
pub fn collect(stdout: &str) -> CheckerResult<DiagnosticReport> {
    let output: PyrightOutput = serde_json::from_str(stdout)?;
    let mut report = DiagnosticReport::new();
    for diagnostic in &output.general_diagnostics {
        let file_name = diagnostic.file_name();
        report.append(&file_name, &diagnostic.render(&file_name));
    }
    Ok(report)
}
