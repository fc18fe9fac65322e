use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-file diagnostic text produced by one `run_tests` call.
///
/// Keys are bare file names. Values are newline-terminated diagnostic lines in
/// the order the adapter accumulated them. The map is ordered so that
/// serialized reports are byte-stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticReport {
    entries: BTreeMap<String, String>,
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `text` to the entry for `file_name`, creating it on first use.
    pub fn append(&mut self, file_name: &str, text: &str) {
        self.entries
            .entry(file_name.to_string())
            .or_default()
            .push_str(text);
    }

    /// Replaces whatever was recorded for `file_name`.
    pub fn insert(&mut self, file_name: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(file_name.into(), text.into());
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.entries.get(file_name).map(String::as_str)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.entries.contains_key(file_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(file, text)| (file.as_str(), text.as_str()))
    }

    /// File keys whose text differs between two reports, including keys
    /// present in only one of them.
    pub fn differing_files(&self, other: &DiagnosticReport) -> Vec<String> {
        let mut files: Vec<String> = self
            .entries
            .iter()
            .filter(|(file, text)| other.entries.get(*file) != Some(*text))
            .map(|(file, _)| file.clone())
            .collect();
        files.extend(
            other
                .entries
                .keys()
                .filter(|file| !self.entries.contains_key(*file))
                .cloned(),
        );
        files.sort();
        files
    }
}

/// Outcome of driving one checker through install, version and run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerRun {
    pub checker: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub installed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nondeterministic_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub report: DiagnosticReport,
}

impl CheckerRun {
    pub fn skipped(checker: &str, reason: impl Into<String>) -> Self {
        Self {
            checker: checker.to_string(),
            version: String::new(),
            generated_at: Utc::now(),
            duration_ms: 0,
            installed: false,
            nondeterministic_files: vec![],
            error: Some(reason.into()),
            report: DiagnosticReport::default(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.installed && self.error.is_none() && self.nondeterministic_files.is_empty()
    }
}
