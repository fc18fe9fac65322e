use crate::adapters::find_checker;
use crate::errors::{CheckerError, CheckerResult};
use crate::harness::process::ToolCommand;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Harness configuration, usually read from `conformance.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct HarnessConfig {
    /// Directory holding the test corpus; every checker runs from here.
    pub work_dir: PathBuf,
    pub python: ToolCommand,
    pub pyre: ToolCommand,
    /// Checkers to drive, by name.
    pub checkers: Vec<String>,
    pub mypy_disabled_error_codes: Vec<String>,
    pub pytype_python_version: String,
    pub results_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
    /// Unset means tool processes may run for as long as they need.
    pub run_timeout_seconds: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("tests"),
            python: ToolCommand::new("python3"),
            pyre: ToolCommand::new("pyre"),
            checkers: ["mypy", "pyright", "pyre", "pytype"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            mypy_disabled_error_codes: vec!["empty-body".to_string()],
            pytype_python_version: "3.11".to_string(),
            results_dir: PathBuf::from("results"),
            log_dir: None,
            run_timeout_seconds: None,
        }
    }
}

impl HarnessConfig {
    pub fn load(path: &Path) -> CheckerResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            CheckerError::Config(format!("failed to read {}: {}", path.to_string_lossy(), error))
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> CheckerResult<Self> {
        let config: HarnessConfig = if raw.trim().is_empty() {
            HarnessConfig::default()
        } else {
            serde_yaml::from_str(raw)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CheckerResult<()> {
        for name in &self.checkers {
            if find_checker(name).is_none() {
                return Err(CheckerError::Config(format!("unknown checker '{}'", name)));
            }
        }
        if self.run_timeout_seconds == Some(0) {
            return Err(CheckerError::Config("run_timeout_seconds must be positive".to_string()));
        }
        let version_ok = {
            let mut parts = self.pytype_python_version.split('.');
            matches!(
                (parts.next(), parts.next(), parts.next()),
                (Some(major), Some(minor), None)
                    if major.parse::<u8>().is_ok() && minor.parse::<u8>().is_ok()
            )
        };
        if !version_ok {
            return Err(CheckerError::Config(format!(
                "pytype_python_version must look like 3.11, got '{}'",
                self.pytype_python_version
            )));
        }
        Ok(())
    }

    pub fn environment(&self) -> ToolEnvironment {
        ToolEnvironment {
            work_dir: self.work_dir.clone(),
            python: self.python.clone(),
            pyre: self.pyre.clone(),
            mypy_disabled_error_codes: self.mypy_disabled_error_codes.clone(),
            pytype_python_version: self.pytype_python_version.clone(),
            run_timeout: self.run_timeout_seconds.map(Duration::from_secs),
        }
    }
}

/// Everything an adapter needs from the outside world for one call.
#[derive(Debug, Clone)]
pub struct ToolEnvironment {
    pub work_dir: PathBuf,
    pub python: ToolCommand,
    pub pyre: ToolCommand,
    pub mypy_disabled_error_codes: Vec<String>,
    pub pytype_python_version: String,
    pub run_timeout: Option<Duration>,
}

impl ToolEnvironment {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        HarnessConfig {
            work_dir: work_dir.into(),
            ..HarnessConfig::default()
        }
        .environment()
    }
}

#[cfg(test)]
mod tests {
    use super::HarnessConfig;
    use crate::errors::CheckerError;
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config = HarnessConfig::from_yaml("").expect("config");
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.checkers, vec!["mypy", "pyright", "pyre", "pytype"]);
        assert!(config.environment().run_timeout.is_none());
    }

    #[test]
    fn parses_partial_yaml_over_defaults() {
        let config = HarnessConfig::from_yaml(
            "work_dir: corpus\n\
             python: [bash, fixtures/mock-python.sh]\n\
             checkers: [mypy, pytype]\n\
             run_timeout_seconds: 90\n",
        )
        .expect("config");

        assert_eq!(config.work_dir, PathBuf::from("corpus"));
        assert_eq!(config.python.program, "bash");
        assert_eq!(config.python.args, vec!["fixtures/mock-python.sh"]);
        assert_eq!(config.pyre.program, "pyre");
        assert_eq!(config.checkers, vec!["mypy", "pytype"]);
        assert_eq!(config.environment().run_timeout.map(|d| d.as_secs()), Some(90));
    }

    #[test]
    fn rejects_unknown_checker() {
        let error = HarnessConfig::from_yaml("checkers: [mypy, pyrefly]\n").expect_err("unknown checker");
        assert!(matches!(error, CheckerError::Config(message) if message.contains("pyrefly")));
    }

    #[test]
    fn rejects_empty_launcher() {
        assert!(matches!(
            HarnessConfig::from_yaml("python: []\n"),
            Err(CheckerError::Config(_))
        ));
    }

    #[test]
    fn rejects_malformed_python_version() {
        assert!(HarnessConfig::from_yaml("pytype_python_version: \"3\"\n").is_err());
        assert!(HarnessConfig::from_yaml("pytype_python_version: \"3.x\"\n").is_err());
        assert!(HarnessConfig::from_yaml("pytype_python_version: \"3.12\"\n").is_ok());
    }
}
