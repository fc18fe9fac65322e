use crate::adapters::{find_checker, TypeChecker, TYPE_CHECKERS};
use crate::config::{HarnessConfig, ToolEnvironment};
use crate::errors::{CheckerError, CheckerResult};
use crate::harness::workdir::source_files;
use crate::models::CheckerRun;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides the configured checker selection when non-empty.
    pub checkers: Vec<String>,
    pub skip_install: bool,
    /// Runs each checker twice and records files whose output changed.
    pub verify_determinism: bool,
}

/// Drives the registered checkers over one corpus.
#[derive(Debug, Clone)]
pub struct ConformanceRunner {
    config: HarnessConfig,
}

impl ConformanceRunner {
    pub fn new(config: HarnessConfig) -> CheckerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Checkers to drive, always in registry order.
    pub fn selected(&self, options: &RunOptions) -> CheckerResult<Vec<&'static dyn TypeChecker>> {
        let wanted = if options.checkers.is_empty() {
            &self.config.checkers
        } else {
            &options.checkers
        };
        for name in wanted {
            if find_checker(name).is_none() {
                return Err(CheckerError::NotFound(format!("no checker named '{}'", name)));
            }
        }
        Ok(TYPE_CHECKERS
            .iter()
            .copied()
            .filter(|checker| wanted.iter().any(|name| name == checker.name()))
            .collect())
    }

    pub fn versions(&self, options: &RunOptions) -> CheckerResult<Vec<(String, String)>> {
        let env = self.config.environment();
        Ok(self
            .selected(options)?
            .into_iter()
            .map(|checker| (checker.name().to_string(), checker.get_version(&env)))
            .collect())
    }

    pub fn run(&self, options: &RunOptions) -> CheckerResult<Vec<CheckerRun>> {
        let env = self.config.environment();
        let test_files = source_files(&env.work_dir)?;
        tracing::info!(
            work_dir = %env.work_dir.to_string_lossy(),
            files = test_files.len(),
            "collected corpus"
        );

        let mut runs = Vec::new();
        for checker in self.selected(options)? {
            runs.push(self.run_checker(checker, &env, &test_files, options));
        }
        Ok(runs)
    }

    fn run_checker(
        &self,
        checker: &dyn TypeChecker,
        env: &ToolEnvironment,
        test_files: &[String],
        options: &RunOptions,
    ) -> CheckerRun {
        let name = checker.name();
        if !options.skip_install && !checker.install(env) {
            return CheckerRun::skipped(name, "installation failed");
        }

        let version = checker.get_version(env);
        tracing::info!(checker = name, version = %version, "starting run");

        let started = Instant::now();
        let first = checker.run_tests(env, test_files);
        let duration_ms = started.elapsed().as_millis() as u64;

        let mut run = CheckerRun {
            checker: name.to_string(),
            version,
            generated_at: Utc::now(),
            duration_ms,
            installed: true,
            nondeterministic_files: vec![],
            error: None,
            report: Default::default(),
        };

        match first {
            Ok(report) => {
                if options.verify_determinism {
                    match checker.run_tests(env, test_files) {
                        Ok(second) => run.nondeterministic_files = report.differing_files(&second),
                        Err(error) => run.error = Some(format!("repeat run failed: {}", error)),
                    }
                    if !run.nondeterministic_files.is_empty() {
                        tracing::warn!(
                            checker = name,
                            files = ?run.nondeterministic_files,
                            "output differed between consecutive runs"
                        );
                    }
                }
                run.report = report;
            }
            Err(error) => {
                tracing::error!(checker = name, error = %error, "checker run failed");
                run.error = Some(error.to_string());
            }
        }

        tracing::info!(checker = name, duration_ms, files = run.report.len(), "finished run");
        run
    }
}

/// Writes `<results_dir>/<checker>.json` for every run and returns the paths.
pub fn write_results(results_dir: &Path, runs: &[CheckerRun]) -> CheckerResult<Vec<PathBuf>> {
    std::fs::create_dir_all(results_dir)?;
    let mut written = Vec::with_capacity(runs.len());
    for run in runs {
        let path = results_dir.join(format!("{}.json", run.checker));
        let mut body = serde_json::to_vec_pretty(run)?;
        body.push(b'\n');
        std::fs::write(&path, body)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::{write_results, ConformanceRunner, RunOptions};
    use crate::config::HarnessConfig;
    use crate::errors::CheckerError;
    use crate::models::{CheckerRun, DiagnosticReport};

    fn runner(checkers: &[&str]) -> ConformanceRunner {
        ConformanceRunner::new(HarnessConfig {
            checkers: checkers.iter().map(|name| name.to_string()).collect(),
            ..HarnessConfig::default()
        })
        .expect("runner")
    }

    #[test]
    fn selection_follows_registry_order() {
        let runner = runner(&["pytype", "mypy"]);
        let names: Vec<&str> = runner
            .selected(&RunOptions::default())
            .expect("selected")
            .iter()
            .map(|checker| checker.name())
            .collect();
        assert_eq!(names, vec!["mypy", "pytype"]);
    }

    #[test]
    fn options_override_configured_selection() {
        let runner = runner(&["mypy"]);
        let options = RunOptions {
            checkers: vec!["pyre".to_string()],
            ..RunOptions::default()
        };
        let selected = runner.selected(&options).expect("selected");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name(), "pyre");

        let unknown = RunOptions {
            checkers: vec!["ty".to_string()],
            ..RunOptions::default()
        };
        assert!(matches!(runner.selected(&unknown), Err(CheckerError::NotFound(_))));
    }

    #[test]
    fn missing_corpus_propagates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let runner = ConformanceRunner::new(HarnessConfig {
            work_dir: dir.path().join("absent"),
            ..HarnessConfig::default()
        })
        .expect("runner");
        assert!(runner.run(&RunOptions::default()).is_err());
    }

    #[test]
    fn writes_one_document_per_checker() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut report = DiagnosticReport::new();
        report.insert("a.py", "a.py:1: error: x\n");
        let mut run = CheckerRun::skipped("mypy", "unused");
        run.error = None;
        run.installed = true;
        run.report = report;

        let paths = write_results(&dir.path().join("results"), &[run, CheckerRun::skipped("pyre", "installation failed")])
            .expect("write");
        assert_eq!(paths.len(), 2);

        let raw = std::fs::read_to_string(&paths[0]).expect("read");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["checker"], "mypy");
        assert_eq!(value["report"]["a.py"], "a.py:1: error: x\n");
        assert!(value.get("error").is_none());
        assert!(value["generated_at"].is_string());
        assert_eq!(value["duration_ms"], 0);
        assert!(value.get("nondeterministic_files").is_none());

        let skipped: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths[1]).expect("read")).expect("json");
        assert_eq!(skipped["installed"], false);
        assert_eq!(skipped["error"], "installation failed");
    }
}
