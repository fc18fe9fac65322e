use super::version::{first_line, strip_build_metadata, with_tool_prefix};
use super::{pip_install, query_version, TypeChecker};
use crate::config::ToolEnvironment;
use crate::errors::CheckerResult;
use crate::harness::pytype_session::{AnalysisReply, AnalysisSession};
use crate::harness::workdir::source_files;
use crate::models::DiagnosticReport;
use crate::normalize::error_log::{enforce_consistent_order, ErrorLog};

#[derive(Debug, Default, Clone, Copy)]
pub struct PytypeChecker;

impl TypeChecker for PytypeChecker {
    fn name(&self) -> &'static str {
        "pytype"
    }

    fn try_install(&self, env: &ToolEnvironment) -> CheckerResult<()> {
        pip_install(env, "pytype")
    }

    fn get_version(&self, env: &ToolEnvironment) -> String {
        let spec = env.python.spec(["-m", "pytype", "--version"], &env.work_dir);
        let raw = strip_build_metadata(&first_line(&query_version(&spec, env)));
        if raw.is_empty() {
            return raw;
        }
        with_tool_prefix(&raw, self.name())
    }

    /// Analyzes every source file in the working directory, in name order,
    /// through one analysis session. `test_files` only sizes the progress
    /// log; pytype has no whole-directory mode to hand the list to.
    fn run_tests(&self, env: &ToolEnvironment, test_files: &[String]) -> CheckerResult<DiagnosticReport> {
        let files = source_files(&env.work_dir)?;
        tracing::info!(
            checker = self.name(),
            files = files.len(),
            requested = test_files.len(),
            "running checker file by file"
        );

        let mut report = DiagnosticReport::new();
        let mut session = AnalysisSession::start(env)?;

        for (index, file_name) in files.iter().enumerate() {
            tracing::info!(
                checker = self.name(),
                file = %file_name,
                progress = %format!("{}/{}", index + 1, files.len()),
                "analyzing"
            );

            match session.analyze(file_name) {
                Ok(AnalysisReply::Analyzed { errors, .. }) => {
                    let log = ErrorLog::new(errors);
                    report.insert(file_name.as_str(), enforce_consistent_order(&log));
                }
                Ok(AnalysisReply::Failed { exception, message, .. }) => {
                    tracing::warn!(checker = self.name(), file = %file_name, exception = %exception, "analysis raised");
                    report.insert(file_name.as_str(), format!("{}: {}\n", exception, message));
                }
                Err(error) => {
                    tracing::warn!(
                        checker = self.name(),
                        file = %file_name,
                        error = %error,
                        "analysis session failed; restarting for remaining files"
                    );
                    report.insert(file_name.as_str(), format!("{}\n", error));
                    session = AnalysisSession::start(env)?;
                }
            }
        }

        Ok(report)
    }
}
