use super::version::{first_line, strip_build_metadata};
use super::{pip_install, query_version, TypeChecker};
use crate::config::ToolEnvironment;
use crate::errors::CheckerResult;
use crate::harness::process::run_captured;
use crate::models::DiagnosticReport;
use crate::normalize::pyright_json;

#[derive(Debug, Default, Clone, Copy)]
pub struct PyrightChecker;

impl TypeChecker for PyrightChecker {
    fn name(&self) -> &'static str {
        "pyright"
    }

    fn try_install(&self, env: &ToolEnvironment) -> CheckerResult<()> {
        pip_install(env, "pyright")?;

        // The pip package is a thin wrapper; the first invocation downloads
        // node and the pyright release itself.
        let version = self.get_version(env);
        tracing::debug!(checker = self.name(), version = %version, "pyright runtime ready");
        Ok(())
    }

    fn get_version(&self, env: &ToolEnvironment) -> String {
        let spec = env.python.spec(["-m", "pyright", "--version"], &env.work_dir);
        strip_build_metadata(&first_line(&query_version(&spec, env)))
    }

    fn run_tests(&self, env: &ToolEnvironment, test_files: &[String]) -> CheckerResult<DiagnosticReport> {
        tracing::info!(checker = self.name(), files = test_files.len(), "running checker over corpus");
        let spec = env
            .python
            .spec(["-m", "pyright", ".", "--outputjson"], &env.work_dir);
        let output = run_captured(&spec, env.run_timeout)?;
        pyright_json::collect(&output.stdout)
    }
}
