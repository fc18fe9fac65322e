use super::version::{labelled_line, replace_label, strip_build_metadata};
use super::{clear_cache, pip_install, query_version, TypeChecker};
use crate::config::ToolEnvironment;
use crate::errors::CheckerResult;
use crate::harness::process::run_captured;
use crate::harness::workdir::write_pyre_configuration;
use crate::models::DiagnosticReport;
use crate::normalize::prefixed_lines;

const CACHE_DIR: &str = ".pyre";
const VERSION_LABEL: &str = "Client version:";

#[derive(Debug, Default, Clone, Copy)]
pub struct PyreChecker;

impl TypeChecker for PyreChecker {
    fn name(&self) -> &'static str {
        "pyre"
    }

    fn try_install(&self, env: &ToolEnvironment) -> CheckerResult<()> {
        clear_cache(env, self.name(), CACHE_DIR);
        pip_install(env, "pyre-check")?;
        write_pyre_configuration(&env.work_dir)
    }

    fn get_version(&self, env: &ToolEnvironment) -> String {
        let spec = env.pyre.spec(["--version"], &env.work_dir);
        let line = labelled_line(&query_version(&spec, env), VERSION_LABEL);
        strip_build_metadata(&replace_label(&line, VERSION_LABEL, self.name()))
    }

    fn run_tests(&self, env: &ToolEnvironment, test_files: &[String]) -> CheckerResult<DiagnosticReport> {
        tracing::info!(checker = self.name(), files = test_files.len(), "running checker over corpus");
        let spec = env.pyre.spec(["check"], &env.work_dir);
        let output = run_captured(&spec, env.run_timeout)?;
        Ok(prefixed_lines::collect(&output.stdout))
    }
}
