use super::version::{first_line, strip_build_metadata};
use super::{clear_cache, pip_install, query_version, TypeChecker};
use crate::config::ToolEnvironment;
use crate::errors::CheckerResult;
use crate::harness::process::{run_captured, CommandSpec};
use crate::models::DiagnosticReport;
use crate::normalize::prefixed_lines;

const CACHE_DIR: &str = ".mypy_cache";

#[derive(Debug, Default, Clone, Copy)]
pub struct MypyChecker;

impl MypyChecker {
    fn check_command(&self, env: &ToolEnvironment) -> CommandSpec {
        let mut args = vec!["-m".to_string(), "mypy".to_string(), ".".to_string()];
        for code in &env.mypy_disabled_error_codes {
            args.push("--disable-error-code".to_string());
            args.push(code.clone());
        }
        env.python.spec(args, &env.work_dir)
    }
}

impl TypeChecker for MypyChecker {
    fn name(&self) -> &'static str {
        "mypy"
    }

    fn try_install(&self, env: &ToolEnvironment) -> CheckerResult<()> {
        // A warm cache skews timings between checkers.
        clear_cache(env, self.name(), CACHE_DIR);
        pip_install(env, "mypy")
    }

    fn get_version(&self, env: &ToolEnvironment) -> String {
        let spec = env.python.spec(["-m", "mypy", "--version"], &env.work_dir);
        strip_build_metadata(&first_line(&query_version(&spec, env)))
    }

    fn run_tests(&self, env: &ToolEnvironment, test_files: &[String]) -> CheckerResult<DiagnosticReport> {
        tracing::info!(checker = self.name(), files = test_files.len(), "running checker over corpus");
        let output = run_captured(&self.check_command(env), env.run_timeout)?;
        Ok(prefixed_lines::collect(&output.stdout))
    }
}
