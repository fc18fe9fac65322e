pub mod mypy;
pub mod pyre;
pub mod pyright;
pub mod pytype;
pub mod version;

use crate::config::ToolEnvironment;
use crate::errors::CheckerResult;
use crate::harness::process::{run_captured, run_checked, CommandSpec};
use crate::models::DiagnosticReport;

pub use mypy::MypyChecker;
pub use pyre::PyreChecker;
pub use pyright::PyrightChecker;
pub use pytype::PytypeChecker;

/// One external type checker. Implementations keep no state besides their
/// name; everything environmental arrives through [`ToolEnvironment`].
pub trait TypeChecker: Send + Sync {
    /// Stable lowercase identifier, used as a lookup key.
    fn name(&self) -> &'static str;

    /// Installs or upgrades the checker to its latest release.
    fn try_install(&self, env: &ToolEnvironment) -> CheckerResult<()>;

    /// [`TypeChecker::try_install`] reduced to a flag so that one checker
    /// failing to install leaves the others untouched.
    fn install(&self, env: &ToolEnvironment) -> bool {
        match self.try_install(env) {
            Ok(()) => {
                tracing::info!(checker = self.name(), "checker installed");
                true
            }
            Err(error) => {
                tracing::error!(checker = self.name(), error = %error, "unable to install checker");
                false
            }
        }
    }

    /// Single-line version string; empty when the tool cannot be queried.
    fn get_version(&self, env: &ToolEnvironment) -> String;

    /// Runs the checker over the corpus in `env.work_dir`. Diagnostics the
    /// tool reports are data; only failures of the run as a whole are errors.
    fn run_tests(&self, env: &ToolEnvironment, test_files: &[String]) -> CheckerResult<DiagnosticReport>;
}

pub static TYPE_CHECKERS: &[&dyn TypeChecker] = &[&MypyChecker, &PyrightChecker, &PyreChecker, &PytypeChecker];

pub fn find_checker(name: &str) -> Option<&'static dyn TypeChecker> {
    TYPE_CHECKERS.iter().copied().find(|checker| checker.name() == name)
}

fn pip_install(env: &ToolEnvironment, package: &str) -> CheckerResult<()> {
    let spec = env
        .python
        .spec(["-m", "pip", "install", package, "--upgrade"], &env.work_dir);
    run_checked(&spec, env.run_timeout)?;
    Ok(())
}

/// Raw, trimmed stdout of a version query. Failures degrade to an empty
/// string.
fn query_version(spec: &CommandSpec, env: &ToolEnvironment) -> String {
    match run_captured(spec, env.run_timeout) {
        Ok(output) => output.stdout.trim().to_string(),
        Err(error) => {
            tracing::warn!(command = %spec.display(), error = %error, "version query failed");
            String::new()
        }
    }
}

fn clear_cache(env: &ToolEnvironment, checker: &str, cache_dir: &str) {
    match crate::harness::workdir::clear_cache_dir(&env.work_dir, cache_dir) {
        Ok(true) => tracing::debug!(checker, cache_dir, "removed checker cache"),
        Ok(false) => {}
        Err(error) => tracing::debug!(checker, error = %error, "ignoring cache removal failure"),
    }
}
