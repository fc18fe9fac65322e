//! Uniform install/version/run adapters over Python type checkers, producing
//! per-file diagnostic reports that are stable across repeated runs.

pub mod adapters;
pub mod config;
pub mod errors;
pub mod harness;
pub mod models;
pub mod normalize;
pub mod runner;

pub use adapters::{find_checker, TypeChecker, TYPE_CHECKERS};
pub use config::{HarnessConfig, ToolEnvironment};
pub use errors::{CheckerError, CheckerResult};
pub use models::{CheckerRun, DiagnosticReport};
pub use runner::{write_results, ConformanceRunner, RunOptions};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Installs the global subscriber. With `log_dir` the log is written as JSON
/// to a daily rolling file there; otherwise it goes to stderr.
pub fn init_tracing(log_dir: Option<&Path>, default_filter: &str) -> Result<(), String> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let Some(log_dir) = log_dir else {
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|error| error.to_string());
    };

    std::fs::create_dir_all(log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "conformance.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
