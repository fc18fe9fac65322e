use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use typecheck_conformance::{init_tracing, write_results, ConformanceRunner, HarnessConfig, RunOptions, TYPE_CHECKERS};

/// Installs, versions and runs Python type checkers against a conformance corpus
#[derive(Parser)]
#[command(name = "typecheck-conformance")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Harness configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Corpus directory, overriding the configuration
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    /// Restrict to these checkers (repeatable)
    #[arg(long = "checker", global = true)]
    checkers: Vec<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Install checkers and run them over the corpus
    Run {
        /// Use whatever checker versions are already installed
        #[arg(long)]
        skip_install: bool,

        /// Run every checker twice and flag files whose output changed
        #[arg(long)]
        verify_determinism: bool,

        /// Where to write per-checker result documents
        #[arg(long)]
        results_dir: Option<PathBuf>,
    },

    /// Print the installed version of each checker
    Versions,

    /// List the supported checkers
    List,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {:#}", error);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    if let Some(work_dir) = &cli.work_dir {
        config.work_dir = work_dir.clone();
    }

    let default_filter = if cli.verbose { "debug" } else { "info" };
    init_tracing(config.log_dir.as_deref(), default_filter)
        .map_err(|error| anyhow::anyhow!("failed to initialize logging: {}", error))?;

    let options = RunOptions {
        checkers: cli.checkers.clone(),
        ..RunOptions::default()
    };

    match cli.command {
        Commands::List => {
            for checker in TYPE_CHECKERS {
                println!("{}", checker.name());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Versions => {
            let runner = ConformanceRunner::new(config)?;
            for (name, version) in runner.versions(&options)? {
                println!("{}: {}", name, version);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run {
            skip_install,
            verify_determinism,
            results_dir,
        } => {
            if let Some(results_dir) = results_dir {
                config.results_dir = results_dir;
            }
            let results_dir = config.results_dir.clone();
            let runner = ConformanceRunner::new(config)?;
            let runs = runner.run(&RunOptions {
                skip_install,
                verify_determinism,
                ..options
            })?;

            let written = write_results(&results_dir, &runs)?;
            for (run, path) in runs.iter().zip(&written) {
                let status = if run.succeeded() { "ok" } else { "FAILED" };
                println!(
                    "{:<8} {:<7} {:>8}ms  {}  -> {}",
                    run.checker,
                    status,
                    run.duration_ms,
                    run.version,
                    path.display()
                );
            }

            if runs.iter().all(|run| run.succeeded()) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
