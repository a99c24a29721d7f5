use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bootstrap::config::EXAMPLE_CONFIG;
use bootstrap::util::{resolve_home, si_bytes};
use bootstrap::{Bootstrapper, Config, Stage, SystemRunner};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Install a tool, register its path, run its setup, and archive a manifest.
#[derive(Debug, Parser)]
#[command(name = "bootstrap", version, about)]
struct Cli {
    /// Home directory to work in (defaults to the invoking user's)
    #[arg(long, value_name = "DIR")]
    home: Option<PathBuf>,

    /// Config file (defaults to ~/.config/bootstrap/config.toml if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run only this stage: install, register-path, setup, archive
    #[arg(long, value_name = "STAGE")]
    only: Option<Stage>,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Print an annotated example config and exit
    #[arg(long)]
    example_config: bool,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false) // Disable ANSI colors in log file
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.example_config {
        print!("{EXAMPLE_CONFIG}");
        return ExitCode::SUCCESS;
    }

    if let Err(e) = init_logging(cli.log_file.as_deref()) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    let loaded =
        resolve_home(cli.home).and_then(|home| Config::load(home, cli.config.as_deref()));
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration failed");
            eprintln!("error: {e}");
            return exit_code(e.exit_code());
        }
    };

    let stages: Vec<Stage> = match cli.only {
        Some(stage) => vec![stage],
        None => Stage::ALL.to_vec(),
    };

    let bootstrapper = Bootstrapper::new(config, SystemRunner::new());
    match bootstrapper.run_stages(&stages) {
        Ok(report) => {
            if let Some(summary) = report.archive {
                println!(
                    "{}: {} members, {}",
                    bootstrapper.config().archive.output.display(),
                    summary.members,
                    si_bytes(summary.bytes)
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let stage = e.stage().map_or("bootstrap", |s| s.name());
            tracing::error!(stage, error = %e, "Stage failed");
            eprintln!("error: {stage} failed: {e}");
            exit_code(e.exit_code())
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
