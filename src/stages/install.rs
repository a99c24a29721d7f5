//! Stage 1: install the package through the configured package manager

use crate::config::Config;
use crate::error::{BootstrapError, CommandFailure, Result};
use crate::process::{CommandRunner, Invocation};

/// Build the package-manager invocation: the configured command with the
/// package name appended.
pub fn install_invocation(config: &Config) -> Option<Invocation> {
    let (program, args) = config.package.manager.split_first()?;
    Some(
        Invocation::new(program)
            .args(args)
            .arg(&config.package.name),
    )
}

pub fn install_dependency(config: &Config, runner: &impl CommandRunner) -> Result<()> {
    let package = config.package.name.clone();

    let invocation = install_invocation(config).ok_or_else(|| {
        BootstrapError::DependencyInstallFailed {
            package: package.clone(),
            reason: CommandFailure::Spawn {
                program: String::new(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "no package manager configured",
                ),
            },
        }
    })?;

    tracing::info!(package = %package, command = %invocation.command_line(), "Installing");

    let status = runner
        .run(&invocation)
        .map_err(|source| BootstrapError::DependencyInstallFailed {
            package: package.clone(),
            reason: CommandFailure::Spawn {
                program: invocation.program_name(),
                source,
            },
        })?;

    if !status.success() {
        return Err(BootstrapError::DependencyInstallFailed {
            package,
            reason: CommandFailure::Exit {
                program: invocation.program_name(),
                status,
            },
        });
    }

    Ok(())
}
