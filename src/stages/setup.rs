//! Stage 3: run the installed tool's own setup non-interactively

use crate::config::Config;
use crate::error::{BootstrapError, CommandFailure, Result};
use crate::process::{CommandRunner, Invocation};
use crate::util::tools::{resolve_tool, ToolStatus};

/// Build the setup invocation, resolving the tool through the install
/// directory first. An unresolved tool is passed by bare name.
pub fn setup_invocation(config: &Config) -> Invocation {
    let install_dir = config.path.install_dir.clone();
    let status = resolve_tool(
        &config.setup.tool,
        std::slice::from_ref(&install_dir),
        &config.home,
    );

    let program = match status {
        ToolStatus::Available(path) => {
            tracing::debug!(tool = %config.setup.tool, path = %path.display(), "Resolved tool");
            path.into_os_string()
        }
        ToolStatus::NotFound => {
            tracing::warn!(
                tool = %config.setup.tool,
                install_dir = %install_dir.display(),
                "Tool not found in install directory or PATH"
            );
            config.setup.tool.clone().into()
        }
    };

    Invocation::new(program)
        .args(config.setup_args())
        .with_path_prefix(install_dir)
}

pub fn setup_tool(config: &Config, runner: &impl CommandRunner) -> Result<()> {
    let tool = config.setup.tool.clone();
    let invocation = setup_invocation(config);

    tracing::info!(
        tool = %tool,
        checkout = %config.setup.checkout_dir.display(),
        command = %invocation.command_line(),
        "Running setup"
    );

    let status = runner
        .run(&invocation)
        .map_err(|source| BootstrapError::ToolSetupFailed {
            tool: tool.clone(),
            reason: CommandFailure::Spawn {
                program: invocation.program_name(),
                source,
            },
        })?;

    if !status.success() {
        return Err(BootstrapError::ToolSetupFailed {
            tool,
            reason: CommandFailure::Exit {
                program: invocation.program_name(),
                status,
            },
        });
    }

    Ok(())
}
