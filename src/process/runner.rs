use std::env;
use std::io;
use std::process::{Command, Stdio};

use super::{ExitStatusInfo, Invocation};

/// Runs external programs to completion.
///
/// An `Err` means the program could not be started at all; a program that
/// started and failed is reported through the returned status.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ExitStatusInfo>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, invocation: &Invocation) -> io::Result<ExitStatusInfo> {
        (**self).run(invocation)
    }
}

/// Spawns real child processes with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ExitStatusInfo> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if !invocation.path_prefix.is_empty() {
            let inherited = env::var_os("PATH").unwrap_or_default();
            let dirs = invocation
                .path_prefix
                .iter()
                .cloned()
                .chain(env::split_paths(&inherited));
            let joined = env::join_paths(dirs)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            command.env("PATH", joined);
        }

        tracing::debug!(command = %invocation.command_line(), "Spawning");
        let status = command.status()?;
        Ok(status.into())
    }
}
