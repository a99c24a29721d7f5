//! External command execution
//!
//! Stages describe what to run as an [`Invocation`] and hand it to a
//! [`CommandRunner`]. The system runner blocks until the child exits and lets
//! the child write straight to the terminal, so its own diagnostics reach the
//! user unfiltered.

mod runner;

pub use runner::{CommandRunner, SystemRunner};

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

/// A single external program call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    /// Directories prepended to the child's `PATH`
    pub path_prefix: Vec<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            path_prefix: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn with_path_prefix(mut self, dir: impl Into<PathBuf>) -> Self {
        self.path_prefix.push(dir.into());
        self
    }

    /// Program name for error messages
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Space-joined command line for logs
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatusInfo {
    Code(i32),
    Signal(i32),
    Unknown,
}

impl ExitStatusInfo {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatusInfo::Code(0))
    }
}

impl From<ExitStatus> for ExitStatusInfo {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitStatusInfo::Code(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitStatusInfo::Signal(signal);
            }
        }

        ExitStatusInfo::Unknown
    }
}

impl fmt::Display for ExitStatusInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatusInfo::Code(code) => write!(f, "exited with status {code}"),
            ExitStatusInfo::Signal(signal) => write!(f, "was terminated by signal {signal}"),
            ExitStatusInfo::Unknown => f.write_str("exited abnormally"),
        }
    }
}
