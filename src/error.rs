//! Error taxonomy for a bootstrap run
//!
//! Every stage failure maps to exactly one variant, and every variant maps to
//! a distinct process exit code so callers can tell which stage stopped the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::process::ExitStatusInfo;
use crate::stages::Stage;

/// Why an external command did not succeed
#[derive(Debug, Error)]
pub enum CommandFailure {
    #[error("could not spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` {status}")]
    Exit {
        program: String,
        status: ExitStatusInfo,
    },
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("could not determine the home directory")]
    HomeDirUnavailable,

    #[error("invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("installing package `{package}` failed: {reason}")]
    DependencyInstallFailed {
        package: String,
        #[source]
        reason: CommandFailure,
    },

    #[error("writing path fragment {path} failed: {source}")]
    PathRegistrationWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("setup of `{tool}` failed: {reason}")]
    ToolSetupFailed {
        tool: String,
        #[source]
        reason: CommandFailure,
    },

    #[error("manifest {path}: {message}")]
    ManifestReadFailed { path: PathBuf, message: String },

    #[error("writing archive {path} failed: {source}")]
    ArchiveWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BootstrapError {
    /// The stage that raised this error, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            BootstrapError::HomeDirUnavailable | BootstrapError::Config { .. } => None,
            BootstrapError::DependencyInstallFailed { .. } => Some(Stage::InstallDependency),
            BootstrapError::PathRegistrationWriteFailed { .. } => Some(Stage::RegisterPath),
            BootstrapError::ToolSetupFailed { .. } => Some(Stage::SetupTool),
            BootstrapError::ManifestReadFailed { .. }
            | BootstrapError::ArchiveWriteFailed { .. } => Some(Stage::CreateArchive),
        }
    }

    /// Process exit code reported by the binary
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::ManifestReadFailed { .. } => 5,
            other => other.stage().map_or(1, |stage| stage.exit_code()),
        }
    }

    pub(crate) fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        BootstrapError::ManifestReadFailed {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BootstrapError>;
