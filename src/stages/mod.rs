//! Bootstrap stages and the fail-fast driver
//!
//! A run walks [`Stage::ALL`] in order. The first failing stage ends the run;
//! nothing that already happened is undone.

pub mod archive;
pub mod install;
pub mod register;
pub mod setup;

pub use archive::{create_archive, read_manifest, ArchiveSummary};
pub use install::install_dependency;
pub use register::register_path;
pub use setup::setup_tool;

use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::error::Result;
use crate::process::CommandRunner;

/// One step of a bootstrap run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    InstallDependency,
    RegisterPath,
    SetupTool,
    CreateArchive,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 4] = [
        Stage::InstallDependency,
        Stage::RegisterPath,
        Stage::SetupTool,
        Stage::CreateArchive,
    ];

    /// Name used on the command line and in logs
    pub fn name(&self) -> &'static str {
        match self {
            Stage::InstallDependency => "install",
            Stage::RegisterPath => "register-path",
            Stage::SetupTool => "setup",
            Stage::CreateArchive => "archive",
        }
    }

    /// Exit code the binary reports when this stage fails.
    ///
    /// A manifest problem in the archive stage reports 5 instead; see
    /// [`BootstrapError::exit_code`](crate::BootstrapError::exit_code).
    pub fn exit_code(&self) -> i32 {
        match self {
            Stage::InstallDependency => 2,
            Stage::RegisterPath => 3,
            Stage::SetupTool => 4,
            Stage::CreateArchive => 6,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Stage::InstallDependency => "install dependency",
            Stage::RegisterPath => "register install directory",
            Stage::SetupTool => "run tool setup",
            Stage::CreateArchive => "create archive",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Stage::ALL.iter().map(Stage::name).collect();
                format!("unknown stage `{s}` (expected one of: {})", names.join(", "))
            })
    }
}

/// What a successful run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub completed: Vec<Stage>,
    pub archive: Option<ArchiveSummary>,
}

/// Drives the stages against a configuration
pub struct Bootstrapper<R> {
    config: Config,
    runner: R,
}

impl<R: CommandRunner> Bootstrapper<R> {
    pub fn new(config: Config, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every stage in order, stopping at the first failure
    pub fn run(&self) -> Result<RunReport> {
        self.run_stages(&Stage::ALL)
    }

    /// Run the given stages in order, stopping at the first failure
    pub fn run_stages(&self, stages: &[Stage]) -> Result<RunReport> {
        let mut report = RunReport::default();

        for &stage in stages {
            let span = tracing::info_span!("stage", stage = stage.name());
            let _guard = span.enter();

            tracing::info!("Starting: {}", stage.description());
            self.run_stage(stage, &mut report)?;
            tracing::info!("Finished: {}", stage.description());

            report.completed.push(stage);
        }

        Ok(report)
    }

    fn run_stage(&self, stage: Stage, report: &mut RunReport) -> Result<()> {
        match stage {
            Stage::InstallDependency => install_dependency(&self.config, &self.runner),
            Stage::RegisterPath => register_path(&self.config.path),
            Stage::SetupTool => setup_tool(&self.config, &self.runner),
            Stage::CreateArchive => {
                report.archive = Some(create_archive(&self.config.archive)?);
                Ok(())
            }
        }
    }
}
