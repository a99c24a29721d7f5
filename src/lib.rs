pub mod config;
pub mod error;
pub mod process;
pub mod stages;
pub mod util;

pub use config::Config;
pub use error::{BootstrapError, CommandFailure, Result};
pub use process::{CommandRunner, ExitStatusInfo, Invocation, SystemRunner};
pub use stages::{ArchiveSummary, Bootstrapper, RunReport, Stage};
