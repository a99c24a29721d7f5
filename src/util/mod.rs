//! Utility modules

pub mod format;
pub mod paths;
pub mod tools;

pub use format::si_bytes;
pub use paths::{default_config_path, resolve_home};
pub use tools::{resolve_tool, ToolStatus};
