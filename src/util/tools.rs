//! Locating external executables
//!
//! A freshly installed tool usually lands in the install directory before any
//! shell has picked up the new path fragment, so lookups search that
//! directory first and then the inherited `PATH`.

use std::env;
use std::path::{Path, PathBuf};

/// Status of a tool's availability
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolStatus {
    /// Tool is available at the given path
    Available(PathBuf),
    /// Tool was not found in the search directories
    #[default]
    NotFound,
}

impl ToolStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, ToolStatus::Available(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ToolStatus::Available(p) => Some(p),
            ToolStatus::NotFound => None,
        }
    }
}

/// Find `binary` in `extra_dirs` followed by the process `PATH`.
///
/// A binary given as a path (containing a separator) is checked directly.
pub fn resolve_tool(binary: &str, extra_dirs: &[PathBuf], cwd: &Path) -> ToolStatus {
    let inherited = env::var_os("PATH").unwrap_or_default();
    let search: Vec<PathBuf> = extra_dirs
        .iter()
        .cloned()
        .chain(env::split_paths(&inherited))
        .collect();

    let search_path = match env::join_paths(&search) {
        Ok(joined) => joined,
        Err(e) => {
            tracing::warn!(error = %e, "Search directories contain a separator; using PATH only");
            inherited
        }
    };

    match which::which_in(binary, Some(search_path), cwd) {
        Ok(path) if is_valid_executable(&path) => ToolStatus::Available(path),
        _ => ToolStatus::NotFound,
    }
}

/// Check if a path points to a valid executable
fn is_valid_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        true
    }
}
