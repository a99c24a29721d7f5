//! Path utilities anchored at the invoking user's home directory

use std::path::{Path, PathBuf};

use crate::error::{BootstrapError, Result};

/// Resolve the home directory, preferring an explicit override.
pub fn resolve_home(custom_path: Option<PathBuf>) -> Result<PathBuf> {
    match custom_path {
        Some(path) => Ok(path),
        None => dirs::home_dir().ok_or(BootstrapError::HomeDirUnavailable),
    }
}

/// Get the default config file path (~/.config/bootstrap/config.toml)
pub fn default_config_path(home: &Path) -> PathBuf {
    home.join(".config").join("bootstrap").join("config.toml")
}

/// Anchor a possibly-relative path at `base`.
///
/// Absolute paths are returned unchanged.
pub fn anchor(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
