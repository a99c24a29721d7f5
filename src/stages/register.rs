//! Stage 2: append the install directory to this installer's path fragment
//!
//! The fragment is a small file owned by this installer alone; a shell init
//! hook elsewhere concatenates fragments into `PATH`. Appends are not
//! deduplicated, so every run adds one more identical line.

use std::fs::{self, OpenOptions};
use std::io::Write;

use crate::config::PathConfig;
use crate::error::{BootstrapError, Result};

pub fn register_path(config: &PathConfig) -> Result<()> {
    let fragment = &config.fragment;
    let write_failed = |source| BootstrapError::PathRegistrationWriteFailed {
        path: fragment.clone(),
        source,
    };

    if let Some(parent) = fragment.parent() {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }

    let mut line = config.install_dir.as_os_str().to_os_string();
    line.push("\n");

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(fragment)
        .map_err(write_failed)?;
    file.write_all(line.as_encoded_bytes()).map_err(write_failed)?;
    file.flush().map_err(write_failed)?;

    tracing::info!(
        fragment = %fragment.display(),
        dir = %config.install_dir.display(),
        "Registered install directory"
    );
    Ok(())
}
