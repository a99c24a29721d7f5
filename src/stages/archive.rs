//! Stage 4: tar up exactly the paths a manifest lists
//!
//! Manifest lines are literal relative paths under the archive root. Nothing
//! is globbed. Every entry is checked before the archive is started, and the
//! archive is written to a temporary file beside the output and renamed into
//! place only once complete, so a failed run never leaves a partial archive
//! at the output path.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::ArchiveConfig;
use crate::error::{BootstrapError, Result};
use crate::util::format::si_bytes;

/// Totals for a written archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Number of tar members, including directories and links
    pub members: usize,
    /// Bytes of regular-file content
    pub bytes: u64,
}

/// Read the manifest into normalized relative paths, in file order.
///
/// Blank lines are skipped. Absolute paths and `..` components are rejected.
pub fn read_manifest(path: &Path) -> Result<Vec<PathBuf>> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BootstrapError::manifest(path, "file not found"),
        _ => BootstrapError::manifest(path, e.to_string()),
    })?;

    let mut entries = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry = normalize_entry(line).map_err(|reason| {
            BootstrapError::manifest(path, format!("line {}: `{line}` {reason}", index + 1))
        })?;
        entries.push(entry);
    }

    Ok(entries)
}

fn normalize_entry(line: &str) -> std::result::Result<PathBuf, &'static str> {
    let raw = Path::new(line);
    if raw.is_absolute() {
        return Err("is absolute; entries must be relative to the archive root");
    }

    let mut normalized = PathBuf::new();
    for component in raw.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => return Err("escapes the archive root"),
            Component::RootDir | Component::Prefix(_) => {
                return Err("is absolute; entries must be relative to the archive root")
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err("names the archive root itself");
    }
    Ok(normalized)
}

pub fn create_archive(config: &ArchiveConfig) -> Result<ArchiveSummary> {
    let entries = read_manifest(&config.manifest)?;

    // Resolve everything up front so a missing entry fails before any output exists.
    let mut sources = Vec::with_capacity(entries.len());
    for entry in &entries {
        let source = config.root.join(entry);
        let metadata = fs::symlink_metadata(&source).map_err(|e| {
            let message = match e.kind() {
                io::ErrorKind::NotFound => format!("listed path `{}` does not exist", entry.display()),
                _ => format!("listed path `{}`: {e}", entry.display()),
            };
            BootstrapError::manifest(&config.manifest, message)
        })?;
        let is_dir = metadata.is_dir();
        if is_dir && is_within(&config.output, &source) {
            return Err(BootstrapError::manifest(
                &config.manifest,
                format!(
                    "listed directory `{}` contains the output archive {}",
                    entry.display(),
                    config.output.display()
                ),
            ));
        }
        sources.push((entry, source, is_dir));
    }

    let output = &config.output;
    let write_failed = |source: io::Error| BootstrapError::ArchiveWriteFailed {
        path: output.clone(),
        source,
    };

    let out_dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&out_dir).map_err(write_failed)?;

    let temp = temp_archive(&out_dir).map_err(write_failed)?;
    {
        let mut builder = tar::Builder::new(temp.as_file());
        builder.follow_symlinks(false);

        for (entry, source, is_dir) in &sources {
            tracing::debug!(entry = %entry.display(), "Adding");
            if *is_dir {
                builder.append_dir_all(entry, source).map_err(write_failed)?;
            } else {
                builder
                    .append_path_with_name(source, entry)
                    .map_err(write_failed)?;
            }
        }

        builder.finish().map_err(write_failed)?;
    }
    temp.as_file().sync_all().map_err(write_failed)?;

    let summary = summarize(temp.path()).map_err(write_failed)?;

    temp.persist(output).map_err(|e| write_failed(e.error))?;

    tracing::info!(
        output = %output.display(),
        members = summary.members,
        size = %si_bytes(summary.bytes),
        "Archive written"
    );
    Ok(summary)
}

/// Whether `path` is `dir` or lies beneath it, lexically or after resolving
/// the existing part of `path`.
fn is_within(path: &Path, dir: &Path) -> bool {
    if path.starts_with(dir) {
        return true;
    }

    let Ok(dir) = fs::canonicalize(dir) else {
        return false;
    };

    // The output itself may not exist yet; resolve its nearest existing ancestor.
    let mut existing = path;
    let mut rest = Vec::new();
    loop {
        if let Ok(resolved) = fs::canonicalize(existing) {
            let full = rest.iter().rev().fold(resolved, |acc: PathBuf, part| acc.join(part));
            return full.starts_with(&dir);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name);
                existing = parent;
            }
            _ => return false,
        }
    }
}

/// Temporary file beside the output, created with the same mode a plain
/// `File::create` would get (0666 less the umask).
fn temp_archive(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    builder.tempfile_in(dir)
}

/// Count members and content bytes of a finished archive
fn summarize(path: &Path) -> io::Result<ArchiveSummary> {
    let mut archive = tar::Archive::new(File::open(path)?);
    let mut summary = ArchiveSummary::default();

    for entry in archive.entries()? {
        let entry = entry?;
        summary.members += 1;
        if entry.header().entry_type().is_file() {
            summary.bytes += entry.header().size()?;
        }
    }

    Ok(summary)
}
