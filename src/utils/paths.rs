//! Path utilities for mng
//!
//! Build output directories are the only state mng persists, and it tracks
//! them purely by presence on disk. The two operations here are idempotent so
//! callers never have to look before they leap.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::MngError;

/// Name of the build output directory inside every target root
pub const BUILD_DIR: &str = "build";

/// Get the build output directory for a target root
pub fn build_dir_of(root: &Path) -> PathBuf {
    root.join(BUILD_DIR)
}

/// Ensure a directory exists, creating it and any parents if absent
pub fn ensure_dir(path: &Path) -> Result<(), MngError> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|e| MngError::filesystem(path, "create directory", e))
}

/// Remove a directory recursively if present.
///
/// Returns the number of bytes reclaimed, or `None` if there was nothing to
/// remove.
pub fn remove_dir_if_present(path: &Path) -> Result<Option<u64>, MngError> {
    if !path.exists() {
        return Ok(None);
    }
    let size = dir_size(path);
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(Some(size)),
        // Raced with another deletion; still absent, still fine
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(MngError::filesystem(path, "remove directory", e)),
    }
}

/// Total size in bytes of all files below a directory
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.metadata().ok())
        .filter(|metadata| metadata.is_file())
        .map(|metadata| metadata.len())
        .sum()
}

/// Format a byte count for humans
pub fn format_size(size_bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size_bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}

/// Collect the source files directly inside `root` whose extension is in
/// `extensions`, sorted by path.
pub fn collect_sources(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut sources: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
        })
        .collect();
    sources.sort();
    sources
}

/// Make a path human-friendly by stripping the workspace prefix
pub fn display_relative(path: &Path, workspace: &Path) -> String {
    path.strip_prefix(workspace)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}
