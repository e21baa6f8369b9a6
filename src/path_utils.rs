use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

/// Expand environment variables and `~` in a path string
pub fn expand_path_str(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| path.into())
        .into_owned()
}

/// Expand a PathBuf with environment variables
pub fn expand_path_buf(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(expand_path_str(&path_str))
}

/// Create a directory and all parent directories if they don't exist
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {path:?}"))?;
        debug!("Created directory: {path:?}");
    }
    Ok(())
}

/// Make sure the directory a file is about to be written into exists
pub fn ensure_parent_directory(file: &Path) -> Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent),
        _ => Ok(()),
    }
}

/// Expand a path and anchor it at `base_dir` if it is relative
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    let expanded_path = expand_path_buf(path);
    if expanded_path.is_absolute() {
        expanded_path
    } else {
        base_dir.join(expanded_path)
    }
}

/// Expand `~` and `$VAR` in a program reference.
///
/// A bare name such as `conda` has nothing to expand and comes back as given,
/// leaving it to `PATH` lookup when the program is launched.
pub fn expand_program(program: &str) -> String {
    expand_path_str(program)
}
