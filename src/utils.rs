//! Shared helpers for the command-line surface.

use std::path::PathBuf;

use anyhow::Result;

/// Gets the cross-platform path of the optional configuration file.
///
/// Returns the path as `{config_dir}/casebook/casebook.env` where
/// `config_dir` is:
/// - Linux: `~/.config`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the configuration directory cannot be determined.
pub fn config_file_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Failed to determine configuration directory"))?;

    Ok(config_dir.join("casebook").join("casebook.env"))
}
