//! Backup and reset of the working deck before a rebuild.

use crate::config::Config;
use crate::error::Result;
use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;

/// What `reset_output` managed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The output deck now matches the pristine source.
    Reset,
    /// No pristine source; the existing output deck is used as is.
    SourceMissing(PathBuf),
}

/// Copy the current output deck into the backup directory.
///
/// Returns the backup path, or `None` when there is no output deck yet.
pub fn backup_output(config: &Config, now: NaiveDateTime) -> Result<Option<PathBuf>> {
    let output = config.output_pptx_path();
    if !output.exists() {
        log::debug!("No output deck at {} to back up", output.display());
        return Ok(None);
    }

    let backup_dir = config.backup_dir_path();
    fs::create_dir_all(&backup_dir)?;

    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("deck");
    let backup_path = backup_dir.join(format!(
        "{}_backup_{}.pptx",
        stem,
        now.format("%Y%m%d_%H%M%S")
    ));
    fs::copy(&output, &backup_path)?;
    log::info!("Backed up to: {}", backup_path.display());
    Ok(Some(backup_path))
}

/// Reseed the output deck from the pristine source.
///
/// A missing source is logged and reported, not treated as an error.
pub fn reset_output(config: &Config) -> Result<ResetOutcome> {
    let source = config.source_pptx_path();
    if !source.exists() {
        log::error!("Source not found: {}", source.display());
        return Ok(ResetOutcome::SourceMissing(source));
    }

    let output = config.output_pptx_path();
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::copy(&source, &output)?;
    log::info!(
        "Reset to original: {}",
        source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    Ok(ResetOutcome::Reset)
}
