use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `contents` via a temp file in the same directory.
///
/// Readers see either the old file or the new one, never a partial write.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

    let mut staging = NamedTempFile::new_in(parent).context("Failed to create staging temp file")?;
    staging
        .write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write staged contents for {}", path.display()))?;
    staging
        .as_file()
        .sync_all()
        .context("Failed to sync staged file to disk")?;
    staging
        .persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Append a section to a log file, separated from earlier entries by a blank line.
///
/// Creates the file with the bare section when it does not exist yet.
pub fn append_section(path: &Path, section: &str) -> Result<()> {
    let combined = match fs::read_to_string(path) {
        Ok(existing) => format!("{existing}\n\n{section}"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => section.to_string(),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    write_atomic(path, &combined)
}
