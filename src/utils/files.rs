use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Ensure the directory that will hold `file_path` exists
pub fn ensure_parent_dir(file_path: &Path) -> io::Result<()> {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent)?;
            debug!("Created directory: {}", parent.display());
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Write `contents` to `file_path` through a temporary file in the same
/// directory, so readers never see a half-written file.
pub fn write_atomically(file_path: &Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(file_path)?;

    let dir = match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(dir)?;
    temp_file.write_all(contents)?;
    temp_file.flush()?;
    temp_file.persist(file_path).map_err(|e| e.error)?;

    Ok(())
}
