//! Atomic output publishing.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;

/// Write `bytes` to `path` so readers never observe a partial file.
///
/// The data is staged in a temporary file in the destination directory,
/// flushed to disk, then renamed over `path`. On failure the previous file
/// (if any) is left as it was.
pub fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;

    log::debug!("published {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
