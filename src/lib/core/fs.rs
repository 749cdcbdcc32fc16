use crate::core::errors::{CovError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Create parent directories for a path when missing.
pub fn make_parent_dirs<P: AsRef<Path>>(path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| CovError::output_io(path.as_ref(), e))?;
        }
    }
    Ok(())
}

/// Locate the sibling `.bai` index for an alignment archive.
///
/// Tries `<name>.bai` first, then the archive path with its extension
/// replaced by `bai`.
pub fn locate_index(bam: &Path) -> Result<PathBuf> {
    let mut appended = bam.as_os_str().to_owned();
    appended.push(".bai");
    let appended = PathBuf::from(appended);
    if appended.is_file() {
        return Ok(appended);
    }

    let swapped = bam.with_extension("bai");
    if swapped.is_file() {
        return Ok(swapped);
    }

    Err(CovError::MissingIndex {
        path: bam.to_path_buf(),
    })
}
