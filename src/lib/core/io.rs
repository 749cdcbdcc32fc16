use crate::core::errors::{CovError, Result};
use noodles::bgzf;
use std::fs::File;
use std::path::Path;

/// Build a tab-delimited writer targeting a plain file.
pub fn tsv_writer<P: AsRef<Path>>(path: P) -> Result<csv::Writer<File>> {
    let file = File::create(path.as_ref()).map_err(|e| CovError::output_io(path.as_ref(), e))?;
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(file))
}

/// Build a tab-delimited writer over a BGZF-compressed file.
///
/// The BGZF blocks carry a zeroed modification time and an unknown (0xff)
/// OS byte, so repeated runs over the same input are byte-identical.
pub fn bgzf_tsv_writer<P: AsRef<Path>>(path: P) -> Result<csv::Writer<bgzf::Writer<File>>> {
    let file = File::create(path.as_ref()).map_err(|e| CovError::output_io(path.as_ref(), e))?;
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(bgzf::Writer::new(file)))
}

/// Flush a BGZF-backed writer and append the end-of-file marker block.
pub fn finish_bgzf_tsv(
    writer: csv::Writer<bgzf::Writer<File>>,
    path: &Path,
) -> Result<()> {
    let inner = writer
        .into_inner()
        .map_err(|e| CovError::output_io(path, e))?;
    inner.finish().map_err(|e| CovError::output_io(path, e))?;
    Ok(())
}
