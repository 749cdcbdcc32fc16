//! Header service over the alignment archives.
//!
//! The pipeline never touches alignment records; all it needs from a BAM file
//! is the ordered reference dictionary and a sample label, both of which come
//! from the header.

use crate::core::errors::{CovError, Result};
use rust_htslib::bam::{Header, Read, Reader};
use std::path::Path;

/// One entry of the reference dictionary, in header order.
#[derive(Debug, Clone)]
pub struct Reference {
    pub tid: usize,
    pub name: String,
    pub length: u64,
}

/// Read the ordered reference dictionary from an archive's header.
pub fn read_references(path: &Path) -> Result<Vec<Reference>> {
    let reader = open(path)?;
    let header = reader.header();

    let mut refs = Vec::with_capacity(header.target_count() as usize);
    for tid in 0..header.target_count() {
        refs.push(Reference {
            tid: tid as usize,
            name: String::from_utf8_lossy(header.tid2name(tid)).into_owned(),
            length: header.target_len(tid).unwrap_or(0),
        });
    }
    Ok(refs)
}

/// Resolve a chromosome name against the dictionary, tolerating a `chr`
/// prefix on either side.
pub fn resolve_reference<'a>(refs: &'a [Reference], chrom: &str) -> Option<&'a Reference> {
    let wanted = chrom.strip_prefix("chr").unwrap_or(chrom);
    refs.iter().find(|r| {
        r.name == wanted || r.name.strip_prefix("chr").map_or(false, |n| n == wanted)
    })
}

/// Derive the sample label for one archive.
///
/// The label is the SM tag of the read groups; distinct tags in one file are
/// unexpected, so they log a warning and the first one wins. Files without a
/// usable read group fall back to their file name.
pub fn sample_label(path: &Path) -> Result<String> {
    let reader = open(path)?;
    let records = Header::from_template(reader.header()).to_hashmap();

    let mut samples: Vec<String> = Vec::new();
    if let Some(read_groups) = records.get("RG") {
        for rg in read_groups {
            if let Some(sm) = rg.get("SM") {
                if !samples.contains(sm) {
                    samples.push(sm.clone());
                }
            }
        }
    }
    if samples.len() > 1 {
        log::warn!("more than one sample tag in {}", path.display());
    }
    if let Some(sample) = samples.into_iter().next() {
        return Ok(sample);
    }

    Ok(path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string()))
}

fn open(path: &Path) -> Result<Reader> {
    Reader::from_path(path).map_err(|e| CovError::HeaderRead {
        path: path.to_path_buf(),
        source: e,
    })
}
