//! Run configuration threaded explicitly through the pipeline.

use std::path::PathBuf;

/// Width of one genomic tile in base pairs. This is the linear-index window
/// size of the BAI format and part of the bed output contract.
pub const TILE_WIDTH: usize = 16384;

/// Ceiling applied to normalized depth values.
pub const DEFAULT_MAX_DEPTH: f32 = 6.0;

/// Expected copies of an autosome.
pub const DEFAULT_PLOIDY: u32 = 2;

/// Normalised configuration for one coverage run.
///
/// Every knob lives here rather than in process-wide state; the pipeline and
/// the statistics it drives only ever see this value.
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix for the three output streams.
    pub prefix: String,
    /// Keep `GL*` unplaced contigs in the plotted set.
    pub include_gl: bool,
    /// Sex chromosomes, in the order their CN columns appear; the first one
    /// populates the pedigree sex field.
    pub sex_chromosomes: Vec<String>,
    /// Restrict the run to a single reference.
    pub chrom: Option<String>,
    /// Expected ploidy used to scale chromosome copy numbers.
    pub ploidy: u32,
    /// Ceiling for normalized depth.
    pub max_depth: f32,
    /// Alignment archives to estimate coverage for.
    pub bam_inputs: Vec<PathBuf>,
}

impl Config {
    pub fn new(prefix: impl Into<String>, bam_inputs: Vec<PathBuf>) -> Self {
        Config {
            prefix: normalize_prefix(prefix.into()),
            include_gl: false,
            sex_chromosomes: vec!["X".to_string(), "Y".to_string()],
            chrom: None,
            ploidy: DEFAULT_PLOIDY,
            max_depth: DEFAULT_MAX_DEPTH,
            bam_inputs,
        }
    }
}

/// A prefix ending in `/` names a directory; drop the outputs there as `qc-*`.
pub fn normalize_prefix(prefix: String) -> String {
    if prefix.ends_with('/') {
        format!("{}qc", prefix)
    } else {
        prefix
    }
}
