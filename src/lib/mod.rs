//! tilecov: whole-genome coverage estimates from BAM index files alone.
//!
//! A BAI index records, for every 16,384-bp window of every reference, the
//! virtual file offset of the first overlapping alignment. The compressed
//! byte span between consecutive windows tracks read depth closely enough
//! that an accurate per-chromosome coverage profile, copy-number and sex
//! inference, QC bin counts and a cohort PCA embedding can all be derived in
//! seconds, without ever reading an alignment record.
//!
//! # Modules
//!
//! - [`tiles`]: index lowering and per-sample depth normalization
//! - [`coverage`]: depth histograms, ROC curves, copy number and bin counts
//! - [`matrix`]: the quantized sample-by-tile matrix and its PCA embedding
//! - [`mops`]: auxiliary integer copy-number calls for one locus
//! - [`pipeline`]: the per-reference driver
//! - [`report`]: the bed.gz / roc / ped output streams
//! - [`presentation`]: the seam to an optional rendering layer

pub mod config;
pub mod core;
pub mod coverage;
pub mod headers;
pub mod matrix;
pub mod mops;
pub mod pipeline;
pub mod presentation;
pub mod report;
pub mod tiles;
