//! Seam between the pipeline and whatever renders its results.
//!
//! Producers hand over pure data (curves, projections, bin tuples); a
//! renderer lives entirely behind this trait so the pipeline never touches
//! templating or chart state.

use crate::coverage::BinCounts;
use crate::matrix::PcaProjection;

pub trait Presentation {
    /// One reference's coverage ROC curves, in sample order. Called only for
    /// references that pass the unplaced-contig plotting policy.
    fn emit_roc(&mut self, chrom: &str, samples: &[String], rocs: &[Vec<f32>]);

    /// The retained principal-component embedding of the cohort.
    fn emit_pca(&mut self, samples: &[String], projection: &PcaProjection);

    /// Final per-sample bin counts.
    fn emit_bins(&mut self, samples: &[String], bins: &[BinCounts]);
}

/// Renderer used when no presentation layer is attached.
#[derive(Debug, Default)]
pub struct DiscardPresentation;

impl Presentation for DiscardPresentation {
    fn emit_roc(&mut self, _chrom: &str, _samples: &[String], _rocs: &[Vec<f32>]) {}

    fn emit_pca(&mut self, _samples: &[String], _projection: &PcaProjection) {}

    fn emit_bins(&mut self, _samples: &[String], _bins: &[BinCounts]) {}
}
