//! Index-to-tile lowering and per-sample depth normalization.
//!
//! A BAI linear index stores, for every 16,384-bp window of a reference, the
//! virtual offset of the first alignment overlapping that window. The byte
//! distance between consecutive window offsets is the compressed footprint of
//! one tile and tracks read count closely enough to serve as a depth proxy,
//! which is what lets the whole pipeline run without ever opening the BAM
//! payload.

use crate::config::TILE_WIDTH;
use crate::core::errors::{CovError, Result};
use crate::core::fs;
use crate::headers;
use noodles::bam::bai;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Per-sample view of one archive's index: tile offset vectors for every
/// reference plus the global median tile size used for normalization.
#[derive(Debug, Clone)]
pub struct SampleIndex {
    label: String,
    refs: Vec<Vec<i64>>,
    median_tile_size: f64,
}

/// Lower a binning index into per-reference vectors of virtual offsets, one
/// entry per tile.
///
/// Offsets are made non-decreasing: a window with no entry (or one that
/// regresses) carries the previous offset forward, so consecutive
/// differences are always valid byte footprints.
pub fn lower_index(index: &bai::Index) -> Vec<Vec<i64>> {
    index
        .reference_sequences()
        .iter()
        .map(|rs| {
            let mut tiles = Vec::with_capacity(rs.index().len());
            let mut prev = 0i64;
            for vp in rs.index().iter() {
                let vo = u64::from(*vp) as i64;
                let vo = if vo == 0 { prev } else { vo.max(prev) };
                tiles.push(vo);
                prev = vo;
            }
            tiles
        })
        .collect()
}

/// Median of consecutive tile differences across all references except the
/// last (trailing unmapped/random contigs would pollute the estimate).
///
/// A zero median means a run of empty windows landed in the middle of the
/// sorted sizes; the median is then retaken over the non-zero remainder.
/// `None` when fewer than three non-zero differences exist.
fn median_tile_size(refs: &[Vec<i64>]) -> Option<f64> {
    let mut sizes: Vec<i64> = Vec::with_capacity(TILE_WIDTH);
    for tiles in refs.iter().take(refs.len().saturating_sub(1)) {
        if tiles.len() < 2 {
            continue;
        }
        sizes.extend(tiles.windows(2).map(|w| w[1] - w[0]));
    }

    if sizes.iter().filter(|&&s| s > 0).count() < 3 {
        return None;
    }

    sizes.sort_unstable();
    let mut median = sizes[sizes.len() / 2];
    if median == 0 {
        let mut i = sizes.len() / 2;
        while sizes[i] == 0 {
            i += 1;
        }
        let nonzero = &sizes[i..];
        median = nonzero[nonzero.len() / 2];
    }
    Some(median as f64)
}

impl SampleIndex {
    /// Load the sibling index of one archive and lower it to tile vectors.
    /// The index buffer is released as soon as the vectors are built.
    pub fn load(bam: &Path) -> Result<Self> {
        let label = headers::sample_label(bam)?;
        let index_path = fs::locate_index(bam)?;

        let file = File::open(&index_path).map_err(|e| CovError::IndexParse {
            path: index_path.clone(),
            source: e,
        })?;
        let index = bai::io::Reader::new(BufReader::new(file))
            .read_index()
            .map_err(|e| CovError::IndexParse {
                path: index_path.clone(),
                source: e,
            })?;

        Self::from_tile_offsets(label, lower_index(&index), bam)
    }

    /// Build a sample view from already-lowered tile vectors.
    pub fn from_tile_offsets(
        label: String,
        refs: Vec<Vec<i64>>,
        origin: &Path,
    ) -> Result<Self> {
        let median_tile_size =
            median_tile_size(&refs).ok_or_else(|| CovError::InsufficientIndex {
                path: origin.to_path_buf(),
            })?;
        Ok(SampleIndex {
            label,
            refs,
            median_tile_size,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn median_tile_size(&self) -> f64 {
        self.median_tile_size
    }

    /// Normalized depth for a region, scaled so the sample-wide mean is ~1
    /// and clamped at `max_depth`. `end == 0` means the whole reference.
    ///
    /// The returned vector has one entry per tile pair in range; the final
    /// tile of a reference has no successor and is dropped.
    pub fn normalized_depth(
        &self,
        ref_id: usize,
        start: usize,
        end: usize,
        max_depth: f32,
    ) -> Vec<f32> {
        let tiles = match self.refs.get(ref_id) {
            Some(t) if t.len() >= 2 => t,
            _ => return Vec::new(),
        };

        let s = start / TILE_WIDTH;
        let mut e = end / TILE_WIDTH;
        if end == 0 || e >= tiles.len() {
            e = tiles.len() - 1;
        }
        if e <= s {
            return Vec::new();
        }

        (s..e)
            .map(|i| {
                let size = (tiles[i + 1] - tiles[i]) as f64;
                ((size / self.median_tile_size) as f32).min(max_depth)
            })
            .collect()
    }
}
