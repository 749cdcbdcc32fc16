//! Depth histograms, coverage ROC curves and per-sample QC statistics.

/// Number of histogram slots.
pub const SLOTS: usize = 70;

/// Slot scale factor; slot `SLOTS * SLOTS_MID` holds depth 1.0 and the top
/// slot saturates just below depth 1.5.
pub const SLOTS_MID: f64 = 2.0 / 3.0;

/// Histogram slot for one normalized depth value.
#[inline]
pub fn depth_slot(depth: f32) -> usize {
    let v = (depth * (SLOTS as f32 * SLOTS_MID as f32) + 0.5) as usize;
    v.min(SLOTS - 1)
}

/// Add each depth into its slot. The counts buffer is reused across
/// references; callers zero it with [`zero_counts`] rather than reallocate.
pub fn count_depths(depths: &[f32], counts: &mut [u64; SLOTS]) {
    for &d in depths {
        counts[depth_slot(d)] += 1;
    }
}

pub fn zero_counts(counts: &mut [u64; SLOTS]) {
    counts.fill(0);
}

/// Reverse-cumulative proportion of tiles at or above each slot's depth.
///
/// The first entry is always 1 for a non-empty histogram and the sequence is
/// non-increasing within [0, 1].
pub fn counts_roc(counts: &[u64; SLOTS]) -> Vec<f32> {
    let mut totals = [0u64; SLOTS];
    totals[SLOTS - 1] = counts[SLOTS - 1];
    for i in (0..SLOTS - 1).rev() {
        totals[i] = totals[i + 1] + counts[i];
    }

    let max = totals[0] as f32;
    if max == 0.0 {
        return vec![0.0; SLOTS];
    }
    totals.iter().map(|&t| t as f32 / max).collect()
}

/// Estimate the copy number of one chromosome for every sample in the cohort.
///
/// Tiles at exactly zero are centromeric or unmappable and are dropped before
/// taking the median; a sample with nothing left reports the sentinel -1.
/// The estimate is crude by design: after normalization the ratio of the
/// chromosome median to the autosomal median is all that is needed.
pub fn copy_numbers(depths: &[Vec<f32>], ploidy: u32) -> Vec<f64> {
    depths
        .iter()
        .map(|d| {
            let mut nonzero: Vec<f32> = d.iter().copied().filter(|&dp| dp != 0.0).collect();
            if nonzero.is_empty() {
                return -1.0;
            }
            nonzero.sort_by(|a, b| a.partial_cmp(b).unwrap());
            f64::from(ploidy as f32 * nonzero[nonzero.len() / 2])
        })
        .collect()
}

/// Counts of tiles in and out of the near-diploid band, accumulated across
/// all non-sex references of one sample.
#[derive(Debug, Default, Clone)]
pub struct BinCounts {
    /// Tiles outside [0.85, 1.15], padded trailing tiles included.
    pub out: u64,
    /// Tiles below 0.15, padded trailing tiles included.
    pub low: u64,
    /// Tiles above 1.15.
    pub hi: u64,
    /// Tiles inside [0.85, 1.15].
    pub within: u64,
}

impl BinCounts {
    /// Accumulate one reference's depths against the cohort-longest length
    /// `n`. Tiles the sample is missing at the tail count as both `out` and
    /// `low`.
    pub fn count(&mut self, depths: &[f32], n: usize) {
        for &d in depths {
            if !(0.85..=1.15).contains(&d) {
                self.out += 1;
                if d > 1.15 {
                    self.hi += 1;
                } else if d < 0.15 {
                    self.low += 1;
                }
            } else {
                self.within += 1;
            }
        }
        let missing = n.saturating_sub(depths.len()) as u64;
        self.out += missing;
        self.low += missing;
    }
}
