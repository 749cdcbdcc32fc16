//! The sample-by-tile quantized depth matrix and its principal-component
//! embedding.

use log::warn;
use nalgebra::linalg::SymmetricEigen;
use nalgebra::DMatrix;

/// Row-per-sample dense matrix of quantized depths over all non-sex
/// references.
///
/// The builder owns the alignment invariant: every `extend` pads the row to
/// the per-reference target length, so after each reference all rows are the
/// same length again.
#[derive(Debug)]
pub struct DepthMatrix {
    rows: Vec<Vec<u8>>,
    max_depth: f32,
}

impl DepthMatrix {
    pub fn new(samples: usize, max_depth: f32) -> Self {
        DepthMatrix {
            rows: vec![Vec::new(); samples],
            max_depth,
        }
    }

    /// Append one reference's depths for one sample, zero-padding up to
    /// `target_len` (the longest depth vector any sample produced there).
    pub fn extend(&mut self, sample: usize, depths: &[f32], target_len: usize) {
        let max_depth = self.max_depth;
        let row = &mut self.rows[sample];
        row.reserve(target_len);
        row.extend(depths.iter().map(|&d| quantize(d, max_depth)));
        row.resize(row.len() + target_len.saturating_sub(depths.len()), 0);
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }
}

/// Quantize a clamped depth onto the 8-bit scale, saturating at 255.
#[inline]
fn quantize(depth: f32, max_depth: f32) -> u8 {
    (255.0 * depth / max_depth + 0.5).min(255.0) as u8
}

/// Top-k principal-component embedding of the samples.
#[derive(Debug)]
pub struct PcaProjection {
    /// One row per sample, k columns.
    pub coordinates: Vec<Vec<f64>>,
    /// Fraction of total variance explained by each retained component.
    pub variance_weights: Vec<f64>,
}

/// Project the samples onto their top principal components.
///
/// Works in the sample dimension: the eigendecomposition runs on the n-by-n
/// Gram matrix of the column-centered data, which is equivalent to the SVD
/// of the centered matrix but never materializes a p-sized factor. Retains
/// k = min(5, rank) components; below three the embedding is not worth
/// plotting, so a warning is emitted and `None` returned.
pub fn principal_components(rows: &[Vec<u8>]) -> Option<PcaProjection> {
    let n = rows.len();
    let p = rows.first().map_or(0, Vec::len);
    if n < 2 || p == 0 {
        warn!("{} principal components computable, skipping projection", 0);
        return None;
    }

    let x = DMatrix::from_fn(n, p, |i, j| f64::from(rows[i][j]));
    let mut xc = x.clone();
    for mut col in xc.column_iter_mut() {
        let mean = col.mean();
        col.add_scalar_mut(-mean);
    }

    let gram = &xc * xc.transpose();
    let eigen = SymmetricEigen::new(gram);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap()
    });

    let total: f64 = eigen.eigenvalues.iter().map(|&l| l.max(0.0)).sum();
    if total <= 0.0 {
        warn!("0 principal components computable, skipping projection");
        return None;
    }
    let tolerance = eigen.eigenvalues[order[0]] * 1e-12 + 1e-9;
    let rank = order
        .iter()
        .filter(|&&i| eigen.eigenvalues[i] > tolerance)
        .count();

    let k = rank.min(5);
    if k < 3 {
        warn!("{} principal components computable, skipping projection", rank);
        return None;
    }

    let variance_weights: Vec<f64> = order
        .iter()
        .take(k)
        .map(|&i| eigen.eigenvalues[i] / total)
        .collect();

    // Dual form: with Xc = U S V^t the component axes are V = Xc^t U S^-1,
    // so the (uncentered, as emitted upstream) projection X V reduces to
    // (X Xc^t) U S^-1 and stays in n-by-n territory.
    let cross = &x * xc.transpose();
    let mut coordinates = vec![vec![0.0; k]; n];
    for (c, &ei) in order.iter().take(k).enumerate() {
        let sigma = eigen.eigenvalues[ei].max(0.0).sqrt();
        let scores = &cross * eigen.eigenvectors.column(ei);
        for (i, row) in coordinates.iter_mut().enumerate() {
            row[c] = scores[i] / sigma;
        }
    }

    Some(PcaProjection {
        coordinates,
        variance_weights,
    })
}
