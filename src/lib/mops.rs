//! Integer copy-number calls for one locus across a cohort of depths.
//!
//! A small Poisson-mixture caller in the style of cn.mops: copy-number
//! classes 0..=8 share a single diploid rate, class i has mean rate
//! `lambda * i / 2`, and the diploid class carries most of the prior mass so
//! weak evidence stays at two copies. The rate is re-estimated from the
//! class assignments with a median, which keeps a handful of amplified
//! samples from dragging the baseline.

const MAX_CN: usize = 8;

/// Fraction of the diploid rate used as the mean of the zero-copy class.
const ZERO_CLASS_RATE: f64 = 0.01;

/// Prior mass on the diploid class; the remainder is spread evenly.
const DIPLOID_PRIOR: f64 = 0.6;

const MAX_ITERATIONS: usize = 8;

/// Call an integer copy number for every sample's depth at one locus.
pub fn mops(depths: &[f32]) -> Vec<i32> {
    if depths.is_empty() {
        return Vec::new();
    }

    let mut lambda = median(depths.iter().map(|&d| f64::from(d)).collect());
    if lambda <= 0.0 {
        return vec![0; depths.len()];
    }

    let flat_prior = (1.0 - DIPLOID_PRIOR) / MAX_CN as f64;
    let log_priors: Vec<f64> = (0..=MAX_CN)
        .map(|cn| if cn == 2 { DIPLOID_PRIOR.ln() } else { flat_prior.ln() })
        .collect();

    let mut calls = vec![2i32; depths.len()];
    for _ in 0..MAX_ITERATIONS {
        let next: Vec<i32> = depths
            .iter()
            .map(|&d| assign(f64::from(d), lambda, &log_priors))
            .collect();

        // Each non-zero call implies a diploid rate of depth * 2 / cn; the
        // median of those implied rates is the next lambda.
        let implied: Vec<f64> = depths
            .iter()
            .zip(&next)
            .filter(|(_, &cn)| cn > 0)
            .map(|(&d, &cn)| f64::from(d) * 2.0 / f64::from(cn))
            .collect();

        let converged = next == calls;
        calls = next;
        if implied.is_empty() || converged {
            break;
        }
        lambda = median(implied);
    }

    calls
}

/// Most likely class for one depth under Poisson log-likelihoods plus the
/// class priors. The depth factorial term is constant across classes and
/// drops out.
fn assign(depth: f64, lambda: f64, log_priors: &[f64]) -> i32 {
    let mut best = 0usize;
    let mut best_ll = f64::NEG_INFINITY;
    for (cn, log_prior) in log_priors.iter().enumerate() {
        let rate = if cn == 0 {
            lambda * ZERO_CLASS_RATE
        } else {
            lambda * cn as f64 / 2.0
        };
        let ll = depth * rate.ln() - rate + log_prior;
        if ll > best_ll {
            best_ll = ll;
            best = cn;
        }
    }
    best as i32
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    values[values.len() / 2]
}
