//! The run driver: loads every sample's index once, walks the references in
//! header order and routes depths into the writers and statistics.

use crate::config::Config;
use crate::core::errors::{CovError, Result};
use crate::core::fs::make_parent_dirs;
use crate::coverage::{self, BinCounts, SLOTS};
use crate::headers::{self, Reference};
use crate::matrix::{principal_components, DepthMatrix};
use crate::presentation::Presentation;
use crate::report::{write_ped, BedWriter, RocWriter};
use crate::tiles::SampleIndex;
use log::info;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::path::Path;
use std::time::Instant;

/// Run one coverage estimate end-to-end.
///
/// References are visited in header order; within a reference the per-sample
/// depth computations fan out on the worker pool, and the ordered collect
/// keeps every output stream in fixed sample order no matter how the workers
/// are scheduled. All index reads happen up front, before the loop.
pub fn run(config: &Config, presentation: &mut dyn Presentation) -> Result<()> {
    let refs = select_references(config)?;
    let samples = load_samples(config)?;
    let names: Vec<String> = samples.iter().map(|s| s.label().to_string()).collect();
    let n = samples.len();
    info!("running on {} indexes over {} references", n, refs.len());

    make_parent_dirs(Path::new(&config.prefix))?;
    let mut bed = BedWriter::create(&config.prefix, &names)?;
    let mut roc = RocWriter::create(&config.prefix)?;

    let mut counts = vec![[0u64; SLOTS]; n];
    let mut bins = vec![BinCounts::default(); n];
    let mut matrix = DepthMatrix::new(n, config.max_depth);
    let mut sex_cns: FxHashMap<String, Vec<f64>> = FxHashMap::default();

    for r in &refs {
        let depths: Vec<Vec<f32>> = samples
            .par_iter()
            .map(|s| s.normalized_depth(r.tid, 0, r.length as usize, config.max_depth))
            .collect();

        // Some samples may be missing trailing data; the longest vector
        // decides how many tiles this reference emits.
        let longest = depths.iter().map(Vec::len).max().unwrap_or(0);

        for (count, d) in counts.iter_mut().zip(&depths) {
            coverage::zero_counts(count);
            coverage::count_depths(d, count);
        }

        let is_sex = config.sex_chromosomes.iter().any(|x| x == &r.name);
        if is_sex {
            if longest > 0 {
                sex_cns.insert(r.name.clone(), coverage::copy_numbers(&depths, config.ploidy));
            }
        } else {
            for (k, d) in depths.iter().enumerate() {
                matrix.extend(k, d, longest);
                bins[k].count(d, longest);
            }
        }

        for tile in 0..longest {
            bed.write_tile(&r.name, tile, &depths)?;
        }

        if longest > 0 {
            let rocs: Vec<Vec<f32>> = counts.iter().map(coverage::counts_roc).collect();
            roc.write_block(&r.name, &names, &rocs)?;
            if config.include_gl || !r.name.starts_with("GL") {
                presentation.emit_roc(&r.name, &names, &rocs);
            }
        }
    }

    bed.finish()?;
    roc.finish()?;

    summarize(config, &names, &sex_cns, &bins, &matrix, presentation)
}

fn select_references(config: &Config) -> Result<Vec<Reference>> {
    let all = headers::read_references(&config.bam_inputs[0])?;
    match &config.chrom {
        Some(chrom) => {
            let r = headers::resolve_reference(&all, chrom).ok_or_else(|| {
                CovError::UnknownReference {
                    name: chrom.clone(),
                }
            })?;
            Ok(vec![r.clone()])
        }
        None => Ok(all),
    }
}

fn load_samples(config: &Config) -> Result<Vec<SampleIndex>> {
    config
        .bam_inputs
        .par_iter()
        .map(|path| SampleIndex::load(path))
        .collect()
}

/// After the last reference: copy numbers, bins and the PCA projection go to
/// the presentation layer and the pedigree summary.
///
/// The summary only makes sense when the configured sex chromosomes were
/// actually seen; a restricted or partial run skips it and leaves the other
/// outputs untouched.
fn summarize(
    config: &Config,
    names: &[String],
    sex_cns: &FxHashMap<String, Vec<f64>>,
    bins: &[BinCounts],
    matrix: &DepthMatrix,
    presentation: &mut dyn Presentation,
) -> Result<()> {
    if sex_cns.is_empty() {
        info!("no sex chromosomes were processed; skipping the summary table");
        return Ok(());
    }
    for key in &config.sex_chromosomes {
        if !sex_cns.contains_key(key) {
            log::warn!("chromosome {} not found; skipping the summary table", key);
            return Ok(());
        }
    }

    let started = Instant::now();
    let pca = principal_components(matrix.rows());
    info!(
        "completed PCA in {:.3} seconds",
        started.elapsed().as_secs_f64()
    );

    presentation.emit_bins(names, bins);
    if let Some(p) = &pca {
        presentation.emit_pca(names, p);
    }

    write_ped(
        &config.prefix,
        names,
        &config.sex_chromosomes,
        sex_cns,
        bins,
        pca.as_ref(),
    )
}
