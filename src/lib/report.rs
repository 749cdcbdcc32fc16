//! The three output streams: the per-tile bed.gz, the per-chromosome roc
//! table and the per-sample pedigree summary.

use crate::config::TILE_WIDTH;
use crate::core::errors::{CovError, Result};
use crate::core::io::{bgzf_tsv_writer, finish_bgzf_tsv, tsv_writer};
use crate::coverage::{BinCounts, SLOTS, SLOTS_MID};
use crate::matrix::PcaProjection;
use noodles::bgzf;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::path::PathBuf;

/// Block-compressed bed-like stream of per-tile depths, one column per
/// sample.
pub struct BedWriter {
    writer: csv::Writer<bgzf::Writer<File>>,
    path: PathBuf,
}

impl BedWriter {
    pub fn create(prefix: &str, samples: &[String]) -> Result<Self> {
        let path = PathBuf::from(format!("{}-indexcov.bed.gz", prefix));
        let mut writer = bgzf_tsv_writer(&path)?;

        let mut header = Vec::with_capacity(3 + samples.len());
        header.extend(["#chrom", "start", "end"].map(String::from));
        header.extend(samples.iter().cloned());
        writer
            .write_record(&header)
            .map_err(|e| CovError::output_io(&path, e))?;

        Ok(BedWriter { writer, path })
    }

    /// Emit one tile row. Samples whose depth vector ends before this tile
    /// serialize a literal `0`.
    pub fn write_tile(&mut self, chrom: &str, tile: usize, depths: &[Vec<f32>]) -> Result<()> {
        let mut record = Vec::with_capacity(3 + depths.len());
        record.push(chrom.to_string());
        record.push((tile * TILE_WIDTH).to_string());
        record.push(((tile + 1) * TILE_WIDTH).to_string());
        for sample in depths {
            record.push(match sample.get(tile) {
                Some(&d) => sig3(d),
                None => "0".to_string(),
            });
        }
        self.writer
            .write_record(&record)
            .map_err(|e| CovError::output_io(&self.path, e))
    }

    pub fn finish(self) -> Result<()> {
        finish_bgzf_tsv(self.writer, &self.path)
    }
}

/// Tab-separated reverse-cumulative coverage curves, one block of 70 rows
/// per reference.
pub struct RocWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl RocWriter {
    pub fn create(prefix: &str) -> Result<Self> {
        let path = PathBuf::from(format!("{}-indexcov.roc", prefix));
        let writer = tsv_writer(&path)?;
        Ok(RocWriter { writer, path })
    }

    pub fn write_block(
        &mut self,
        chrom: &str,
        samples: &[String],
        rocs: &[Vec<f32>],
    ) -> Result<()> {
        let mut header = Vec::with_capacity(2 + samples.len());
        header.extend(["#chrom", "cov"].map(String::from));
        header.extend(samples.iter().cloned());
        self.writer
            .write_record(&header)
            .map_err(|e| CovError::output_io(&self.path, e))?;

        for slot in 0..SLOTS {
            let mut record = Vec::with_capacity(2 + rocs.len());
            record.push(chrom.to_string());
            record.push(format!("{:.2}", slot as f64 / (SLOTS as f64 * SLOTS_MID)));
            record.extend(rocs.iter().map(|r| format!("{:.2}", r[slot])));
            self.writer
                .write_record(&record)
                .map_err(|e| CovError::output_io(&self.path, e))?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| CovError::output_io(&self.path, e))
    }
}

/// Write the pedigree-like summary: inferred sex, per-chromosome copy
/// numbers, bin counts and (when available) the component projection.
pub fn write_ped(
    prefix: &str,
    samples: &[String],
    sex_keys: &[String],
    sex_cns: &FxHashMap<String, Vec<f64>>,
    bins: &[BinCounts],
    pca: Option<&PcaProjection>,
) -> Result<()> {
    let path = PathBuf::from(format!("{}-indexcov.ped", prefix));
    let mut writer = tsv_writer(&path)?;
    let io_err = |e: csv::Error| CovError::output_io(&path, e);

    let mut header = Vec::with_capacity(sex_keys.len() + 12);
    header.extend(
        ["#family_id", "sample_id", "paternal_id", "maternal_id", "sex", "phenotype"]
            .map(String::from),
    );
    header.extend(sex_keys.iter().map(|k| format!("CN{}", k)));
    header.extend(["bins.out", "bins.lo", "bins.hi", "bins.in", "p.out"].map(String::from));
    if let Some(p) = pca {
        header.extend((1..=p.variance_weights.len()).map(|i| format!("PC{}", i)));
    }
    writer.write_record(&header).map_err(io_err)?;

    for (i, sample) in samples.iter().enumerate() {
        let inferred = (0.5 + sex_cns[&sex_keys[0]][i]) as i64;

        let mut record = Vec::with_capacity(header.len());
        record.push("unknown".to_string());
        record.push(sample.clone());
        record.push("-9".to_string());
        record.push("-9".to_string());
        record.push(inferred.to_string());
        record.push("-9".to_string());
        for key in sex_keys {
            record.push(format!("{:.2}", sex_cns[key][i]));
        }
        let b = &bins[i];
        record.push(b.out.to_string());
        record.push(b.low.to_string());
        record.push(b.hi.to_string());
        record.push(b.within.to_string());
        record.push(format!("{:.2}", b.out as f64 / b.within as f64));
        if let Some(p) = pca {
            record.extend(p.coordinates[i].iter().map(|c| format!("{:.2}", c)));
        }
        writer.write_record(&record).map_err(io_err)?;
    }

    writer.flush().map_err(|e| CovError::output_io(&path, e))
}

/// Compact three-significant-figure rendering of a depth value, trailing
/// zeros trimmed.
pub(crate) fn sig3(v: f32) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let exponent = v.abs().log10().floor() as i32;
    let decimals = (2 - exponent).max(0) as usize;
    let s = format!("{:.*}", decimals, v);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
