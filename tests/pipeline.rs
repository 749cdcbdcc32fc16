//! End-to-end runs over synthetic archives.
//!
//! Each fixture is a header-only BAM plus a hand-built BAI whose linear
//! index encodes a known tile-size pattern, so every derived number in the
//! three output streams can be predicted exactly.

use noodles::bam;
use noodles::bam::bai;
use noodles::bgzf;
use noodles::csi::binning_index::index::reference_sequence::index::LinearIndex;
use noodles::csi::binning_index::index::ReferenceSequence;
use noodles::sam;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use tilecov_lib::config::Config;
use tilecov_lib::core::errors::CovError;
use tilecov_lib::coverage::BinCounts;
use tilecov_lib::matrix::PcaProjection;
use tilecov_lib::pipeline;
use tilecov_lib::presentation::Presentation;

const REF_LENGTHS: [(&str, usize); 4] = [
    ("1", 20 * 16384),
    ("X", 8 * 16384),
    ("Y", 4 * 16384),
    ("GL000201.1", 3 * 16384),
];

fn write_bam(path: &Path, sample: &str) {
    let mut text = String::from("@HD\tVN:1.6\tSO:coordinate\n");
    for (name, length) in REF_LENGTHS {
        text.push_str(&format!("@SQ\tSN:{}\tLN:{}\n", name, length));
    }
    text.push_str(&format!("@RG\tID:rg0\tSM:{}\n", sample));

    let header: sam::Header = text.parse().expect("fixture header");
    let mut writer = bam::io::Writer::new(File::create(path).unwrap());
    writer.write_header(&header).unwrap();
    writer.try_finish().unwrap();
}

fn write_bai(path: &Path, per_ref_diffs: &[Vec<u64>]) {
    let reference_sequences = per_ref_diffs
        .iter()
        .map(|diffs| {
            let mut offset = 1u64 << 16;
            let mut linear = LinearIndex::with_capacity(diffs.len() + 1);
            linear.push(bgzf::VirtualPosition::from(offset));
            for d in diffs {
                offset += d;
                linear.push(bgzf::VirtualPosition::from(offset));
            }
            ReferenceSequence::new(Default::default(), linear, None)
        })
        .collect();

    let index = bai::Index::builder()
        .set_reference_sequences(reference_sequences)
        .build();
    let mut writer = bai::io::Writer::new(File::create(path).unwrap());
    writer.write_index(&index).unwrap();
}

/// One cohort member: tile sizes scale with `u = 1000 * (s + 1)` so every
/// sample has a different library size but identical normalized depth,
/// except for a depth-2 tile at position `s` of chromosome 1 and halved
/// (or absent) sex-chromosome coverage for odd (male-like) members.
fn write_sample(dir: &Path, s: usize) -> PathBuf {
    let bam_path = dir.join(format!("sample{}.bam", s));
    write_bam(&bam_path, &format!("s{}", s));

    let u = 1000 * (s as u64 + 1);
    let male = s % 2 == 1;

    let mut chr1 = vec![u; 20];
    chr1[s] = 2 * u;
    let x = vec![if male { u / 2 } else { u }; 8];
    let y = vec![if male { u / 2 } else { 0 }; 4];
    let gl = vec![u; 3];

    let mut bai_path = bam_path.clone().into_os_string();
    bai_path.push(".bai");
    write_bai(Path::new(&bai_path), &[chr1, x, y, gl]);

    bam_path
}

#[derive(Default)]
struct CollectingPresentation {
    roc_chroms: Vec<String>,
    pca_dims: Option<(usize, usize)>,
    bin_samples: usize,
}

impl Presentation for CollectingPresentation {
    fn emit_roc(&mut self, chrom: &str, samples: &[String], rocs: &[Vec<f32>]) {
        assert_eq!(samples.len(), rocs.len());
        self.roc_chroms.push(chrom.to_string());
    }

    fn emit_pca(&mut self, samples: &[String], projection: &PcaProjection) {
        self.pca_dims = Some((samples.len(), projection.coordinates[0].len()));
    }

    fn emit_bins(&mut self, samples: &[String], bins: &[BinCounts]) {
        assert_eq!(samples.len(), bins.len());
        self.bin_samples = bins.len();
    }
}

fn read_bgzf_text(path: &Path) -> String {
    let mut reader = bgzf::Reader::new(File::open(path).unwrap());
    let mut text = String::new();
    reader.read_to_string(&mut text).unwrap();
    text
}

#[test]
fn cohort_run_produces_all_three_streams() {
    let dir = tempdir().unwrap();
    let bams: Vec<PathBuf> = (0..6).map(|s| write_sample(dir.path(), s)).collect();

    let prefix = dir.path().join("cohort").to_string_lossy().into_owned();
    let config = Config::new(prefix.clone(), bams);

    let mut presentation = CollectingPresentation::default();
    pipeline::run(&config, &mut presentation).unwrap();

    // bed stream: reproducible BGZF framing (zeroed mtime, unknown OS).
    let bed_path = PathBuf::from(format!("{}-indexcov.bed.gz", prefix));
    let raw = fs::read(&bed_path).unwrap();
    assert_eq!(&raw[..4], &[0x1f, 0x8b, 0x08, 0x04]);
    assert_eq!(&raw[4..8], &[0, 0, 0, 0]);
    assert_eq!(raw[9], 0xff);

    let bed = read_bgzf_text(&bed_path);
    let lines: Vec<&str> = bed.lines().collect();
    assert_eq!(lines[0], "#chrom\tstart\tend\ts0\ts1\ts2\ts3\ts4\ts5");
    // 20 + 8 + 4 + 3 tiles
    assert_eq!(lines.len(), 1 + 35);

    assert_eq!(lines[1], "1\t0\t16384\t2\t1\t1\t1\t1\t1");
    assert_eq!(lines[6], "1\t81920\t98304\t1\t1\t1\t1\t1\t2");
    // X halves for the male-like members; Y disappears for the others.
    assert_eq!(lines[21], "X\t0\t16384\t1\t0.5\t1\t0.5\t1\t0.5");
    assert_eq!(lines[29], "Y\t0\t16384\t0\t0.5\t0\t0.5\t0\t0.5");
    assert!(lines[33].starts_with("GL000201.1\t0\t16384\t1\t1"));

    // roc stream: one 70-row block per reference, in header order.
    let roc = fs::read_to_string(format!("{}-indexcov.roc", prefix)).unwrap();
    let roc_lines: Vec<&str> = roc.lines().collect();
    assert_eq!(roc_lines.len(), 4 * 71);
    assert_eq!(roc_lines[0], "#chrom\tcov\ts0\ts1\ts2\ts3\ts4\ts5");
    assert_eq!(roc_lines[1], "1\t0.00\t1.00\t1.00\t1.00\t1.00\t1.00\t1.00");
    assert!(roc_lines[3 * 71].starts_with("#chrom\tcov"));
    assert!(roc_lines[3 * 71 + 1].starts_with("GL000201.1\t0.00"));

    // ped summary: sex from CNX, bins from the non-sex references, 5 PCs.
    let ped = fs::read_to_string(format!("{}-indexcov.ped", prefix)).unwrap();
    let ped_lines: Vec<&str> = ped.lines().collect();
    assert_eq!(ped_lines.len(), 1 + 6);
    assert_eq!(
        ped_lines[0],
        "#family_id\tsample_id\tpaternal_id\tmaternal_id\tsex\tphenotype\tCNX\tCNY\t\
         bins.out\tbins.lo\tbins.hi\tbins.in\tp.out\tPC1\tPC2\tPC3\tPC4\tPC5"
    );
    let female: Vec<&str> = ped_lines[1].split('\t').collect();
    assert_eq!(&female[..6], &["unknown", "s0", "-9", "-9", "2", "-9"]);
    assert_eq!(&female[6..8], &["2.00", "-1.00"]);
    assert_eq!(&female[8..13], &["1", "0", "1", "22", "0.05"]);
    assert_eq!(female.len(), 18);

    let male: Vec<&str> = ped_lines[2].split('\t').collect();
    assert_eq!(male[4], "1");
    assert_eq!(&male[6..8], &["1.00", "1.00"]);

    // GL contigs stay out of the plotted set by default.
    assert_eq!(presentation.roc_chroms, vec!["1", "X", "Y"]);
    assert_eq!(presentation.pca_dims, Some((6, 5)));
    assert_eq!(presentation.bin_samples, 6);
}

#[test]
fn two_samples_skip_the_projection_but_keep_the_summary() {
    let dir = tempdir().unwrap();
    let bams: Vec<PathBuf> = (0..2).map(|s| write_sample(dir.path(), s)).collect();

    let prefix = dir.path().join("pair").to_string_lossy().into_owned();
    let config = Config::new(prefix.clone(), bams);

    let mut presentation = CollectingPresentation::default();
    pipeline::run(&config, &mut presentation).unwrap();

    let ped = fs::read_to_string(format!("{}-indexcov.ped", prefix)).unwrap();
    let header = ped.lines().next().unwrap();
    assert!(header.ends_with("bins.out\tbins.lo\tbins.hi\tbins.in\tp.out"));
    assert!(!header.contains("PC1"));
    assert_eq!(ped.lines().count(), 3);
    assert_eq!(presentation.pca_dims, None);
}

#[test]
fn chrom_filter_restricts_the_run_and_skips_the_summary() {
    let dir = tempdir().unwrap();
    let bams = vec![write_sample(dir.path(), 0)];

    let prefix = dir.path().join("chr1").to_string_lossy().into_owned();
    let mut config = Config::new(prefix.clone(), bams.clone());
    // resolution tolerates a chr prefix the header does not carry
    config.chrom = Some("chr1".to_string());

    let mut presentation = CollectingPresentation::default();
    pipeline::run(&config, &mut presentation).unwrap();

    let bed = read_bgzf_text(&PathBuf::from(format!("{}-indexcov.bed.gz", prefix)));
    assert_eq!(bed.lines().count(), 1 + 20);
    assert!(bed.lines().skip(1).all(|l| l.starts_with("1\t")));
    assert!(!Path::new(&format!("{}-indexcov.ped", prefix)).exists());

    let mut config = Config::new(prefix, bams);
    config.chrom = Some("22".to_string());
    let err = pipeline::run(&config, &mut presentation).unwrap_err();
    match err {
        CovError::UnknownReference { name } => assert_eq!(name, "22"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn a_missing_index_is_fatal_per_sample() {
    let dir = tempdir().unwrap();
    let with_index = write_sample(dir.path(), 0);
    let orphan = dir.path().join("orphan.bam");
    write_bam(&orphan, "orphan");

    let prefix = dir.path().join("broken").to_string_lossy().into_owned();
    let config = Config::new(prefix, vec![with_index, orphan.clone()]);

    let mut presentation = CollectingPresentation::default();
    match pipeline::run(&config, &mut presentation).unwrap_err() {
        CovError::MissingIndex { path } => assert_eq!(path, orphan),
        other => panic!("unexpected error: {}", other),
    }
}
