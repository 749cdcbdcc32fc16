//! tilecov - coverage estimates straight from BAM indexes
//!
//! ```bash
//! # whole-genome coverage profile for a cohort
//! tilecov -p results/cohort1 *.bam
//!
//! # a single chromosome, with GL contigs kept in the plotted set
//! tilecov -p results/chr20 -c chr20 -e *.bam
//! ```

use anyhow::Result;
use env_logger::Env;
use log::error;
use std::path::PathBuf;
use structopt::StructOpt;
use tilecov_lib::config::Config;
use tilecov_lib::core::concurrency::configure_global_thread_pool;
use tilecov_lib::core::errors::is_broken_pipe;
use tilecov_lib::pipeline;
use tilecov_lib::presentation::DiscardPresentation;

#[derive(Debug, StructOpt)]
#[structopt(name = "tilecov", rename_all = "kebab-case", author, about)]
/// Estimate per-chromosome coverage, copy number and sample QC from the
/// index files of one or more alignment archives.
struct Args {
    /// Prefix for output files.
    #[structopt(long, short = "p")]
    prefix: String,

    /// Plot unplaced contigs like GL000201.1, which are skipped by default.
    #[structopt(long, short = "e")]
    include_gl: bool,

    /// Sex chromosome(s) used to infer sex; the first populates the sex
    /// column of the ped file.
    #[structopt(long = "sex", short = "X", default_value = "X,Y", use_delimiter = true)]
    sex_chromosomes: Vec<String>,

    /// Optional chromosome to extract depth for. Default is the entire
    /// genome.
    #[structopt(long, short = "c")]
    chrom: Option<String>,

    /// Expected ploidy of the samples.
    #[structopt(long, default_value = "2")]
    ploidy: u32,

    /// Number of worker threads; defaults to the available CPUs.
    #[structopt(long, short = "t")]
    threads: Option<usize>,

    /// Indexed BAM(s) for which to estimate coverage.
    #[structopt(name = "bams", required = true, parse(from_os_str))]
    bam_inputs: Vec<PathBuf>,
}

fn try_run(args: Args) -> Result<()> {
    configure_global_thread_pool(args.threads)?;

    let mut config = Config::new(args.prefix, args.bam_inputs);
    config.include_gl = args.include_gl;
    config.sex_chromosomes = args.sex_chromosomes;
    config.chrom = args.chrom;
    config.ploidy = args.ploidy;

    let mut presentation = DiscardPresentation;
    pipeline::run(&config, &mut presentation)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = try_run(Args::from_args()) {
        if is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{}", err);
        std::process::exit(1);
    }
    Ok(())
}
