//! Runs a whole token frequency job inside one process.
//!
//! Partitions are counted in parallel, partial counts are combined and
//! hash-shuffled into reduce partitions, and each reduce partition writes one
//! `part-r-NNNNN` file of `token<TAB>count` lines.

use std::fmt;
use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use uuid::Uuid;

use crate::metrics::{Counters, TokenCounter};
use crate::tokenizer::TokenizerRegistry;
use crate::{Error, JobConfig};

pub mod engine;

/// Printed when the command line cannot be parsed.
pub const USAGE: &str = "Usage: <Comma separated input paths> <Output path>";

/// Marker written once every output file is complete.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Comma separated input paths: files, directories or glob patterns
    pub input: String,

    /// Output directory, must not exist yet
    pub output: PathBuf,

    /// Tokenizer selector, e.g. `standard`, `words` or `pattern:<regex>`
    #[arg(short, long)]
    pub tokenizer: Option<String>,

    /// Number of reduce partitions (output files)
    #[arg(short, long)]
    pub reducers: Option<u32>,

    /// Skip the combiner before the shuffle
    #[arg(long)]
    pub no_combiner: bool,

    /// Maximum number of records per partition
    #[arg(long)]
    pub split_records: Option<usize>,

    /// JSON job configuration; flags override its values
    #[arg(short, long)]
    pub conf: Option<PathBuf>,
}

impl Args {
    /// The job configuration: the `--conf` file if given, then flags on top.
    pub fn job_config(&self) -> Result<JobConfig> {
        let mut config = match &self.conf {
            Some(path) => JobConfig::from_file(path)?,
            None => JobConfig::default(),
        };
        if let Some(tokenizer) = &self.tokenizer {
            config.tokenizer = tokenizer.clone();
        }
        if let Some(reducers) = self.reducers {
            config.num_reduce_partitions = reducers;
        }
        if self.no_combiner {
            config.combine = false;
        }
        if let Some(split_records) = self.split_records {
            config.split_records = Some(split_records);
        }
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub inputs: Vec<String>,
    pub output: PathBuf,
    pub config: JobConfig,
}

impl Job {
    /// A job over the comma separated `input` paths.
    pub fn new(input: &str, output: impl Into<PathBuf>, config: JobConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            inputs: input
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            output: output.into(),
            config,
        }
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        Ok(Self::new(&args.input, args.output.clone(), args.job_config()?))
    }
}

/// What a finished job did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobReport {
    pub partitions: usize,
    pub records: u64,
    /// Sum over partitions of distinct tokens flushed.
    pub distinct_tokens: u64,
    /// Token occurrences in the whole input.
    pub total_occurrences: u64,
    /// Final count records written.
    pub output_records: u64,
    pub output_files: Vec<PathBuf>,
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "partitions={} records={} {}={} {}={} output_records={} output_files={}",
            self.partitions,
            self.records,
            TokenCounter::NumTokens,
            self.distinct_tokens,
            TokenCounter::CountSum,
            self.total_occurrences,
            self.output_records,
            self.output_files.len()
        )
    }
}

/// Runs `job` with the built-in tokenizers.
pub fn run_job(job: &Job) -> Result<JobReport> {
    run_job_with(job, &TokenizerRegistry::default())
}

/// Runs `job`, resolving its tokenizer from `registry`.
///
/// Configuration problems (invalid values, unknown tokenizer, existing output
/// directory) are reported before any input is read.
pub fn run_job_with(job: &Job, registry: &TokenizerRegistry) -> Result<JobReport> {
    let started = Instant::now();
    let config = &job.config;

    config.validate()?;
    let tokenizer = registry.build(&config.tokenizer)?;
    if job.output.exists() {
        return Err(Error::InvalidConfig(format!(
            "output directory {} already exists",
            job.output.display()
        ))
        .into());
    }
    if job.inputs.is_empty() {
        return Err(Error::InvalidConfig("no input paths given".to_string()).into());
    }
    info!(job = %job.id, tokenizer = %config.tokenizer, reducers = config.num_reduce_partitions, "starting job");

    let files = engine::resolve_inputs(&job.inputs)?;
    let splits = engine::read_splits(&files, config.split_records)?;
    info!(job = %job.id, files = files.len(), partitions = splits.len(), "resolved input");

    let counters = Counters::new();
    let map_output = engine::perform_map(&splits, tokenizer.as_ref(), &counters, config)?;
    let partitions = splits.len();
    drop(splits);
    debug!(job = %job.id, records = map_output.records, shuffled = map_output.shuffled, "map phase done");

    fs::create_dir_all(&job.output)
        .with_context(|| format!("Failed to create output directory {}", job.output.display()))?;
    let reduce_output =
        engine::perform_reduce(map_output.buckets, &job.output, config.num_reduce_partitions)?;
    File::create(job.output.join(SUCCESS_MARKER))
        .with_context(|| format!("Failed to mark {} as complete", job.output.display()))?;

    let report = JobReport {
        partitions,
        records: map_output.records,
        distinct_tokens: counters.get(TokenCounter::NumTokens),
        total_occurrences: counters.get(TokenCounter::CountSum),
        output_records: reduce_output.records,
        output_files: reduce_output.files,
    };
    info!(job = %job.id, elapsed = ?started.elapsed(), "{}", report);
    Ok(report)
}
