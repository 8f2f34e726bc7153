use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use dashmap::DashMap;
use glob::glob;
use rayon::prelude::*;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::utils::{chunk_records, records, string_from_bytes, strip_bom};
use crate::*;

// types related to this engine
type BucketIndex = u32;
pub type Buckets = DashMap<BucketIndex, Vec<PartialCount>>;

/// A slice of one input file's records, counted by one aggregator.
#[derive(Debug, Clone)]
pub struct InputSplit {
    pub path: PathBuf,
    pub index: usize,
    pub data: Bytes,
}

impl fmt::Display for InputSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.index)
    }
}

/// Result of counting one partition.
#[derive(Debug)]
pub struct PartitionOutput {
    pub partials: Vec<PartialCount>,
    pub records: u64,
}

/// Partial counts routed to their reduce partitions.
#[derive(Debug)]
pub struct MapOutput {
    pub buckets: Buckets,
    pub records: u64,
    /// Partial count records that went through the shuffle.
    pub shuffled: u64,
}

#[derive(Debug)]
pub struct ReduceOutput {
    pub records: u64,
    pub files: Vec<PathBuf>,
}

/// Expands input paths into the files to read, in sorted order.
///
/// Patterns containing `*`, `?` or `[` are globbed. Directories are walked
/// recursively. Glob matches and walked entries whose name starts with `_`
/// or `.` are skipped.
pub fn resolve_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.contains(|c: char| matches!(c, '*' | '?' | '[')) {
            let mut matched = 0usize;
            let paths =
                glob(input).with_context(|| format!("Invalid input pattern `{}`", input))?;
            for pathspec in paths {
                let pathspec = pathspec?;
                if pathspec.file_name().map_or(false, is_hidden_name) {
                    continue;
                }
                collect_files(&pathspec, &mut files)?;
                matched += 1;
            }
            if matched == 0 {
                bail!("Input pattern `{}` matches 0 files", input);
            }
        } else {
            let path = PathBuf::from(input);
            if !path.exists() {
                bail!("Input path does not exist: {}", input);
            }
            collect_files(&path, &mut files)?;
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_hidden_name(name: &OsStr) -> bool {
    name.to_str()
        .map(|name| name.starts_with('_') || name.starts_with('.'))
        .unwrap_or(false)
}

fn is_hidden(entry: &DirEntry) -> bool {
    is_hidden_name(entry.file_name())
}

fn collect_files(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if !path.is_dir() {
        files.push(path.to_path_buf());
        return Ok(());
    }
    let walker = WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to list {}", path.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(())
}

/// Reads every file and cuts it into partitions of at most `split_records`
/// records. Without a limit each file is one partition.
pub fn read_splits(files: &[PathBuf], split_records: Option<usize>) -> Result<Vec<InputSplit>> {
    let per_file = files
        .par_iter()
        .map(|path| -> Result<Vec<InputSplit>> {
            let buf = fs::read(path)
                .with_context(|| format!("Failed to read input {}", path.display()))?;
            let buf = strip_bom(Bytes::from(buf));
            let chunks = match split_records {
                Some(max_records) => chunk_records(buf, max_records),
                None => vec![buf],
            };
            Ok(chunks
                .into_iter()
                .enumerate()
                .map(|(index, data)| InputSplit {
                    path: path.clone(),
                    index,
                    data,
                })
                .collect())
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(per_file.into_iter().flatten().collect())
}

/// Counts the records of one partition with a fresh [`LocalAggregator`].
pub fn run_partition(
    split: &InputSplit,
    tokenizer: &dyn Tokenizer,
    metrics: &dyn MetricsSink,
) -> Result<PartitionOutput> {
    let mut aggregator = LocalAggregator::new(tokenizer, metrics);
    let mut n_records = 0u64;
    for record in records(split.data.clone()) {
        aggregator
            .ingest(&string_from_bytes(&record))
            .with_context(|| format!("Failed to count partition {}", split))?;
        n_records += 1;
    }
    let partials = aggregator
        .flush()
        .with_context(|| format!("Failed to flush partition {}", split))?;
    debug!(partition = %split, records = n_records, distinct = partials.len(), "counted partition");
    Ok(PartitionOutput {
        partials,
        records: n_records,
    })
}

/// Counts all partitions in parallel and shuffles the partial counts into
/// `config.num_reduce_partitions` buckets.
///
/// With `config.combine`, the partial counts of every batch of partitions
/// handled together are merged before they are shuffled.
pub fn perform_map(
    splits: &[InputSplit],
    tokenizer: &dyn Tokenizer,
    metrics: &dyn MetricsSink,
    config: &JobConfig,
) -> Result<MapOutput> {
    let num_reduce_worker = config.num_reduce_partitions;
    if num_reduce_worker == 0 {
        bail!("At least one reduce partition is required");
    }
    let n_records = AtomicU64::new(0);

    let batches = splits
        .par_iter()
        .map(|split| -> Result<Vec<PartialCount>> {
            let output = run_partition(split, tokenizer, metrics)?;
            n_records.fetch_add(output.records, Ordering::Relaxed);
            Ok(output.partials)
        })
        .try_fold(Vec::new, |mut batch: Vec<PartialCount>, partials| {
            batch.extend(partials?);
            Ok::<_, anyhow::Error>(batch)
        })
        .map(|batch| -> Result<Vec<PartialCount>> {
            let batch = batch?;
            if !config.combine {
                return Ok(batch);
            }
            let before = batch.len();
            let combined = merge::combine(batch)?;
            trace!(before, after = combined.len(), "combined batch");
            Ok(combined)
        })
        .collect::<Result<Vec<_>>>()?;

    // For each partial count, insert it into a bucket according to the
    // hashed token (mod # reduce partitions).
    let buckets = Buckets::new();
    let shuffled = AtomicU64::new(0);
    batches.into_par_iter().flatten().for_each(|partial| {
        let bucket_no = ihash(partial.token.as_bytes()) % num_reduce_worker;
        buckets.entry(bucket_no).or_default().push(partial);
        shuffled.fetch_add(1, Ordering::Relaxed);
    });

    Ok(MapOutput {
        buckets,
        records: n_records.into_inner(),
        shuffled: shuffled.into_inner(),
    })
}

/// Merges every bucket and writes it to `part-r-NNNNN` under `output_dir`.
///
/// A file is written for each of the `num_reduce_worker` partitions, even
/// when its bucket is empty.
pub fn perform_reduce(
    buckets: Buckets,
    output_dir: &Path,
    num_reduce_worker: u32,
) -> Result<ReduceOutput> {
    let written = (0..num_reduce_worker)
        .into_par_iter()
        .map(|reduce_id| -> Result<(PathBuf, u64)> {
            let mut bkt = buckets
                .remove(&reduce_id)
                .map(|(_, bkt)| bkt)
                .unwrap_or_default();
            bkt.sort_unstable_by(|a, b| a.token.cmp(&b.token));
            let totals = merge::merge_sorted(&bkt)
                .with_context(|| format!("Failed to merge reduce partition {}", reduce_id))?;

            let out_pathspec = output_dir.join(format!("part-r-{:05}", reduce_id));
            write_part(&out_pathspec, &totals)?;
            debug!(reduce_id, records = totals.len(), "wrote reduce partition");
            Ok((out_pathspec, totals.len() as u64))
        })
        .collect::<Result<Vec<_>>>()?;

    let records: u64 = written.iter().map(|(_, n)| n).sum();
    let files: Vec<PathBuf> = written.into_iter().map(|(path, _)| path).collect();
    Ok(ReduceOutput { records, files })
}

fn write_part(path: &Path, totals: &[FinalCount]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out_file = BufWriter::new(file);
    for total in totals {
        writeln!(out_file, "{}\t{}", total.token, total.count)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    out_file
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
