//! Single-process composition of map, shuffle and reduce.
//!
//! Reproduces `mapper | sort | reducer` for tests and small inputs. Every
//! shard gets a fresh mapper, so each shard may carry its own header line.
//! All intermediate lines are held in memory for the sort.

use std::io::{BufRead, Write};

use mrsql_csv::KeyedRecord;
use mrsql_plan::{MapStats, ReduceStats};
use mrsql_result::{Error, Result};

use crate::job::Job;

/// One map input, optionally naming the table its rows belong to.
#[derive(Debug)]
pub struct Shard<R> {
    pub table: Option<String>,
    pub input: R,
}

impl<R: BufRead> Shard<R> {
    pub fn new(input: R) -> Self {
        Self { table: None, input }
    }

    /// Shard of one side of a join.
    pub fn for_table(table: impl Into<String>, input: R) -> Self {
        Self {
            table: Some(table.into()),
            input,
        }
    }
}

/// Counters from both stages of a local run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub shards: usize,
    pub map: MapStats,
    pub reduce: ReduceStats,
}

/// Map every shard, sort the intermediate lines by key and reduce them.
///
/// The sort is stable, so lines sharing a key keep their map order. A shard
/// without a table falls back to the job's table.
pub fn run_local<I, R, W>(job: &mut Job, shards: I, mut output: W) -> Result<PipelineSummary>
where
    I: IntoIterator<Item = Shard<R>>,
    R: BufRead,
    W: Write,
{
    let mut summary = PipelineSummary::default();
    let mut intermediate = Vec::new();

    for shard in shards {
        let table = shard.table.or_else(|| job.table().map(str::to_string));
        let mut mapper = job.mapper_for_table(table.as_deref())?;
        for line in shard.input.lines() {
            mapper.map_line(&line?, &mut intermediate)?;
        }
        mapper.finish(&mut intermediate)?;
        summary.map.absorb(mapper.stats());
        summary.shards += 1;
    }

    let text = String::from_utf8(intermediate)
        .map_err(|err| Error::Internal(format!("map output is not UTF-8: {err}")))?;
    let mut lines: Vec<&str> = text.lines().collect();
    lines.sort_by(|a, b| shuffle_key(a).cmp(shuffle_key(b)));
    tracing::debug!(
        shards = summary.shards,
        records = lines.len(),
        "shuffled map output"
    );

    let mut reducer = job.reducer()?;
    for line in lines {
        reducer.reduce_line(line, &mut output)?;
    }
    reducer.finish(&mut output)?;
    output.flush()?;
    summary.reduce = reducer.stats();
    Ok(summary)
}

fn shuffle_key(line: &str) -> &str {
    KeyedRecord::parse(line).map_or(line, |record| record.key)
}
