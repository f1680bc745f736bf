//! Identity reduce step for filter and projection jobs.

use std::io::Write;

use mrsql_csv::content_of;
use mrsql_plan::{ReduceStats, Reducer};
use mrsql_result::Result;

/// Re-emits every non-blank line the mappers produced, trimmed.
///
/// Lines are copied whole. A tab inside a row is data, not a key separator.
#[derive(Debug, Default)]
pub struct PassThroughReducer {
    stats: ReduceStats,
}

impl PassThroughReducer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reducer for PassThroughReducer {
    fn reduce_line(&mut self, line: &str, out: &mut dyn Write) -> Result<()> {
        let Some(row) = content_of(line) else {
            return Ok(());
        };
        self.stats.records_read += 1;
        writeln!(out, "{row}")?;
        self.stats.rows_emitted += 1;
        Ok(())
    }

    fn finish(&mut self, _out: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    fn stats(&self) -> ReduceStats {
        self.stats
    }
}
