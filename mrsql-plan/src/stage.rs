//! Contracts shared by every mapper and reducer.
//!
//! Both stages consume one line at a time and write their output as soon as
//! it is known. Neither holds more than the active group's state between
//! calls.

use std::io::Write;

use mrsql_result::Result;

/// Per-invocation counters reported by a mapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapStats {
    /// Non-blank data lines seen (header lines excluded).
    pub rows_read: u64,
    /// Lines written to the output.
    pub rows_emitted: u64,
    /// Data lines that failed a predicate or lacked a required field.
    pub rows_rejected: u64,
    /// Lines consumed as a header.
    pub header_lines: u64,
}

impl MapStats {
    /// Add another shard's counters into these.
    pub fn absorb(&mut self, other: MapStats) {
        self.rows_read += other.rows_read;
        self.rows_emitted += other.rows_emitted;
        self.rows_rejected += other.rows_rejected;
        self.header_lines += other.header_lines;
    }
}

/// Per-invocation counters reported by a reducer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReduceStats {
    /// Non-blank input lines seen.
    pub records_read: u64,
    /// Malformed lines skipped without affecting any group.
    pub records_skipped: u64,
    /// Distinct keys flushed.
    pub groups: u64,
    /// Lines written to the output.
    pub rows_emitted: u64,
}

/// Stateless-per-row transformation run over one input shard.
pub trait Mapper {
    /// Consume one raw input line, writing zero or one output line.
    fn map_line(&mut self, line: &str, out: &mut dyn Write) -> Result<()>;

    /// Called once after the last line. Mappers hold no pending output, so
    /// the default does nothing.
    fn finish(&mut self, _out: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    fn stats(&self) -> MapStats;
}

/// Key-boundary driven consumer of a key-sorted record stream.
pub trait Reducer {
    /// Consume one raw `key<TAB>value` line.
    fn reduce_line(&mut self, line: &str, out: &mut dyn Write) -> Result<()>;

    /// Flush whatever group is still open at end of input.
    fn finish(&mut self, out: &mut dyn Write) -> Result<()>;

    fn stats(&self) -> ReduceStats;
}
