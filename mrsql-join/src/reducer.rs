use std::io::Write;

use mrsql_csv::{KeyedRecord, RowFormat, record_content};
use mrsql_plan::{JoinSpec, QueryDescriptor, ReduceStats, Reducer};
use mrsql_result::{Error, Result};

use crate::cartesian::write_cross_product;

/// Buffers the rows of one join key per side and emits their cross product.
///
/// Input records look like `key<TAB>tag,row` where `tag` names the table the
/// row came from. Rows tagged with the left table go to the left buffer and
/// rows tagged with the right table to the right buffer. When both sides name
/// the same table a row lands in both, which gives self-join semantics.
///
/// As with aggregation, input must be grouped by key.
pub struct JoinReducer {
    left_table: String,
    right_table: String,
    format: RowFormat,
    current: Option<String>,
    left: Vec<String>,
    right: Vec<String>,
    stats: ReduceStats,
}

impl JoinReducer {
    pub fn new(spec: &JoinSpec, format: RowFormat) -> Self {
        Self {
            left_table: spec.left_table.clone(),
            right_table: spec.right_table.clone(),
            format,
            current: None,
            left: Vec::new(),
            right: Vec::new(),
            stats: ReduceStats::default(),
        }
    }

    pub fn from_descriptor(descriptor: &QueryDescriptor, format: RowFormat) -> Result<Self> {
        let spec = descriptor.join().ok_or(Error::MissingJoinClause)?;
        Ok(Self::new(spec, format))
    }

    /// Rows currently buffered for the active key, as `(left, right)`.
    pub fn buffered(&self) -> (usize, usize) {
        (self.left.len(), self.right.len())
    }

    fn flush(&mut self, out: &mut dyn Write) -> Result<()> {
        let Some(key) = self.current.take() else {
            return Ok(());
        };
        let written = write_cross_product(out, &key, &self.left, &self.right, &self.format)?;
        if written == 0 {
            tracing::trace!(
                key = %key,
                left = self.left.len(),
                right = self.right.len(),
                "join key without a partner"
            );
        }
        self.left.clear();
        self.right.clear();
        self.stats.groups += 1;
        self.stats.rows_emitted += written;
        Ok(())
    }

    fn skip(&mut self, line: &str, reason: &str) {
        tracing::warn!(line, reason, "skipping malformed join record");
        self.stats.records_skipped += 1;
    }
}

impl Reducer for JoinReducer {
    fn reduce_line(&mut self, line: &str, out: &mut dyn Write) -> Result<()> {
        let Some(line) = record_content(line) else {
            return Ok(());
        };
        self.stats.records_read += 1;

        let Some(record) = KeyedRecord::parse(line) else {
            self.skip(line, "missing key separator");
            return Ok(());
        };
        let Some((tag, row)) = record.value.split_once(self.format.delimiter) else {
            self.skip(line, "missing table tag");
            return Ok(());
        };
        let to_left = tag == self.left_table;
        let to_right = tag == self.right_table;
        if !to_left && !to_right {
            self.skip(line, "unknown table tag");
            return Ok(());
        }

        if self.current.as_deref() != Some(record.key) {
            self.flush(out)?;
            self.current = Some(record.key.to_string());
        }
        if to_left {
            self.left.push(row.to_string());
        }
        if to_right {
            self.right.push(row.to_string());
        }
        Ok(())
    }

    fn finish(&mut self, out: &mut dyn Write) -> Result<()> {
        self.flush(out)
    }

    fn stats(&self) -> ReduceStats {
        self.stats
    }
}
