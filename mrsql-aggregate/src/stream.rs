use std::io::Write;

use mrsql_csv::{KeyedRecord, RowFormat, record_content, write_record};
use mrsql_expr::Literal;
use mrsql_plan::{AggregateFunction, QueryDescriptor, ReduceStats, Reducer};
use mrsql_result::Result;

use crate::AggregateAccumulator;

/// Group-by reducer over a key-sorted `key<TAB>v1,v2,...` stream.
///
/// The i-th value of a record feeds the i-th aggregation of the query. Extra
/// values are ignored and a missing value leaves that column's accumulator
/// untouched. A record whose used values are not all numeric is skipped
/// whole.
///
/// Only the active group is held in memory. Input must be grouped by key:
/// a key that reappears after another key starts a second group and is
/// emitted twice.
pub struct AggregateReducer {
    format: RowFormat,
    current: Option<String>,
    accumulators: Vec<AggregateAccumulator>,
    stats: ReduceStats,
}

impl AggregateReducer {
    pub fn new(descriptor: &QueryDescriptor, format: RowFormat) -> Self {
        Self::with_functions(descriptor.aggregation_functions(), format)
    }

    pub fn with_functions(
        functions: impl IntoIterator<Item = AggregateFunction>,
        format: RowFormat,
    ) -> Self {
        Self {
            format,
            current: None,
            accumulators: functions.into_iter().map(AggregateAccumulator::new).collect(),
            stats: ReduceStats::default(),
        }
    }

    /// Key of the group being accumulated, if any.
    pub fn current_key(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn flush(&mut self, out: &mut dyn Write) -> Result<()> {
        let Some(key) = self.current.take() else {
            return Ok(());
        };
        let rendered: Vec<String> = self
            .accumulators
            .iter()
            .map(|acc| acc.finalize().to_string())
            .collect();
        write_record(out, &key, &self.format.join(&rendered))?;
        for acc in &mut self.accumulators {
            acc.reset();
        }
        self.stats.groups += 1;
        self.stats.rows_emitted += 1;
        Ok(())
    }

    fn skip(&mut self, line: &str, reason: &str) {
        tracing::warn!(line, reason, "skipping malformed aggregation record");
        self.stats.records_skipped += 1;
    }
}

impl Reducer for AggregateReducer {
    fn reduce_line(&mut self, line: &str, out: &mut dyn Write) -> Result<()> {
        let Some(line) = record_content(line) else {
            return Ok(());
        };
        self.stats.records_read += 1;

        let Some(record) = KeyedRecord::parse(line) else {
            self.skip(line, "missing key separator");
            return Ok(());
        };

        let values: Vec<Literal> = if self.accumulators.is_empty() {
            Vec::new()
        } else {
            self.format
                .split(record.value)
                .into_iter()
                .take(self.accumulators.len())
                .map(Literal::coerce)
                .collect()
        };
        if values.iter().any(|value| !value.is_numeric()) {
            self.skip(line, "non-numeric value");
            return Ok(());
        }

        if self.current.as_deref() != Some(record.key) {
            self.flush(out)?;
            self.current = Some(record.key.to_string());
        }
        for (acc, value) in self.accumulators.iter_mut().zip(&values) {
            acc.update(value);
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
