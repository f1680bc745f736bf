use std::io::Write;

use mrsql_csv::{RowFormat, content_of};
use mrsql_plan::{MapStats, Mapper, QueryDescriptor, Schema, SelectBindings};
use mrsql_result::Result;

use crate::header::{HeaderEcho, HeaderMode};

/// Filter and projection mapper.
///
/// Rows that satisfy every WHERE predicate are written out, narrowed to the
/// projected columns unless the query selects `*`.
///
/// In [`HeaderMode::Inline`] the first line is taken as the header only when
/// it names every predicate column. Otherwise it is treated as data: the
/// stream is given positional `col_N` names, the k-th predicate reads field
/// k, and rows are written whole.
pub struct SelectMapper {
    descriptor: QueryDescriptor,
    format: RowFormat,
    bindings: Option<SelectBindings>,
    echo: HeaderEcho,
    stats: MapStats,
}

impl SelectMapper {
    pub fn new(descriptor: QueryDescriptor, header: HeaderMode, format: RowFormat) -> Result<Self> {
        let (bindings, echo) = match header {
            HeaderMode::Inline => (None, HeaderEcho::default()),
            HeaderMode::External(columns) => {
                let schema = Schema::new(columns);
                let bindings = SelectBindings::resolve(&descriptor, &schema)?;
                (Some(bindings), HeaderEcho::expecting(schema))
            }
        };
        Ok(Self {
            descriptor,
            format,
            bindings,
            echo,
            stats: MapStats::default(),
        })
    }

    /// Resolve bindings from the first line. Returns `true` when the line was
    /// consumed as the header.
    fn bind_from_first_line(&mut self, fields: &[&str]) -> Result<bool> {
        if SelectBindings::looks_like_header(&self.descriptor, fields) {
            let schema = Schema::new(fields.iter().map(|f| f.to_string()).collect());
            self.bindings = Some(SelectBindings::resolve(&self.descriptor, &schema)?);
            self.stats.header_lines += 1;
            return Ok(true);
        }
        tracing::debug!(
            columns = ?Schema::synthetic(fields.len()).columns(),
            "first line lacks predicate columns; treating it as data"
        );
        self.bindings = Some(SelectBindings::positional(&self.descriptor));
        Ok(false)
    }
}

impl Mapper for SelectMapper {
    fn map_line(&mut self, line: &str, out: &mut dyn Write) -> Result<()> {
        let Some(line) = content_of(line) else {
            return Ok(());
        };
        let fields = self.format.split(line);

        if self.bindings.is_none() {
            if self.bind_from_first_line(&fields)? {
                return Ok(());
            }
        } else if self.echo.is_echo(&fields) {
            self.stats.header_lines += 1;
            return Ok(());
        }

        let Some(bindings) = &self.bindings else {
            return Ok(());
        };
        self.stats.rows_read += 1;

        if !bindings.predicates.matches(&fields) {
            self.stats.rows_rejected += 1;
            return Ok(());
        }

        match &bindings.projection {
            None => writeln!(out, "{line}")?,
            Some(indices) => writeln!(out, "{}", self.format.select(&fields, indices))?,
        }
        self.stats.rows_emitted += 1;
        Ok(())
    }

    fn stats(&self) -> MapStats {
        self.stats
    }
}
