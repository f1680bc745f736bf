use std::io::Write;

use mrsql_csv::{RowFormat, content_of, write_record};
use mrsql_plan::{JoinBindings, MapStats, Mapper, QueryDescriptor, Schema};
use mrsql_result::{Error, Result};

use crate::header::{HeaderEcho, HeaderMode};

/// Emits `join_value<TAB>table,row` for one side of an equi-join.
///
/// A mapper instance reads rows of exactly one table, named at construction.
/// The tag lets the reducer route each row to its side without a schema.
pub struct JoinMapper {
    descriptor: QueryDescriptor,
    table: String,
    format: RowFormat,
    bindings: Option<JoinBindings>,
    echo: HeaderEcho,
    stats: MapStats,
}

impl JoinMapper {
    pub fn new(
        descriptor: QueryDescriptor,
        table: &str,
        header: HeaderMode,
        format: RowFormat,
    ) -> Result<Self> {
        let spec = descriptor.join().ok_or(Error::MissingJoinClause)?;
        if !spec.involves(table) {
            return Err(Error::InvalidArgument(format!(
                "table '{table}' is not part of the join between '{}' and '{}'",
                spec.left_table, spec.right_table
            )));
        }

        let (bindings, echo) = match header {
            HeaderMode::Inline => (None, HeaderEcho::default()),
            HeaderMode::External(columns) => {
                let schema = Schema::new(columns);
                let bindings = JoinBindings::resolve(&descriptor, &schema, table)?;
                (Some(bindings), HeaderEcho::expecting(schema))
            }
        };
        Ok(Self {
            descriptor,
            table: table.to_string(),
            format,
            bindings,
            echo,
            stats: MapStats::default(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Mapper for JoinMapper {
    fn map_line(&mut self, line: &str, out: &mut dyn Write) -> Result<()> {
        let Some(line) = content_of(line) else {
            return Ok(());
        };
        let fields = self.format.split(line);

        let bindings = match &self.bindings {
            Some(_) if self.echo.is_echo(&fields) => {
                self.stats.header_lines += 1;
                return Ok(());
            }
            Some(bindings) => bindings,
            None => {
                let schema = Schema::from_header_line(line, &self.format);
                self.bindings = Some(JoinBindings::resolve(&self.descriptor, &schema, &self.table)?);
                self.stats.header_lines += 1;
                return Ok(());
            }
        };
        self.stats.rows_read += 1;

        let Some(key) = fields.get(bindings.key) else {
            tracing::trace!(table = %self.table, "row too short for join column");
            self.stats.rows_rejected += 1;
            return Ok(());
        };

        let value = format!("{}{}{}", self.table, self.format.delimiter, line);
        write_record(out, key, &value)?;
        self.stats.rows_emitted += 1;
        Ok(())
    }

    fn stats(&self) -> MapStats {
        self.stats
    }
}
