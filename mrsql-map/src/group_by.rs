use std::io::Write;

use mrsql_csv::{RowFormat, content_of, write_record};
use mrsql_plan::{GroupByBindings, MapStats, Mapper, QueryDescriptor, Schema};
use mrsql_result::Result;

use crate::header::{HeaderEcho, HeaderMode};

/// Emits `group_key<TAB>agg_values` for every row passing the WHERE clause.
///
/// The group key joins the group-by column values with the row delimiter;
/// the value joins the aggregated columns' raw text in descriptor order.
/// Every referenced column must exist in the header.
pub struct GroupByMapper {
    descriptor: QueryDescriptor,
    format: RowFormat,
    bindings: Option<GroupByBindings>,
    echo: HeaderEcho,
    stats: MapStats,
}

impl GroupByMapper {
    pub fn new(descriptor: QueryDescriptor, header: HeaderMode, format: RowFormat) -> Result<Self> {
        let (bindings, echo) = match header {
            HeaderMode::Inline => (None, HeaderEcho::default()),
            HeaderMode::External(columns) => {
                let schema = Schema::new(columns);
                let bindings = GroupByBindings::resolve(&descriptor, &schema)?;
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
}

impl Mapper for GroupByMapper {
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
                self.bindings = Some(GroupByBindings::resolve(&self.descriptor, &schema)?);
                self.stats.header_lines += 1;
                return Ok(());
            }
        };
        self.stats.rows_read += 1;

        if !bindings.predicates.matches(&fields) {
            self.stats.rows_rejected += 1;
            return Ok(());
        }

        let key = self.format.select(&fields, &bindings.key);
        let values = self.format.select(&fields, &bindings.values);
        write_record(out, &key, &values)?;
        self.stats.rows_emitted += 1;
        Ok(())
    }

    fn stats(&self) -> MapStats {
        self.stats
    }
}
