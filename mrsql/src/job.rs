use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use mrsql_aggregate::AggregateReducer;
use mrsql_csv::RowFormat;
use mrsql_join::JoinReducer;
use mrsql_map::{HeaderMode, mapper_for};
use mrsql_plan::{
    HeaderSource, MapStats, Mapper, Operator, QueryDescriptor, ReduceStats, Reducer,
};
use mrsql_result::{Error, Result};
use mrsql_sql::parse_for;

use crate::passthrough::PassThroughReducer;

/// Which half of the job an invocation runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Map,
    Reduce,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Map => write!(f, "map"),
            Stage::Reduce => write!(f, "reduce"),
        }
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "map" | "mapper" => Ok(Stage::Map),
            "reduce" | "reducer" => Ok(Stage::Reduce),
            other => Err(Error::InvalidArgument(format!(
                "unknown stage '{other}'; expected map or reduce"
            ))),
        }
    }
}

/// Everything one operator instance needs besides its input stream.
pub struct Job {
    operator: Operator,
    descriptor: QueryDescriptor,
    header_source: Option<Box<dyn HeaderSource>>,
    header: Option<HeaderMode>,
    table: Option<String>,
    format: RowFormat,
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("operator", &self.operator)
            .field("descriptor", &self.descriptor)
            .field("header_source", &self.header_source.is_some())
            .field("table", &self.table)
            .field("format", &self.format)
            .finish()
    }
}

impl Job {
    /// Parse `sql` and check that it suits `operator`.
    pub fn from_query(operator: Operator, sql: &str) -> Result<Self> {
        Ok(Self {
            operator,
            descriptor: parse_for(operator, sql)?,
            header_source: None,
            header: None,
            table: None,
            format: RowFormat::default(),
        })
    }

    /// Take column names from `source` instead of the stream's first line.
    pub fn with_header_source(mut self, source: impl HeaderSource + 'static) -> Self {
        self.header_source = Some(Box::new(source));
        self.header = None;
        self
    }

    /// Table the map input belongs to. Required for join mappers.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_format(mut self, format: RowFormat) -> Self {
        self.format = format;
        self
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn format(&self) -> RowFormat {
        self.format
    }

    /// Header mode for mappers, reading the header source at most once.
    fn header_mode(&mut self) -> Result<HeaderMode> {
        if let Some(mode) = &self.header {
            return Ok(mode.clone());
        }
        let mode = HeaderMode::from_source(self.header_source.as_deref_mut())?;
        self.header = Some(mode.clone());
        Ok(mode)
    }

    /// Mapper for this job's own table.
    pub fn mapper(&mut self) -> Result<Box<dyn Mapper>> {
        let table = self.table.clone();
        self.mapper_for_table(table.as_deref())
    }

    pub(crate) fn mapper_for_table(&mut self, table: Option<&str>) -> Result<Box<dyn Mapper>> {
        let header = self.header_mode()?;
        mapper_for(
            self.operator,
            self.descriptor.clone(),
            header,
            table,
            self.format,
        )
    }

    pub fn reducer(&self) -> Result<Box<dyn Reducer>> {
        let reducer: Box<dyn Reducer> = match self.operator {
            Operator::Filter | Operator::Projection => Box::new(PassThroughReducer::new()),
            Operator::GroupBy => Box::new(AggregateReducer::new(&self.descriptor, self.format)),
            Operator::Join => Box::new(JoinReducer::from_descriptor(
                &self.descriptor,
                self.format,
            )?),
        };
        Ok(reducer)
    }
}

/// Counters reported by one [`run`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunSummary {
    Map(MapStats),
    Reduce(ReduceStats),
}

/// Run one stage of `job`, streaming `input` to `output` line by line.
///
/// Output already written stays written when a later line fails.
pub fn run<R, W>(stage: Stage, job: &mut Job, input: R, mut output: W) -> Result<RunSummary>
where
    R: BufRead,
    W: Write,
{
    tracing::debug!(%stage, operator = %job.operator(), "starting stage");
    let summary = match stage {
        Stage::Map => {
            let mut mapper = job.mapper()?;
            for line in input.lines() {
                mapper.map_line(&line?, &mut output)?;
            }
            mapper.finish(&mut output)?;
            RunSummary::Map(mapper.stats())
        }
        Stage::Reduce => {
            let mut reducer = job.reducer()?;
            for line in input.lines() {
                reducer.reduce_line(&line?, &mut output)?;
            }
            reducer.finish(&mut output)?;
            RunSummary::Reduce(reducer.stats())
        }
    };
    output.flush()?;
    tracing::debug!(?summary, "stage finished");
    Ok(summary)
}
