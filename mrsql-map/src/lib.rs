//! Map stage: turn each raw input row into zero or one output line.
//!
//! * [`SelectMapper`] (filter, projection) prints qualifying rows directly.
//! * [`GroupByMapper`] emits `group_key<TAB>agg_values` for the shuffle.
//! * [`JoinMapper`] emits `join_value<TAB>table,row` for the shuffle.
//!
//! Mappers keep no state across rows beyond the one-time schema resolution,
//! so any number of them may run over disjoint shards of the input.
#![forbid(unsafe_code)]

mod group_by;
mod header;
mod join;
mod select;

pub use group_by::GroupByMapper;
pub use header::HeaderMode;
pub use join::JoinMapper;
pub use select::SelectMapper;

use mrsql_csv::RowFormat;
use mrsql_plan::{Mapper, Operator, QueryDescriptor};
use mrsql_result::{Error, Result};

/// Build the mapper for `operator`.
///
/// `table` names the join side the input belongs to and is required only for
/// [`Operator::Join`].
pub fn mapper_for(
    operator: Operator,
    descriptor: QueryDescriptor,
    header: HeaderMode,
    table: Option<&str>,
    format: RowFormat,
) -> Result<Box<dyn Mapper>> {
    let mapper: Box<dyn Mapper> = match operator {
        Operator::Filter | Operator::Projection => {
            Box::new(SelectMapper::new(descriptor, header, format)?)
        }
        Operator::GroupBy => Box::new(GroupByMapper::new(descriptor, header, format)?),
        Operator::Join => {
            let table = table.ok_or_else(|| {
                Error::Usage("the join mapper needs the table name of its input".into())
            })?;
            Box::new(JoinMapper::new(descriptor, table, header, format)?)
        }
    };
    Ok(mapper)
}
