//! Bind descriptor column names to positional row indices.
//!
//! Each operator has its own binding type. Resolution happens once per mapper
//! invocation, after the schema is known and before the first data row.

use mrsql_expr::{Conjunction, FieldPredicate};
use mrsql_result::{Error, Result};

use crate::plans::QueryDescriptor;
use crate::schema::Schema;

/// Indices used by the filter and projection mappers.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectBindings {
    pub predicates: Conjunction,
    /// `None` emits rows unmodified.
    pub projection: Option<Vec<usize>>,
}

impl SelectBindings {
    /// Decide whether the first line of a stream is its header.
    ///
    /// The line counts as a header when every predicate column appears among
    /// its fields. A data row that happens to contain each predicate column's
    /// name as a value is misclassified; callers that cannot tolerate that
    /// should supply an external header instead.
    pub fn looks_like_header(descriptor: &QueryDescriptor, fields: &[&str]) -> bool {
        descriptor
            .predicates()
            .iter()
            .all(|pred| fields.contains(&pred.column.as_str()))
    }

    /// Bind against a known schema.
    ///
    /// Predicate columns must exist. Projection columns missing from the
    /// schema are dropped from the output.
    pub fn resolve(descriptor: &QueryDescriptor, schema: &Schema) -> Result<Self> {
        let predicates = bind_predicates_strict(descriptor, schema)?;

        let projection = if descriptor.projection().is_wildcard() {
            None
        } else {
            let mut indices = Vec::with_capacity(descriptor.projection().columns().len());
            for column in descriptor.projection().columns() {
                match schema.index_of(column) {
                    Some(idx) => indices.push(idx),
                    None => tracing::debug!(%column, "dropping projection column absent from header"),
                }
            }
            Some(indices)
        };

        Ok(Self {
            predicates,
            projection,
        })
    }

    /// Bind a headerless stream against the synthetic `col_N` schema.
    ///
    /// Predicates bind by declaration order (the k-th predicate reads field
    /// k) and rows pass through without projection.
    pub fn positional(descriptor: &QueryDescriptor) -> Self {
        let predicates = descriptor
            .predicates()
            .iter()
            .enumerate()
            .map(|(idx, pred)| FieldPredicate::new(idx, pred.op, pred.value.clone()))
            .collect();
        Self {
            predicates,
            projection: None,
        }
    }
}

/// Indices used by the group-by mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupByBindings {
    pub predicates: Conjunction,
    pub key: Vec<usize>,
    /// Aggregated columns, in descriptor order.
    pub values: Vec<usize>,
}

impl GroupByBindings {
    pub fn resolve(descriptor: &QueryDescriptor, schema: &Schema) -> Result<Self> {
        let predicates = bind_predicates_strict(descriptor, schema)?;
        for column in descriptor.projection().columns() {
            schema.require(column)?;
        }
        let key = descriptor
            .group_key_columns()
            .iter()
            .map(|col| schema.require(col))
            .collect::<Result<Vec<_>>>()?;
        let values = descriptor
            .aggregations()
            .iter()
            .map(|agg| schema.require(&agg.column))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            predicates,
            key,
            values,
        })
    }
}

/// Indices used by the join mapper for one side of the join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinBindings {
    pub key: usize,
}

impl JoinBindings {
    /// Bind the join column of `table`.
    pub fn resolve(descriptor: &QueryDescriptor, schema: &Schema, table: &str) -> Result<Self> {
        let spec = descriptor.join().ok_or(Error::MissingJoinClause)?;
        if !spec.involves(table) {
            return Err(Error::InvalidArgument(format!(
                "table '{table}' is not part of the join between '{}' and '{}'",
                spec.left_table, spec.right_table
            )));
        }
        let column = spec.column_for(table).ok_or_else(|| {
            Error::invalid_query(format!("ON clause does not reference table '{table}'"))
        })?;
        Ok(Self {
            key: schema.require(column)?,
        })
    }
}

fn bind_predicates_strict(descriptor: &QueryDescriptor, schema: &Schema) -> Result<Conjunction> {
    descriptor
        .predicates()
        .iter()
        .map(|pred| {
            let index = schema.require(&pred.column)?;
            Ok(FieldPredicate::new(index, pred.op, pred.value.clone()))
        })
        .collect()
}
