//! Structured form of a restricted SQL query.

use std::fmt;
use std::str::FromStr;

use mrsql_expr::CompareOp;
use mrsql_result::{Error, Result};

/// Relational operator a job runs. Each operator has its own mapper and
/// reducer and places different requirements on the descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    /// WHERE-driven selection, optionally narrowed by a projection.
    Filter,
    /// Column narrowing; WHERE predicates are honoured when present.
    Projection,
    /// Group-by aggregation.
    GroupBy,
    /// Two-table inner equi-join.
    Join,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Filter => write!(f, "filter"),
            Operator::Projection => write!(f, "projection"),
            Operator::GroupBy => write!(f, "groupby"),
            Operator::Join => write!(f, "join"),
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filter" => Ok(Operator::Filter),
            "projection" | "project" => Ok(Operator::Projection),
            "groupby" | "group-by" | "group_by" => Ok(Operator::GroupBy),
            "join" | "inner-join" | "inner_join" => Ok(Operator::Join),
            other => Err(Error::InvalidArgument(format!(
                "unknown operator '{other}'; expected filter, projection, groupby or join"
            ))),
        }
    }
}

/// Aggregate function tag attached to a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Sum,
    Avg,
    Max,
    Min,
    Count,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateFunction::Sum => write!(f, "SUM"),
            AggregateFunction::Avg => write!(f, "AVG"),
            AggregateFunction::Max => write!(f, "MAX"),
            AggregateFunction::Min => write!(f, "MIN"),
            AggregateFunction::Count => write!(f, "COUNT"),
        }
    }
}

impl FromStr for AggregateFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SUM" => Ok(AggregateFunction::Sum),
            "AVG" => Ok(AggregateFunction::Avg),
            "MAX" => Ok(AggregateFunction::Max),
            "MIN" => Ok(AggregateFunction::Min),
            "COUNT" => Ok(AggregateFunction::Count),
            other => Err(Error::invalid_query(format!(
                "unknown aggregate function '{other}'"
            ))),
        }
    }
}

/// Output columns of a query.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Projection {
    /// `SELECT *`: rows pass through unmodified.
    #[default]
    Wildcard,
    Columns(Vec<String>),
}

impl Projection {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Projection::Wildcard)
    }

    /// Named columns; empty for the wildcard.
    pub fn columns(&self) -> &[String] {
        match self {
            Projection::Wildcard => &[],
            Projection::Columns(cols) => cols,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateItem {
    pub column: String,
    pub function: AggregateFunction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredicateSpec {
    pub column: String,
    pub op: CompareOp,
    /// Literal with any surrounding quotes removed.
    pub value: String,
}

/// Fully qualified `table.column` reference from an ON clause.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

impl FromStr for ColumnRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once('.') {
            Some((table, column)) if !table.is_empty() && !column.is_empty() => {
                Ok(ColumnRef::new(table, column))
            }
            _ => Err(Error::invalid_query(format!(
                "expected a table.column reference, got '{s}'"
            ))),
        }
    }
}

/// `FROM left INNER JOIN right ON on_left = on_right`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinSpec {
    pub left_table: String,
    pub right_table: String,
    pub on_left: ColumnRef,
    pub on_right: ColumnRef,
}

impl JoinSpec {
    /// Join column for rows that originate from `table`.
    ///
    /// The ON clause may name its sides in either order, so the reference is
    /// matched by table name rather than position.
    pub fn column_for(&self, table: &str) -> Option<&str> {
        [&self.on_left, &self.on_right]
            .into_iter()
            .find(|col| col.table == table)
            .map(|col| col.column.as_str())
    }

    pub fn involves(&self, table: &str) -> bool {
        self.left_table == table || self.right_table == table
    }
}

/// Immutable result of parsing a query.
///
/// Aggregations and predicates behave as ordered maps keyed by column name: a
/// repeated column keeps the position of its first occurrence and the value of
/// its last.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct QueryDescriptor {
    projection: Projection,
    aggregations: Vec<AggregateItem>,
    predicates: Vec<PredicateSpec>,
    group_by: Vec<String>,
    table: Option<String>,
    join: Option<JoinSpec>,
}

impl QueryDescriptor {
    pub fn builder() -> QueryDescriptorBuilder {
        QueryDescriptorBuilder::default()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn aggregations(&self) -> &[AggregateItem] {
        &self.aggregations
    }

    pub fn predicates(&self) -> &[PredicateSpec] {
        &self.predicates
    }

    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn join(&self) -> Option<&JoinSpec> {
        self.join.as_ref()
    }

    pub fn aggregation_functions(&self) -> Vec<AggregateFunction> {
        self.aggregations.iter().map(|item| item.function).collect()
    }

    /// Columns forming the group key.
    ///
    /// Without a GROUP BY clause the plain projected columns act as the key,
    /// so `SELECT VendorID, SUM(fare) FROM t` groups by `VendorID`. With
    /// neither, every row falls into the single empty-key group.
    pub fn group_key_columns(&self) -> &[String] {
        if self.group_by.is_empty() {
            self.projection.columns()
        } else {
            &self.group_by
        }
    }

    /// Check that the descriptor carries what `operator` needs.
    pub fn validate_for(&self, operator: Operator) -> Result<()> {
        match operator {
            Operator::Filter => {
                if self.predicates.is_empty() {
                    return Err(Error::MissingPredicate);
                }
            }
            Operator::Projection => {}
            Operator::GroupBy => {
                if self.aggregations.is_empty() && self.group_by.is_empty() {
                    return Err(Error::invalid_query(
                        "group-by needs at least one aggregate or GROUP BY column",
                    ));
                }
            }
            Operator::Join => {
                if self.join.is_none() {
                    return Err(Error::MissingJoinClause);
                }
                if !self.aggregations.is_empty() {
                    return Err(Error::invalid_query(
                        "aggregate functions are not supported in join queries",
                    ));
                }
                if !self.predicates.is_empty() {
                    return Err(Error::invalid_query(
                        "WHERE is not supported in join queries",
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct QueryDescriptorBuilder {
    inner: QueryDescriptor,
}

impl QueryDescriptorBuilder {
    pub fn wildcard(mut self) -> Self {
        self.inner.projection = Projection::Wildcard;
        self
    }

    pub fn project(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        match &mut self.inner.projection {
            Projection::Wildcard => self.inner.projection = Projection::Columns(vec![column]),
            Projection::Columns(cols) => cols.push(column),
        }
        self
    }

    pub fn aggregate(mut self, column: impl Into<String>, function: AggregateFunction) -> Self {
        let column = column.into();
        match self.inner.aggregations.iter_mut().find(|a| a.column == column) {
            Some(existing) => existing.function = function,
            None => self.inner.aggregations.push(AggregateItem { column, function }),
        }
        self
    }

    pub fn predicate(
        mut self,
        column: impl Into<String>,
        op: CompareOp,
        value: impl Into<String>,
    ) -> Self {
        let column = column.into();
        let value = value.into();
        match self.inner.predicates.iter_mut().find(|p| p.column == column) {
            Some(existing) => {
                existing.op = op;
                existing.value = value;
            }
            None => self.inner.predicates.push(PredicateSpec { column, op, value }),
        }
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.inner.group_by.push(column.into());
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.inner.table = Some(table.into());
        self
    }

    pub fn join(mut self, spec: JoinSpec) -> Self {
        self.inner.join = Some(spec);
        self
    }

    pub fn build(self) -> QueryDescriptor {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_predicate_keeps_position_and_takes_last_value() {
        let desc = QueryDescriptor::builder()
            .predicate("a", CompareOp::Eq, "1")
            .predicate("b", CompareOp::Gt, "2")
            .predicate("a", CompareOp::Lt, "9")
            .build();
        let preds = desc.predicates();
        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0].column, "a");
        assert_eq!(preds[0].op, CompareOp::Lt);
        assert_eq!(preds[0].value, "9");
        assert_eq!(preds[1].column, "b");
    }

    #[test]
    fn repeated_aggregate_column_takes_last_function() {
        let desc = QueryDescriptor::builder()
            .aggregate("x", AggregateFunction::Sum)
            .aggregate("y", AggregateFunction::Avg)
            .aggregate("x", AggregateFunction::Max)
            .build();
        assert_eq!(
            desc.aggregation_functions(),
            vec![AggregateFunction::Max, AggregateFunction::Avg]
        );
    }

    #[test]
    fn validation_per_operator() {
        let empty = QueryDescriptor::default();
        assert!(matches!(
            empty.validate_for(Operator::Filter),
            Err(Error::MissingPredicate)
        ));
        assert!(matches!(
            empty.validate_for(Operator::GroupBy),
            Err(Error::InvalidQuery(_))
        ));
        assert!(matches!(
            empty.validate_for(Operator::Join),
            Err(Error::MissingJoinClause)
        ));
        assert!(empty.validate_for(Operator::Projection).is_ok());

        let join = JoinSpec {
            left_table: "views".into(),
            right_table: "carts".into(),
            on_left: ColumnRef::new("views", "category_id"),
            on_right: ColumnRef::new("carts", "category_id"),
        };
        let with_where = QueryDescriptor::builder()
            .join(join.clone())
            .predicate("price", CompareOp::Gt, "10")
            .build();
        assert!(matches!(
            with_where.validate_for(Operator::Join),
            Err(Error::InvalidQuery(_))
        ));

        let with_agg = QueryDescriptor::builder()
            .join(join)
            .aggregate("price", AggregateFunction::Sum)
            .build();
        assert!(matches!(
            with_agg.validate_for(Operator::Join),
            Err(Error::InvalidQuery(_))
        ));
    }

    #[test]
    fn join_column_is_matched_by_table_name() {
        let spec = JoinSpec {
            left_table: "views".into(),
            right_table: "carts".into(),
            on_left: ColumnRef::new("carts", "cat"),
            on_right: ColumnRef::new("views", "category"),
        };
        assert_eq!(spec.column_for("views"), Some("category"));
        assert_eq!(spec.column_for("carts"), Some("cat"));
        assert_eq!(spec.column_for("orders"), None);
    }

    #[test]
    fn operator_names() {
        assert_eq!("GroupBy".parse::<Operator>().unwrap(), Operator::GroupBy);
        assert_eq!("inner-join".parse::<Operator>().unwrap(), Operator::Join);
        assert!(matches!(
            "sort".parse::<Operator>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn group_key_falls_back_to_projection() {
        let desc = QueryDescriptor::builder()
            .project("VendorID")
            .aggregate("fare", AggregateFunction::Sum)
            .build();
        assert_eq!(desc.group_key_columns(), ["VendorID".to_string()]);

        let grouped = QueryDescriptor::builder()
            .project("VendorID")
            .group_by("payment_type")
            .build();
        assert_eq!(grouped.group_key_columns(), ["payment_type".to_string()]);
    }
}
