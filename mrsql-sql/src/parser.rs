use std::sync::OnceLock;

use mrsql_expr::CompareOp;
use mrsql_plan::{AggregateFunction, ColumnRef, JoinSpec, Operator, QueryDescriptor};
use mrsql_result::{Error, Result};
use regex::Regex;

static SELECT_FROM_RE: OnceLock<Regex> = OnceLock::new();
static WHERE_RE: OnceLock<Regex> = OnceLock::new();
static CONDITION_RE: OnceLock<Regex> = OnceLock::new();
static GROUP_BY_RE: OnceLock<Regex> = OnceLock::new();
static INNER_JOIN_RE: OnceLock<Regex> = OnceLock::new();
static AGGREGATE_ITEM_RE: OnceLock<Regex> = OnceLock::new();

fn select_from_re() -> &'static Regex {
    SELECT_FROM_RE.get_or_init(|| {
        Regex::new(r"(?is)\bSELECT\s+(.*?)\s+FROM\s+(\w+)").expect("valid SELECT regex")
    })
}

/// Text between WHERE and the next GROUP BY / ORDER BY, or the end. A
/// GROUP BY keyword only ends the clause when a column name follows it, so a
/// predicate on a column called `groupby` stays inside WHERE.
fn where_re() -> &'static Regex {
    WHERE_RE.get_or_init(|| {
        Regex::new(r"(?is)\bWHERE\s+(.*?)(?:\s+GROUP ?BY\s+\w|\s+ORDER BY\b|$)")
            .expect("valid WHERE regex")
    })
}

/// `<identifier> <operator> <value>`; the operator is any run of `=<>!` so
/// that unsupported spellings reach [`CompareOp::from_str`] and are rejected
/// rather than silently skipped.
fn condition_re() -> &'static Regex {
    CONDITION_RE.get_or_init(|| {
        Regex::new(r#"(\w+)\s*([=<>!]+)\s*(?:'([^']*)'|"([^"]*)"|([^\s,]+))"#)
            .expect("valid condition regex")
    })
}

/// `GROUPBY` is accepted as a legacy spelling of `GROUP BY`. The column list
/// must start with an identifier.
fn group_by_re() -> &'static Regex {
    GROUP_BY_RE.get_or_init(|| {
        Regex::new(r"(?is)\bGROUP ?BY\s+(\w.*?)\s*(?:\bORDER BY\b|$)")
            .expect("valid GROUP BY regex")
    })
}

fn inner_join_re() -> &'static Regex {
    INNER_JOIN_RE.get_or_init(|| {
        Regex::new(
            r"(?is)\bSELECT\s+(.*?)\s+FROM\s+(\w+)\s+INNER\s+JOIN\s+(\w+)\s+ON\s+(\w+\.\w+)\s*=\s*(\w+\.\w+)",
        )
        .expect("valid INNER JOIN regex")
    })
}

fn aggregate_item_re() -> &'static Regex {
    AGGREGATE_ITEM_RE.get_or_init(|| {
        Regex::new(r"^(?i)(SUM|AVG|MAX|MIN|COUNT)\s*\(\s*([^()]*?)\s*\)$")
            .expect("valid aggregate regex")
    })
}

/// Parse `sql` into a descriptor without checking it against an operator.
pub fn parse_query(sql: &str) -> Result<QueryDescriptor> {
    let sql = sql.trim().trim_end_matches(';');
    tracing::debug!(sql, "parsing query");

    let select = select_from_re()
        .captures(sql)
        .ok_or_else(|| Error::invalid_query("expected SELECT <items> FROM <table>"))?;
    let items = select.get(1).map_or("", |m| m.as_str());
    let table = select.get(2).map_or("", |m| m.as_str());

    let mut builder = QueryDescriptor::builder().table(table);

    let items: Vec<&str> = items.split(',').map(str::trim).collect();
    if items.iter().any(|item| item.is_empty()) {
        return Err(Error::invalid_query("empty item in SELECT list"));
    }
    if items.as_slice() == ["*"] {
        builder = builder.wildcard();
    } else {
        for item in items {
            if item == "*" {
                return Err(Error::invalid_query(
                    "'*' cannot be combined with other SELECT items",
                ));
            }
            match aggregate_item_re().captures(item) {
                Some(caps) => {
                    let function: AggregateFunction = caps[1].parse()?;
                    let column = &caps[2];
                    if column.is_empty() {
                        return Err(Error::invalid_query(format!(
                            "aggregate {function} needs a column"
                        )));
                    }
                    builder = builder.aggregate(column, function);
                }
                None => builder = builder.project(item),
            }
        }
    }

    if let Some(where_caps) = where_re().captures(sql) {
        let conditions = where_caps.get(1).map_or("", |m| m.as_str());
        for caps in condition_re().captures_iter(conditions) {
            let op: CompareOp = caps[2].parse()?;
            let value = caps
                .get(3)
                .or_else(|| caps.get(4))
                .or_else(|| caps.get(5))
                .map_or("", |m| m.as_str());
            builder = builder.predicate(&caps[1], op, value);
        }
    }

    if let Some(group_caps) = group_by_re().captures(sql) {
        let columns = group_caps.get(1).map_or("", |m| m.as_str());
        for column in columns.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            builder = builder.group_by(column);
        }
    }

    if let Some(join_caps) = inner_join_re().captures(sql) {
        let on_left: ColumnRef = join_caps[4].parse()?;
        let on_right: ColumnRef = join_caps[5].parse()?;
        builder = builder.join(JoinSpec {
            left_table: join_caps[2].to_string(),
            right_table: join_caps[3].to_string(),
            on_left,
            on_right,
        });
    }

    let descriptor = builder.build();
    tracing::trace!(?descriptor, "parsed query");
    Ok(descriptor)
}

/// Parse `sql` and check that it can drive `operator`.
pub fn parse_for(operator: Operator, sql: &str) -> Result<QueryDescriptor> {
    let descriptor = parse_query(sql)?;
    descriptor.validate_for(operator)?;
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn where_stops_before_group_by() {
        let desc =
            parse_query("SELECT a, SUM(b) FROM t WHERE a > 1 GROUP BY a").expect("parse");
        assert_eq!(desc.predicates().len(), 1);
        assert_eq!(desc.group_by(), ["a".to_string()]);
    }

    #[test]
    fn trailing_semicolon_is_ignored() {
        let desc = parse_query("SELECT a FROM t GROUP BY a;").expect("parse");
        assert_eq!(desc.group_by(), ["a".to_string()]);
    }

    #[test]
    fn column_named_groupby_stays_in_where() {
        let desc = parse_query("SELECT * FROM t WHERE groupby = 1").expect("parse");
        assert_eq!(desc.predicates().len(), 1);
        assert_eq!(desc.predicates()[0].column, "groupby");
        assert!(desc.group_by().is_empty());

        let desc =
            parse_query("SELECT groupby, COUNT(x) FROM t WHERE groupby > 1 GROUPBY groupby")
                .expect("parse");
        assert_eq!(desc.predicates().len(), 1);
        assert_eq!(desc.group_by(), ["groupby".to_string()]);
    }

    #[test]
    fn join_rejects_where_clause() {
        let sql = "SELECT * FROM views INNER JOIN carts ON views.cid = carts.cid WHERE nosuch = 1";
        assert!(matches!(
            parse_for(Operator::Join, sql),
            Err(Error::InvalidQuery(_))
        ));
        let sql = "SELECT * FROM views INNER JOIN carts ON views.cid = carts.cid";
        assert!(parse_for(Operator::Join, sql).is_ok());
    }
}
