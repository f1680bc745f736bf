//! Parser behaviour on the query shapes used by the map/reduce operators.

use mrsql_expr::CompareOp;
use mrsql_plan::{AggregateFunction, ColumnRef, Operator, Projection};
use mrsql_result::Error;
use mrsql_sql::{parse_for, parse_query};

#[test]
fn filter_query_with_quoted_literals() {
    let desc = parse_for(
        Operator::Filter,
        "SELECT VendorID, passenger_count, trip_distance FROM tripdata \
         WHERE VendorID = '2' AND passenger_count >= '4' AND trip_distance <= '10'",
    )
    .expect("parse filter");

    assert_eq!(desc.table(), Some("tripdata"));
    assert_eq!(
        desc.projection(),
        &Projection::Columns(vec![
            "VendorID".into(),
            "passenger_count".into(),
            "trip_distance".into()
        ])
    );

    let preds: Vec<(&str, CompareOp, &str)> = desc
        .predicates()
        .iter()
        .map(|p| (p.column.as_str(), p.op, p.value.as_str()))
        .collect();
    assert_eq!(
        preds,
        vec![
            ("VendorID", CompareOp::Eq, "2"),
            ("passenger_count", CompareOp::GtEq, "4"),
            ("trip_distance", CompareOp::LtEq, "10"),
        ]
    );
}

#[test]
fn unquoted_and_compact_conditions() {
    let desc = parse_query("select * from t where age>=4 and status=active and score!=0.5")
        .expect("parse");
    assert!(desc.projection().is_wildcard());
    let ops: Vec<CompareOp> = desc.predicates().iter().map(|p| p.op).collect();
    assert_eq!(ops, vec![CompareOp::GtEq, CompareOp::Eq, CompareOp::NotEq]);
    assert_eq!(desc.predicates()[1].value, "active");
    assert_eq!(desc.predicates()[2].value, "0.5");
}

#[test]
fn quoted_literal_may_contain_spaces() {
    let desc = parse_query("SELECT * FROM t WHERE city = 'New York'").expect("parse");
    assert_eq!(desc.predicates()[0].value, "New York");

    let double = parse_query(r#"SELECT * FROM t WHERE city = "Oslo""#).expect("parse");
    assert_eq!(double.predicates()[0].value, "Oslo");
}

#[test]
fn later_predicate_on_same_column_wins() {
    let desc = parse_query("SELECT * FROM t WHERE a > 1 AND b = 2 AND a < 9").expect("parse");
    assert_eq!(desc.predicates().len(), 2);
    assert_eq!(desc.predicates()[0].column, "a");
    assert_eq!(desc.predicates()[0].op, CompareOp::Lt);
    assert_eq!(desc.predicates()[0].value, "9");
}

#[test]
fn unsupported_operator_spelling_is_rejected() {
    let err = parse_query("SELECT * FROM t WHERE a == 1").unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperator(op) if op == "=="));

    let err = parse_query("SELECT * FROM t WHERE a <> 1").unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperator(op) if op == "<>"));
}

#[test]
fn group_by_with_aggregates() {
    let desc = parse_for(
        Operator::GroupBy,
        "SELECT VendorID, sum(fare_amount), AVG(tip_amount) FROM tripdata GROUP BY VendorID",
    )
    .expect("parse group by");

    assert_eq!(desc.projection().columns(), ["VendorID".to_string()]);
    let aggs: Vec<(&str, AggregateFunction)> = desc
        .aggregations()
        .iter()
        .map(|a| (a.column.as_str(), a.function))
        .collect();
    assert_eq!(
        aggs,
        vec![
            ("fare_amount", AggregateFunction::Sum),
            ("tip_amount", AggregateFunction::Avg),
        ]
    );
    assert_eq!(desc.group_by(), ["VendorID".to_string()]);
}

#[test]
fn legacy_groupby_keyword_and_where_before_it() {
    let desc = parse_query(
        "SELECT payment_type, MAX(fare) FROM tripdata WHERE fare > 0 GROUPBY payment_type, VendorID",
    )
    .expect("parse");
    assert_eq!(desc.predicates().len(), 1);
    assert_eq!(desc.predicates()[0].value, "0");
    assert_eq!(
        desc.group_by(),
        ["payment_type".to_string(), "VendorID".to_string()]
    );
}

#[test]
fn where_clause_stops_at_order_by() {
    let desc = parse_query("SELECT * FROM t WHERE a = 1 ORDER BY b = 2").expect("parse");
    assert_eq!(desc.predicates().len(), 1);
}

#[test]
fn non_aggregate_function_is_a_plain_column() {
    let desc = parse_query("SELECT UPPER(name), COUNT(id) FROM t").expect("parse");
    assert_eq!(desc.projection().columns(), ["UPPER(name)".to_string()]);
    assert_eq!(desc.aggregations()[0].function, AggregateFunction::Count);
}

#[test]
fn inner_join_shape() {
    let desc = parse_for(
        Operator::Join,
        "SELECT * FROM views INNER JOIN carts ON views.category_id = carts.category_id",
    )
    .expect("parse join");

    let join = desc.join().expect("join spec");
    assert_eq!(join.left_table, "views");
    assert_eq!(join.right_table, "carts");
    assert_eq!(join.on_left, ColumnRef::new("views", "category_id"));
    assert_eq!(join.on_right, ColumnRef::new("carts", "category_id"));
    assert_eq!(desc.table(), Some("views"));
}

#[test]
fn operator_specific_failures() {
    assert!(matches!(
        parse_for(Operator::Filter, "SELECT a FROM t"),
        Err(Error::MissingPredicate)
    ));
    assert!(matches!(
        parse_for(Operator::Join, "SELECT a FROM t WHERE a = 1"),
        Err(Error::MissingJoinClause)
    ));
    assert!(matches!(
        parse_for(Operator::Join, "SELECT a FROM t JOIN u ON t.a = u.a"),
        Err(Error::MissingJoinClause)
    ));
    assert!(matches!(
        parse_for(
            Operator::Join,
            "SELECT SUM(v.x) FROM v INNER JOIN c ON v.k = c.k"
        ),
        Err(Error::InvalidQuery(_))
    ));
}

#[test]
fn malformed_select_is_invalid() {
    for sql in [
        "",
        "DELETE FROM t",
        "SELECT a, b",
        "SELECT FROM t",
        "SELECT a,,b FROM t",
        "SELECT *, a FROM t",
    ] {
        assert!(
            matches!(parse_query(sql), Err(Error::InvalidQuery(_))),
            "expected InvalidQuery for {sql:?}"
        );
    }
}
