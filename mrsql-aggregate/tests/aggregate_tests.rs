//! Streaming group-by reduction over key-sorted records.

use mrsql_aggregate::AggregateReducer;
use mrsql_csv::RowFormat;
use mrsql_plan::{AggregateFunction, Operator, Reducer};
use mrsql_sql::parse_for;
use mrsql_test_utils::{init_tracing_for_tests, reduce_all};

use AggregateFunction::*;

fn reducer(functions: &[AggregateFunction]) -> AggregateReducer {
    AggregateReducer::with_functions(functions.iter().copied(), RowFormat::default())
}

#[test]
fn sum_and_avg_per_key() {
    init_tracing_for_tests();
    let descriptor = parse_for(
        Operator::GroupBy,
        "SELECT k, SUM(x), AVG(y) FROM t GROUP BY k",
    )
    .expect("parse");
    let mut reducer = AggregateReducer::new(&descriptor, RowFormat::default());
    let out = reduce_all(&mut reducer, &["A\t1,2", "A\t3,4", "B\t5,6"]);
    assert_eq!(out, vec!["A\t4,3.0", "B\t5,6.0"]);

    let stats = reducer.stats();
    assert_eq!(stats.records_read, 3);
    assert_eq!(stats.groups, 2);
    assert_eq!(stats.records_skipped, 0);
    assert_eq!(reducer.current_key(), None);
}

#[test]
fn every_key_is_emitted_once_in_first_seen_order() {
    let mut reducer = reducer(&[Count]);
    let out = reduce_all(
        &mut reducer,
        &["b\t1", "b\t1", "a\t1", "c\t1", "c\t1", "c\t1"],
    );
    assert_eq!(out, vec!["b\t2", "a\t1", "c\t3"]);
}

#[test]
fn mixed_inputs_promote_min_and_max_to_float() {
    let mut reducer = reducer(&[Min, Max]);
    assert_eq!(
        reduce_all(&mut reducer, &["k\t3,3", "k\t1.5,7"]),
        vec!["k\t1.5,7.0"]
    );

    let mut integral = self::reducer(&[Min, Max]);
    assert_eq!(
        reduce_all(&mut integral, &["k\t4,4", "k\t-2,-2"]),
        vec!["k\t-2,4"]
    );
}

#[test]
fn missing_values_leave_columns_untouched() {
    let mut reducer = reducer(&[Sum, Min]);
    assert_eq!(
        reduce_all(&mut reducer, &["k\t1,2", "k\t3"]),
        vec!["k\t4,2"]
    );

    let mut empty_min = self::reducer(&[Sum, Min]);
    assert_eq!(reduce_all(&mut empty_min, &["k\t1"]), vec!["k\t1,"]);

    let mut empty_avg = self::reducer(&[Sum, Avg]);
    assert_eq!(reduce_all(&mut empty_avg, &["k\t2"]), vec!["k\t2,0.0"]);
}

#[test]
fn extra_values_are_ignored() {
    let mut reducer = reducer(&[Count]);
    assert_eq!(reduce_all(&mut reducer, &["a\t9,x", "a\t1,2,3"]), vec!["a\t2"]);
}

#[test]
fn malformed_records_are_skipped_and_counted() {
    let mut reducer = reducer(&[Sum]);
    let out = reduce_all(
        &mut reducer,
        &["A\t1", "no separator", "A\tabc", "", "A\t2"],
    );
    assert_eq!(out, vec!["A\t3"]);

    let stats = reducer.stats();
    assert_eq!(stats.records_read, 4);
    assert_eq!(stats.records_skipped, 2);
    assert_eq!(stats.groups, 1);
}

#[test]
fn empty_key_is_a_real_group() {
    let mut reducer = reducer(&[Sum]);
    assert_eq!(
        reduce_all(&mut reducer, &["\t1", "\t2", "z\t5"]),
        vec!["\t3", "z\t5"]
    );
}

#[test]
fn ungrouped_input_splits_groups() {
    let mut reducer = reducer(&[Sum]);
    assert_eq!(
        reduce_all(&mut reducer, &["A\t1", "B\t1", "A\t1"]),
        vec!["A\t1", "B\t1", "A\t1"]
    );
}

#[test]
fn group_by_without_aggregates_emits_distinct_keys() {
    let mut reducer = reducer(&[]);
    assert_eq!(
        reduce_all(&mut reducer, &["1,card\t", "1,card\t", "2,cash\t"]),
        vec!["1,card\t", "2,cash\t"]
    );
}

#[test]
fn empty_input_emits_nothing() {
    let mut reducer = reducer(&[Sum]);
    assert!(reduce_all(&mut reducer, &[]).is_empty());
    assert_eq!(reducer.stats().groups, 0);
}
