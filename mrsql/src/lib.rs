//! mrsql: restricted SQL executed as streaming map and reduce steps.
//!
//! A query such as
//!
//! ```text
//! SELECT VendorID, SUM(fare) FROM tripdata WHERE passenger_count >= 2 GROUP BY VendorID
//! ```
//!
//! runs as two independent programs joined by an external shuffle: every map
//! instance reads one shard of delimited rows and writes `key<TAB>value`
//! lines, the shuffle sorts those lines by key, and every reduce instance
//! folds each run of equal keys into result lines. This crate ties the stages
//! together behind [`run`] and offers [`pipeline::run_local`] for running the
//! whole composition in one process.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use mrsql::{Job, Operator, Stage};
//!
//! let mut job = Job::from_query(
//!     Operator::Filter,
//!     "SELECT VendorID,trip_distance FROM tripdata WHERE VendorID='2' AND trip_distance<='10'",
//! )
//! .unwrap();
//! let input = Cursor::new("VendorID,trip_distance,extra\n2,5,x\n3,5,y\n2,11,z\n");
//! let mut output = Vec::new();
//! mrsql::run(Stage::Map, &mut job, input, &mut output).unwrap();
//! assert_eq!(output, b"2,5\n");
//! ```
//!
//! # Workspace layout
//!
//! - **Parsing** (`mrsql-sql`, `mrsql-plan`): query text to [`QueryDescriptor`].
//! - **Evaluation** (`mrsql-expr`): literal coercion and row predicates.
//! - **Map stage** (`mrsql-map`): filter, projection, group-by and join mappers.
//! - **Reduce stage** (`mrsql-aggregate`, `mrsql-join`): streaming reducers.

#![forbid(unsafe_code)]

mod job;
pub mod passthrough;
pub mod pipeline;

pub use job::{Job, RunSummary, Stage, run};
pub use passthrough::PassThroughReducer;

pub use mrsql_csv::RowFormat;
pub use mrsql_map::HeaderMode;
pub use mrsql_plan::{
    FileHeader, HeaderSource, MapStats, Mapper, Operator, QueryDescriptor, ReduceStats, Reducer,
    StaticHeader,
};
pub use mrsql_result::{Error, Result};
pub use mrsql_sql::{parse_for, parse_query};
