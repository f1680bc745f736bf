//! Query descriptors and schema binding for mrsql.
//!
//! The parser in `mrsql-sql` produces a [`QueryDescriptor`]. Before the first
//! data row a mapper resolves a [`Schema`], either from the stream's own first
//! line or from a [`HeaderSource`], and binds the descriptor's column names to
//! positional indices (see [`binding`]).

pub mod binding;
pub mod plans;
pub mod schema;
pub mod stage;

pub use binding::{GroupByBindings, JoinBindings, SelectBindings};
pub use plans::{
    AggregateFunction, AggregateItem, ColumnRef, JoinSpec, Operator, PredicateSpec, Projection,
    QueryDescriptor, QueryDescriptorBuilder,
};
pub use schema::{FileHeader, HeaderSource, Schema, StaticHeader};
pub use stage::{MapStats, Mapper, ReduceStats, Reducer};
