//! Row-level expressions: literal coercion, comparison operators and the
//! conjunctive predicate evaluator applied by the map stage.
#![forbid(unsafe_code)]

pub mod expr;
pub use expr::*;

// Mappers only need the evaluator types, re-exported below.
pub mod literal;
pub mod predicate;

pub use literal::Literal;
pub use predicate::{Conjunction, FieldPredicate};
