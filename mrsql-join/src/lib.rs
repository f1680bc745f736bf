//! Reduce side of the two-table equi-join.
//!
//! Mappers tag every row with its table and key it by the join column (see
//! `mrsql-map`). After the shuffle all rows sharing a join value arrive
//! together; [`JoinReducer`] buffers them per side and emits their cross
//! product when the key changes.

#![forbid(unsafe_code)]

pub mod cartesian;
pub mod reducer;

pub use cartesian::write_cross_product;
pub use reducer::JoinReducer;
