//! Error types and result definitions for the mrsql engine.
//!
//! Every mrsql crate returns [`Result<T>`], whose error variant is the single
//! [`Error`] enum defined here. Errors propagate with `?` up to the invocation
//! boundary, where the binary prints them and exits non-zero.
//!
//! # Error Categories
//!
//! - **Query errors** ([`Error::InvalidQuery`], [`Error::MissingPredicate`],
//!   [`Error::MissingJoinClause`], [`Error::UnsupportedOperator`]): the query
//!   string cannot drive the requested operator.
//! - **Schema errors** ([`Error::UnknownColumn`]): a referenced column is absent
//!   from the resolved header.
//! - **Invocation errors** ([`Error::InvalidArgument`], [`Error::Usage`]): the
//!   caller wired the stage up incorrectly.
//! - **I/O errors** ([`Error::Io`]): reading rows or writing output failed.
//!
//! Malformed intermediate lines seen by a reducer are *not* errors. Reducers
//! skip them, log a warning and count them in their stats.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
