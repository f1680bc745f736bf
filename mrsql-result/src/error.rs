use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all mrsql operations.
///
/// Every variant is fatal for the mapper or reducer invocation that raised it.
/// Output lines that were already written stay written; the stream format is
/// append-only, so a partially completed run never corrupts earlier lines.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading the input stream, a header file, or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The query string does not have the `SELECT ... FROM ...` shape, or it is
    /// structurally incompatible with the requested operator.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The operator filters rows but the query carries no usable WHERE predicate.
    #[error("no valid WHERE clause found")]
    MissingPredicate,

    /// The operator joins two tables but the query has no `INNER JOIN ... ON ...`.
    #[error("no INNER JOIN ... ON ... clause found")]
    MissingJoinClause,

    /// A column referenced by the query is absent from the resolved schema.
    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    /// A predicate uses a comparison operator the evaluator does not implement.
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// A caller-supplied argument is invalid (unknown stage, unknown table tag, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required argument is missing.
    #[error("usage: {0}")]
    Usage(String),

    /// Violated internal invariant. Indicates a bug rather than bad input.
    #[error("an internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create an [`Error::InvalidQuery`] from any displayable value.
    ///
    /// ```
    /// use mrsql_result::Error;
    ///
    /// let err = Error::invalid_query("missing FROM clause");
    /// assert!(matches!(err, Error::InvalidQuery(msg) if msg.contains("FROM")));
    /// ```
    #[inline]
    pub fn invalid_query<E: fmt::Display>(err: E) -> Self {
        Error::InvalidQuery(err.to_string())
    }

    /// Create an [`Error::UnknownColumn`] for `column`.
    #[inline]
    pub fn unknown_column(column: impl Into<String>) -> Self {
        Error::UnknownColumn {
            column: column.into(),
        }
    }
}
