//! Comparison operators accepted in WHERE clauses.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use mrsql_result::Error;

/// Binary comparison between a row field and a literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    /// The operator as written in a query.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        }
    }

    /// Decide the comparison from the ordering of `field` relative to the literal.
    ///
    /// `None` means the two values are unordered (a NaN was involved); only
    /// `!=` holds in that case.
    #[inline]
    pub fn holds(self, ordering: Option<Ordering>) -> bool {
        match self {
            CompareOp::Eq => ordering == Some(Ordering::Equal),
            CompareOp::NotEq => ordering != Some(Ordering::Equal),
            CompareOp::Lt => ordering == Some(Ordering::Less),
            CompareOp::LtEq => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            CompareOp::Gt => ordering == Some(Ordering::Greater),
            CompareOp::GtEq => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for CompareOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::NotEq),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::LtEq),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::GtEq),
            other => Err(Error::UnsupportedOperator(other.to_string())),
        }
    }
}
