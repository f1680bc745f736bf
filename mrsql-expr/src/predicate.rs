//! Evaluate a conjunction of `column <op> literal` conditions against one row.
//!
//! Each condition compares numerically when both the row field and the
//! literal coerce to numbers, and lexically on the raw text otherwise.

use std::cmp::Ordering;

use crate::expr::CompareOp;
use crate::literal::Literal;

/// One condition bound to a positional field index.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub index: usize,
    pub op: CompareOp,
    literal: Literal,
    raw: String,
}

impl FieldPredicate {
    pub fn new(index: usize, op: CompareOp, value: impl Into<String>) -> Self {
        let raw = value.into();
        Self {
            index,
            op,
            literal: Literal::coerce(&raw),
            raw,
        }
    }

    /// Return `true` when the row's field satisfies the condition.
    ///
    /// A row too short to contain the bound field never satisfies it.
    pub fn matches(&self, fields: &[&str]) -> bool {
        let Some(field) = fields.get(self.index) else {
            tracing::trace!(
                index = self.index,
                width = fields.len(),
                "predicate field beyond row width"
            );
            return false;
        };
        self.op.holds(self.compare(field))
    }

    fn compare(&self, field: &str) -> Option<Ordering> {
        if let Some(target) = self.literal.as_f64() {
            match Literal::coerce(field) {
                Literal::Integer(value) => {
                    if let Literal::Integer(target) = self.literal {
                        return Some(value.cmp(&target));
                    }
                    return (value as f64).partial_cmp(&target);
                }
                Literal::Float(value) => return value.partial_cmp(&target),
                Literal::String(_) => {}
            }
        }
        Some(field.cmp(self.raw.as_str()))
    }
}

/// Logical AND of field predicates. An empty conjunction accepts every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conjunction {
    terms: Vec<FieldPredicate>,
}

impl Conjunction {
    pub fn new(terms: Vec<FieldPredicate>) -> Self {
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[FieldPredicate] {
        &self.terms
    }

    /// Evaluate every term, stopping at the first one that fails.
    #[inline]
    pub fn matches(&self, fields: &[&str]) -> bool {
        self.terms.iter().all(|term| term.matches(fields))
    }
}

impl FromIterator<FieldPredicate> for Conjunction {
    fn from_iter<T: IntoIterator<Item = FieldPredicate>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
