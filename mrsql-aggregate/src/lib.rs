//! Aggregate functions and the streaming group-by reducer.
//!
//! An [`AggregateAccumulator`] folds the values of one column within one
//! group. [`AggregateReducer`] owns one accumulator per aggregated column and
//! drives them over a key-sorted record stream, flushing a result line each
//! time the key changes.

#![forbid(unsafe_code)]

use std::fmt;

use mrsql_expr::Literal;
use mrsql_plan::AggregateFunction;

pub mod stream;

pub use stream::AggregateReducer;

/// Finalized value of one aggregate for one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateValue {
    Integer(i64),
    Float(f64),
    /// MIN or MAX of a group that contributed no values.
    Empty,
}

impl fmt::Display for AggregateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateValue::Integer(v) => write!(f, "{v}"),
            // 3.0, not 3
            AggregateValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            AggregateValue::Float(v) => write!(f, "{v}"),
            AggregateValue::Empty => Ok(()),
        }
    }
}

/// Incremental state of one aggregate function.
///
/// SUM, MIN and MAX stay integral while every input is an integer and switch
/// to floating point as soon as one float arrives. AVG is always a float and
/// COUNT always an integer.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateAccumulator {
    Count {
        value: i64,
    },
    Sum {
        /// Exact integer sum; `None` once it overflowed.
        int: Option<i64>,
        float: f64,
        integral: bool,
    },
    Avg {
        sum: f64,
        count: i64,
    },
    Min {
        int: Option<i64>,
        float: Option<f64>,
        integral: bool,
    },
    Max {
        int: Option<i64>,
        float: Option<f64>,
        integral: bool,
    },
}

impl AggregateAccumulator {
    pub fn new(function: AggregateFunction) -> Self {
        match function {
            AggregateFunction::Count => AggregateAccumulator::Count { value: 0 },
            AggregateFunction::Sum => AggregateAccumulator::Sum {
                int: Some(0),
                float: 0.0,
                integral: true,
            },
            AggregateFunction::Avg => AggregateAccumulator::Avg { sum: 0.0, count: 0 },
            AggregateFunction::Min => AggregateAccumulator::Min {
                int: None,
                float: None,
                integral: true,
            },
            AggregateFunction::Max => AggregateAccumulator::Max {
                int: None,
                float: None,
                integral: true,
            },
        }
    }

    pub fn function(&self) -> AggregateFunction {
        match self {
            AggregateAccumulator::Count { .. } => AggregateFunction::Count,
            AggregateAccumulator::Sum { .. } => AggregateFunction::Sum,
            AggregateAccumulator::Avg { .. } => AggregateFunction::Avg,
            AggregateAccumulator::Min { .. } => AggregateFunction::Min,
            AggregateAccumulator::Max { .. } => AggregateFunction::Max,
        }
    }

    /// Fold one value into the accumulator.
    ///
    /// COUNT counts every value it is given. The other functions ignore
    /// values that are not numeric.
    pub fn update(&mut self, value: &Literal) {
        if let AggregateAccumulator::Count { value: count } = self {
            *count = count.saturating_add(1);
            return;
        }
        let (exact, approx) = match value {
            Literal::Integer(i) => (Some(*i), *i as f64),
            Literal::Float(f) => (None, *f),
            Literal::String(_) => return,
        };

        match self {
            AggregateAccumulator::Count { .. } => {}
            AggregateAccumulator::Sum {
                int,
                float,
                integral,
            } => {
                *float += approx;
                match exact {
                    Some(i) => *int = int.and_then(|sum| sum.checked_add(i)),
                    None => *integral = false,
                }
            }
            AggregateAccumulator::Avg { sum, count } => {
                *sum += approx;
                *count += 1;
            }
            AggregateAccumulator::Min {
                int,
                float,
                integral,
            } => {
                *float = Some(float.map_or(approx, |cur| cur.min(approx)));
                match exact {
                    Some(i) => *int = Some(int.map_or(i, |cur| cur.min(i))),
                    None => *integral = false,
                }
            }
            AggregateAccumulator::Max {
                int,
                float,
                integral,
            } => {
                *float = Some(float.map_or(approx, |cur| cur.max(approx)));
                match exact {
                    Some(i) => *int = Some(int.map_or(i, |cur| cur.max(i))),
                    None => *integral = false,
                }
            }
        }
    }

    pub fn finalize(&self) -> AggregateValue {
        match self {
            AggregateAccumulator::Count { value } => AggregateValue::Integer(*value),
            AggregateAccumulator::Sum {
                int,
                float,
                integral,
            } => match (integral, int) {
                (true, Some(sum)) => AggregateValue::Integer(*sum),
                _ => AggregateValue::Float(*float),
            },
            AggregateAccumulator::Avg { count: 0, .. } => AggregateValue::Float(0.0),
            AggregateAccumulator::Avg { sum, count } => AggregateValue::Float(sum / *count as f64),
            AggregateAccumulator::Min {
                int,
                float,
                integral,
            }
            | AggregateAccumulator::Max {
                int,
                float,
                integral,
            } => match (integral, int, float) {
                (true, Some(i), _) => AggregateValue::Integer(*i),
                (_, _, Some(f)) => AggregateValue::Float(*f),
                _ => AggregateValue::Empty,
            },
        }
    }

    /// Return to the state of a freshly created accumulator.
    pub fn reset(&mut self) {
        *self = Self::new(self.function());
    }
}

/// Apply `function` to a whole sequence of values at once.
pub fn evaluate<'a>(
    function: AggregateFunction,
    values: impl IntoIterator<Item = &'a Literal>,
) -> AggregateValue {
    let mut acc = AggregateAccumulator::new(function);
    for value in values {
        acc.update(value);
    }
    acc.finalize()
}
