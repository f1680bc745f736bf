//! Restricted SQL front end.
//!
//! Two query shapes are understood:
//!
//! ```text
//! SELECT <items> FROM <table> [WHERE <cond> (AND <cond>)*] [GROUP BY <cols>]
//! SELECT <items> FROM <t1> INNER JOIN <t2> ON <t1.col> = <t2.col>
//! ```
//!
//! Parsing is pattern based rather than grammar based: each clause is located
//! independently and anything outside the recognised clauses is ignored.
//! Keywords are case-insensitive.

pub mod parser;

pub use parser::{parse_for, parse_query};
