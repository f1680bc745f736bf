//! Line codecs for the two text formats that flow through a job.
//!
//! * **Rows** are delimiter-separated fields with no quoting or escaping. A
//!   field must never contain the delimiter; the format has no way to express
//!   it, so rows that violate this simply split into more fields.
//! * **Records** are the map→reduce intermediate form, `key<TAB>value`.

use std::io::{self, Write};

/// Separator between the key and the value of an intermediate record.
pub const KEY_VALUE_SEPARATOR: char = '\t';

/// Field delimiter configuration shared by mappers and reducers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowFormat {
    pub delimiter: char,
}

impl Default for RowFormat {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl RowFormat {
    pub fn with_delimiter(delimiter: char) -> Self {
        Self { delimiter }
    }

    /// Split a row into fields. An empty line yields a single empty field.
    #[inline]
    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        line.split(self.delimiter).collect()
    }

    /// Join fields back into a row.
    pub fn join<S: AsRef<str>>(&self, fields: &[S]) -> String {
        let mut out = String::with_capacity(fields.iter().map(|f| f.as_ref().len() + 1).sum());
        for (idx, field) in fields.iter().enumerate() {
            if idx > 0 {
                out.push(self.delimiter);
            }
            out.push_str(field.as_ref());
        }
        out
    }

    /// Pick the fields at `indices`, in order, and join them.
    ///
    /// Indices beyond the row's width contribute an empty field so the output
    /// always has exactly `indices.len()` fields.
    pub fn select(&self, fields: &[&str], indices: &[usize]) -> String {
        let picked: Vec<&str> = indices
            .iter()
            .map(|&idx| fields.get(idx).copied().unwrap_or(""))
            .collect();
        self.join(&picked)
    }
}

/// Borrowed view of one `key<TAB>value` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyedRecord<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> KeyedRecord<'a> {
    /// Split a line at its first tab. Returns `None` when there is no tab.
    #[inline]
    pub fn parse(line: &'a str) -> Option<Self> {
        line.split_once(KEY_VALUE_SEPARATOR)
            .map(|(key, value)| Self { key, value })
    }
}

/// Write one `key<TAB>value` record followed by a newline.
pub fn write_record<W: Write + ?Sized>(out: &mut W, key: &str, value: &str) -> io::Result<()> {
    writeln!(out, "{key}{KEY_VALUE_SEPARATOR}{value}")
}

/// Strip surrounding whitespace and report whether anything is left.
///
/// Every stage ignores blank lines; this keeps the rule in one place.
#[inline]
pub fn content_of(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Strip the line terminator from an intermediate record, dropping blank lines.
///
/// Unlike [`content_of`] this keeps leading whitespace, so a record whose key
/// is empty (`"\t1,2"`) survives intact.
#[inline]
pub fn record_content(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    (!line.trim().is_empty()).then_some(line)
}
