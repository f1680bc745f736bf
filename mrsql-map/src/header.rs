use mrsql_plan::{HeaderSource, Schema};
use mrsql_result::Result;

/// Where a mapper learns its column names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// The first non-blank line of the stream is the header.
    #[default]
    Inline,
    /// Column names supplied before the stream starts.
    External(Vec<String>),
}

impl HeaderMode {
    /// Consult `source` once, or fall back to [`HeaderMode::Inline`].
    pub fn from_source<S: HeaderSource + ?Sized>(source: Option<&mut S>) -> Result<Self> {
        match source {
            Some(source) => Ok(HeaderMode::External(source.read_header()?)),
            None => Ok(HeaderMode::Inline),
        }
    }
}

/// Drops the stream's own copy of an externally supplied header.
///
/// Data files usually still start with their header line even when the
/// header is also provided out of band. Only the very first line is checked,
/// and only an exact match is dropped.
#[derive(Debug, Default)]
pub(crate) struct HeaderEcho {
    pending: Option<Schema>,
}

impl HeaderEcho {
    pub(crate) fn expecting(schema: Schema) -> Self {
        Self {
            pending: Some(schema),
        }
    }

    pub(crate) fn is_echo(&mut self, fields: &[&str]) -> bool {
        self.pending
            .take()
            .is_some_and(|schema| schema.is_header_row(fields))
    }
}
