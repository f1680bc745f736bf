use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use mrsql_csv::{RowFormat, content_of};
use mrsql_result::{Error, Result};
use rustc_hash::FxHashMap;

/// Ordered column names with constant-time name lookup.
///
/// Built once per mapper invocation and never mutated afterwards. When a
/// header repeats a name, lookups resolve to its first position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
    name_to_index: FxHashMap<String, usize>,
}

impl Schema {
    pub fn new(columns: Vec<String>) -> Self {
        let mut name_to_index = FxHashMap::default();
        for (idx, name) in columns.iter().enumerate() {
            name_to_index.entry(name.clone()).or_insert(idx);
        }
        Self {
            columns,
            name_to_index,
        }
    }

    /// Schema parsed from a header line.
    pub fn from_header_line(line: &str, format: &RowFormat) -> Self {
        Self::new(format.split(line).into_iter().map(str::to_string).collect())
    }

    /// Positional names `col_0 .. col_{width-1}` for streams without a header.
    pub fn synthetic(width: usize) -> Self {
        Self::new((0..width).map(|idx| format!("col_{idx}")).collect())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Index of `name`, failing with [`Error::UnknownColumn`] when absent.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| Error::unknown_column(name))
    }

    /// True when `fields` is exactly this schema's header.
    pub fn is_header_row(&self, fields: &[&str]) -> bool {
        fields.len() == self.columns.len()
            && fields.iter().zip(&self.columns).all(|(f, c)| *f == c.as_str())
    }
}

/// Side channel supplying column names before any row is processed.
pub trait HeaderSource {
    fn read_header(&mut self) -> Result<Vec<String>>;
}

/// Header held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticHeader {
    columns: Vec<String>,
}

impl StaticHeader {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl HeaderSource for StaticHeader {
    fn read_header(&mut self) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }
}

/// Header taken from the first non-blank line of a file.
#[derive(Debug, Clone)]
pub struct FileHeader {
    path: PathBuf,
    format: RowFormat,
}

impl FileHeader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_format(path, RowFormat::default())
    }

    pub fn with_format(path: impl AsRef<Path>, format: RowFormat) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }
}

impl HeaderSource for FileHeader {
    fn read_header(&mut self) -> Result<Vec<String>> {
        let reader = BufReader::new(File::open(&self.path)?);
        for line in reader.lines() {
            let line = line?;
            if let Some(content) = content_of(&line) {
                tracing::debug!(path = %self.path.display(), "read external header");
                return Ok(self
                    .format
                    .split(content)
                    .into_iter()
                    .map(str::to_string)
                    .collect());
            }
        }
        Err(Error::InvalidArgument(format!(
            "header file {} contains no header line",
            self.path.display()
        )))
    }
}
