//! Cross-product emission for one join key.

use std::io::Write;

use mrsql_csv::{RowFormat, write_record};
use mrsql_result::Result;

/// Write `key<TAB>left,right` for every pair of buffered rows.
///
/// Left rows form the outer loop, so output is grouped by left row and keeps
/// the arrival order of both sides. Returns the number of lines written,
/// which is `left.len() * right.len()`.
pub fn write_cross_product<S: AsRef<str>>(
    out: &mut dyn Write,
    key: &str,
    left: &[S],
    right: &[S],
    format: &RowFormat,
) -> Result<u64> {
    let mut written = 0u64;
    for l in left {
        for r in right {
            write_record(out, key, &format.join(&[l.as_ref(), r.as_ref()]))?;
            written += 1;
        }
    }
    Ok(written)
}
