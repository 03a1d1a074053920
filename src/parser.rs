//! Line-level GMT parsing.
//!
//! Produces every gene set in input order, duplicates included; name
//! resolution happens afterwards in [`crate::dedup`].

use std::io::BufRead;

use tracing::debug;

use crate::domain::GeneSet;
use crate::error::GmtError;

const MIN_FIELDS: usize = 3;

/// Parses a single GMT line (terminator already stripped).
///
/// Returns `Ok(None)` for blank lines. `line_no` is 1-based and only used
/// for error reporting.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<GeneSet>, GmtError> {
    if line.is_empty() {
        return Ok(None);
    }
    let fields = line.split('\t').collect::<Vec<_>>();
    if fields.len() < MIN_FIELDS {
        return Err(GmtError::MalformedLine {
            line: line_no,
            fields: fields.len(),
        });
    }

    // Column 1 is the gene set name, column 2 the description
    let genes = fields[2..].iter().map(|gene| gene.to_string()).collect();
    Ok(Some(GeneSet::new(fields[0], fields[1], genes)))
}

/// Reads GMT content to EOF and returns the raw gene sets.
pub fn parse_reader<R: BufRead>(
    mut reader: R,
    source_name: &str,
) -> Result<Vec<GeneSet>, GmtError> {
    let mut sets = Vec::new();
    let mut buf = Vec::with_capacity(4096);
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|err| GmtError::unavailable(source_name, err))?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let line = strip_terminator(&buf);
        let line = std::str::from_utf8(line).map_err(|err| {
            GmtError::unavailable(source_name, format!("line {line_no} is not UTF-8: {err}"))
        })?;
        if let Some(set) = parse_line(line, line_no)? {
            sets.push(set);
        }
    }

    debug!(source = source_name, lines = line_no, sets = sets.len(), "parsed GMT");
    Ok(sets)
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
