//! IPAC ASCII tables: `\` keyword lines, up to four `|`-delimited header lines
//! (names, types, units, nulls), then fixed-width data rows aligned to the first
//! header line's pipe positions.

use std::io::BufRead;

use crate::error::{Error, Result};
use crate::input::Table;

const NAMES: usize = 0;
const NULLS: usize = 3;

pub fn read_ipac_table<R: BufRead>(reader: R, name: &str) -> Result<Table> {
    let mut header_lines: Vec<String> = Vec::new();
    let mut data_lines: Vec<String> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.starts_with('\\') || line.trim().is_empty() {
            continue;
        }
        if line.starts_with('|') && data_lines.is_empty() {
            header_lines.push(line);
        } else {
            data_lines.push(line);
        }
    }

    let Some(name_line) = header_lines.get(NAMES) else {
        return Ok(Table::new(name, Vec::new(), Vec::new()));
    };
    let bounds = pipe_positions(name_line);
    if bounds.len() < 2 {
        return Err(Error::table_load(
            name,
            "IPAC header line has no column delimiters",
        ));
    }

    let columns = slice_fields(name_line, &bounds);
    let nulls = header_lines
        .get(NULLS)
        .map(|line| slice_fields(line, &bounds))
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(data_lines.len());
    for line in &data_lines {
        let mut fields = slice_fields(line, &bounds);
        for (idx, field) in fields.iter_mut().enumerate() {
            let declared_null = nulls.get(idx).is_some_and(|n| !n.is_empty() && n == field);
            if declared_null || field.eq_ignore_ascii_case("null") {
                field.clear();
            }
        }
        rows.push(fields);
    }

    Ok(Table::new(name, columns, rows))
}

fn pipe_positions(line: &str) -> Vec<usize> {
    line.bytes()
        .enumerate()
        .filter(|&(_, b)| b == b'|')
        .map(|(i, _)| i)
        .collect()
}

/// Cuts one line into the cells between consecutive pipes. The byte under the
/// closing pipe is included so values that touch the delimiter survive.
fn slice_fields(line: &str, bounds: &[usize]) -> Vec<String> {
    let bytes = line.as_bytes();
    bounds
        .windows(2)
        .map(|w| {
            let start = (w[0] + 1).min(bytes.len());
            let end = (w[1] + 1).min(bytes.len());
            String::from_utf8_lossy(&bytes[start..end])
                .trim_matches(|c: char| c == '|' || c.is_whitespace())
                .to_string()
        })
        .collect()
}
