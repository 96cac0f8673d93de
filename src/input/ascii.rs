use std::io::BufRead;

use crate::error::Result;
use crate::input::Table;

/// Whitespace-delimited table. The first non-comment line is the header; `#` starts a comment line.
pub fn read_ascii_table<R: BufRead>(reader: R, name: &str) -> Result<Table> {
    let mut columns: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields = trimmed
            .split_whitespace()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        if columns.is_none() {
            columns = Some(fields);
        } else {
            rows.push(fields);
        }
    }

    Ok(Table::new(name, columns.unwrap_or_default(), rows))
}
