use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use clap::ValueEnum;
use flate2::read::MultiGzDecoder;
use serde::Serialize;

use crate::error::{Error, Result};

pub mod ascii;
pub mod csv_table;
pub mod ipac;

/// In-memory catalog: a header plus string cells, every row exactly `columns.len()` wide.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let name = name.into();
        let (rows, fit) = fit_rows(rows, columns.len());
        if fit.truncated > 0 {
            tracing::warn!(
                table = %name,
                rows = fit.truncated,
                width = columns.len(),
                "rows wider than the header were truncated"
            );
        }
        if fit.padded > 0 {
            tracing::debug!(table = %name, rows = fit.padded, "short rows padded with empty cells");
        }
        Self {
            name,
            columns,
            rows,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| Error::ColumnLookup {
            column: name.to_string(),
            table: self.name.clone(),
        })
    }

    pub fn index_by_name(&self) -> HashMap<&str, usize> {
        let mut map = HashMap::with_capacity(self.columns.len());
        for (idx, name) in self.columns.iter().enumerate() {
            map.entry(name.as_str()).or_insert(idx);
        }
        map
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Auto,
    Csv,
    Ascii,
    Ipac,
}

impl TableFormat {
    /// Resolves `Auto` from the file extension; a trailing `.gz` is looked through.
    pub fn resolve(self, path: &Path) -> Result<TableFormat> {
        if self != TableFormat::Auto {
            return Ok(self);
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let stem = file_name.strip_suffix(".gz").unwrap_or(&file_name);
        let ext = stem.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
        match ext {
            "csv" => Ok(TableFormat::Csv),
            "tbl" | "ipac" => Ok(TableFormat::Ipac),
            "txt" | "dat" | "ascii" | "tsv" => Ok(TableFormat::Ascii),
            "fits" | "fit" | "fts" => Err(Error::table_load(
                path,
                "FITS tables are not supported; export the table to CSV or IPAC",
            )),
            other => Err(Error::table_load(
                path,
                format!("cannot infer table format from extension `{other}`; pass --format"),
            )),
        }
    }
}

/// Loads the catalog to be ranked. Every failure, including an empty table, is a `TableLoad` error.
pub fn load_table(path: &Path, format: TableFormat) -> Result<Table> {
    let table = read_table(path, format)?;
    if table.columns.is_empty() {
        return Err(Error::table_load(path, "table has no header"));
    }
    if table.rows.is_empty() {
        return Err(Error::table_load(path, "table has no data rows"));
    }
    Ok(table)
}

/// Reads a table without judging its size; control pools may legitimately be empty.
pub fn read_table(path: &Path, format: TableFormat) -> Result<Table> {
    let format = format.resolve(path)?;
    let reader = open_maybe_gz(path)?;
    let name = path.display().to_string();

    let parsed = match format {
        TableFormat::Csv => csv_table::read_csv_table(reader, &name),
        TableFormat::Ascii => ascii::read_ascii_table(reader, &name),
        TableFormat::Ipac => ipac::read_ipac_table(reader, &name),
        TableFormat::Auto => return Err(Error::table_load(path, "unresolved table format")),
    };
    let table = parsed.map_err(|e| match e {
        Error::TableLoad { .. } => e,
        other => Error::table_load(path, other.to_string()),
    })?;

    tracing::info!(
        path = %path.display(),
        format = ?format,
        rows = table.n_rows(),
        columns = table.columns.len(),
        "table loaded"
    );
    Ok(table)
}

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| Error::table_load(path, e.to_string()))?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parses one cell. `None` means "no value": empty, a null marker, or not a number.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if is_missing_marker(s) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| !v.is_nan())
}

pub fn is_missing_marker(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "" | "nan" | "null" | "none" | "na" | "n/a" | "--"
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowFit {
    pub padded: usize,
    pub truncated: usize,
}

/// Resizes every row to `width`, counting how many were padded or cut.
pub fn fit_rows(rows: Vec<Vec<String>>, width: usize) -> (Vec<Vec<String>>, RowFit) {
    let mut fit = RowFit::default();
    let rows = rows
        .into_iter()
        .map(|mut row| {
            if row.len() < width {
                fit.padded += 1;
            } else if row.len() > width {
                fit.truncated += 1;
            }
            row.resize(width, String::new());
            row
        })
        .collect();
    (rows, fit)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
