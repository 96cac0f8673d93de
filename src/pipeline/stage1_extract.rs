use crate::error::Result;
use crate::input::{Table, is_missing_marker, parse_numeric};
use crate::model::columns::ColumnSpec;

/// One selected column pulled out of the table, aligned 1:1 with its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub spec: ColumnSpec,
    pub index: usize,
    pub values: Vec<f64>,
    pub missing: usize,
    pub unparseable: usize,
}

#[derive(Debug, Clone)]
pub struct Stage1Output {
    pub columns: Vec<RawColumn>,
    pub n_rows: usize,
}

pub fn run_stage1(
    table: &Table,
    specs: &[ColumnSpec],
    identity_columns: &[String],
) -> Result<Stage1Output> {
    // Resolve every name before touching any cell: lookup is all-or-nothing.
    let indices = specs
        .iter()
        .map(|spec| table.require_column(&spec.name))
        .collect::<Result<Vec<_>>>()?;
    // Identity columns are only checked here; they ride along in the source row.
    for name in identity_columns {
        table.require_column(name)?;
    }

    let mut columns = Vec::with_capacity(specs.len());
    for (spec, &index) in specs.iter().zip(&indices) {
        let column = extract_column(table, spec, index);
        tracing::debug!(column = %spec.name, missing = column.missing, "column extracted");
        if column.unparseable > 0 {
            tracing::warn!(
                column = %spec.name,
                count = column.unparseable,
                "non-numeric cells treated as missing"
            );
        }
        columns.push(column);
    }

    tracing::info!(
        columns = columns.len(),
        rows = table.n_rows(),
        identity = identity_columns.len(),
        "stage1 extract complete"
    );

    Ok(Stage1Output {
        columns,
        n_rows: table.n_rows(),
    })
}

pub fn extract_column(table: &Table, spec: &ColumnSpec, index: usize) -> RawColumn {
    let mut values = Vec::with_capacity(table.n_rows());
    let mut missing = 0usize;
    let mut unparseable = 0usize;
    for row in &table.rows {
        let cell = row.get(index).map(String::as_str).unwrap_or("");
        match parse_numeric(cell) {
            Some(v) => values.push(v),
            None => {
                if is_missing_marker(cell) {
                    missing += 1;
                } else {
                    unparseable += 1;
                }
                values.push(f64::NAN);
            }
        }
    }
    RawColumn {
        spec: spec.clone(),
        index,
        values,
        missing,
        unparseable,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_extract.rs"]
mod tests;
