use crate::model::columns::ColumnSpec;
use crate::model::transforms::TransformProfile;
use crate::pipeline::stage1_extract::RawColumn;

/// Row-major normalized values. `specs[j]` is the column that produced `rows[i][j]`,
/// so weights are always read from the same record that chose the transform.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMatrix {
    pub specs: Vec<ColumnSpec>,
    pub omitted: Vec<ColumnSpec>,
    pub rows: Vec<Vec<f64>>,
}

impl ParameterMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.specs.len()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.specs.iter().map(|s| s.weight).collect()
    }
}

pub fn run_stage2(columns: &[RawColumn], profile: &TransformProfile) -> ParameterMatrix {
    let n_rows = columns.first().map(|c| c.values.len()).unwrap_or(0);

    let mut applied = Vec::with_capacity(columns.len());
    let mut omitted = Vec::new();
    for column in columns {
        match profile.get(column.spec.kind) {
            Some(transform) => applied.push((column, *transform)),
            None => {
                tracing::warn!(
                    column = %column.spec.name,
                    kind = %column.spec.kind,
                    profile = %profile.name,
                    "no transform for kind; column omitted from scoring"
                );
                omitted.push(column.spec.clone());
            }
        }
    }

    let mut rows = Vec::with_capacity(n_rows);
    for i in 0..n_rows {
        let row = applied
            .iter()
            .map(|(column, transform)| transform.apply(column.values[i]))
            .collect::<Vec<_>>();
        rows.push(row);
    }

    tracing::info!(
        rows = n_rows,
        applied = applied.len(),
        omitted = omitted.len(),
        profile = %profile.name,
        "stage2 normalize complete"
    );

    ParameterMatrix {
        specs: applied.iter().map(|(c, _)| c.spec.clone()).collect(),
        omitted,
        rows,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_normalize.rs"]
mod tests;
