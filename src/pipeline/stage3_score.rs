use crate::error::{Error, Result};
use crate::pipeline::stage2_normalize::ParameterMatrix;

pub fn run_stage3(matrix: &ParameterMatrix) -> Result<Vec<f64>> {
    let scores = score_rows(&matrix.rows, &matrix.weights())?;
    tracing::info!(rows = scores.len(), "stage3 score complete");
    Ok(scores)
}

pub fn score_rows(rows: &[Vec<f64>], weights: &[f64]) -> Result<Vec<f64>> {
    let mut scores = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if row.len() != weights.len() {
            return Err(Error::SettingsValidation(format!(
                "row {i} has {} parameters but {} weights were given",
                row.len(),
                weights.len()
            )));
        }
        scores.push(weighted_nansum(row, weights));
    }
    Ok(scores)
}

/// Σ w·x where a NaN product adds nothing. Missing values are not renormalized
/// away: a row with a missing parameter simply scores lower.
pub fn weighted_nansum(row: &[f64], weights: &[f64]) -> f64 {
    let mut sum = 0.0f64;
    for (&x, &w) in row.iter().zip(weights) {
        let term = w * x;
        if !term.is_nan() {
            sum += term;
        }
    }
    sum
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_score.rs"]
mod tests;
