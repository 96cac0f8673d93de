use super::*;
use crate::model::columns::{ColumnSpec, ParameterKind};

#[test]
fn test_score_is_weighted_sum() {
    let rows = vec![vec![10.0, 2.0], vec![0.0, 4.0]];
    let scores = score_rows(&rows, &[0.5, 0.25]).unwrap();
    assert_eq!(scores, vec![5.5, 1.0]);
}

#[test]
fn test_missing_term_contributes_zero_without_renormalizing() {
    // A renormalizing scorer would give 10.0 for the first row.
    let rows = vec![vec![10.0, f64::NAN], vec![10.0, 10.0]];
    let scores = score_rows(&rows, &[0.5, 0.5]).unwrap();
    assert_eq!(scores[0], 5.0);
    assert_eq!(scores[1], 10.0);
    assert!(scores[0] < scores[1]);
}

#[test]
fn test_all_missing_row_scores_zero() {
    assert_eq!(weighted_nansum(&[f64::NAN, f64::NAN], &[1.0, 1.0]), 0.0);
    assert_eq!(weighted_nansum(&[], &[]), 0.0);
}

#[test]
fn test_weight_length_mismatch_is_error() {
    let rows = vec![vec![1.0, 2.0]];
    assert!(score_rows(&rows, &[1.0]).is_err());
}

#[test]
fn test_run_stage3_reads_weights_from_matrix() {
    let matrix = ParameterMatrix {
        specs: vec![
            ColumnSpec::new("a", ParameterKind::Magnitude, 1.0),
            ColumnSpec::new("b", ParameterKind::Parallax, 0.0),
        ],
        omitted: vec![],
        rows: vec![vec![3.0, 100.0], vec![1.0, 900.0]],
    };
    assert_eq!(run_stage3(&matrix).unwrap(), vec![3.0, 1.0]);
}
