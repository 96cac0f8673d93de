use super::*;
use crate::model::columns::{ColumnSpec, ParameterKind};
use crate::model::transforms::TransformProfile;
use crate::pipeline::stage1_extract::run_stage1;
use crate::pipeline::stage2_normalize::run_stage2;
use crate::pipeline::stage3_score::run_stage3;

fn mag_table(values: &[&str]) -> Table {
    Table::new(
        "cat.csv",
        vec!["id".to_string(), "gmag".to_string()],
        values
            .iter()
            .enumerate()
            .map(|(i, v)| vec![format!("s{i}"), v.to_string()])
            .collect(),
    )
}

fn rank(table: &Table) -> RankedTable {
    let specs = vec![ColumnSpec::new("gmag", ParameterKind::Magnitude, 1.0)];
    let raw = run_stage1(table, &specs, &[]).unwrap();
    let matrix = run_stage2(&raw.columns, &TransformProfile::exorank_v1());
    let scores = run_stage3(&matrix).unwrap();
    run_stage4(table, &raw.columns, &scores)
}

#[test]
fn test_reciprocal_magnitudes_rank_brightest_first() {
    let ranked = rank(&mag_table(&["2", "4", "8"]));
    assert_eq!(ranked.columns, vec!["id", "gmag", "#gmag", "#RANK", "#Target ID"]);
    assert_eq!(ranked.scores, vec![5000.0, 2500.0, 1250.0]);
    assert_eq!(ranked.target_ids, vec![1.0, 2.0, 3.0]);
    assert_eq!(ranked.rows[0], vec!["s0", "2", "2", "5000", "1"]);
    assert_eq!(ranked.rows[2], vec!["s2", "8", "8", "1250", "3"]);
    assert_eq!(ranked.target_id_col, 4);
}

#[test]
fn test_ties_share_average_rank() {
    assert_eq!(average_ranks_desc(&[10.0, 10.0]), vec![1.5, 1.5]);
    assert_eq!(average_ranks_desc(&[1.0, 5.0, 5.0, 5.0]), vec![4.0, 2.0, 2.0, 2.0]);
}

#[test]
fn test_rank_sum_invariant() {
    let scores = [3.0, 1.0, 3.0, 7.5, 0.0, 1.0, 3.0];
    let ranks = average_ranks_desc(&scores);
    let n = scores.len() as f64;
    assert_eq!(ranks.iter().sum::<f64>(), n * (n + 1.0) / 2.0);
}

#[test]
fn test_higher_score_gets_smaller_target_id() {
    let scores = [0.4, 9.0, 2.5, 2.5, 11.0, f64::NAN];
    let ranks = average_ranks_desc(&scores);
    for a in 0..scores.len() {
        for b in 0..scores.len() {
            if scores[a] > scores[b] {
                assert!(ranks[a] < ranks[b], "{a} vs {b}");
            }
        }
    }
    // NaN sorts after every finite score.
    assert_eq!(ranks[5], 6.0);
}

#[test]
fn test_order_is_stable_for_ties() {
    assert_eq!(rank_order(&[1.0, 2.0, 1.0, 2.0]), vec![1, 3, 0, 2]);
}

#[test]
fn test_missing_values_rank_last_and_echo_raw_cell() {
    let ranked = rank(&mag_table(&["", "5"]));
    assert_eq!(ranked.source_rows, vec![1, 0]);
    let last = &ranked.rows[1];
    assert_eq!(last[2], "");
    assert_eq!(last[3], "0");
    assert_eq!(last[4], "2");
}

#[test]
fn test_column_selected_twice_is_echoed_once() {
    let table = mag_table(&["2", "4"]);
    let specs = vec![
        ColumnSpec::new("gmag", ParameterKind::Magnitude, 0.5),
        ColumnSpec::new("gmag", ParameterKind::EffectiveTemperature, 0.5),
    ];
    let raw = run_stage1(&table, &specs, &[]).unwrap();
    let ranked = run_stage4(&table, &raw.columns, &[1.0, 2.0]);
    assert_eq!(
        ranked.columns.iter().filter(|c| c.as_str() == "#gmag").count(),
        1
    );
    assert_eq!(ranked.source_rows, vec![1, 0]);
}

#[test]
fn test_format_number() {
    assert_eq!(format_number(f64::NAN), "");
    assert_eq!(format_number(1.5), "1.5");
    assert_eq!(format_number(2.0), "2");
}
