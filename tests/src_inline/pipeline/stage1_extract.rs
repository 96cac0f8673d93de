use super::*;
use crate::error::Error;
use crate::model::columns::ParameterKind;

fn catalog() -> Table {
    let s = |v: &[&str]| v.iter().map(|c| c.to_string()).collect::<Vec<_>>();
    Table::new(
        "cat.csv",
        s(&["ra", "dec", "gmag", "plx"]),
        vec![
            s(&["1.0", "2.0", "12.5", "3.1"]),
            s(&["1.1", "2.1", "", "M4V"]),
            s(&["1.2", "2.2", "9.0", "nan"]),
        ],
    )
}

#[test]
fn test_extracts_values_aligned_with_rows() {
    let table = catalog();
    let specs = vec![
        ColumnSpec::new("gmag", ParameterKind::Magnitude, 0.5),
        ColumnSpec::new("plx", ParameterKind::Parallax, 0.5),
    ];
    let out = run_stage1(&table, &specs, &[]).unwrap();
    assert_eq!(out.n_rows, 3);
    assert_eq!(out.columns.len(), 2);

    let gmag = &out.columns[0];
    assert_eq!(gmag.index, 2);
    assert_eq!(gmag.values[0], 12.5);
    assert!(gmag.values[1].is_nan());
    assert_eq!(gmag.missing, 1);
    assert_eq!(gmag.unparseable, 0);

    let plx = &out.columns[1];
    assert_eq!(plx.missing, 1);
    assert_eq!(plx.unparseable, 1);
    assert!(plx.values[1].is_nan() && plx.values[2].is_nan());
}

#[test]
fn test_unknown_column_fails_whole_lookup() {
    let table = catalog();
    let specs = vec![
        ColumnSpec::new("gmag", ParameterKind::Magnitude, 0.5),
        ColumnSpec::new("bp_rp", ParameterKind::Magnitude, 0.5),
    ];
    match run_stage1(&table, &specs, &[]).unwrap_err() {
        Error::ColumnLookup { column, .. } => assert_eq!(column, "bp_rp"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_identity_columns_must_exist() {
    let table = catalog();
    let specs = vec![ColumnSpec::new("gmag", ParameterKind::Magnitude, 1.0)];
    assert!(run_stage1(&table, &specs, &["ra".to_string(), "dec".to_string()]).is_ok());
    let err = run_stage1(&table, &specs, &["source_id".to_string()]).unwrap_err();
    assert!(matches!(err, Error::ColumnLookup { .. }));
}

#[test]
fn test_same_column_under_two_kinds() {
    let table = catalog();
    let specs = vec![
        ColumnSpec::new("gmag", ParameterKind::Magnitude, 0.5),
        ColumnSpec::new("gmag", ParameterKind::EffectiveTemperature, 0.5),
    ];
    let out = run_stage1(&table, &specs, &[]).unwrap();
    assert_eq!(out.columns[0].index, out.columns[1].index);
    assert_eq!(out.columns[1].spec.kind, ParameterKind::EffectiveTemperature);
}
