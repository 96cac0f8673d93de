use super::*;
use crate::model::columns::ParameterKind;

fn base_config() -> RunConfig {
    RunConfig {
        input: PathBuf::from("cat.csv"),
        format: TableFormat::Auto,
        output_name: "ranked".to_string(),
        out_dir: PathBuf::from("Output"),
        columns: vec![ColumnSpec::new("g", ParameterKind::Magnitude, 1.0)],
        identity_columns: vec![],
        profile: TransformProfile::exorank_v1(),
        partition: None,
    }
}

fn plan(chunk_size: usize, p_pos: f64, p_neg: f64) -> PartitionPlan {
    PartitionPlan {
        settings: PartitionSettings {
            chunk_size,
            positive_fraction: p_pos,
            negative_fraction: p_neg,
            seed: 7,
            seed_scope: SeedScope::Shared,
        },
        positive: None,
        negative: None,
    }
}

#[test]
fn test_valid_config() {
    assert!(base_config().validate().is_ok());
}

#[test]
fn test_output_name_must_be_a_stem() {
    let mut config = base_config();
    config.output_name = "nested/out".to_string();
    assert!(matches!(config.validate().unwrap_err(), Error::SettingsValidation(_)));
    config.output_name = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_partition_settings_checked_up_front() {
    let mut config = base_config();
    config.partition = Some(plan(0, 0.0, 0.0));
    assert!(matches!(config.validate().unwrap_err(), Error::PartitionConfig(_)));

    config.partition = Some(plan(10, 1.0, 0.0));
    assert!(matches!(config.validate().unwrap_err(), Error::PartitionConfig(_)));

    config.partition = Some(plan(10, 0.2, 0.1));
    assert!(config.validate().is_ok());
}

#[test]
fn test_settings_file_parses() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"columns":[{"name":"plx","kind":"plx","weight":0.4}],"identity_columns":["ra","dec"]}"#,
    )
    .unwrap();
    let file = SettingsFile::load(&path).unwrap();
    assert_eq!(file.columns[0].kind, ParameterKind::Parallax);
    assert_eq!(file.identity_columns, vec!["ra", "dec"]);

    std::fs::write(&path, r#"{"columns":[],"scalings":[1]}"#).unwrap();
    assert!(matches!(
        SettingsFile::load(&path).unwrap_err(),
        Error::SettingsValidation(_)
    ));
}

#[test]
fn test_unreadable_settings_file_is_settings_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SettingsFile::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::SettingsValidation(_)));
    assert_eq!(err.stage(), "settings");
    assert!(err.to_string().contains("absent.json"));

    let err = TransformProfile::resolve(dir.path().to_str().unwrap()).unwrap_err();
    assert_eq!(err.stage(), "settings");
}
