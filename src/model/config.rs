use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::input::TableFormat;
use crate::model::columns::{ColumnSpec, validate_specs};
use crate::model::transforms::TransformProfile;

/// How control-row sampling is seeded across shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SeedScope {
    /// Every shard re-seeds with the run seed, so all shards share one control set.
    Shared,
    /// Each shard derives its own seed and draws an independent control sample.
    PerShard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionSettings {
    pub chunk_size: usize,
    pub positive_fraction: f64,
    pub negative_fraction: f64,
    pub seed: u64,
    pub seed_scope: SeedScope,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionPlan {
    pub settings: PartitionSettings,
    pub positive: Option<PathBuf>,
    pub negative: Option<PathBuf>,
}

/// Column selection as stored on disk.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub identity_columns: Vec<String>,
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::SettingsValidation(format!("cannot read settings {}: {e}", path.display()))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            Error::SettingsValidation(format!("{}: {e}", path.display()))
        })
    }
}

/// Everything one run needs, built once up front and only read afterwards.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub format: TableFormat,
    pub output_name: String,
    pub out_dir: PathBuf,
    pub columns: Vec<ColumnSpec>,
    pub identity_columns: Vec<String>,
    pub profile: TransformProfile,
    pub partition: Option<PartitionPlan>,
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        validate_specs(&self.columns)?;
        self.profile.validate()?;
        let name = self.output_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(Error::SettingsValidation(format!(
                "output name `{}` must be a non-empty file stem",
                self.output_name
            )));
        }
        if let Some(plan) = &self.partition {
            let s = &plan.settings;
            if s.chunk_size == 0 {
                return Err(Error::PartitionConfig(
                    "chunk size must be a positive integer".to_string(),
                ));
            }
            for (label, p) in [
                ("positive", s.positive_fraction),
                ("negative", s.negative_fraction),
            ] {
                if !p.is_finite() || !(0.0..1.0).contains(&p) {
                    return Err(Error::PartitionConfig(format!(
                        "{label} fraction {p} is outside [0, 1)"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/config.rs"]
mod tests;
