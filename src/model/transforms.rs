use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::columns::ParameterKind;

/// One-argument desirability transform. Invalid inputs map to NaN, never a panic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    Constant { value: f64 },
    Linear { scale: f64, offset: f64 },
    Sqrt { scale: f64 },
    Reciprocal { numerator: f64, offset: f64 },
    Clamped { scale: f64, min: f64, max: f64 },
}

impl Transform {
    pub fn apply(&self, x: f64) -> f64 {
        match *self {
            // Placeholder kinds carry no signal, so the input is ignored.
            Transform::Constant { value } => value,
            Transform::Linear { scale, offset } => scale * x + offset,
            Transform::Sqrt { scale } => {
                if x < 0.0 {
                    f64::NAN
                } else {
                    scale * x.sqrt()
                }
            }
            // Only the branch right of the pole keeps "smaller input scores higher".
            Transform::Reciprocal { numerator, offset } => {
                let denom = x + offset;
                if denom > 0.0 { numerator / denom } else { f64::NAN }
            }
            Transform::Clamped { scale, min, max } => {
                let v = scale * x;
                if v.is_nan() { f64::NAN } else { v.clamp(min, max) }
            }
        }
    }

    fn params(&self) -> Vec<f64> {
        match *self {
            Transform::Constant { value } => vec![value],
            Transform::Linear { scale, offset } => vec![scale, offset],
            Transform::Sqrt { scale } => vec![scale],
            Transform::Reciprocal { numerator, offset } => vec![numerator, offset],
            Transform::Clamped { scale, min, max } => vec![scale, min, max],
        }
    }
}

/// Versioned registry of per-kind transforms. A kind with no entry is omitted
/// from the parameter matrix for every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformProfile {
    pub name: String,
    pub transforms: BTreeMap<ParameterKind, Transform>,
}

pub const DEFAULT_PROFILE: &str = "exorank_v1";

impl TransformProfile {
    pub fn exorank_v1() -> Self {
        use ParameterKind::*;
        let transforms = BTreeMap::from([
            (PositionalWeightedDistance, Transform::Sqrt { scale: 100.0 }),
            (
                Magnitude,
                Transform::Reciprocal {
                    numerator: 10_000.0,
                    offset: 0.0,
                },
            ),
            (
                Parallax,
                Transform::Reciprocal {
                    numerator: 1_000.0,
                    offset: 1.0,
                },
            ),
            (
                Distance,
                Transform::Reciprocal {
                    numerator: 10_000.0,
                    offset: 100.0,
                },
            ),
            (
                EffectiveTemperature,
                Transform::Clamped {
                    scale: 0.01,
                    min: 0.0,
                    max: 100.0,
                },
            ),
            (
                ProperMotion,
                Transform::Reciprocal {
                    numerator: 1_000.0,
                    offset: 1.0,
                },
            ),
            (SpectralType, Transform::Constant { value: 1.0 }),
        ]);
        Self {
            name: "exorank_v1".to_string(),
            transforms,
        }
    }

    /// Later generation: retuned constants and no `spt` rule at all.
    pub fn exorank_v2() -> Self {
        use ParameterKind::*;
        let mut base = Self::exorank_v1();
        base.name = "exorank_v2".to_string();
        base.transforms.insert(
            PositionalWeightedDistance,
            Transform::Linear {
                scale: 1.0,
                offset: 0.0,
            },
        );
        base.transforms.insert(
            Parallax,
            Transform::Reciprocal {
                numerator: 100.0,
                offset: 1.0,
            },
        );
        base.transforms.insert(
            Distance,
            Transform::Reciprocal {
                numerator: 1_000.0,
                offset: 10.0,
            },
        );
        base.transforms.insert(
            EffectiveTemperature,
            Transform::Clamped {
                scale: 0.001,
                min: 0.0,
                max: 10.0,
            },
        );
        base.transforms.insert(
            ProperMotion,
            Transform::Reciprocal {
                numerator: 100.0,
                offset: 1.0,
            },
        );
        base.transforms.remove(&SpectralType);
        base
    }

    /// Earliest generation, where every kind counted as 1.
    pub fn placeholder_v0() -> Self {
        Self {
            name: "placeholder_v0".to_string(),
            transforms: ParameterKind::ALL
                .into_iter()
                .map(|k| (k, Transform::Constant { value: 1.0 }))
                .collect(),
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "exorank_v1" => Some(Self::exorank_v1()),
            "exorank_v2" => Some(Self::exorank_v2()),
            "placeholder_v0" => Some(Self::placeholder_v0()),
            _ => None,
        }
    }

    /// A builtin profile name, or a path to a JSON profile file.
    pub fn resolve(arg: &str) -> Result<Self> {
        if let Some(profile) = Self::builtin(arg) {
            return Ok(profile);
        }
        let path = Path::new(arg);
        if !path.exists() {
            return Err(Error::SettingsValidation(format!(
                "unknown transform profile `{arg}` (builtin: exorank_v1, exorank_v2, placeholder_v0)"
            )));
        }
        Self::from_json_file(path)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::SettingsValidation(format!("cannot read profile {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text).map_err(|e| match e {
            Error::SettingsValidation(msg) => {
                Error::SettingsValidation(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let profile: TransformProfile = serde_json::from_str(text)
            .map_err(|e| Error::SettingsValidation(format!("bad transform profile: {e}")))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        for (kind, transform) in &self.transforms {
            if transform.params().iter().any(|p| !p.is_finite()) {
                return Err(Error::SettingsValidation(format!(
                    "profile `{}`: transform for `{kind}` has a non-finite parameter",
                    self.name
                )));
            }
            if let Transform::Clamped { min, max, .. } = transform {
                if min > max {
                    return Err(Error::SettingsValidation(format!(
                        "profile `{}`: clamp range for `{kind}` has min > max",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, kind: ParameterKind) -> Option<&Transform> {
        self.transforms.get(&kind)
    }
}

impl Default for TransformProfile {
    fn default() -> Self {
        Self::exorank_v1()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/transforms.rs"]
mod tests;
