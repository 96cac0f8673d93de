use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Closed set of catalog column kinds a user may rank on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    #[serde(rename = "pwd")]
    PositionalWeightedDistance,
    #[serde(rename = "mag")]
    Magnitude,
    #[serde(rename = "plx")]
    Parallax,
    #[serde(rename = "distance")]
    Distance,
    #[serde(rename = "teff")]
    EffectiveTemperature,
    #[serde(rename = "pm")]
    ProperMotion,
    #[serde(rename = "spt")]
    SpectralType,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 7] = [
        ParameterKind::PositionalWeightedDistance,
        ParameterKind::Magnitude,
        ParameterKind::Parallax,
        ParameterKind::Distance,
        ParameterKind::EffectiveTemperature,
        ParameterKind::ProperMotion,
        ParameterKind::SpectralType,
    ];

    pub fn code(self) -> &'static str {
        match self {
            ParameterKind::PositionalWeightedDistance => "pwd",
            ParameterKind::Magnitude => "mag",
            ParameterKind::Parallax => "plx",
            ParameterKind::Distance => "distance",
            ParameterKind::EffectiveTemperature => "teff",
            ParameterKind::ProperMotion => "pm",
            ParameterKind::SpectralType => "spt",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ParameterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        ParameterKind::ALL
            .into_iter()
            .find(|k| k.code() == needle)
            .ok_or_else(|| {
                Error::SettingsValidation(format!(
                    "unknown column kind `{s}` (use one of pwd, mag, plx, distance, teff, pm, spt)"
                ))
            })
    }
}

/// One selected column. The record travels through extraction, normalization
/// and scoring as a unit so name, kind and weight cannot drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ParameterKind,
    pub weight: f64,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ParameterKind, weight: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            weight,
        }
    }

    /// Parses `NAME:KIND:WEIGHT`. The name may itself contain `:`.
    pub fn parse_cli(arg: &str) -> Result<Self> {
        let mut parts = arg.rsplitn(3, ':');
        let weight = parts.next();
        let kind = parts.next();
        let name = parts.next();
        let (Some(name), Some(kind), Some(weight)) = (name, kind, weight) else {
            return Err(Error::SettingsValidation(format!(
                "column `{arg}` must look like NAME:KIND:WEIGHT"
            )));
        };
        let weight = weight.trim().parse::<f64>().map_err(|_| {
            Error::SettingsValidation(format!("column `{arg}` has a non-numeric weight"))
        })?;
        Ok(Self::new(name.trim(), kind.parse()?, weight))
    }
}

/// Rejects the whole list if any entry is invalid; nothing is partially applied.
pub fn validate_specs(specs: &[ColumnSpec]) -> Result<()> {
    if specs.is_empty() {
        return Err(Error::SettingsValidation(
            "no columns selected; pass --column or a settings file".to_string(),
        ));
    }
    for (idx, spec) in specs.iter().enumerate() {
        if spec.name.trim().is_empty() {
            return Err(Error::SettingsValidation(format!(
                "column #{} has an empty name",
                idx + 1
            )));
        }
        if !spec.weight.is_finite() || !(0.0..=1.0).contains(&spec.weight) {
            return Err(Error::SettingsValidation(format!(
                "weight {} for column `{}` is outside [0, 1]",
                spec.weight, spec.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/columns.rs"]
mod tests;
