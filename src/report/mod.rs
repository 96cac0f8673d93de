pub mod json;

use serde::Serialize;

use crate::input::TableFormat;
use crate::model::columns::ColumnSpec;
use crate::model::config::PartitionSettings;
use crate::pipeline::stage5_partition::Quota;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool_name: String,
    pub tool_version: String,
    pub input: String,
    pub format: TableFormat,
    pub profile: String,
    pub n_rows: usize,
    pub columns_applied: Vec<ColumnSpec>,
    pub columns_omitted: Vec<ColumnSpec>,
    pub identity_columns: Vec<String>,
    pub score: ScoreStats,
    pub outputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<PartitionSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartitionSummary {
    pub settings: PartitionSettings,
    pub quota: Quota,
    pub shards: Vec<ShardSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShardSummary {
    pub file: String,
    pub offset: usize,
    pub rows: usize,
    pub ranked_rows: usize,
    pub positive_controls: usize,
    pub negative_controls: usize,
}

/// Min, max and median over the finite scores; all `None` when there are none.
pub fn score_stats(scores: &[f64]) -> ScoreStats {
    let mut finite = scores
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect::<Vec<_>>();
    if finite.is_empty() {
        return ScoreStats {
            min: None,
            max: None,
            median: None,
        };
    }
    finite.sort_by(f64::total_cmp);
    let n = finite.len();
    let median = if n % 2 == 0 {
        (finite[n / 2 - 1] + finite[n / 2]) / 2.0
    } else {
        finite[n / 2]
    };
    ScoreStats {
        min: finite.first().copied(),
        max: finite.last().copied(),
        median: Some(median),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
