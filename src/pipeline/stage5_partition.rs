use rand::SeedableRng;
use rand::seq::{SliceRandom, index};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::input::Table;
use crate::model::config::{PartitionSettings, SeedScope};
use crate::pipeline::stage4_rank::RankedTable;

pub const BITMASK_COLUMN: &str = "#BITMASK";

#[derive(Debug, Clone, Copy, Default)]
pub struct ControlPools<'a> {
    pub positive: Option<&'a Table>,
    pub negative: Option<&'a Table>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quota {
    pub n_pos: usize,
    pub n_neg: usize,
    pub ranked_per_shard: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Ranked,
    Positive,
    Negative,
}

impl Provenance {
    pub fn bitmask(self) -> &'static str {
        match self {
            Provenance::Ranked => "1",
            Provenance::Positive | Provenance::Negative => "0",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shard {
    pub index: usize,
    pub offset: usize,
    pub rows: Vec<Vec<String>>,
    pub provenance: Vec<Provenance>,
    pub ranked_range: std::ops::Range<usize>,
}

impl Shard {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn count(&self, kind: Provenance) -> usize {
        self.provenance.iter().filter(|&&p| p == kind).count()
    }
}

#[derive(Debug, Clone)]
pub struct Stage5Output {
    pub columns: Vec<String>,
    pub quota: Quota,
    pub shards: Vec<Shard>,
}

/// Validates the partition request against the pools and fixes per-shard counts.
/// Any failure here happens before a single shard exists.
pub fn compute_quota(
    settings: &PartitionSettings,
    positive_len: Option<usize>,
    negative_len: Option<usize>,
) -> Result<Quota> {
    if settings.chunk_size == 0 {
        return Err(Error::PartitionConfig(
            "chunk size must be a positive integer".to_string(),
        ));
    }
    let p_pos = settings.positive_fraction;
    let p_neg = settings.negative_fraction;
    for (label, p) in [("positive", p_pos), ("negative", p_neg)] {
        if !p.is_finite() || !(0.0..1.0).contains(&p) {
            return Err(Error::PartitionConfig(format!(
                "{label} fraction {p} is outside [0, 1)"
            )));
        }
    }
    if p_pos + p_neg >= 1.0 {
        return Err(Error::PartitionConfig(format!(
            "control fractions {p_pos} + {p_neg} leave no room for ranked rows"
        )));
    }

    let n_pos = pool_quota("positive", p_pos, settings.chunk_size, positive_len)?;
    let n_neg = pool_quota("negative", p_neg, settings.chunk_size, negative_len)?;

    let ranked_per_shard = settings
        .chunk_size
        .checked_sub(n_pos + n_neg)
        .filter(|&q| q >= 1)
        .ok_or_else(|| {
            Error::PartitionConfig(format!(
                "chunk size {} leaves no ranked rows after {n_pos} positive and {n_neg} negative controls",
                settings.chunk_size
            ))
        })?;

    Ok(Quota {
        n_pos,
        n_neg,
        ranked_per_shard,
    })
}

fn pool_quota(label: &str, fraction: f64, chunk_size: usize, pool_len: Option<usize>) -> Result<usize> {
    if fraction == 0.0 {
        return Ok(0);
    }
    let available = match pool_len {
        Some(n) if n > 0 => n,
        _ => {
            return Err(Error::PartitionConfig(format!(
                "{label} fraction {fraction} requested but the {label} control pool is empty or missing"
            )));
        }
    };
    let requested = (fraction * chunk_size as f64).floor() as usize;
    if requested > available {
        tracing::warn!(
            pool = label,
            requested,
            available,
            "control quota capped at pool size"
        );
    }
    Ok(requested.min(available))
}

pub fn run_stage5(
    ranked: &RankedTable,
    pools: &ControlPools<'_>,
    settings: &PartitionSettings,
) -> Result<Stage5Output> {
    let quota = compute_quota(
        settings,
        pools.positive.map(Table::n_rows),
        pools.negative.map(Table::n_rows),
    )?;

    let mut columns = ranked.columns.clone();
    columns.push(BITMASK_COLUMN.to_string());

    let positive = pools.positive.map(|t| align_rows(t, &ranked.columns));
    let negative = pools.negative.map(|t| align_rows(t, &ranked.columns));

    let mut shards = Vec::new();
    let mut offset = 0usize;
    let mut start = 0usize;
    while start < ranked.n_rows() {
        let end = (start + quota.ranked_per_shard).min(ranked.n_rows());
        let shard_index = shards.len();
        let mut rng = shard_rng(settings, shard_index);

        let mut tagged: Vec<(Vec<String>, Provenance)> =
            Vec::with_capacity(end - start + quota.n_pos + quota.n_neg);
        for row in &ranked.rows[start..end] {
            tagged.push((row.clone(), Provenance::Ranked));
        }
        if let Some(pool) = &positive {
            draw_controls(&mut rng, pool, quota.n_pos, Provenance::Positive, &mut tagged);
        }
        if let Some(pool) = &negative {
            draw_controls(&mut rng, pool, quota.n_neg, Provenance::Negative, &mut tagged);
        }
        tagged.shuffle(&mut rng);

        let mut rows = Vec::with_capacity(tagged.len());
        let mut provenance = Vec::with_capacity(tagged.len());
        for (i, (mut row, kind)) in tagged.into_iter().enumerate() {
            row[ranked.target_id_col] = (offset + i).to_string();
            row.push(kind.bitmask().to_string());
            rows.push(row);
            provenance.push(kind);
        }

        tracing::debug!(
            shard = shard_index,
            offset,
            ranked = end - start,
            rows = rows.len(),
            "shard assembled"
        );
        let len = rows.len();
        shards.push(Shard {
            index: shard_index,
            offset,
            rows,
            provenance,
            ranked_range: start..end,
        });
        offset += len;
        start = end;
    }

    tracing::info!(
        shards = shards.len(),
        n_pos = quota.n_pos,
        n_neg = quota.n_neg,
        ranked_per_shard = quota.ranked_per_shard,
        "stage5 partition complete"
    );

    Ok(Stage5Output {
        columns,
        quota,
        shards,
    })
}

fn draw_controls(
    rng: &mut ChaCha8Rng,
    pool: &[Vec<String>],
    amount: usize,
    kind: Provenance,
    out: &mut Vec<(Vec<String>, Provenance)>,
) {
    for idx in index::sample(rng, pool.len(), amount).into_vec() {
        out.push((pool[idx].clone(), kind));
    }
}

/// Control rows reshaped to the ranked schema by column name; absent columns stay empty.
pub fn align_rows(pool: &Table, schema: &[String]) -> Vec<Vec<String>> {
    let by_name = pool.index_by_name();
    let mapping = schema
        .iter()
        .map(|name| by_name.get(name.as_str()).copied())
        .collect::<Vec<_>>();
    pool.rows
        .iter()
        .map(|row| {
            mapping
                .iter()
                .map(|m| m.map(|idx| row[idx].clone()).unwrap_or_default())
                .collect()
        })
        .collect()
}

pub fn shard_rng(settings: &PartitionSettings, shard_index: usize) -> ChaCha8Rng {
    let seed = match settings.seed_scope {
        SeedScope::Shared => settings.seed,
        SeedScope::PerShard => splitmix64(settings.seed ^ splitmix64(shard_index as u64)),
    };
    ChaCha8Rng::seed_from_u64(seed)
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_partition.rs"]
mod tests;
