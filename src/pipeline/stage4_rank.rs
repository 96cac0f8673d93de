use std::cmp::Ordering;

use crate::input::Table;
use crate::pipeline::stage1_extract::RawColumn;

pub const RANK_COLUMN: &str = "#RANK";
pub const TARGET_ID_COLUMN: &str = "#Target ID";

/// Source table plus echoed raw columns, `#RANK` and `#Target ID`, ordered best first.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub scores: Vec<f64>,
    pub target_ids: Vec<f64>,
    pub source_rows: Vec<usize>,
    pub target_id_col: usize,
}

impl RankedTable {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Row indices ordered by descending score. The sort is stable, so ties keep
/// source order; NaN scores go last.
pub fn rank_order(scores: &[f64]) -> Vec<usize> {
    let mut order = (0..scores.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| compare_desc(scores[a], scores[b]));
    order
}

fn compare_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Average descending rank: ties share the mean of the 1-based positions they span.
pub fn average_ranks_desc(scores: &[f64]) -> Vec<f64> {
    let order = rank_order(scores);
    let n = order.len();
    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && compare_desc(scores[order[j]], scores[order[j + 1]]) == Ordering::Equal
        {
            j += 1;
        }
        let avg_rank = (i + 1 + j + 1) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }
    ranks
}

pub fn run_stage4(table: &Table, raw: &[RawColumn], scores: &[f64]) -> RankedTable {
    let ranks = average_ranks_desc(scores);
    let order = rank_order(scores);

    // Each selected column is echoed once, even if it was selected under several kinds.
    let mut echoed: Vec<&RawColumn> = Vec::new();
    for column in raw {
        if !echoed.iter().any(|c| c.index == column.index) {
            echoed.push(column);
        }
    }

    let mut columns = table.columns.clone();
    columns.extend(echoed.iter().map(|c| format!("#{}", c.spec.name)));
    columns.push(RANK_COLUMN.to_string());
    columns.push(TARGET_ID_COLUMN.to_string());
    let target_id_col = columns.len() - 1;

    let mut rows = Vec::with_capacity(order.len());
    let mut ordered_scores = Vec::with_capacity(order.len());
    let mut target_ids = Vec::with_capacity(order.len());
    for &src in &order {
        let source = &table.rows[src];
        let mut row = Vec::with_capacity(columns.len());
        row.extend(source.iter().cloned());
        row.extend(echoed.iter().map(|c| source[c.index].clone()));
        row.push(format_number(scores[src]));
        row.push(format_number(ranks[src]));
        rows.push(row);
        ordered_scores.push(scores[src]);
        target_ids.push(ranks[src]);
    }

    tracing::info!(
        rows = rows.len(),
        top_score = ordered_scores.first().copied().unwrap_or(f64::NAN),
        "stage4 rank complete"
    );

    RankedTable {
        columns,
        rows,
        scores: ordered_scores,
        target_ids,
        source_rows: order,
        target_id_col,
    }
}

/// Shortest round-trip decimal; NaN is written as an empty cell.
pub fn format_number(v: f64) -> String {
    if v.is_nan() { String::new() } else { format!("{v}") }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_rank.rs"]
mod tests;
