// src/rank/mod.rs

use std::cmp::Ordering;

use tracing::debug;

use crate::aggregate::AggregatedDataset;
use crate::error::ShapeError;

/// What a ranked cut sorts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankKey {
    /// The derived per-row total.
    Total,
    /// A plain numeric column.
    Column(String),
}

/// Stable descending sort on `key`, truncated to the first `limit` rows.
///
/// Ties keep their original relative order. `NaN` keys sink below every real
/// number (also keeping their relative order); that policy is deliberate and
/// covered by tests, not an accident of the comparator. Fewer than `limit`
/// rows returns all of them.
pub fn rank_top_n(
    agg: &AggregatedDataset,
    key: &RankKey,
    limit: usize,
) -> Result<AggregatedDataset, ShapeError> {
    if let RankKey::Column(name) = key {
        agg.dataset().require_column(name)?;
    }

    let key_of = |row: usize| -> f64 {
        match key {
            RankKey::Total => agg.total(row).unwrap_or(f64::NAN),
            RankKey::Column(name) => agg.dataset().number(row, name).unwrap_or(f64::NAN),
        }
    };

    let mut order: Vec<usize> = (0..agg.len()).collect();
    order.sort_by(|&a, &b| desc_nan_last(key_of(a), key_of(b)));
    order.truncate(limit);

    debug!(kept = order.len(), limit, "ranked cut");
    Ok(agg.select(&order))
}

/// Descending order with `NaN` greater than everything (i.e. last).
fn desc_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
