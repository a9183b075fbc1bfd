//! Weighted random selection over a cumulative-weight array.
//!
//! All weighted draws in the engine (loot tier, loot item, dungeon enemy) go
//! through `pick_index`: build running totals once, draw a single uniform
//! number in `[0, total)`, take the first bucket whose running total exceeds it.

use rand::Rng;

/// Running totals of `weights`. Negative and NaN weights count as zero.
pub fn cumulative_weights(weights: &[f64]) -> Vec<f64> {
    let mut total = 0.0;
    weights
        .iter()
        .map(|&w| {
            if w.is_finite() && w > 0.0 {
                total += w;
            }
            total
        })
        .collect()
}

/// Index of the bucket that `roll` (in `[0, total)`) falls into.
///
/// Returns `None` when there are no buckets or the total weight is zero.
pub fn index_for_roll(cumulative: &[f64], roll: f64) -> Option<usize> {
    let total = *cumulative.last()?;
    if total <= 0.0 {
        return None;
    }
    if roll >= total {
        // First bucket reaching the total is the last non-empty one
        return Some(cumulative.partition_point(|&c| c < total));
    }
    Some(cumulative.partition_point(|&c| c <= roll))
}

/// Draws one index with probability proportional to its weight.
pub fn pick_index(weights: &[f64], rng: &mut impl Rng) -> Option<usize> {
    let cumulative = cumulative_weights(weights);
    let total = *cumulative.last()?;
    if total <= 0.0 {
        return None;
    }
    let roll = rng.gen::<f64>() * total;
    index_for_roll(&cumulative, roll)
}

/// Draws one element of `items` weighted by `weight`.
pub fn pick_weighted<'a, T>(
    items: &'a [T],
    weight: impl Fn(&T) -> f64,
    rng: &mut impl Rng,
) -> Option<&'a T> {
    let weights: Vec<f64> = items.iter().map(weight).collect();
    pick_index(&weights, rng).map(|i| &items[i])
}
