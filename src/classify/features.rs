use bigdecimal::{BigDecimal, ToPrimitive};

/// Number of features to keep out of `n`: `max(floor(threshold * n), minimum)`,
/// never more than `n`.
pub fn keep_count(n: usize, threshold: &BigDecimal, minimum: usize) -> usize {
    let scaled = (threshold * &BigDecimal::from(n as u64)).with_scale(0);
    let scaled = scaled.to_usize().unwrap_or(n);
    scaled.max(minimum).min(n)
}

/// Pick the most discriminating features.
///
/// Returns indices into `frequencies`, ordered by `|frequency - uniform|`
/// descending. Equal distances keep input order.
pub fn select(
    frequencies: &[BigDecimal],
    uniform: &BigDecimal,
    threshold: &BigDecimal,
    minimum: usize,
) -> Vec<usize> {
    let distances: Vec<BigDecimal> = frequencies
        .iter()
        .map(|freq| (freq - uniform).abs())
        .collect();

    let mut order: Vec<usize> = (0..frequencies.len()).collect();
    order.sort_by(|&a, &b| distances[b].cmp(&distances[a]));
    order.truncate(keep_count(frequencies.len(), threshold, minimum));
    order
}
