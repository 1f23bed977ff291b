//! Turns a token stream into the `(token, count)` pairs the engines consume.

use std::collections::HashMap;

/// Count every token, most frequent first. Ties keep first-appearance order.
pub fn aggregate<I, T>(tokens: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();

    for token in tokens {
        let token = token.into();
        match positions.get(&token) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(token.clone(), counts.len());
                counts.push((token, 1));
            }
        }
    }

    // sort_by is stable, so equal counts stay in appearance order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Reset every count to 1, for callers that only care about presence.
pub fn collapse(pairs: Vec<(String, u64)>) -> Vec<(String, u64)> {
    pairs.into_iter().map(|(token, _)| (token, 1)).collect()
}
