use std::cmp::Ordering;

use crate::utils::nan_safe_f32_cmp;

/// Greedily selects up to `k` candidates by maximal marginal relevance.
///
/// Each step picks the remaining candidate maximizing
/// `lambda * relevance(c) - (1 - lambda) * max(similarity(c, s) for s in selected)`, where the
/// similarity term is zero while nothing is selected. Ties go to the candidate which comes first.
///
/// Returns the indices of the selected candidates in the order of their selection.
pub fn select_diverse<T>(
    candidates: &[T],
    k: usize,
    lambda: f32,
    relevance: impl Fn(&T) -> f32,
    similarity: impl Fn(&T, &T) -> f32,
) -> Vec<usize> {
    let relevances = candidates.iter().map(relevance).collect::<Vec<_>>();
    let mut pool = (0..candidates.len()).collect::<Vec<_>>();
    let mut selected = Vec::with_capacity(k.min(candidates.len()));

    while selected.len() < k && !pool.is_empty() {
        let mut best: Option<(usize, f32)> = None;
        for (position, &candidate) in pool.iter().enumerate() {
            let redundancy = selected
                .iter()
                .map(|&chosen| similarity(&candidates[candidate], &candidates[chosen]))
                .max_by(nan_safe_f32_cmp)
                .unwrap_or_default();
            let value = lambda * relevances[candidate] - (1. - lambda) * redundancy;

            let is_better = best.map_or(true, |(_, best_value)| {
                nan_safe_f32_cmp(&value, &best_value) == Ordering::Greater
            });
            if is_better {
                best = Some((position, value));
            }
        }

        match best {
            Some((position, _)) => selected.push(pool.remove(position)),
            None => break,
        }
    }

    selected
}
