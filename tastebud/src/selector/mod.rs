//! Active learning selection of the next pair to compare.

mod noise;

use std::cmp::Ordering;

use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

pub use self::noise::{NoiseSource, SeededNoise};
#[cfg(test)]
pub(crate) use self::noise::MockNoiseSource;
use crate::{
    config::{PivotPolicy, SelectorConfig},
    features::{cosine_similarity, view_or_empty},
    item::{FeatureLookup, ItemId},
    state::UserState,
    strength::StrengthModel,
    utils::{nan_safe_f32_cmp, nan_safe_f32_cmp_desc},
};

/// Two distinct items to be shown side by side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pair {
    pub a: ItemId,
    pub b: ItemId,
}

impl Pair {
    /// The order independent key of the pair.
    pub fn key(&self) -> PairKey {
        PairKey::new(&self.a, &self.b)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        &self.a == id || &self.b == id
    }
}

/// An unordered pair of ids, `PairKey::new(a, b) == PairKey::new(b, a)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey(ItemId, ItemId);

impl PairKey {
    pub fn new(a: &ItemId, b: &ItemId) -> Self {
        if a <= b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }
}

/// A candidate with everything the pair score needs.
struct Candidate<'a> {
    id: &'a ItemId,
    logit: f32,
    uncertainty: f32,
}

/// Picks the pair which is expected to teach the most about the taste of the user.
#[derive(Clone, Debug)]
pub(crate) struct PairSelector {
    config: SelectorConfig,
}

impl PairSelector {
    pub(crate) fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Selects the next pair from the eligible ids and records it as shown.
    ///
    /// Returns `None` if fewer than two distinct ids are eligible or if every possible pair was
    /// already shown and repeats are not allowed.
    pub(crate) fn select(
        &self,
        state: &mut UserState,
        model: &impl StrengthModel,
        eligible: &[ItemId],
        features: &impl FeatureLookup,
        noise: &mut dyn NoiseSource,
    ) -> Option<Pair> {
        let candidates = eligible
            .iter()
            .unique()
            .map(|id| Candidate {
                id,
                logit: model.logit_strength(state.ratings(), id),
                uncertainty: model.uncertainty(state.ratings(), id),
            })
            .collect_vec();
        if candidates.len() < 2 {
            debug!("no pair available from {} eligible ids", candidates.len());
            return None;
        }

        let pivots = self.pivot_order(&candidates, noise);
        let pair = self
            .best_pair(state, &candidates, &pivots, features, false)
            .or_else(|| {
                if self.config.allow_repeats() {
                    debug!("all pairs were shown, falling back to repeats");
                    self.best_pair(state, &candidates, &pivots, features, true)
                } else {
                    None
                }
            });

        match pair {
            Some(pair) => {
                debug!("selected pair ({}, {})", pair.a, pair.b);
                state.record_shown(&pair);
                Some(pair)
            }
            None => {
                debug!("all pairs of {} eligible ids were shown", candidates.len());
                None
            }
        }
    }

    /// Orders the candidate indices by their preference as pivot.
    ///
    /// The items of the boundary window around the median strength come first, followed by all
    /// remaining items ordered by descending uncertainty.
    fn pivot_order(&self, candidates: &[Candidate], noise: &mut dyn NoiseSource) -> Vec<usize> {
        let by_strength = (0..candidates.len())
            .sorted_by(|&i, &j| nan_safe_f32_cmp_desc(&candidates[i].logit, &candidates[j].logit))
            .collect_vec();
        let window_len = self.config.window().min(candidates.len());
        let start = (candidates.len() / 2)
            .saturating_sub(window_len / 2)
            .min(candidates.len() - window_len);
        let window = &by_strength[start..start + window_len];

        let window_order = match self.config.pivot() {
            PivotPolicy::MostUncertain => window
                .iter()
                .copied()
                .sorted_by(|&i, &j| {
                    nan_safe_f32_cmp_desc(&candidates[i].uncertainty, &candidates[j].uncertainty)
                })
                .collect_vec(),
            PivotPolicy::Sampled { scale } => window
                .iter()
                .map(|&i| {
                    let candidate = &candidates[i];
                    let draw = candidate.logit
                        + scale * candidate.uncertainty * noise.standard_normal();
                    (i, draw)
                })
                .sorted_by(|(_, a), (_, b)| nan_safe_f32_cmp_desc(a, b))
                .map(|(i, _)| i)
                .collect_vec(),
        };
        let rest = by_strength[..start]
            .iter()
            .chain(&by_strength[start + window_len..])
            .copied()
            .sorted_by(|&i, &j| {
                nan_safe_f32_cmp_desc(&candidates[i].uncertainty, &candidates[j].uncertainty)
            });

        window_order.into_iter().chain(rest).collect()
    }

    /// Finds the best partner for the first pivot which has one.
    fn best_pair(
        &self,
        state: &UserState,
        candidates: &[Candidate],
        pivots: &[usize],
        features: &impl FeatureLookup,
        repeats: bool,
    ) -> Option<Pair> {
        pivots.iter().find_map(|&pivot| {
            let pivot = &candidates[pivot];
            let pivot_features = view_or_empty(features.features(pivot.id));

            candidates
                .iter()
                .filter(|partner| partner.id != pivot.id)
                .filter(|partner| repeats || !state.was_shown(pivot.id, partner.id))
                .map(|partner| {
                    let similarity = cosine_similarity(
                        pivot_features,
                        view_or_empty(features.features(partner.id)),
                    );
                    let score = pivot.uncertainty.min(partner.uncertainty)
                        * (1. - similarity)
                        * (-(pivot.logit - partner.logit).abs()).exp();
                    trace!("pair ({}, {}) scores {}", pivot.id, partner.id, score);
                    (partner, score)
                })
                // first candidate wins on ties
                .fold(None, |best: Option<(&Candidate, f32)>, (partner, score)| {
                    match best {
                        Some((_, best_score))
                            if nan_safe_f32_cmp(&score, &best_score) != Ordering::Greater =>
                        {
                            best
                        }
                        _ => Some((partner, score)),
                    }
                })
                .map(|(partner, _)| Pair {
                    a: pivot.id.clone(),
                    b: partner.id.clone(),
                })
        })
    }
}
