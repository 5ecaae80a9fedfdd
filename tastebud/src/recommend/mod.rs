mod mmr;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

pub use self::mmr::select_diverse;
use crate::{
    config::MmrConfig,
    features::{cosine_similarity, view_or_empty},
    item::{Item, ItemId},
    state::UserState,
    strength::StrengthModel,
};

/// A recommended item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: ItemId,
    /// The relevance of the item for the user.
    pub score: f32,
    pub poster_url: Option<String>,
    pub trailer_key: Option<String>,
    /// A human readable explanation.
    pub reason: String,
}

/// Scores the pool and builds a relevant but diverse top-k list from it.
#[derive(Clone, Debug)]
pub(crate) struct Recommender {
    config: MmrConfig,
}

impl Recommender {
    pub(crate) fn new(config: MmrConfig) -> Self {
        Self { config }
    }

    /// The relevance `weight_score * (w · x) + weight_strength * strength` of the item, where
    /// the strength is on the logit scale.
    pub(crate) fn relevance(
        &self,
        state: &UserState,
        model: &impl StrengthModel,
        item: &Item,
    ) -> f32 {
        self.config.weight_score() * state.weights().score(item.features.as_ref())
            + self.config.weight_strength() * model.logit_strength(state.ratings(), &item.id)
    }

    /// Recommends up to `k` items of the pool which are neither blocked nor seen.
    ///
    /// The trade-off `lambda` must be validated by the caller.
    pub(crate) fn recommend(
        &self,
        state: &UserState,
        model: &impl StrengthModel,
        pool: &[Item],
        k: usize,
        lambda: f32,
    ) -> Vec<Recommendation> {
        let candidates = pool
            .iter()
            .unique_by(|item| &item.id)
            .filter(|item| state.is_eligible(&item.id))
            .map(|item| (item, self.relevance(state, model, item)))
            .collect_vec();

        let selected = select_diverse(
            &candidates,
            k,
            lambda,
            |(_, relevance)| *relevance,
            |(a, _), (b, _)| {
                cosine_similarity(
                    view_or_empty(a.features.as_ref()),
                    view_or_empty(b.features.as_ref()),
                )
            },
        );
        debug!(
            "recommending {} of {} candidates",
            selected.len(),
            candidates.len(),
        );

        selected
            .into_iter()
            .map(|index| {
                let (item, relevance) = candidates[index];
                Recommendation {
                    id: item.id.clone(),
                    score: relevance,
                    poster_url: item.poster_url.clone(),
                    trailer_key: item.trailer_key.clone(),
                    reason: self.config.reason().to_string(),
                }
            })
            .collect()
    }
}
