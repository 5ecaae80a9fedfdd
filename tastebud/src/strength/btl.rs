use log::trace;

use crate::{
    config::BtlConfig,
    item::ItemId,
    strength::{Ratings, StrengthModel},
    utils::sigmoid,
};

/// Guards the uncertainty of items without any information.
const INFO_EPSILON: f32 = 1e-6;

/// Bradley-Terry-Luce model, `P(i beats j) = sigmoid(θi - θj)`, fitted by online gradient steps.
#[derive(Clone, Debug)]
pub(crate) struct Btl {
    config: BtlConfig,
}

impl Btl {
    pub(crate) fn new(config: BtlConfig) -> Self {
        Self { config }
    }
}

impl StrengthModel for Btl {
    fn initial_strength(&self) -> f32 {
        0.
    }

    fn update(&self, ratings: &mut Ratings, winner: &ItemId, loser: &ItemId) {
        let theta_winner = ratings.strength_or(winner, 0.);
        let theta_loser = ratings.strength_or(loser, 0.);
        let learning_rate = self.config.learning_rate();
        let shrinkage = self.config.shrinkage();

        let p = sigmoid(theta_winner - theta_loser);
        let surprise = 1. - p;
        let strengths = (
            theta_winner + learning_rate * (surprise - shrinkage * theta_winner),
            theta_loser - learning_rate * (surprise + shrinkage * theta_loser),
        );
        trace!(
            "btl {} beats {}: p = {}, strengths {:?}",
            winner,
            loser,
            p,
            strengths,
        );
        ratings.record(winner, loser, 0., strengths);

        // both items gain the same local Fisher information
        let information = p * (1. - p);
        *ratings.info.entry(winner.clone()).or_default() += information;
        *ratings.info.entry(loser.clone()).or_default() += information;
    }

    fn uncertainty(&self, ratings: &Ratings, id: &ItemId) -> f32 {
        1. / (ratings.info(id) + INFO_EPSILON).sqrt()
    }

    fn logit(&self, strength: f32) -> f32 {
        strength
    }
}
