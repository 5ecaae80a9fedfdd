use std::f32::consts::LN_10;

use log::trace;

use crate::{
    config::EloConfig,
    item::ItemId,
    strength::{Ratings, StrengthModel},
};

/// Elo ratings whose k-factor decays with the number of comparisons of an item.
///
/// New items move fast and well observed items move slowly, which plays the role of the
/// information shrinkage of the [`Btl`](super::Btl) model.
#[derive(Clone, Debug)]
pub(crate) struct Elo {
    config: EloConfig,
}

impl Elo {
    pub(crate) fn new(config: EloConfig) -> Self {
        Self { config }
    }

    /// The expected score of `a` against `b`.
    fn expected_score(&self, a: f32, b: f32) -> f32 {
        1. / (1. + 10_f32.powf((b - a) / self.config.scale()))
    }

    fn k_factor(&self, comparisons: u32) -> f32 {
        self.config.base_k() / (1. + comparisons as f32).sqrt()
    }
}

impl StrengthModel for Elo {
    fn initial_strength(&self) -> f32 {
        self.config.initial()
    }

    fn update(&self, ratings: &mut Ratings, winner: &ItemId, loser: &ItemId) {
        let initial = self.config.initial();
        let (winner_rating, winner_comparisons) = ratings
            .get(winner)
            .map_or((initial, 0), |rating| (rating.strength, rating.comparisons));
        let (loser_rating, loser_comparisons) = ratings
            .get(loser)
            .map_or((initial, 0), |rating| (rating.strength, rating.comparisons));

        let expected = self.expected_score(winner_rating, loser_rating);
        let strengths = (
            winner_rating + self.k_factor(winner_comparisons) * (1. - expected),
            loser_rating - self.k_factor(loser_comparisons) * (1. - expected),
        );
        trace!(
            "elo {} beats {}: expected = {}, ratings {:?}",
            winner,
            loser,
            expected,
            strengths,
        );
        ratings.record(winner, loser, initial, strengths);
    }

    fn uncertainty(&self, ratings: &Ratings, id: &ItemId) -> f32 {
        let comparisons = ratings.get(id).map_or(0, |rating| rating.comparisons);
        1. / (1. + comparisons as f32).sqrt()
    }

    fn logit(&self, strength: f32) -> f32 {
        (strength - self.config.initial()) * LN_10 / self.config.scale()
    }
}

#[cfg(test)]
mod tests {
    use test_utils::assert_approx_eq;

    use super::*;

    #[test]
    fn test_first_comparison() {
        let elo = Elo::new(EloConfig::default());
        let mut ratings = Ratings::default();
        let (a, b) = (ItemId::from("a"), ItemId::from("b"));

        elo.update(&mut ratings, &a, &b);

        let a = ratings.get(&a).unwrap();
        let b = ratings.get(&b).unwrap();
        assert_approx_eq!(f32, a.strength, 1216.);
        assert_approx_eq!(f32, b.strength, 1184.);
        assert_eq!(a.comparisons, 1);
        assert_eq!(b.comparisons, 1);
    }

    #[test]
    fn test_k_factor_decays() {
        let elo = Elo::new(EloConfig::default());

        assert_approx_eq!(f32, elo.k_factor(0), 32.);
        assert_approx_eq!(f32, elo.k_factor(3), 16.);
        assert!(elo.k_factor(10) > elo.k_factor(11));
    }

    #[test]
    fn test_experienced_items_move_slowly() {
        let elo = Elo::new(EloConfig::default());
        let mut ratings = Ratings::default();
        let (veteran, rookie, other) = (ItemId::from("v"), ItemId::from("r"), ItemId::from("o"));

        for _ in 0..8 {
            elo.update(&mut ratings, &veteran, &other);
            elo.update(&mut ratings, &other, &veteran);
        }
        let before = ratings.get(&veteran).unwrap().strength;
        elo.update(&mut ratings, &rookie, &veteran);

        let veteran_loss = before - ratings.get(&veteran).unwrap().strength;
        let rookie_gain = ratings.get(&rookie).unwrap().strength - 1200.;
        assert!(veteran_loss < rookie_gain);
    }

    #[test]
    fn test_expected_score() {
        let elo = Elo::new(EloConfig::default());

        assert_approx_eq!(f32, elo.expected_score(1200., 1200.), 0.5);
        assert_approx_eq!(
            f32,
            elo.expected_score(1600., 1200.),
            10. / 11.,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_logit_scale() {
        let elo = Elo::new(EloConfig::default());

        assert_approx_eq!(f32, elo.logit(1200.), 0.);
        assert_approx_eq!(f32, elo.logit(1600.), LN_10);
    }

    #[test]
    fn test_uncertainty() {
        let elo = Elo::new(EloConfig::default());
        let mut ratings = Ratings::default();
        let (a, b) = (ItemId::from("a"), ItemId::from("b"));

        assert_approx_eq!(f32, elo.uncertainty(&ratings, &a), 1.);
        for _ in 0..3 {
            elo.update(&mut ratings, &a, &b);
        }
        assert_approx_eq!(f32, elo.uncertainty(&ratings, &a), 0.5);
    }
}
