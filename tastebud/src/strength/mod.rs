mod btl;
mod elo;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub(crate) use self::{btl::Btl, elo::Elo};
use crate::{
    config::{Config, StrengthStrategy},
    item::ItemId,
};

/// The pairwise record of an item.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// The learned strength, on the scale of the strategy which produced it.
    pub strength: f32,
    pub comparisons: u32,
    pub wins: u32,
    pub losses: u32,
}

impl Rating {
    pub(crate) fn new(strength: f32) -> Self {
        Self {
            strength,
            comparisons: 0,
            wins: 0,
            losses: 0,
        }
    }

    fn record_win(&mut self) {
        self.comparisons += 1;
        self.wins += 1;
    }

    fn record_loss(&mut self) {
        self.comparisons += 1;
        self.losses += 1;
    }
}

/// The ratings and the accumulated information of all referenced items.
///
/// Records are created lazily on the first update and are never removed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    pub(crate) ratings: HashMap<ItemId, Rating>,
    pub(crate) info: HashMap<ItemId, f32>,
}

impl Ratings {
    /// Gets the rating of the item, if it was compared at least once.
    pub fn get(&self, id: &ItemId) -> Option<&Rating> {
        self.ratings.get(id)
    }

    /// Gets the accumulated Fisher information of the item.
    pub fn info(&self, id: &ItemId) -> f32 {
        self.info.get(id).copied().unwrap_or_default()
    }

    /// Iterates over all rated items in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &Rating)> {
        self.ratings.iter()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    fn strength_or(&self, id: &ItemId, initial: f32) -> f32 {
        self.ratings
            .get(id)
            .map_or(initial, |rating| rating.strength)
    }

    /// Records the outcome for both items and sets their new strengths.
    fn record(
        &mut self,
        winner: &ItemId,
        loser: &ItemId,
        initial: f32,
        strengths: (f32, f32),
    ) {
        let (winner_strength, loser_strength) = strengths;

        let rating = self
            .ratings
            .entry(winner.clone())
            .or_insert_with(|| Rating::new(initial));
        rating.strength = winner_strength;
        rating.record_win();

        let rating = self
            .ratings
            .entry(loser.clone())
            .or_insert_with(|| Rating::new(initial));
        rating.strength = loser_strength;
        rating.record_loss();
    }
}

/// Learns the per item strengths from pairwise outcomes.
pub(crate) trait StrengthModel {
    /// The strength of an item which was never compared.
    fn initial_strength(&self) -> f32;

    /// Updates the ratings of both items after `winner` was preferred over `loser`.
    fn update(&self, ratings: &mut Ratings, winner: &ItemId, loser: &ItemId);

    /// The uncertainty about the strength of the item.
    ///
    /// It never increases when the item takes part in more comparisons.
    fn uncertainty(&self, ratings: &Ratings, id: &ItemId) -> f32;

    /// Maps a strength onto the logit scale, ie. the scale on which a difference of `1` means
    /// odds of `e : 1` for the stronger item.
    fn logit(&self, strength: f32) -> f32;

    /// The strength of the item on the logit scale.
    fn logit_strength(&self, ratings: &Ratings, id: &ItemId) -> f32 {
        self.logit(ratings.strength_or(id, self.initial_strength()))
    }
}

/// The configured strength model.
#[derive(Clone, Debug)]
pub(crate) enum Strength {
    Btl(Btl),
    Elo(Elo),
}

impl Strength {
    pub(crate) fn from_config(config: &Config) -> Self {
        match config.strategy() {
            StrengthStrategy::Btl => Self::Btl(Btl::new(config.btl().clone())),
            StrengthStrategy::Elo => Self::Elo(Elo::new(config.elo().clone())),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $model:ident => $call:expr) => {
        match $self {
            Strength::Btl($model) => $call,
            Strength::Elo($model) => $call,
        }
    };
}

impl StrengthModel for Strength {
    fn initial_strength(&self) -> f32 {
        dispatch!(self, model => model.initial_strength())
    }

    fn update(&self, ratings: &mut Ratings, winner: &ItemId, loser: &ItemId) {
        dispatch!(self, model => model.update(ratings, winner, loser))
    }

    fn uncertainty(&self, ratings: &Ratings, id: &ItemId) -> f32 {
        dispatch!(self, model => model.uncertainty(ratings, id))
    }

    fn logit(&self, strength: f32) -> f32 {
        dispatch!(self, model => model.logit(strength))
    }
}
