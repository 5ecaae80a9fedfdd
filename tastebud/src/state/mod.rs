#![allow(unused_macros)] // obake

mod database;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use smallvec::SmallVec;

pub use self::database::StateError;
use crate::{
    item::ItemId,
    learner::Weights,
    selector::{Pair, PairKey},
    strength::Ratings,
};

/// The maximum number of recently shown ids.
pub const RECENTLY_SHOWN: usize = 8;

/// The lifecycle of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize_repr, Serialize_repr)]
#[repr(u8)]
pub enum Phase {
    /// No outcome was applied yet.
    Fresh = 0,
    /// Pairs are being shown and decided.
    Eliciting = 1,
    /// No further pair is available.
    Exhausted = 2,
    /// Recommendations were requested.
    Recommending = 3,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Fresh
    }
}

/// The most recently shown ids, most recent first and without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentlyShown(SmallVec<[ItemId; RECENTLY_SHOWN]>);

impl RecentlyShown {
    /// Moves the id to the front, the oldest id is dropped if the capacity is exceeded.
    fn push(&mut self, id: &ItemId) {
        self.0.retain(|shown| shown != id);
        self.0.insert(0, id.clone());
        self.0.truncate(RECENTLY_SHOWN);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.0.iter()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything the engine learned about one user.
#[obake::versioned]
#[obake(version("0.0.0"))]
#[obake(version("0.1.0"))]
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct UserState {
    #[obake(cfg(">=0.1"))]
    pub(crate) ratings: Ratings,
    #[obake(cfg(">=0.0"))]
    pub(crate) weights: Weights,
    #[obake(cfg(">=0.1"))]
    pub(crate) seen: HashSet<ItemId>,
    #[obake(cfg(">=0.1"))]
    pub(crate) blocked: HashSet<ItemId>,
    #[obake(cfg(">=0.1"))]
    pub(crate) recently_shown: RecentlyShown,
    #[obake(cfg(">=0.1"))]
    pub(crate) pairs_shown: HashSet<PairKey>,
    #[obake(cfg(">=0.0"))]
    pub(crate) rounds: u32,
    #[obake(cfg(">=0.1"))]
    pub(crate) phase: Phase,
}

impl From<UserState_v0_0_0> for UserState {
    fn from(state: UserState_v0_0_0) -> Self {
        let phase = if state.rounds > 0 {
            Phase::Eliciting
        } else {
            Phase::Fresh
        };

        Self {
            weights: state.weights,
            rounds: state.rounds,
            phase,
            ..Self::default()
        }
    }
}

impl UserState {
    pub fn ratings(&self) -> &Ratings {
        &self.ratings
    }

    /// The learned content weights.
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn seen(&self) -> &HashSet<ItemId> {
        &self.seen
    }

    pub fn blocked(&self) -> &HashSet<ItemId> {
        &self.blocked
    }

    pub fn recently_shown(&self) -> &RecentlyShown {
        &self.recently_shown
    }

    /// The unordered pairs offered so far.
    pub fn pairs_shown(&self) -> &HashSet<PairKey> {
        &self.pairs_shown
    }

    /// The number of applied outcomes.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Checks if the unordered pair was offered before.
    pub fn was_shown(&self, a: &ItemId, b: &ItemId) -> bool {
        self.pairs_shown.contains(&PairKey::new(a, b))
    }

    /// Checks if the item may still be offered, ie. it is neither blocked nor seen.
    pub fn is_eligible(&self, id: &ItemId) -> bool {
        !self.blocked.contains(id) && !self.seen.contains(id)
    }

    pub(crate) fn record_shown(&mut self, pair: &Pair) {
        self.recently_shown.push(&pair.a);
        self.recently_shown.push(&pair.b);
        self.pairs_shown.insert(pair.key());
    }

    /// Clears everything and starts over.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str) -> Pair {
        Pair {
            a: a.into(),
            b: b.into(),
        }
    }

    #[test]
    fn test_fresh_state() {
        let state = UserState::default();

        assert!(state.ratings().is_empty());
        assert!(state.weights().is_empty());
        assert!(state.seen().is_empty());
        assert!(state.blocked().is_empty());
        assert!(state.recently_shown().is_empty());
        assert!(state.pairs_shown().is_empty());
        assert_eq!(state.rounds(), 0);
        assert_eq!(state.phase(), Phase::Fresh);
    }

    #[test]
    fn test_recently_shown_is_bounded_and_unique() {
        let mut state = UserState::default();

        for i in 0..10 {
            state.record_shown(&pair(&i.to_string(), &(i + 1).to_string()));
            let shown = state.recently_shown().iter().collect::<Vec<_>>();
            assert!(shown.len() <= RECENTLY_SHOWN);
            assert_eq!(
                shown.iter().collect::<HashSet<_>>().len(),
                shown.len(),
                "duplicates in {:?}",
                shown,
            );
        }

        let shown = state.recently_shown().iter().cloned().collect::<Vec<_>>();
        let expected = ["10", "9", "8", "7", "6", "5", "4", "3"]
            .iter()
            .map(|&id| ItemId::from(id))
            .collect::<Vec<_>>();
        assert_eq!(shown, expected);
        assert_eq!(state.pairs_shown().len(), 10);
    }

    #[test]
    fn test_was_shown_ignores_the_order() {
        let mut state = UserState::default();
        state.record_shown(&pair("a", "b"));

        assert!(state.was_shown(&"a".into(), &"b".into()));
        assert!(state.was_shown(&"b".into(), &"a".into()));
        assert!(!state.was_shown(&"a".into(), &"c".into()));
    }

    #[test]
    fn test_eligibility() {
        let mut state = UserState::default();
        state.blocked.insert("blocked".into());
        state.seen.insert("seen".into());

        assert!(!state.is_eligible(&"blocked".into()));
        assert!(!state.is_eligible(&"seen".into()));
        assert!(state.is_eligible(&"other".into()));
    }

    #[test]
    fn test_reset() {
        let mut state = UserState::default();
        state.record_shown(&pair("a", "b"));
        state.blocked.insert("c".into());
        state.rounds = 3;
        state.phase = Phase::Exhausted;

        state.reset();

        assert_eq!(state, UserState::default());
    }

    #[test]
    fn test_migration_from_v0() {
        let legacy = UserState_v0_0_0 {
            weights: Weights::from(vec![0.5, -0.25]),
            rounds: 12,
        };

        let state = UserState::from(legacy.clone());

        assert_eq!(state.weights(), &legacy.weights);
        assert_eq!(state.rounds(), 12);
        assert_eq!(state.phase(), Phase::Eliciting);
        assert!(state.ratings().is_empty());
    }
}
