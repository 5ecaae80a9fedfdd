use std::path::PathBuf;

use anyhow::Error;
use itertools::Itertools;
use log::debug;
use serde::Serialize;
use structopt::StructOpt;
use tastebud::{Builder, Engine, ItemId};

use crate::{
    exit_code::NO_ERROR,
    utils::{load_state, print_json},
};

/// Prints a summary of a serialized user state.
#[derive(StructOpt, Debug)]
pub struct InspectCmd {
    /// Path to the serialized state.
    state: PathBuf,

    /// Number of the strongest items to list.
    #[structopt(short, long, default_value = "10")]
    top: usize,

    /// Pretty prints the summary.
    #[structopt(long)]
    pretty: bool,
}

impl InspectCmd {
    pub fn run(self) -> Result<i32, Error> {
        let Self { state, top, pretty } = self;

        debug!("Loading the state from {}.", state.display());
        let engine = Builder::default()
            .with_serialized_state(load_state(Some(&state))?)?
            .build();

        print_json(&StateSummary::new(&engine, top), pretty)?;
        Ok(NO_ERROR)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RankedItem {
    pub(crate) id: ItemId,
    pub(crate) strength: f32,
    pub(crate) comparisons: u32,
    pub(crate) wins: u32,
    pub(crate) losses: u32,
}

/// The human readable parts of a user state.
#[derive(Debug, Serialize)]
pub(crate) struct StateSummary {
    pub(crate) phase: String,
    pub(crate) rounds: u32,
    pub(crate) weights: Vec<f32>,
    pub(crate) ranking: Vec<RankedItem>,
    pub(crate) recently_shown: Vec<ItemId>,
    pub(crate) pairs_shown: usize,
    pub(crate) blocked: Vec<ItemId>,
    pub(crate) seen: usize,
}

impl StateSummary {
    pub(crate) fn new(engine: &Engine, top: usize) -> Self {
        let state = engine.state();
        let ranking = engine
            .ranking()
            .into_iter()
            .take(top)
            .map(|(id, rating)| RankedItem {
                id,
                strength: rating.strength,
                comparisons: rating.comparisons,
                wins: rating.wins,
                losses: rating.losses,
            })
            .collect();

        Self {
            phase: format!("{:?}", engine.phase()),
            rounds: state.rounds(),
            weights: state.weights().to_vec(),
            ranking,
            recently_shown: state.recently_shown().iter().cloned().collect(),
            pairs_shown: state.pairs_shown().len(),
            blocked: state.blocked().iter().cloned().sorted().collect(),
            seen: state.seen().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_a_fresh_state() {
        let summary = StateSummary::new(&Builder::default().with_seed(0).build(), 10);

        assert_eq!(summary.phase, "Fresh");
        assert_eq!(summary.rounds, 0);
        assert!(summary.weights.is_empty());
        assert!(summary.ranking.is_empty());
    }

    #[test]
    fn test_summary_is_truncated_to_the_top_items() {
        let mut engine = Builder::default().with_seed(0).build();
        engine
            .apply_outcome(&"a".into(), &"b".into(), None, None)
            .unwrap();
        engine
            .apply_outcome(&"a".into(), &"c".into(), None, None)
            .unwrap();
        engine.block("d");
        engine.block("c");

        let summary = StateSummary::new(&engine, 1);

        assert_eq!(summary.phase, "Eliciting");
        assert_eq!(summary.rounds, 2);
        assert_eq!(summary.ranking.len(), 1);
        assert_eq!(summary.ranking[0].id, ItemId::from("a"));
        assert_eq!(summary.ranking[0].wins, 2);
        assert_eq!(summary.blocked, [ItemId::from("c"), "d".into()]);
    }
}
