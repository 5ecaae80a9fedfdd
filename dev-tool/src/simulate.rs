use std::path::PathBuf;

use anyhow::{bail, Error};
use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use structopt::StructOpt;
use tastebud::{Builder, Engine, Item, ItemId, Recommendation};

use crate::{
    config_file::ConfigFile,
    exit_code::NO_ERROR,
    inspect::StateSummary,
    utils::{load_catalogue, print_json, rounds_progress_bar, save_state},
};

/// Simulates an elicitation session of a user with a known taste.
///
/// The simulated user prefers the item whose features have the larger dot product with the
/// taste vector.
#[derive(StructOpt, Debug)]
pub struct SimulateCmd {
    /// Path to the JSON catalogue.
    catalogue: PathBuf,

    /// The hidden taste of the user, one comma separated weight per feature dimension.
    #[structopt(long, use_delimiter = true, allow_hyphen_values = true)]
    taste: Vec<f32>,

    /// Maximum number of comparisons.
    #[structopt(short, long, default_value = "30")]
    rounds: usize,

    /// Number of recommendations to request at the end.
    #[structopt(short, long, default_value = "5")]
    k: usize,

    /// Seed of the pivot noise and the answer noise.
    #[structopt(short, long, default_value = "0")]
    seed: u64,

    /// JSON file with the engine configuration.
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Probability that the user answers against their taste.
    #[structopt(long, default_value = "0")]
    flip: f64,

    /// Writes the final serialized state to this file.
    #[structopt(long)]
    state_out: Option<PathBuf>,

    /// Pretty prints the summary.
    #[structopt(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct SimulationSummary {
    comparisons: usize,
    flipped: usize,
    #[serde(flatten)]
    state: StateSummary,
    recommendations: Vec<Recommendation>,
}

impl SimulateCmd {
    pub fn run(self) -> Result<i32, Error> {
        let SimulateCmd {
            catalogue,
            taste,
            rounds,
            k,
            seed,
            config,
            flip,
            state_out,
            pretty,
        } = self;

        if !(0. ..=1.).contains(&flip) {
            bail!("flip needs to be in range 0..=1");
        }

        let pool = load_catalogue(catalogue)?;
        let config = ConfigFile::load_config(config)?;
        let mut engine = Builder::default()
            .with_config(config)
            .with_seed(seed)
            .build();
        let mut user = SimulatedUser::new(taste, flip, seed);

        let progress_bar = rounds_progress_bar(rounds);
        let mut comparisons = 0;
        while comparisons < rounds {
            if !play_round(&mut engine, &pool, &mut user)? {
                progress_bar.println("No more pairs to show.");
                break;
            }
            comparisons += 1;
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();
        info!(
            "Simulated {} comparisons, {} answers flipped.",
            comparisons, user.flipped,
        );

        let recommendations = engine.recommend(&pool, k);
        if let Some(path) = state_out {
            save_state(path, &engine.serialize()?)?;
        }

        let summary = SimulationSummary {
            comparisons,
            flipped: user.flipped,
            state: StateSummary::new(&engine, pool.len()),
            recommendations,
        };
        print_json(&summary, pretty)?;

        Ok(NO_ERROR)
    }
}

struct SimulatedUser {
    taste: Vec<f32>,
    flip: f64,
    rng: StdRng,
    flipped: usize,
}

impl SimulatedUser {
    fn new(taste: Vec<f32>, flip: f64, seed: u64) -> Self {
        Self {
            taste,
            flip,
            rng: StdRng::seed_from_u64(seed),
            flipped: 0,
        }
    }

    fn utility(&self, item: &Item) -> f32 {
        item.features.as_ref().map_or(0., |features| {
            features
                .iter()
                .zip(self.taste.iter())
                .map(|(x, t)| x * t)
                .sum()
        })
    }

    /// Returns whether the user prefers `a` over `b`.
    fn prefers(&mut self, a: &Item, b: &Item) -> bool {
        let honest = self.utility(a) >= self.utility(b);
        if self.flip > 0. && self.rng.gen_bool(self.flip) {
            self.flipped += 1;
            !honest
        } else {
            honest
        }
    }
}

fn find<'a>(pool: &'a [Item], id: &ItemId) -> Result<&'a Item, Error> {
    match pool.iter().find(|item| &item.id == id) {
        Some(item) => Ok(item),
        None => bail!("The selected item {} is not in the catalogue", id),
    }
}

/// Shows the next pair to the user and applies the answer, returns `false` if no pair is left.
fn play_round(engine: &mut Engine, pool: &[Item], user: &mut SimulatedUser) -> Result<bool, Error> {
    let pair = match engine.next_pair(pool) {
        Some(pair) => pair,
        None => return Ok(false),
    };
    let (a, b) = (find(pool, &pair.a)?, find(pool, &pair.b)?);
    let (winner, loser) = if user.prefers(a, b) { (a, b) } else { (b, a) };
    debug!("{} > {}", winner.title, loser.title);

    engine.apply_outcome(
        &winner.id,
        &loser.id,
        winner.features.as_ref(),
        loser.features.as_ref(),
    )?;

    Ok(true)
}
