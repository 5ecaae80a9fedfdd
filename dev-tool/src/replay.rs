use std::{
    collections::HashMap,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::Error;
use log::{debug, warn};
use serde::Deserialize;
use structopt::StructOpt;
use tastebud::{Builder, Engine, FeatureVector, ItemId, OutcomeError};

use crate::{
    config_file::ConfigFile,
    exit_code::{NON_FATAL_ERROR, NO_ERROR},
    utils::{load_catalogue, load_state, progress_spin_until_done, save_state},
};

/// Replays recorded comparison outcomes onto a user state.
///
/// The outcomes are read from a csv file with a `winner` and a `loser` column. Outcomes which
/// can't be applied are reported and skipped.
#[derive(StructOpt, Debug)]
pub struct ReplayCmd {
    /// Csv file with the outcomes.
    outcomes: PathBuf,

    /// Serialized state to start from, a fresh state if not given.
    #[structopt(short, long)]
    input: Option<PathBuf>,

    /// File to write the resulting serialized state to.
    #[structopt(short, long)]
    out: PathBuf,

    /// JSON catalogue to look up the features of the items.
    ///
    /// Without it only the item strengths are learned.
    #[structopt(long)]
    catalogue: Option<PathBuf>,

    /// JSON file with the engine configuration.
    #[structopt(short, long)]
    config: Option<PathBuf>,
}

/// A recorded outcome.
#[derive(Debug, Deserialize)]
struct OutcomeRecord {
    winner: ItemId,
    loser: ItemId,
}

impl ReplayCmd {
    pub fn run(self) -> Result<i32, Error> {
        let ReplayCmd {
            outcomes,
            input,
            out,
            catalogue,
            config,
        } = self;

        let features: HashMap<ItemId, FeatureVector> = match catalogue {
            Some(path) => load_catalogue(path)?
                .into_iter()
                .filter_map(|item| {
                    let id = item.id;
                    item.features.map(move |features| (id, features))
                })
                .collect(),
            None => HashMap::new(),
        };
        let mut engine = Builder::default()
            .with_config(ConfigFile::load_config(config)?)
            .with_serialized_state(load_state(input)?)?
            .build();

        let records = load_outcomes(outcomes)?;
        let rejected = progress_spin_until_done("Replaying outcomes", || {
            replay(&mut engine, &records, &features)
        });
        save_state(out, &engine.serialize()?)?;

        if rejected.is_empty() {
            Ok(NO_ERROR)
        } else {
            for (line, error) in &rejected {
                eprintln!("Skipped outcome {}: {}", line, error);
            }
            Ok(NON_FATAL_ERROR)
        }
    }
}

fn load_outcomes(path: impl AsRef<Path>) -> Result<Vec<OutcomeRecord>, Error> {
    read_outcomes(csv::Reader::from_path(path)?)
}

fn read_outcomes<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<OutcomeRecord>, Error> {
    reader
        .deserialize()
        .map(|record| record.map_err(Into::into))
        .collect()
}

/// Applies all records in order, returns the rejected ones by their 1-based position.
fn replay(
    engine: &mut Engine,
    records: &[OutcomeRecord],
    features: &HashMap<ItemId, FeatureVector>,
) -> Vec<(usize, OutcomeError)> {
    let mut rejected = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let result = engine.apply_outcome(
            &record.winner,
            &record.loser,
            features.get(&record.winner),
            features.get(&record.loser),
        );
        if let Err(error) = result {
            warn!("Rejected outcome {}: {}", index + 1, error);
            rejected.push((index + 1, error));
        }
    }
    debug!(
        "Replayed {} of {} outcomes.",
        records.len() - rejected.len(),
        records.len(),
    );

    rejected
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    const OUTCOMES: &str = "winner,loser\n\
        tt0133093,tt0109830\n\
        tt0083658,tt0083658\n\
        tt0133093,tt0083658\n";

    fn records() -> Vec<OutcomeRecord> {
        read_outcomes(csv::Reader::from_reader(OUTCOMES.as_bytes())).unwrap()
    }

    #[test]
    fn test_read_outcomes() {
        let records = records();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].winner, ItemId::from("tt0133093"));
        assert_eq!(records[0].loser, ItemId::from("tt0109830"));
    }

    #[test]
    fn test_missing_column() {
        let reader = csv::Reader::from_reader("winner\ntt0133093\n".as_bytes());

        assert!(read_outcomes(reader).is_err());
    }

    #[test]
    fn test_self_comparisons_are_skipped() {
        let mut engine = Builder::default().with_seed(0).build();

        let rejected = replay(&mut engine, &records(), &HashMap::new());

        assert_eq!(
            rejected,
            [(2, OutcomeError::SelfComparison("tt0083658".into()))],
        );
        assert_eq!(engine.state().rounds(), 2);
        assert_eq!(engine.ranking()[0].0, ItemId::from("tt0133093"));
    }

    #[test]
    fn test_run_writes_the_state() {
        let dir = tempdir().unwrap();
        let outcomes = dir.path().join("outcomes.csv");
        let out = dir.path().join("state.bin");
        fs::write(&outcomes, OUTCOMES).unwrap();

        let exit_code = ReplayCmd {
            outcomes,
            input: None,
            out: out.clone(),
            catalogue: Some(test_utils::catalogue().unwrap()),
            config: None,
        }
        .run()
        .unwrap();
        assert_eq!(exit_code, NON_FATAL_ERROR);

        let engine = Builder::default()
            .with_serialized_state(fs::read(&out).unwrap())
            .unwrap()
            .build();
        assert_eq!(engine.state().rounds(), 2);
        assert_eq!(engine.state().weights().len(), 8);
    }
}
