use std::{
    fs::{self, File},
    io::{self, BufReader, Write},
    path::Path,
};

use anyhow::{Context, Error};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tastebud::Item;

pub(crate) fn progress_spin_until_done<R>(msg: &'static str, func: impl FnOnce() -> R) -> R {
    let progress_bar = ProgressBar::new_spinner()
        .with_style(ProgressStyle::default_bar().template("{msg}: {elapsed:>10} {spinner:.green}"));
    progress_bar.set_message(msg);
    progress_bar.enable_steady_tick(100);
    let res = func();
    progress_bar.finish();
    res
}

/// A bar which counts the elicitation rounds.
pub(crate) fn rounds_progress_bar(rounds: usize) -> ProgressBar {
    let progress_bar = ProgressBar::new(rounds as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("Rounds: [{bar:30.green}] {percent:>3}% ({pos:>4}/{len:>4}) {msg}")
            .progress_chars("=> "),
    );
    progress_bar
}

/// Loads a JSON array of catalogue items.
pub(crate) fn load_catalogue(path: impl AsRef<Path>) -> Result<Vec<Item>, Error> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Opening the catalogue {} failed", path.display()))?;

    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Parsing the catalogue {} failed", path.display()))
}

/// Reads a serialized user state, no file means a fresh state.
pub(crate) fn load_state(path: Option<impl AsRef<Path>>) -> Result<Vec<u8>, Error> {
    match path {
        Some(path) => {
            let path = path.as_ref();
            fs::read(path).with_context(|| format!("Reading the state {} failed", path.display()))
        }
        None => Ok(Vec::new()),
    }
}

pub(crate) fn save_state(path: impl AsRef<Path>, bytes: &[u8]) -> Result<(), Error> {
    let path = path.as_ref();
    fs::write(path, bytes).with_context(|| format!("Writing the state {} failed", path.display()))
}

/// Writes the value as JSON to stdout.
pub(crate) fn print_json(value: &impl Serialize, pretty: bool) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_catalogue() {
        let items = load_catalogue(test_utils::catalogue().unwrap()).unwrap();

        assert_eq!(items.len(), 16);
        assert!(items.iter().all(|item| item.features.is_some()));
    }

    #[test]
    fn test_missing_catalogue() {
        let dir = tempdir().unwrap();

        let error = load_catalogue(dir.path().join("missing.json")).unwrap_err();
        assert!(error.to_string().starts_with("Opening the catalogue"));
    }

    #[test]
    fn test_state_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.bin");

        assert!(load_state(None::<&Path>).unwrap().is_empty());
        save_state(&path, &[1, 2, 3]).unwrap();
        assert_eq!(load_state(Some(&path)).unwrap(), [1, 2, 3]);
    }
}
