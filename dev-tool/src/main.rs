use std::process::exit;

use anyhow::Error;
use structopt::StructOpt;

use crate::exit_code::FATAL_ERROR;

mod config_file;
mod exit_code;
mod inspect;
mod replay;
mod simulate;
mod utils;

/// Tooling for the developers of tastebud.
#[derive(StructOpt, Debug)]
enum CommandArgs {
    Simulate(simulate::SimulateCmd),
    Replay(replay::ReplayCmd),
    Inspect(inspect::InspectCmd),
}

impl CommandArgs {
    fn run(self) -> Result<i32, Error> {
        match self {
            CommandArgs::Simulate(cmd) => cmd.run(),
            CommandArgs::Replay(cmd) => cmd.run(),
            CommandArgs::Inspect(cmd) => cmd.run(),
        }
    }
}

fn main() {
    env_logger::init();

    let exit_code = match CommandArgs::from_args().run() {
        Ok(exit_code) => exit_code,
        Err(error) => {
            eprintln!("{:?}", error);
            FATAL_ERROR
        }
    };

    exit(exit_code);
}
