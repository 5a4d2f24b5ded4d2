//! Parsing command-line arguments.

use clap::{command, value_parser, Arg};
use nrss_lib::Config;
use std::path::PathBuf;

/// A struct to store the parse results.
pub(crate) struct Args {
    pub(crate) config: Config,
    pub(crate) state_file: PathBuf,
}

/// Parses the command-line arguments.
pub(crate) fn parse() -> Result<Args, clap::Error> {
    let matches = command!()
        .long_about(
            "Searching for non-adjustable-reduced-speed spaceships (NRSS)\n\
             \n\
             The program builds soups from repeated copies of a small seed \n\
             engine at varying offsets and phases, evolves each soup, and \n\
             records every distinct purely-horizontal spaceship speed in \n\
             the state file. Interrupting the search and starting it again \n\
             with the same state file resumes without duplicates.\n",
        )
        .arg(
            Arg::new("ENGINES")
                .help("Number of engine copies per soup")
                .required(true)
                .index(1)
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("MAXXSEP")
                .help("Largest x-separation between engines")
                .required(true)
                .index(2)
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("MAXPERIOD")
                .help("Generation cap per soup")
                .required(true)
                .index(3)
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("RANDOMIZE")
                .help("1 to randomize soups, 0 to enumerate every combination")
                .required(true)
                .index(4)
                .value_parser(["0", "1"]),
        )
        .arg(
            Arg::new("STATEFILE")
                .help("Path of the persisted discovery ledger")
                .required(true)
                .index(5)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("SEED")
                .help("Fixed noise-source seed, for reproducible randomized runs")
                .long("seed")
                .value_parser(value_parser!(u64)),
        )
        .try_get_matches()?;

    let engines = *matches.get_one::<u32>("ENGINES").unwrap();
    let max_x_sep = *matches.get_one::<u32>("MAXXSEP").unwrap();
    let max_period = *matches.get_one::<u32>("MAXPERIOD").unwrap();
    let randomize = matches.get_one::<String>("RANDOMIZE").unwrap() == "1";
    let state_file = matches.get_one::<PathBuf>("STATEFILE").unwrap().clone();
    let seed = matches.get_one::<u64>("SEED").copied();

    let config = Config::new(engines, max_x_sep, max_period, randomize).set_seed(seed);
    Ok(Args { config, state_file })
}
