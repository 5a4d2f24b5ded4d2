//! The search driver.

use crate::{
    config::Config,
    detect::{PatternCache, Repeat, Speed},
    engine::PhaseTable,
    error::Error,
    lattice::{Lattice, Step, MARGIN},
    ledger::{encode_rle, Ledger},
    noise::Noise,
    rule::TransitionTable,
    soup::SoupBuilder,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// Search status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// The batch finished without exhausting the space.
    Searching,
    /// The exhaustive enumeration visited every soup.
    Exhausted,
    /// The stop flag was raised; the search ended between trials.
    Stopped,
}

/// How a single trial concluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trial {
    /// Every cell died.
    Extinct,
    /// The bounding box reached the outer margin; potential unbounded
    /// growth, discarded.
    Escaped,
    /// The soup settled into a zero-displacement repeat.
    Oscillator {
        /// Number of generations per repeat.
        period: u32,
    },
    /// The soup became a horizontally translating periodic pattern.
    Spaceship(Speed),
    /// The generation cap was reached without a conclusion.
    Undecided,
}

/// The search context.
///
/// Owns every piece of mutable state of a search: the lattice, the
/// transition table, the engine phase cache, the soup builder, the pattern
/// cache, and the discovery ledger. Soups are generated and evolved
/// strictly sequentially; nothing here is shared between threads except
/// the stop flag.
pub struct Search {
    config: Config,
    table: TransitionTable,
    lattice: Lattice,
    phases: PhaseTable,
    builder: SoupBuilder,
    cache: PatternCache,
    ledger: Ledger,
    soups: u64,
    stop: Arc<AtomicBool>,
}

impl Search {
    /// Builds the search context: parses the rule, precomputes the engine
    /// phases, loads the ledger, and prepares the soup builder.
    pub fn new<P: AsRef<Path>>(config: &Config, state_file: P) -> Result<Self, Error> {
        config.check()?;
        let table = TransitionTable::parse_rule(&config.rule_string)?;
        let mut lattice = Lattice::new(config.width_log2, config.height_log2);
        let phases =
            PhaseTable::generate(&config.engine_rle, config.phase_count, &table, &mut lattice)?;

        let anchor = (lattice.height() / 2, lattice.width() / 8);
        let worst_row = anchor.0
            + config.engines.saturating_sub(1) as usize * config.max_gap as usize
            + phases.max_height();
        let worst_col = anchor.1 + config.max_x_sep as usize + phases.max_width();
        if worst_row >= lattice.height() - MARGIN || worst_col >= lattice.width() - MARGIN {
            return Err(Error::ConfigError(format!(
                "a soup of {} engines cannot fit a {}x{} lattice",
                config.engines,
                lattice.width(),
                lattice.height()
            )));
        }

        let builder = if config.randomize {
            let noise = match config.seed {
                Some(seed) => Noise::from_seed(seed),
                None => Noise::from_entropy()?,
            };
            SoupBuilder::random(
                config.engines,
                config.max_x_sep as usize,
                config.min_gap as usize,
                config.max_gap as usize,
                anchor,
                noise,
            )
        } else {
            SoupBuilder::exhaustive(
                config.engines,
                config.max_x_sep as usize,
                config.min_gap as usize,
                config.max_gap as usize,
                anchor,
                phases.len(),
            )
        };

        let ledger = Ledger::load(state_file)?;
        Ok(Search {
            config: config.clone(),
            table,
            lattice,
            phases,
            builder,
            cache: PatternCache::new(config.check_interval),
            ledger,
            soups: 0,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// A handle that stops the search between trials when set.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Number of completed trials.
    pub fn soup_count(&self) -> u64 {
        self.soups
    }

    /// Total number of soups, when the mode is exhaustive.
    pub fn total_soups(&self) -> Option<u64> {
        self.builder.total_soups()
    }

    /// Number of distinct discovered speeds.
    pub fn ship_count(&self) -> usize {
        self.ledger.count()
    }

    /// The discovery ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Runs one trial to its first conclusive outcome.
    ///
    /// Returns `None` when the exhaustive enumeration is finished. A
    /// spaceship (or, when oscillators are kept, an oscillator) is
    /// recorded in the ledger before the lattice is recycled; duplicates
    /// are silently ignored.
    pub fn run_soup(&mut self) -> Result<Option<Trial>, Error> {
        self.cache.clear();
        if !self.builder.next_soup(&self.phases, &mut self.lattice) {
            return Ok(None);
        }

        let mut trial = Trial::Undecided;
        for generation in 1..=self.config.max_period {
            match self.lattice.step(&self.table) {
                Step::Extinct => {
                    trial = Trial::Extinct;
                    break;
                }
                Step::Escaped => {
                    trial = Trial::Escaped;
                    break;
                }
                Step::Live => {}
            }
            match self.cache.observe(&self.lattice, generation) {
                Some(Repeat::Oscillator { period }) => {
                    trial = Trial::Oscillator { period };
                    break;
                }
                Some(Repeat::Spaceship(speed)) => {
                    let speed = if self.config.reduce_speed {
                        speed.reduced()
                    } else {
                        speed
                    };
                    trial = Trial::Spaceship(speed);
                    break;
                }
                None => {}
            }
        }

        match trial {
            Trial::Spaceship(speed) => self.record(speed)?,
            Trial::Oscillator { period } if !self.config.skip_oscillators => {
                self.record(Speed { dx: 0, period })?
            }
            _ => {}
        }

        self.lattice.clear();
        self.cache.clear();
        self.soups += 1;
        Ok(Some(trial))
    }

    /// Appends a discovery to the ledger, with the lattice still holding
    /// the pattern at its detection generation.
    fn record(&mut self, speed: Speed) -> Result<(), Error> {
        if self.ledger.contains(speed) {
            return Ok(());
        }
        let Some(block) = encode_rle(&self.lattice, self.table.rule_string()) else {
            return Ok(());
        };
        let pattern = format!("#C {}\n{}", speed, block);
        self.ledger.record(speed, pattern)?;
        Ok(())
    }

    /// The search function.
    ///
    /// Runs up to `max_soups` trials (unlimited when `None`), returning
    /// [`Status::Exhausted`] when the enumeration is finished and
    /// [`Status::Stopped`] when the stop flag is raised between trials.
    pub fn search(&mut self, max_soups: Option<u64>) -> Result<Status, Error> {
        let mut count = 0;
        loop {
            if self.stop.load(Ordering::Relaxed) {
                return Ok(Status::Stopped);
            }
            if let Some(max) = max_soups {
                if count >= max {
                    return Ok(Status::Searching);
                }
            }
            match self.run_soup()? {
                None => return Ok(Status::Exhausted),
                Some(_) => count += 1,
            }
        }
    }
}
