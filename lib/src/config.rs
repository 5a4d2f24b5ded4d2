//! Search configuration.

use crate::{error::Error, search::Search};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The rule the search runs in by default.
pub const DEFAULT_RULE: &str = "B2-ak3ce4eikqrz5-iknq6-ek8/S1c2aek3aekn4eiknry5eiky6-ei7c8";

/// The default seed engine, a 2×3 sparker of [`DEFAULT_RULE`].
pub const DEFAULT_ENGINE: &str =
    "x = 2, y = 3, rule = B2-ak3ce4eikqrz5-iknq6-ek8/S1c2aek3aekn4eiknry5eiky6-ei7c8\n2o$o$2o!";

/// Search configuration.
///
/// The search context will be generated from this configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Number of engine copies per soup.
    pub engines: u32,

    /// Largest x-offset of a free engine from the anchor column.
    pub max_x_sep: u32,

    /// Generation cap per trial; a trial with no conclusion by then is
    /// silently discarded.
    pub max_period: u32,

    /// Randomized soup construction instead of exhaustive enumeration.
    pub randomize: bool,

    /// Rule of the cellular automaton.
    pub rule_string: String,

    /// The seed engine, as an RLE pattern.
    pub engine_rle: String,

    /// Number of engine phases to precompute.
    pub phase_count: usize,

    /// Smallest y-gap between consecutive engines.
    pub min_gap: u32,

    /// Largest y-gap between consecutive engines.
    pub max_gap: u32,

    /// Base-2 logarithm of the lattice width.
    pub width_log2: u32,

    /// Base-2 logarithm of the lattice height.
    pub height_log2: u32,

    /// Generations between pattern snapshots.
    pub check_interval: u32,

    /// Discard trials that settle into an oscillator.
    pub skip_oscillators: bool,

    /// Reduce detected speeds to lowest terms.
    pub reduce_speed: bool,

    /// Fixed noise-source seed, for reproducible randomized runs.
    ///
    /// `None` seeds from the operating system's entropy source.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            engines: 2,
            max_x_sep: 16,
            max_period: 1024,
            randomize: false,
            rule_string: DEFAULT_RULE.to_string(),
            engine_rle: DEFAULT_ENGINE.to_string(),
            phase_count: 100,
            min_gap: 7,
            max_gap: 12,
            width_log2: 12,
            height_log2: 12,
            check_interval: 1,
            skip_oscillators: true,
            reduce_speed: true,
            seed: None,
        }
    }
}

impl Config {
    /// Sets up a new configuration with the given parameters.
    pub fn new(engines: u32, max_x_sep: u32, max_period: u32, randomize: bool) -> Self {
        Config {
            engines,
            max_x_sep,
            max_period,
            randomize,
            ..Config::default()
        }
    }

    /// Sets the rule string.
    pub fn set_rule_string(mut self, rule_string: String) -> Self {
        self.rule_string = rule_string;
        self
    }

    /// Sets the seed engine RLE.
    pub fn set_engine_rle(mut self, engine_rle: String) -> Self {
        self.engine_rle = engine_rle;
        self
    }

    /// Sets the number of precomputed engine phases.
    pub fn set_phase_count(mut self, phase_count: usize) -> Self {
        self.phase_count = phase_count;
        self
    }

    /// Sets the y-gap range between consecutive engines.
    pub fn set_gap_range(mut self, min_gap: u32, max_gap: u32) -> Self {
        self.min_gap = min_gap;
        self.max_gap = max_gap;
        self
    }

    /// Sets the lattice dimensions as base-2 logarithms.
    pub fn set_lattice_size(mut self, width_log2: u32, height_log2: u32) -> Self {
        self.width_log2 = width_log2;
        self.height_log2 = height_log2;
        self
    }

    /// Sets the snapshot interval.
    pub fn set_check_interval(mut self, check_interval: u32) -> Self {
        self.check_interval = check_interval;
        self
    }

    /// Sets whether oscillators are discarded.
    pub fn set_skip_oscillators(mut self, skip_oscillators: bool) -> Self {
        self.skip_oscillators = skip_oscillators;
        self
    }

    /// Sets whether detected speeds are reduced to lowest terms.
    pub fn set_reduce_speed(mut self, reduce_speed: bool) -> Self {
        self.reduce_speed = reduce_speed;
        self
    }

    /// Sets a fixed noise-source seed.
    pub fn set_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Checks that the parameters are consistent.
    pub(crate) fn check(&self) -> Result<(), Error> {
        if self.phase_count == 0 {
            return Err(Error::ConfigError(
                "phase count must be positive".to_string(),
            ));
        }
        if self.min_gap > self.max_gap {
            return Err(Error::ConfigError(format!(
                "minimum y-gap {} exceeds maximum y-gap {}",
                self.min_gap, self.max_gap
            )));
        }
        if self.width_log2 < 4
            || self.width_log2 > 16
            || self.height_log2 < 4
            || self.height_log2 > 16
        {
            return Err(Error::ConfigError(format!(
                "lattice size logs ({}, {}) must be within 4..=16",
                self.width_log2, self.height_log2
            )));
        }
        Ok(())
    }

    /// Creates the search context from the configuration.
    pub fn search<P: AsRef<Path>>(&self, state_file: P) -> Result<Search, Error> {
        Search::new(self, state_file)
    }
}
