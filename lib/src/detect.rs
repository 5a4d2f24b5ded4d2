//! The pattern cache and the spaceship detector.

use crate::{error::Error, lattice::Lattice};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// A detected speed: horizontal displacement per period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Speed {
    /// Horizontal displacement per period.
    pub dx: u32,
    /// Number of generations per repeat.
    pub period: u32,
}

impl Speed {
    /// Reduces the speed to lowest terms by the greatest common divisor of
    /// displacement and period.
    ///
    /// `10c/20` becomes `1c/2`; an oscillator speed (`dx == 0`) is returned
    /// unchanged.
    pub fn reduced(self) -> Self {
        if self.dx == 0 {
            return self;
        }
        let divisor = gcd(self.dx, self.period);
        Speed {
            dx: self.dx / divisor,
            period: self.period / divisor,
        }
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Display for Speed {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}c/{}", self.dx, self.period)
    }
}

impl FromStr for Speed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (dx, period) = s
            .split_once("c/")
            .ok_or_else(|| Error::LedgerError(format!("invalid speed {:?}", s)))?;
        let dx = dx
            .parse()
            .map_err(|_| Error::LedgerError(format!("invalid speed {:?}", s)))?;
        let period = period
            .parse()
            .map_err(|_| Error::LedgerError(format!("invalid speed {:?}", s)))?;
        Ok(Speed { dx, period })
    }
}

/// What a repeated snapshot implies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// The pattern came back in place.
    Oscillator {
        /// Number of generations per repeat.
        period: u32,
    },
    /// The pattern came back translated horizontally.
    Spaceship(Speed),
}

/// A bit-packed copy of the bounding-box content at one sampling
/// generation.
#[derive(Clone, Debug)]
pub struct Snapshot {
    top: usize,
    left: usize,
    height: usize,
    width: usize,
    population: u32,
    hash: u64,
    words: Vec<u64>,
}

impl Snapshot {
    /// Captures the lattice's bounding-box content, or `None` when the
    /// lattice is empty.
    pub fn capture(lattice: &Lattice) -> Option<Self> {
        let bbox = lattice.bbox()?;
        let (height, width) = (bbox.height(), bbox.width());
        let mut words: Vec<u64> = vec![0; (height * width + 63) / 64];
        let mut population = 0;
        let mut bit = 0;
        for row in bbox.top..=bbox.bottom {
            for col in bbox.left..=bbox.right {
                if lattice.is_alive(row, col) {
                    population += 1;
                    words[bit >> 6] |= 1 << (bit & 63);
                }
                bit += 1;
            }
        }
        let mut hash = 0u64;
        for &word in &words {
            hash = hash.rotate_left(16) ^ word.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        }
        Some(Snapshot {
            top: bbox.top,
            left: bbox.left,
            height,
            width,
            population,
            hash,
            words,
        })
    }

    /// The rolling hash over the packed bits, an equality pre-filter.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Number of live cells.
    pub fn population(&self) -> u32 {
        self.population
    }

    /// Top row of the captured box.
    pub fn top(&self) -> usize {
        self.top
    }

    /// Left column of the captured box.
    pub fn left(&self) -> usize {
        self.left
    }

    /// Height of the captured box.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Width of the captured box.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The cheap pre-filter: hash, population and dimensions all match.
    fn matches(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.population == other.population
            && self.height == other.height
            && self.width == other.width
    }

    /// Exact bit-for-bit equality of the packed content.
    fn same_content(&self, other: &Self) -> bool {
        self.words == other.words
    }
}

/// The per-trial ordered cache of snapshots, and the detector that scans
/// it.
pub struct PatternCache {
    check_interval: u32,
    snapshots: Vec<Snapshot>,
}

impl PatternCache {
    /// A cache sampling every `check_interval` generations.
    pub fn new(check_interval: u32) -> Self {
        PatternCache {
            check_interval: check_interval.max(1),
            snapshots: Vec::new(),
        }
    }

    /// Number of cached snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Called once per generation; snapshots the lattice at multiples of
    /// the sampling interval and scans for a repeat.
    ///
    /// The scan walks earlier snapshots from most recent to oldest and
    /// stops at the first content-equal match without vertical movement, so
    /// the reported period is the smallest one visible in the cache. A
    /// match that moved vertically is not a horizontal spaceship and is
    /// skipped.
    pub fn observe(&mut self, lattice: &Lattice, generation: u32) -> Option<Repeat> {
        if generation % self.check_interval != 0 {
            return None;
        }
        let current = Snapshot::capture(lattice)?;
        let repeat = self.scan(&current);
        self.snapshots.push(current);
        repeat
    }

    fn scan(&self, current: &Snapshot) -> Option<Repeat> {
        let here = self.snapshots.len();
        for (there, past) in self.snapshots.iter().enumerate().rev() {
            if !past.matches(current) || !past.same_content(current) {
                continue;
            }
            if past.top != current.top {
                continue;
            }
            let period = self.check_interval * (here - there) as u32;
            let dx = current.left.abs_diff(past.left) as u32;
            return Some(if dx == 0 {
                Repeat::Oscillator { period }
            } else {
                Repeat::Spaceship(Speed { dx, period })
            });
        }
        None
    }

    /// Drops all snapshots, ending the trial.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
