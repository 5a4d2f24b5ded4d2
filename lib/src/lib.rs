//! Searches for non-adjustable-reduced-speed spaceships (NRSS): periodic,
//! purely horizontally translating patterns at non-unit, non-reducible
//! speed, in a fixed two-state range-1 Moore-neighborhood rule.
//!
//! The search composes soups from repeated copies of a small seed engine at
//! varying offsets and phases, evolves each soup generation by generation,
//! and watches for the moment it becomes a horizontally moving periodic
//! pattern. Distinct speeds are collected in a persisted ledger, so a
//! search can resume across sessions without duplicate discoveries.

mod config;
mod detect;
mod engine;
mod error;
mod lattice;
mod ledger;
mod noise;
mod rule;
mod search;
mod soup;

pub use config::{Config, DEFAULT_ENGINE, DEFAULT_RULE};
pub use detect::{PatternCache, Repeat, Snapshot, Speed};
pub use engine::{Phase, PhaseTable};
pub use error::Error;
pub use lattice::{Box2, Lattice, Step, MARGIN};
pub use ledger::{encode_rle, Ledger};
pub use noise::Noise;
pub use rule::TransitionTable;
pub use search::{Search, Status, Trial};
pub use soup::{Odometer, Placement, SlotDigits, SoupBuilder};
