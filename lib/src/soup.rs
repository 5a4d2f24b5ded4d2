//! Soup construction.

use crate::{engine::PhaseTable, lattice::Lattice, noise::Noise};

/// One engine placement within a soup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Row of the placement's top-left corner.
    pub row: usize,
    /// Column of the placement's top-left corner.
    pub col: usize,
    /// Index into the phase table.
    pub phase: usize,
}

/// The digits of one free engine slot in the exhaustive enumeration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SlotDigits {
    /// Index into the phase table.
    pub phase: usize,
    /// Horizontal offset from the anchor column.
    pub x_offset: usize,
    /// Vertical gap above the minimum, added on top of `min_gap`.
    pub y_gap: usize,
}

/// A mixed-radix counter over every combination of (phase, x-offset, y-gap)
/// for each free engine slot.
///
/// Within a slot the phase is the innermost digit, then the x-offset, then
/// the y-gap; a carry out of a slot increments the next slot, and slot 0 is
/// the least significant. Every configuration is visited exactly once, in a
/// single monotonic order, and `next` signals exhaustion afterwards.
pub struct Odometer {
    digits: Vec<SlotDigits>,
    phases: usize,
    x_offsets: usize,
    y_gaps: usize,
    fresh: bool,
    done: bool,
}

impl Odometer {
    /// A counter with `slots` free engine slots and the given digit radices.
    pub fn new(slots: usize, phases: usize, x_offsets: usize, y_gaps: usize) -> Self {
        Odometer {
            digits: vec![SlotDigits::default(); slots],
            phases,
            x_offsets,
            y_gaps,
            fresh: true,
            done: false,
        }
    }

    /// Total number of configurations in the space.
    pub fn total(&self) -> u64 {
        let per_slot = (self.phases * self.x_offsets * self.y_gaps) as u64;
        per_slot
            .checked_pow(self.digits.len() as u32)
            .unwrap_or(u64::MAX)
    }

    /// The next configuration, or `None` once the space is exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&[SlotDigits]> {
        if self.done {
            return None;
        }
        if self.fresh {
            self.fresh = false;
            return Some(&self.digits);
        }
        for i in 0..self.digits.len() {
            let slot = &mut self.digits[i];
            slot.phase += 1;
            if slot.phase < self.phases {
                return Some(&self.digits);
            }
            slot.phase = 0;
            slot.x_offset += 1;
            if slot.x_offset < self.x_offsets {
                return Some(&self.digits);
            }
            slot.x_offset = 0;
            slot.y_gap += 1;
            if slot.y_gap < self.y_gaps {
                return Some(&self.digits);
            }
            slot.y_gap = 0;
        }
        self.done = true;
        None
    }
}

/// The source of offsets and phases for the free engine slots.
enum Mode {
    Random(Noise),
    Exhaustive(Odometer),
}

/// Composes K engine copies into an initial pattern.
///
/// Instance 0 is anchored at the configured origin with phase 0 in both
/// modes; each later instance descends by a y-gap in `[min_gap, max_gap]`
/// and shifts right by an x-offset in `[0, max_x_sep]`, with its phase
/// drawn or enumerated from the phase table. Overlapping placements merge:
/// a live cell is never overwritten by a dead one.
pub struct SoupBuilder {
    engines: u32,
    max_x_sep: usize,
    min_gap: usize,
    max_gap: usize,
    anchor: (usize, usize),
    mode: Mode,
    placements: Vec<Placement>,
}

impl SoupBuilder {
    /// A builder that draws offsets and phases from the noise source.
    pub fn random(
        engines: u32,
        max_x_sep: usize,
        min_gap: usize,
        max_gap: usize,
        anchor: (usize, usize),
        noise: Noise,
    ) -> Self {
        SoupBuilder {
            engines,
            max_x_sep,
            min_gap,
            max_gap,
            anchor,
            mode: Mode::Random(noise),
            placements: Vec::new(),
        }
    }

    /// A builder that enumerates the full combinatorial space exactly once.
    pub fn exhaustive(
        engines: u32,
        max_x_sep: usize,
        min_gap: usize,
        max_gap: usize,
        anchor: (usize, usize),
        phases: usize,
    ) -> Self {
        let slots = engines.saturating_sub(1) as usize;
        let odometer = Odometer::new(slots, phases, max_x_sep + 1, max_gap - min_gap + 1);
        SoupBuilder {
            engines,
            max_x_sep,
            min_gap,
            max_gap,
            anchor,
            mode: Mode::Exhaustive(odometer),
            placements: Vec::new(),
        }
    }

    /// Total number of soups, when the mode is exhaustive.
    pub fn total_soups(&self) -> Option<u64> {
        match &self.mode {
            Mode::Random(_) => None,
            Mode::Exhaustive(odometer) => Some(odometer.total()),
        }
    }

    /// Builds the next soup into the lattice, which must be empty.
    ///
    /// Returns `false` when an exhaustive enumeration is finished; a
    /// randomized builder never finishes.
    pub fn next_soup(&mut self, phases: &PhaseTable, lattice: &mut Lattice) -> bool {
        self.placements.clear();
        let (row0, col0) = self.anchor;
        if self.engines > 0 {
            self.placements.push(Placement {
                row: row0,
                col: col0,
                phase: 0,
            });
        }

        match &mut self.mode {
            Mode::Random(noise) => {
                let mut row = row0;
                for _ in 1..self.engines {
                    row += self.min_gap
                        + noise.uniform((self.max_gap - self.min_gap + 1) as u32) as usize;
                    let col = col0 + noise.uniform(self.max_x_sep as u32 + 1) as usize;
                    let phase = noise.uniform(phases.len() as u32) as usize;
                    self.placements.push(Placement { row, col, phase });
                }
            }
            Mode::Exhaustive(odometer) => {
                let Some(digits) = odometer.next() else {
                    return false;
                };
                let mut row = row0;
                for digit in digits {
                    row += self.min_gap + digit.y_gap;
                    self.placements.push(Placement {
                        row,
                        col: col0 + digit.x_offset,
                        phase: digit.phase,
                    });
                }
            }
        }

        for placement in &self.placements {
            let shape = &phases[placement.phase];
            for (row, col) in shape.live_cells() {
                lattice.set_alive(placement.row + row, placement.col + col);
            }
        }
        true
    }

    /// The placements of the most recently built soup.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }
}
