//! The engine phase cache.

use crate::{
    error::Error,
    lattice::{Lattice, Step},
    rule::TransitionTable,
};
use ca_formats::rle::Rle;
use std::ops::Index;

/// One shape of the seed engine within its oscillation cycle.
///
/// Immutable once recorded: the dimensions and bits of the engine's live
/// rectangle after `k` steps of isolated evolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phase {
    height: usize,
    width: usize,
    cells: Vec<bool>,
}

impl Phase {
    /// Height of the live rectangle.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Width of the live rectangle.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the cell at the given offset within the rectangle is alive.
    #[inline]
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.width + col]
    }

    /// Offsets of all live cells, in row-major order.
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &alive)| alive)
            .map(|(i, _)| (i / self.width, i % self.width))
    }

    fn capture(lattice: &Lattice) -> Option<Self> {
        let bbox = lattice.bbox()?;
        let (height, width) = (bbox.height(), bbox.width());
        let mut cells = Vec::with_capacity(height * width);
        for row in bbox.top..=bbox.bottom {
            for col in bbox.left..=bbox.right {
                cells.push(lattice.is_alive(row, col));
            }
        }
        Some(Phase {
            height,
            width,
            cells,
        })
    }
}

/// The precomputed cyclic sequence of the seed engine's own shapes.
///
/// Built once at startup and read-only thereafter.
pub struct PhaseTable {
    phases: Vec<Phase>,
}

impl PhaseTable {
    /// Evolves the isolated seed engine on the given (empty) lattice,
    /// recording its live rectangle after every step.
    ///
    /// The lattice is left empty again on return. Fails if the engine has
    /// no live cells, or dies out or reaches the margin within the
    /// requested number of phases.
    pub fn generate(
        engine_rle: &str,
        count: usize,
        table: &TransitionTable,
        lattice: &mut Lattice,
    ) -> Result<Self, Error> {
        let cells = parse_engine(engine_rle)?;
        if cells.is_empty() {
            return Err(Error::EmptyEngine);
        }

        let (row0, col0) = (lattice.height() / 2, lattice.width() / 4);
        for &(row, col) in &cells {
            lattice.set_alive(row0 + row, col0 + col);
        }

        let mut phases = Vec::with_capacity(count);
        for _ in 0..count {
            match Phase::capture(lattice) {
                Some(phase) => phases.push(phase),
                None => {
                    lattice.clear();
                    return Err(Error::EngineCollapsed);
                }
            }
            if lattice.step(table) != Step::Live {
                lattice.clear();
                return Err(Error::EngineCollapsed);
            }
        }

        lattice.clear();
        Ok(PhaseTable { phases })
    }

    /// Number of recorded phases.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// The tallest phase, in rows.
    pub fn max_height(&self) -> usize {
        self.phases.iter().map(Phase::height).max().unwrap_or(0)
    }

    /// The widest phase, in columns.
    pub fn max_width(&self) -> usize {
        self.phases.iter().map(Phase::width).max().unwrap_or(0)
    }
}

impl Index<usize> for PhaseTable {
    type Output = Phase;

    fn index(&self, phase: usize) -> &Phase {
        &self.phases[phase]
    }
}

/// Parses an RLE pattern into live cell offsets, row-major from the
/// pattern's top-left corner.
fn parse_engine(rle: &str) -> Result<Vec<(usize, usize)>, Error> {
    let parsed = Rle::new(rle).map_err(|e| Error::ParsePatternError(e.to_string()))?;
    let mut cells = Vec::new();
    for cell in parsed {
        let cell = cell.map_err(|e| Error::ParsePatternError(e.to_string()))?;
        let (x, y) = cell.position;
        let col = usize::try_from(x)
            .map_err(|_| Error::ParsePatternError(format!("negative coordinate {:?}", (x, y))))?;
        let row = usize::try_from(y)
            .map_err(|_| Error::ParsePatternError(format!("negative coordinate {:?}", (x, y))))?;
        cells.push((row, col));
    }
    Ok(cells)
}
