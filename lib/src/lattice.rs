//! The lattice and the stepper.

use crate::rule::TransitionTable;

/// Width of the dead border ring that live cells may never enter.
///
/// The stepper reads two cells past the bounding box on every side, so the
/// box reaching this ring aborts the trial as potential unbounded growth.
pub const MARGIN: usize = 2;

/// The minimal rectangle containing all live cells, inclusive on all four
/// edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Box2 {
    /// Smallest row with a live cell.
    pub top: usize,
    /// Largest row with a live cell.
    pub bottom: usize,
    /// Smallest column with a live cell.
    pub left: usize,
    /// Largest column with a live cell.
    pub right: usize,
}

impl Box2 {
    /// Number of rows covered by the box.
    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }

    /// Number of columns covered by the box.
    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }

    fn include(&mut self, row: usize, col: usize) {
        self.top = self.top.min(row);
        self.bottom = self.bottom.max(row);
        self.left = self.left.min(col);
        self.right = self.right.max(col);
    }
}

/// Outcome of advancing the lattice by one generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Live cells remain and the bounding box stays clear of the margin.
    Live,
    /// No cell survived.
    Extinct,
    /// The bounding box reached the outer margin; the pattern may be
    /// growing without bound.
    Escaped,
}

/// Row-major cell storage with power-of-two dimensions.
///
/// Linear indexing is `row << width_log2 | col`; bounds are checked in
/// debug builds.
#[derive(Clone)]
struct Grid {
    width_log2: u32,
    height_log2: u32,
    cells: Box<[u8]>,
}

impl Grid {
    fn new(width_log2: u32, height_log2: u32) -> Self {
        Grid {
            width_log2,
            height_log2,
            cells: vec![0; 1 << (width_log2 + height_log2)].into_boxed_slice(),
        }
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < 1 << self.height_log2);
        debug_assert!(col < 1 << self.width_log2);
        (row << self.width_log2) | col
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[self.index(row, col)]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, value: u8) {
        let index = self.index(row, col);
        self.cells[index] = value;
    }
}

/// The lattice.
///
/// Owns the cell grid, advances it one generation at a time, and keeps the
/// live bounding box tight. The box is always maintained incrementally from
/// the cells that changed; the full grid is never scanned.
pub struct Lattice {
    grid: Grid,
    scratch: Grid,
    height: usize,
    width: usize,
    bbox: Option<Box2>,
}

impl Lattice {
    /// Creates an empty lattice of `1 << width_log2` by `1 << height_log2`
    /// cells.
    pub fn new(width_log2: u32, height_log2: u32) -> Self {
        Lattice {
            grid: Grid::new(width_log2, height_log2),
            scratch: Grid::new(width_log2, height_log2),
            height: 1 << height_log2,
            width: 1 << width_log2,
            bbox: None,
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The live bounding box, or `None` when the lattice is empty.
    pub fn bbox(&self) -> Option<Box2> {
        self.bbox
    }

    /// Whether the cell at the given position is alive.
    #[inline]
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.grid.get(row, col) != 0
    }

    /// Sets a single cell alive, widening the bounding box around it.
    ///
    /// The cell must lie strictly inside the outer margin.
    pub fn set_alive(&mut self, row: usize, col: usize) {
        debug_assert!(row >= MARGIN && row < self.height - MARGIN);
        debug_assert!(col >= MARGIN && col < self.width - MARGIN);
        self.grid.set(row, col, 1);
        match &mut self.bbox {
            Some(bbox) => bbox.include(row, col),
            None => {
                self.bbox = Some(Box2 {
                    top: row,
                    bottom: row,
                    left: col,
                    right: col,
                })
            }
        }
    }

    fn touches_margin(&self, bbox: Box2) -> bool {
        bbox.top < MARGIN
            || bbox.left < MARGIN
            || bbox.bottom >= self.height - MARGIN
            || bbox.right >= self.width - MARGIN
    }

    /// The three cells of one column of a neighborhood, packed top-to-bottom
    /// into the low three bits.
    #[inline]
    fn column_bits(&self, row: usize, col: usize) -> u16 {
        (u16::from(self.grid.get(row - 1, col)) << 2)
            | (u16::from(self.grid.get(row, col)) << 1)
            | u16::from(self.grid.get(row + 1, col))
    }

    /// Advances the lattice by one generation.
    ///
    /// Recomputes the cells in a one-cell margin around the bounding box,
    /// sliding a 9-bit window along each row so every cell costs one table
    /// lookup instead of nine reads. The box is retightened from the cells
    /// written during the scan.
    pub fn step(&mut self, table: &TransitionTable) -> Step {
        let Some(bbox) = self.bbox else {
            return Step::Extinct;
        };
        if self.touches_margin(bbox) {
            return Step::Escaped;
        }

        let mut live = None::<Box2>;
        for row in bbox.top - 1..=bbox.bottom + 1 {
            let mut window =
                (self.column_bits(row, bbox.left - 2) << 3) | self.column_bits(row, bbox.left - 1);
            for col in bbox.left - 1..=bbox.right + 1 {
                window = (window << 3) & 0x1ff | self.column_bits(row, col + 1);
                let alive = table.next_state(window);
                self.scratch.set(row, col, u8::from(alive));
                if alive {
                    match &mut live {
                        Some(live) => live.include(row, col),
                        None => {
                            live = Some(Box2 {
                                top: row,
                                bottom: row,
                                left: col,
                                right: col,
                            })
                        }
                    }
                }
            }
        }

        // Copy back the whole scanned region: it covers every cell whose
        // state may have changed, and nothing outside it was touched.
        for row in bbox.top - 1..=bbox.bottom + 1 {
            for col in bbox.left - 1..=bbox.right + 1 {
                self.grid.set(row, col, self.scratch.get(row, col));
            }
        }

        self.bbox = live;
        match live {
            None => Step::Extinct,
            Some(live) if self.touches_margin(live) => Step::Escaped,
            Some(_) => Step::Live,
        }
    }

    /// Resets every cell within the last known bounding box to dead.
    ///
    /// The cost is proportional to the box, not the lattice, so recycling
    /// the lattice between trials is cheap.
    pub fn clear(&mut self) {
        if let Some(bbox) = self.bbox.take() {
            for row in bbox.top..=bbox.bottom {
                for col in bbox.left..=bbox.right {
                    self.grid.set(row, col, 0);
                }
            }
        }
    }
}
