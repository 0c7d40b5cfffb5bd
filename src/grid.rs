//! Bounded two-dimensional cell storage.
//!
//! A `Grid` has fixed dimensions chosen at construction and is generic over
//! the cell type, so the placement board (`Option<ShipId>`) and the battle
//! board (`BattleCell`) share bounds checking and neighbour queries.

use alloc::vec::Vec;
use core::fmt;

use crate::ship::Orientation;

/// Errors returned by grid operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Row or column index is outside the grid.
    OutOfBounds { row: usize, col: usize },
    /// A row of a nested payload has the wrong length.
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::OutOfBounds { row, col } => {
                write!(f, "OutOfBounds: row={}, col={}", row, col)
            }
            GridError::Ragged {
                row,
                expected,
                found,
            } => write!(
                f,
                "Ragged: row {} has {} cells, expected {}",
                row, found, expected
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid<C> {
    rows: usize,
    cols: usize,
    cells: Vec<C>,
}

impl<C: Clone> Grid<C> {
    /// Create a `rows`×`cols` grid with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: C) -> Self {
        Grid {
            rows,
            cols,
            cells: alloc::vec![value; rows * cols],
        }
    }

    /// Copy the grid out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<C>> {
        self.cells.chunks(self.cols.max(1)).map(|r| r.to_vec()).collect()
    }
}

impl<C: Clone + Default> Grid<C> {
    /// Create a grid of default cells.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, C::default())
    }
}

impl<C> Grid<C> {
    /// Build a grid from nested rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<C>>) -> Result<Self, GridError> {
        let cols = rows.first().map_or(0, |r| r.len());
        let height = rows.len();
        let mut cells = Vec::with_capacity(height * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::Ragged {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            cells.extend(row);
        }
        Ok(Grid {
            rows: height,
            cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        self.in_bounds(row, col).then(|| row * self.cols + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&C> {
        self.index(row, col).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut C> {
        self.index(row, col).map(move |i| &mut self.cells[i])
    }

    /// Overwrite a cell, returning its previous value.
    pub fn set(&mut self, row: usize, col: usize, value: C) -> Result<C, GridError> {
        let cell = self
            .get_mut(row, col)
            .ok_or(GridError::OutOfBounds { row, col })?;
        Ok(core::mem::replace(cell, value))
    }

    /// All cells in row-major order with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &C)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| ((i / cols, i % cols), c))
    }

    /// Orthogonal neighbours of a cell that lie inside the grid.
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let up = row.checked_sub(1).map(|r| (r, col));
        let left = col.checked_sub(1).map(|c| (row, c));
        let down = Some((row + 1, col));
        let right = Some((row, col + 1));
        [up, down, left, right]
            .into_iter()
            .flatten()
            .filter(move |&(r, c)| self.in_bounds(r, c))
    }

    /// Length of the run of cells matching `pred`, starting at (`row`, `col`)
    /// and stepping in `orientation`. Zero if the start cell does not match.
    pub fn run_length<F>(&self, row: usize, col: usize, orientation: Orientation, pred: F) -> usize
    where
        F: Fn(&C) -> bool,
    {
        let (dr, dc) = orientation.step();
        let (mut r, mut c) = (row, col);
        let mut len = 0;
        while let Some(cell) = self.get(r, c) {
            if !pred(cell) {
                break;
            }
            len += 1;
            r += dr;
            c += dc;
        }
        len
    }

    /// Number of cells matching `pred`.
    pub fn count<F>(&self, pred: F) -> usize
    where
        F: Fn(&C) -> bool,
    {
        self.cells.iter().filter(|c| pred(c)).count()
    }

    /// Apply `f` to every cell, producing a grid of the same shape.
    pub fn map<D, F>(&self, f: F) -> Grid<D>
    where
        F: Fn(&C) -> D,
    {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}
