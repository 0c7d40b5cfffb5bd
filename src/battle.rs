//! Battle-phase cell states and the board they live on.

use crate::common::HitOutcome;
use crate::grid::{Grid, GridError};
use crate::reconcile::merge_cell;

/// State of one battle cell.
///
/// `HitWater` and `HitShip` are terminal: once a cell is resolved no hit can
/// change it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BattleCell {
    #[default]
    Water,
    HitWater,
    Ship,
    HitShip,
}

impl BattleCell {
    pub const ALL: [BattleCell; 4] = [
        BattleCell::Water,
        BattleCell::HitWater,
        BattleCell::Ship,
        BattleCell::HitShip,
    ];

    /// Integer used on the wire.
    pub const fn code(self) -> u8 {
        match self {
            BattleCell::Water => 1,
            BattleCell::HitWater => 2,
            BattleCell::Ship => 3,
            BattleCell::HitShip => 4,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(BattleCell::Water),
            2 => Some(BattleCell::HitWater),
            3 => Some(BattleCell::Ship),
            4 => Some(BattleCell::HitShip),
            _ => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, BattleCell::HitWater | BattleCell::HitShip)
    }

    /// Next state after a shot lands here, and what the shot did.
    pub const fn apply_hit(self) -> (Self, HitOutcome) {
        match self {
            BattleCell::Water => (BattleCell::HitWater, HitOutcome::Miss),
            BattleCell::Ship => (BattleCell::HitShip, HitOutcome::Hit),
            resolved => (resolved, HitOutcome::AlreadyResolved),
        }
    }
}

pub type BattleGrid = Grid<BattleCell>;

/// The sea a player fires into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleBoard {
    grid: BattleGrid,
}

impl BattleBoard {
    /// All-water board.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            grid: Grid::new(rows, cols),
        }
    }

    pub fn from_grid(grid: BattleGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &BattleGrid {
        &self.grid
    }

    pub fn into_grid(self) -> BattleGrid {
        self.grid
    }

    pub fn get(&self, row: usize, col: usize) -> Option<BattleCell> {
        self.grid.get(row, col).copied()
    }

    /// Fire at (`row`, `col`).
    pub fn apply_hit(&mut self, row: usize, col: usize) -> Result<HitOutcome, GridError> {
        let cell = self
            .grid
            .get_mut(row, col)
            .ok_or(GridError::OutOfBounds { row, col })?;
        let (next, outcome) = cell.apply_hit();
        *cell = next;
        Ok(outcome)
    }

    /// Record the server's verdict for one cell. Server wins unless it would
    /// take a resolved cell back to an unresolved one.
    pub fn resolve(&mut self, row: usize, col: usize, server: BattleCell) -> Result<BattleCell, GridError> {
        let cell = self
            .grid
            .get_mut(row, col)
            .ok_or(GridError::OutOfBounds { row, col })?;
        *cell = merge_cell(*cell, server);
        Ok(*cell)
    }

    /// Mark a ship segment. Only unresolved water becomes ship.
    pub fn mark_ship(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        let cell = self
            .grid
            .get_mut(row, col)
            .ok_or(GridError::OutOfBounds { row, col })?;
        if *cell == BattleCell::Water {
            *cell = BattleCell::Ship;
        }
        Ok(())
    }

    pub fn count(&self, state: BattleCell) -> usize {
        self.grid.count(|c| *c == state)
    }

    /// The board as an opponent sees it: unhit ship segments look like water.
    pub fn fogged(&self) -> BattleGrid {
        self.grid.map(|c| match c {
            BattleCell::Ship => BattleCell::Water,
            other => *other,
        })
    }
}
