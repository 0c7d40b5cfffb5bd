//! Pre-battle ship placement: pick up, drop, rotate, and validate ships on a
//! placement grid.
//!
//! A drop that fails never loses the ship: if it came off the grid it goes
//! back where it was picked up from.

use alloc::vec::Vec;

use log::debug;
use rand::Rng;

use crate::common::PlacementError;
use crate::config::{PLACEMENT_ATTEMPTS, PLACEMENT_COLS, PLACEMENT_ROWS};
use crate::grid::Grid;
use crate::ship::{fits, footprint, Fleet, Orientation, Ship, ShipId, ShipPlacement};

/// Placement cells: `None` is empty water, `Some(id)` a ship segment.
pub type PlacementGrid = Grid<Option<ShipId>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    row: usize,
    col: usize,
    orientation: Orientation,
}

/// A ship lifted off the grid and not yet dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PickedUp {
    ship_id: ShipId,
    from: Option<Anchor>,
}

pub struct PlacementEngine {
    grid: PlacementGrid,
    fleet: Fleet,
    last_known: Vec<Option<Anchor>>,
    picked_up: Option<PickedUp>,
}

impl PlacementEngine {
    /// Empty `rows`×`cols` grid with every ship of `fleet` unplaced.
    pub fn new(rows: usize, cols: usize, fleet: Fleet) -> Self {
        let last_known = alloc::vec![None; fleet.len()];
        Self {
            grid: Grid::new(rows, cols),
            fleet,
            last_known,
            picked_up: None,
        }
    }

    /// Standard 10×10 grid with the standard fleet.
    pub fn standard() -> Self {
        Self::new(PLACEMENT_ROWS, PLACEMENT_COLS, Fleet::standard())
    }

    pub fn grid(&self) -> &PlacementGrid {
        &self.grid
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// Hand the grid over when the placement phase ends.
    pub fn into_grid(self) -> PlacementGrid {
        self.grid
    }

    /// Ship currently held by a drag, if any.
    pub fn picked_up(&self) -> Option<ShipId> {
        self.picked_up.map(|p| p.ship_id)
    }

    fn ship_index(&self, ship_id: ShipId) -> Result<usize, PlacementError> {
        self.fleet
            .position(ship_id)
            .ok_or(PlacementError::UnknownShip)
    }

    /// First cell holding `ship_id` in row-major order, with the orientation
    /// implied by its neighbours.
    fn locate(&self, ship: &Ship) -> Option<Anchor> {
        let ((row, col), _) = self
            .grid
            .iter()
            .find(|(_, cell)| **cell == Some(ship.id()))?;
        let is_ship = |cell: &Option<ShipId>| *cell == Some(ship.id());
        let orientation = if self.grid.get(row, col + 1).is_some_and(is_ship) {
            Orientation::Horizontal
        } else if self.grid.get(row + 1, col).is_some_and(is_ship) {
            Orientation::Vertical
        } else {
            ship.orientation()
        };
        Some(Anchor {
            row,
            col,
            orientation,
        })
    }

    /// `true` when all `size` cells of the ship hold its id, contiguously.
    pub fn is_placed(&self, ship_id: ShipId) -> bool {
        let Some(ship) = self.fleet.get(ship_id) else {
            return false;
        };
        let Some(anchor) = self.locate(ship) else {
            return false;
        };
        let is_ship = |cell: &Option<ShipId>| *cell == Some(ship_id);
        self.grid
            .run_length(anchor.row, anchor.col, anchor.orientation, is_ship)
            >= ship.size()
            && self.grid.count(is_ship) == ship.size()
    }

    /// Returns `true` when every ship of the fleet is on the grid.
    pub fn all_placed(&self) -> bool {
        self.fleet.iter().all(|s| self.is_placed(s.id()))
    }

    /// Lift a ship off the grid, remembering where it was.
    ///
    /// Picking up a second ship while one is held puts the first one back.
    pub fn pick_up(&mut self, ship_id: ShipId) -> Result<Ship, PlacementError> {
        let index = self.ship_index(ship_id)?;
        if self.picked_up.is_some_and(|p| p.ship_id != ship_id) {
            self.cancel_pick_up();
        }
        let ship = self.fleet.iter().nth(index).copied().ok_or(PlacementError::UnknownShip)?;
        let from = match self.picked_up {
            Some(held) if held.ship_id == ship_id => held.from,
            _ => self.locate(&ship),
        };
        self.clear_ship(ship_id);
        if let Some(anchor) = from {
            self.last_known[index] = Some(anchor);
        }
        self.picked_up = Some(PickedUp { ship_id, from });
        debug!("picked up {} {} from {:?}", ship.name(), ship_id, from);
        Ok(ship)
    }

    /// Drop a ship with its anchor at (`row`, `col`).
    ///
    /// A ship still on the grid is picked up first, so this also moves ships.
    /// On failure the grid is left as it was before the ship was picked up.
    pub fn try_place(
        &mut self,
        ship_id: ShipId,
        row: usize,
        col: usize,
        orientation: Orientation,
    ) -> Result<&PlacementGrid, PlacementError> {
        let index = self.ship_index(ship_id)?;
        if self.picked_up() != Some(ship_id) {
            self.pick_up(ship_id)?;
        }
        let size = self.fleet.iter().nth(index).map_or(0, |s| s.size());
        if let Err(err) = self.check(row, col, orientation, size) {
            debug!("drop of {} at ({}, {}) rejected: {}", ship_id, row, col, err);
            self.cancel_pick_up();
            return Err(err);
        }
        self.write(ship_id, row, col, orientation, size);
        if let Some(ship) = self.fleet.ship_mut(index) {
            ship.set_orientation(orientation);
        }
        self.last_known[index] = Some(Anchor {
            row,
            col,
            orientation,
        });
        self.picked_up = None;
        Ok(&self.grid)
    }

    /// End a drag without dropping: the held ship returns to where it was
    /// picked up from, if that spot is still free.
    pub fn cancel_pick_up(&mut self) {
        let Some(held) = self.picked_up.take() else {
            return;
        };
        let Some(anchor) = held.from else {
            return;
        };
        let Some(size) = self.fleet.get(held.ship_id).map(|s| s.size()) else {
            return;
        };
        if self
            .check(anchor.row, anchor.col, anchor.orientation, size)
            .is_ok()
        {
            self.write(held.ship_id, anchor.row, anchor.col, anchor.orientation, size);
        } else {
            debug!("{} cannot return to its old spot; left unplaced", held.ship_id);
        }
    }

    /// Turn a ship about its anchor. Unplaced ships only change their
    /// preferred orientation.
    pub fn rotate(&mut self, ship_id: ShipId) -> Result<&PlacementGrid, PlacementError> {
        let index = self.ship_index(ship_id)?;
        let ship = self.fleet.iter().nth(index).copied().ok_or(PlacementError::UnknownShip)?;
        match self.locate(&ship) {
            Some(anchor) => self.try_place(ship_id, anchor.row, anchor.col, anchor.orientation.flipped()),
            None => {
                if let Some(ship) = self.fleet.ship_mut(index) {
                    ship.set_orientation(ship.orientation().flipped());
                }
                Ok(&self.grid)
            }
        }
    }

    /// Place every unplaced ship at a random free spot.
    pub fn place_randomly<R: Rng>(&mut self, rng: &mut R) -> Result<(), PlacementError> {
        self.cancel_pick_up();
        let ships: Vec<Ship> = self.fleet.iter().copied().collect();
        for ship in ships {
            if self.is_placed(ship.id()) {
                continue;
            }
            let (row, col, orientation) = self.random_spot(rng, &ship)?;
            self.try_place(ship.id(), row, col, orientation)?;
        }
        Ok(())
    }

    fn random_spot<R: Rng>(
        &self,
        rng: &mut R,
        ship: &Ship,
    ) -> Result<(usize, usize, Orientation), PlacementError> {
        let (rows, cols) = self.grid.dimensions();
        for _ in 0..PLACEMENT_ATTEMPTS {
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (max_r, max_c) = match orientation {
                Orientation::Horizontal => (rows, (cols + 1).saturating_sub(ship.size())),
                Orientation::Vertical => ((rows + 1).saturating_sub(ship.size()), cols),
            };
            if max_r == 0 || max_c == 0 {
                continue;
            }
            let row = rng.random_range(0..max_r);
            let col = rng.random_range(0..max_c);
            let free = footprint(row, col, orientation, ship.size())
                .all(|(r, c)| self.grid.get(r, c).is_some_and(|cell| cell.is_none() || *cell == Some(ship.id())));
            if free {
                return Ok((row, col, orientation));
            }
        }
        Err(PlacementError::UnableToPlace)
    }

    /// Remove every ship and forget last-known positions.
    pub fn clear(&mut self) {
        self.grid = Grid::new(self.grid.rows(), self.grid.cols());
        self.last_known.iter_mut().for_each(|a| *a = None);
        self.picked_up = None;
    }

    /// Current layout, one entry per fleet ship in fleet order.
    pub fn describe_fleet(&self) -> Vec<ShipPlacement> {
        self.fleet
            .iter()
            .enumerate()
            .map(|(i, ship)| {
                let (anchor, placed) = match self.locate(ship) {
                    Some(anchor) => (anchor, self.is_placed(ship.id())),
                    None => (
                        self.last_known[i].unwrap_or(Anchor {
                            row: 0,
                            col: 0,
                            orientation: ship.orientation(),
                        }),
                        false,
                    ),
                };
                ShipPlacement {
                    ship_id: ship.id(),
                    name: ship.name(),
                    size: ship.size(),
                    row: anchor.row,
                    col: anchor.col,
                    orientation: anchor.orientation,
                    placed,
                }
            })
            .collect()
    }

    fn check(
        &self,
        row: usize,
        col: usize,
        orientation: Orientation,
        size: usize,
    ) -> Result<(), PlacementError> {
        let (rows, cols) = self.grid.dimensions();
        if !fits(rows, cols, row, col, orientation, size) {
            return Err(PlacementError::OutOfBounds);
        }
        let overlaps = footprint(row, col, orientation, size)
            .any(|(r, c)| self.grid.get(r, c).is_some_and(|cell| cell.is_some()));
        if overlaps {
            return Err(PlacementError::Overlap);
        }
        Ok(())
    }

    fn write(&mut self, ship_id: ShipId, row: usize, col: usize, orientation: Orientation, size: usize) {
        for (r, c) in footprint(row, col, orientation, size) {
            if let Some(cell) = self.grid.get_mut(r, c) {
                *cell = Some(ship_id);
            }
        }
    }

    fn clear_ship(&mut self, ship_id: ShipId) {
        let cells: Vec<(usize, usize)> = self
            .grid
            .iter()
            .filter(|(_, cell)| **cell == Some(ship_id))
            .map(|(pos, _)| pos)
            .collect();
        for (r, c) in cells {
            let _ = self.grid.set(r, c, None);
        }
    }
}
