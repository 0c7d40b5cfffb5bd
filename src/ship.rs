//! Ship definitions, fleets, and the cells a placement covers.

use alloc::vec::Vec;
use core::fmt;

use crate::config::FLEET;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// The other orientation.
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// Row/column step taken from one segment to the next.
    pub fn step(self) -> (usize, usize) {
        match self {
            Orientation::Horizontal => (0, 1),
            Orientation::Vertical => (1, 0),
        }
    }
}

/// Class of ship: name and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipClass {
    name: &'static str,
    size: usize,
}

impl ShipClass {
    /// Returns `None` for a zero size.
    pub const fn new(name: &'static str, size: usize) -> Option<Self> {
        if size == 0 {
            None
        } else {
            Some(Self { name, size })
        }
    }

    /// Class for the built-in fleet table, whose sizes are known to be non-zero.
    pub(crate) const fn fixed(name: &'static str, size: usize) -> Self {
        Self { name, size }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Identifier written into every placement cell a ship occupies. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShipId(u8);

impl ShipId {
    /// Returns `None` for zero, which is reserved for empty cells.
    pub const fn new(id: u8) -> Option<Self> {
        if id == 0 {
            None
        } else {
            Some(ShipId(id))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A member of a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ship {
    id: ShipId,
    class: ShipClass,
    orientation: Orientation,
}

impl Ship {
    pub fn new(id: ShipId, class: ShipClass, orientation: Orientation) -> Self {
        Self {
            id,
            class,
            orientation,
        }
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.class.name()
    }

    pub fn size(&self) -> usize {
        self.class.size()
    }

    pub fn class(&self) -> ShipClass {
        self.class
    }

    /// Orientation the ship was last placed (or rotated) with.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub(crate) fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }
}

/// Returns `true` when `size` cells starting at (`row`, `col`) fit in a
/// `rows`×`cols` grid.
pub fn fits(
    rows: usize,
    cols: usize,
    row: usize,
    col: usize,
    orientation: Orientation,
    size: usize,
) -> bool {
    match orientation {
        Orientation::Horizontal => row < rows && col.checked_add(size).is_some_and(|end| end <= cols),
        Orientation::Vertical => col < cols && row.checked_add(size).is_some_and(|end| end <= rows),
    }
}

/// Cells covered by a ship anchored at (`row`, `col`). Callers check [`fits`] first.
pub fn footprint(
    row: usize,
    col: usize,
    orientation: Orientation,
    size: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let (dr, dc) = orientation.step();
    (0..size).map(move |i| (row + i * dr, col + i * dc))
}

/// The fixed set of ships a player places before battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    ships: Vec<Ship>,
}

impl Fleet {
    /// Build a fleet from ship classes, numbering ships from 1 in order.
    ///
    /// Fleets are limited to 255 ships so every id fits the cell encoding;
    /// extra classes are ignored.
    pub fn from_classes(classes: &[ShipClass]) -> Self {
        let ships = classes
            .iter()
            .zip(1..=u8::MAX)
            .filter_map(|(class, n)| {
                ShipId::new(n).map(|id| Ship::new(id, *class, Orientation::Horizontal))
            })
            .collect();
        Fleet { ships }
    }

    /// The default fleet from the configuration.
    pub fn standard() -> Self {
        Self::from_classes(&FLEET)
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ship> {
        self.ships.iter()
    }

    pub fn get(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id == id)
    }

    /// Position of a ship in fleet order.
    pub fn position(&self, id: ShipId) -> Option<usize> {
        self.ships.iter().position(|s| s.id == id)
    }

    /// Total number of cells the fleet occupies.
    pub fn total_cells(&self) -> usize {
        self.ships.iter().map(|s| s.size()).sum()
    }

    pub(crate) fn ship_mut(&mut self, index: usize) -> Option<&mut Ship> {
        self.ships.get_mut(index)
    }
}

/// Where a fleet ship sits, as reported to the session server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipPlacement {
    pub ship_id: ShipId,
    pub name: &'static str,
    pub size: usize,
    pub row: usize,
    pub col: usize,
    pub orientation: Orientation,
    /// `false` when the ship is not on the grid and the anchor is last-known or default.
    pub placed: bool,
}
