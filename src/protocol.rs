//! JSON documents exchanged with the session server.
//!
//! Every response is one JSON value with camelCase keys, decoded in a single
//! pass. Coordinates on the wire are `x` = column, `y` = row.

use serde::{Deserialize, Serialize};

use crate::battle::{BattleCell, BattleGrid};
use crate::common::{HitOutcome, PlayerId, SessionError};
use crate::grid::Grid;
use crate::ship::{Orientation, ShipPlacement};

pub const STATUS_PLAYER_ACCEPTED: &str = "Player accepted";
pub const STATUS_SESSION_FULL: &str = "Session full";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    pub status: String,
}

/// Interpreted join status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinStatus {
    Accepted,
    SessionFull,
    Other(String),
}

impl JoinResponse {
    pub fn accepted() -> Self {
        JoinResponse {
            status: STATUS_PLAYER_ACCEPTED.to_string(),
        }
    }

    pub fn session_full() -> Self {
        JoinResponse {
            status: STATUS_SESSION_FULL.to_string(),
        }
    }

    pub fn join_status(&self) -> JoinStatus {
        match self.status.as_str() {
            STATUS_PLAYER_ACCEPTED => JoinStatus::Accepted,
            STATUS_SESSION_FULL => JoinStatus::SessionFull,
            other => JoinStatus::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayersResponse {
    pub player_ids: Vec<PlayerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipPayload {
    pub name: String,
    /// Fleet id of the ship.
    pub ship_type: u8,
    #[serde(rename = "firstCell_coordinates")]
    pub first_cell_coordinates: Coordinates,
    pub orientation: Orientation,
}

impl From<&ShipPlacement> for ShipPayload {
    fn from(p: &ShipPlacement) -> Self {
        ShipPayload {
            name: p.name.to_string(),
            ship_type: p.ship_id.get(),
            first_cell_coordinates: Coordinates { x: p.col, y: p.row },
            orientation: p.orientation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceShipsRequest {
    pub ships: Vec<ShipPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyEntry {
    pub id: PlayerId,
    pub ready_for_battle: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainGrid {
    pub grid: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateResponse {
    pub main_grid: MainGrid,
}

impl GameStateResponse {
    pub fn from_grid(grid: &BattleGrid) -> Self {
        let rows = grid
            .to_rows()
            .into_iter()
            .map(|row| row.into_iter().map(BattleCell::code).collect())
            .collect();
        GameStateResponse {
            main_grid: MainGrid { grid: rows },
        }
    }

    /// Decode the cell codes. Unknown codes or ragged rows are a contract violation.
    pub fn to_grid(&self) -> Result<BattleGrid, SessionError> {
        let mut rows = Vec::with_capacity(self.main_grid.grid.len());
        for (r, row) in self.main_grid.grid.iter().enumerate() {
            let mut cells = Vec::with_capacity(row.len());
            for (c, &code) in row.iter().enumerate() {
                let cell = BattleCell::from_code(code).ok_or_else(|| {
                    SessionError::UnexpectedServerResponse(format!(
                        "cell ({}, {}) has unknown state {}",
                        r, c, code
                    ))
                })?;
                cells.push(cell);
            }
            rows.push(cells);
        }
        Grid::from_rows(rows).map_err(|e| SessionError::UnexpectedServerResponse(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitRequest {
    pub x: usize,
    pub y: usize,
}

impl HitRequest {
    pub fn at(row: usize, col: usize) -> Self {
        HitRequest { x: col, y: row }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitVerdict {
    Miss,
    Hit,
    Sunk,
}

impl HitVerdict {
    /// Cell state the verdict implies.
    pub fn cell(self) -> BattleCell {
        match self {
            HitVerdict::Miss => BattleCell::HitWater,
            HitVerdict::Hit | HitVerdict::Sunk => BattleCell::HitShip,
        }
    }

    pub fn outcome(self) -> HitOutcome {
        match self {
            HitVerdict::Miss => HitOutcome::Miss,
            HitVerdict::Hit => HitOutcome::Hit,
            HitVerdict::Sunk => HitOutcome::Sunk,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitResponse {
    pub result: HitVerdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunk_ship: Option<String>,
}
