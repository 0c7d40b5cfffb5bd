//! In-process stand-in for the session server.
//!
//! Holds the authoritative session: seats, readiness, each player's sea with
//! their submitted fleet, and hit resolution with sink detection. Clones share
//! the same session, so one clone per client plays the part of the HTTP server.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};

use crate::battle::{BattleBoard, BattleCell};
use crate::common::{HitOutcome, PlayerId, SessionError};
use crate::config::{BATTLE_COLS, BATTLE_ROWS, MAX_PLAYERS};
use crate::protocol::{
    GameStateResponse, HitRequest, HitResponse, HitVerdict, JoinRequest, JoinResponse,
    PlaceShipsRequest, PlayersResponse, ReadyEntry,
};
use crate::ship::{fits, footprint, Fleet, ShipId};
use crate::transport::SessionApi;

struct Hull {
    name: String,
    cells: Vec<(usize, usize)>,
}

struct Seat {
    id: PlayerId,
    name: String,
    ready: bool,
    sea: Option<BattleBoard>,
    hulls: Vec<Hull>,
}

struct SessionState {
    rows: usize,
    cols: usize,
    fleet: Fleet,
    seats: Vec<Seat>,
    offline: bool,
    departures: Vec<PlayerId>,
}

impl SessionState {
    fn seat(&self, player: &PlayerId) -> Option<&Seat> {
        self.seats.iter().find(|s| &s.id == player)
    }

    fn seat_mut(&mut self, player: &PlayerId) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|s| &s.id == player)
    }

    fn opponent_mut(&mut self, player: &PlayerId) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|s| &s.id != player)
    }

    fn opponent(&self, player: &PlayerId) -> Option<&Seat> {
        self.seats.iter().find(|s| &s.id != player)
    }

    fn depart(&mut self, player: &PlayerId) {
        if self.seat(player).is_some() {
            info!("[InMemorySession] {} left; session closed", player);
            self.seats.clear();
        }
        self.departures.push(player.clone());
    }
}

#[derive(Clone)]
pub struct InMemorySessionServer {
    state: Arc<Mutex<SessionState>>,
}

impl InMemorySessionServer {
    /// Empty session whose battle seas are `rows`×`cols`, expecting the standard fleet.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_fleet(rows, cols, Fleet::standard())
    }

    /// Empty session that sizes submitted ships by their id in `fleet`.
    pub fn with_fleet(rows: usize, cols: usize, fleet: Fleet) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                rows,
                cols,
                fleet,
                seats: Vec::new(),
                offline: false,
                departures: Vec::new(),
            })),
        }
    }

    pub fn standard() -> Self {
        Self::new(BATTLE_ROWS, BATTLE_COLS)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn online(&self) -> Result<MutexGuard<'_, SessionState>, SessionError> {
        let state = self.lock();
        if state.offline {
            return Err(SessionError::NetworkFailure(
                "in-memory session is offline".to_string(),
            ));
        }
        Ok(state)
    }

    /// While offline every request fails with `NetworkFailure`.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn player_count(&self) -> usize {
        self.lock().seats.len()
    }

    pub fn player_name(&self, player: &PlayerId) -> Option<String> {
        self.lock().seat(player).map(|s| s.name.clone())
    }

    /// Players that sent a departure, in order.
    pub fn departures(&self) -> Vec<PlayerId> {
        self.lock().departures.clone()
    }

    /// Unfogged sea of `player`, if their fleet has been submitted.
    pub fn sea(&self, player: &PlayerId) -> Option<BattleBoard> {
        self.lock().seat(player).and_then(|s| s.sea.clone())
    }

    /// Overwrite one cell of `player`'s sea, bypassing game rules.
    pub fn force_cell(&self, player: &PlayerId, row: usize, col: usize, cell: BattleCell) -> bool {
        let mut state = self.lock();
        let Some(sea) = state.seat_mut(player).and_then(|s| s.sea.as_mut()) else {
            return false;
        };
        let mut grid = sea.grid().clone();
        if grid.set(row, col, cell).is_err() {
            return false;
        }
        *sea = BattleBoard::from_grid(grid);
        true
    }
}

#[async_trait::async_trait]
impl SessionApi for InMemorySessionServer {
    async fn join(&self, player: &PlayerId, request: JoinRequest) -> Result<JoinResponse, SessionError> {
        let mut state = self.online()?;
        if state.seat(player).is_some() {
            return Ok(JoinResponse::accepted());
        }
        if state.seats.len() >= MAX_PLAYERS {
            debug!("[InMemorySession] rejecting {}: session full", player);
            return Ok(JoinResponse::session_full());
        }
        info!("[InMemorySession] {} joined as {:?}", player, request.player_name);
        state.seats.push(Seat {
            id: player.clone(),
            name: request.player_name,
            ready: false,
            sea: None,
            hulls: Vec::new(),
        });
        Ok(JoinResponse::accepted())
    }

    async fn players(&self) -> Result<PlayersResponse, SessionError> {
        let state = self.online()?;
        Ok(PlayersResponse {
            player_ids: state.seats.iter().map(|s| s.id.clone()).collect(),
        })
    }

    async fn place_ships(&self, player: &PlayerId, request: PlaceShipsRequest) -> Result<(), SessionError> {
        let mut state = self.online()?;
        let (rows, cols) = (state.rows, state.cols);
        let fleet = state.fleet.clone();
        let seat = state
            .seat_mut(player)
            .ok_or_else(|| SessionError::UnexpectedServerResponse(format!("unknown player {}", player)))?;

        let mut sea = BattleBoard::new(rows, cols);
        let mut hulls = Vec::with_capacity(request.ships.len());
        let mut seen: Vec<ShipId> = Vec::with_capacity(request.ships.len());
        for ship in &request.ships {
            let (id, size) = ShipId::new(ship.ship_type)
                .and_then(|id| fleet.get(id))
                .map(|s| (s.id(), s.size()))
                .ok_or_else(|| {
                    SessionError::UnexpectedServerResponse(format!("unknown ship type {}", ship.ship_type))
                })?;
            if seen.contains(&id) {
                return Err(SessionError::UnexpectedServerResponse(format!(
                    "ship type {} placed twice",
                    ship.ship_type
                )));
            }
            seen.push(id);
            let (row, col) = (ship.first_cell_coordinates.y, ship.first_cell_coordinates.x);
            if !fits(rows, cols, row, col, ship.orientation, size) {
                return Err(SessionError::UnexpectedServerResponse(format!(
                    "{} does not fit the sea",
                    ship.name
                )));
            }
            let cells: Vec<(usize, usize)> = footprint(row, col, ship.orientation, size).collect();
            if cells.iter().any(|&(r, c)| sea.get(r, c) != Some(BattleCell::Water)) {
                return Err(SessionError::UnexpectedServerResponse(format!(
                    "{} overlaps another ship",
                    ship.name
                )));
            }
            for &(r, c) in &cells {
                let _ = sea.mark_ship(r, c);
            }
            hulls.push(Hull {
                name: ship.name.clone(),
                cells,
            });
        }
        if seen.len() != fleet.len() {
            return Err(SessionError::UnexpectedServerResponse(format!(
                "layout has {} of {} ships",
                seen.len(),
                fleet.len()
            )));
        }
        seat.sea = Some(sea);
        seat.hulls = hulls;
        seat.ready = true;
        info!("[InMemorySession] {} placed {} ships and is ready", player, request.ships.len());
        Ok(())
    }

    async fn ready_states(&self) -> Result<Vec<ReadyEntry>, SessionError> {
        let state = self.online()?;
        Ok(state
            .seats
            .iter()
            .map(|s| ReadyEntry {
                id: s.id.clone(),
                ready_for_battle: s.ready,
            })
            .collect())
    }

    async fn game_state(&self, player: &PlayerId) -> Result<GameStateResponse, SessionError> {
        let state = self.online()?;
        let fogged = match state.opponent(player).and_then(|s| s.sea.as_ref()) {
            Some(sea) => sea.fogged(),
            None => BattleBoard::new(state.rows, state.cols).into_grid(),
        };
        Ok(GameStateResponse::from_grid(&fogged))
    }

    async fn hit(&self, player: &PlayerId, request: HitRequest) -> Result<HitResponse, SessionError> {
        let mut state = self.online()?;
        if state.seat(player).is_none() {
            return Err(SessionError::UnexpectedServerResponse(format!("unknown player {}", player)));
        }
        let target = state
            .opponent_mut(player)
            .ok_or_else(|| SessionError::UnexpectedServerResponse("no opponent".to_string()))?;
        let Some(sea) = target.sea.as_mut() else {
            return Err(SessionError::UnexpectedServerResponse(
                "battle has not started".to_string(),
            ));
        };
        let (row, col) = (request.y, request.x);
        let outcome = sea
            .apply_hit(row, col)
            .map_err(|e| SessionError::UnexpectedServerResponse(e.to_string()))?;
        let response = match outcome {
            HitOutcome::Miss => HitResponse {
                result: HitVerdict::Miss,
                sunk_ship: None,
            },
            HitOutcome::Hit | HitOutcome::Sunk => {
                let sea = &*sea;
                let sunk = target.hulls.iter().find(|h| {
                    h.cells.contains(&(row, col))
                        && h.cells.iter().all(|&(r, c)| sea.get(r, c) == Some(BattleCell::HitShip))
                });
                match sunk {
                    Some(hull) => HitResponse {
                        result: HitVerdict::Sunk,
                        sunk_ship: Some(hull.name.clone()),
                    },
                    None => HitResponse {
                        result: HitVerdict::Hit,
                        sunk_ship: None,
                    },
                }
            }
            HitOutcome::AlreadyResolved => HitResponse {
                result: match sea.get(row, col) {
                    Some(BattleCell::HitShip) => HitVerdict::Hit,
                    _ => HitVerdict::Miss,
                },
                sunk_ship: None,
            },
        };
        debug!("[InMemorySession] {} fired at ({}, {}): {:?}", player, row, col, response.result);
        Ok(response)
    }

    async fn leave(&self, player: &PlayerId) -> Result<(), SessionError> {
        let mut state = self.online()?;
        state.depart(player);
        Ok(())
    }

    fn send_departure_beacon(&self, player: &PlayerId) {
        let mut state = self.lock();
        if state.offline {
            debug!("[InMemorySession] beacon from {} lost", player);
            return;
        }
        state.depart(player);
    }
}
