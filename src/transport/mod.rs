use crate::common::{PlayerId, SessionError};
use crate::protocol::{
    GameStateResponse, HitRequest, HitResponse, JoinRequest, JoinResponse, PlaceShipsRequest,
    PlayersResponse, ReadyEntry,
};

/// Operations the session server exposes to a client.
#[async_trait::async_trait]
pub trait SessionApi: Send + Sync {
    /// `POST /session/join?player_id=<id>`
    async fn join(&self, player: &PlayerId, request: JoinRequest) -> Result<JoinResponse, SessionError>;

    /// `GET /session/join`
    async fn players(&self) -> Result<PlayersResponse, SessionError>;

    /// `POST /session/placeShips?player_id=<id>`
    async fn place_ships(&self, player: &PlayerId, request: PlaceShipsRequest) -> Result<(), SessionError>;

    /// `GET /session/ready`
    async fn ready_states(&self) -> Result<Vec<ReadyEntry>, SessionError>;

    /// `GET /game/state?player_id=<id>`
    async fn game_state(&self, player: &PlayerId) -> Result<GameStateResponse, SessionError>;

    /// `POST /game/hit?player_id=<id>`
    async fn hit(&self, player: &PlayerId, request: HitRequest) -> Result<HitResponse, SessionError>;

    /// `DELETE /session/join?player_id=<id>`, awaited.
    async fn leave(&self, player: &PlayerId) -> Result<(), SessionError>;

    /// Best-effort departure notice. Must not block on a reply and must be
    /// callable from `Drop`.
    fn send_departure_beacon(&self, player: &PlayerId);
}

pub mod http;
pub mod in_memory;
