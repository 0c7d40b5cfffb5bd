//! Commonly used types and utilities for ease of import.

pub use crate::{
    Autopilot, BattleBoard, BattleCell, ClientConfig, ControllerEvent, HitOutcome, Orientation, Phase,
    PlacementEngine, PlayerId, SessionController, ShipId,
};

pub use crate::transport::{http::HttpSessionApi, in_memory::InMemorySessionServer, SessionApi};
