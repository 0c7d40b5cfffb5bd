//! Common types: errors, hit outcomes, player ids, session phases.

use alloc::string::String;
use core::fmt;

use rand::Rng;

use crate::grid::GridError;

/// Result of applying a hit to a battle cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// The shot landed in open water.
    Miss,
    /// The shot struck a ship segment.
    Hit,
    /// The server reports the shot finished off a ship.
    Sunk,
    /// The cell was already resolved; nothing changed.
    AlreadyResolved,
}

/// Errors returned by the placement engine. Callers snap the ship back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// A computed cell lies outside the grid.
    OutOfBounds,
    /// A computed cell is occupied by another ship.
    Overlap,
    /// No ship with this id in the fleet.
    UnknownShip,
    /// Random placement ran out of attempts.
    UnableToPlace,
}

impl From<GridError> for PlacementError {
    fn from(_: GridError) -> Self {
        PlacementError::OutOfBounds
    }
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::OutOfBounds => write!(f, "Ship placement is out of bounds"),
            PlacementError::Overlap => write!(f, "Ship placement overlaps with another ship"),
            PlacementError::UnknownShip => write!(f, "Ship is not part of the fleet"),
            PlacementError::UnableToPlace => write!(f, "Unable to place ship"),
        }
    }
}

/// Attack rejected by the local rate limiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaminaError {
    Exhausted { available: u32, cost: u32 },
}

impl fmt::Display for StaminaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaminaError::Exhausted { available, cost } => write!(
                f,
                "Not enough stamina: {} available, {} needed",
                available, cost
            ),
        }
    }
}

/// Mutually exclusive session phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Lobby,
    Placement,
    Battle,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Lobby => "lobby",
            Phase::Placement => "placement",
            Phase::Battle => "battle",
        };
        f.write_str(name)
    }
}

/// Errors from the session lifecycle. All are recoverable: the message is
/// shown to the player and the failed action can be retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Player name too short.
    InvalidPlayerName,
    /// Two players are already seated.
    SessionFull,
    /// Ready was requested before every ship was placed.
    FleetIncomplete,
    /// The action belongs to another phase.
    WrongPhase { expected: Phase, actual: Phase },
    /// The server answered with something outside the contract.
    UnexpectedServerResponse(String),
    /// The request never got a response.
    NetworkFailure(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidPlayerName => write!(f, "Player name is too short"),
            SessionError::SessionFull => write!(f, "Session full"),
            SessionError::FleetIncomplete => write!(f, "Place every ship before getting ready"),
            SessionError::WrongPhase { expected, actual } => {
                write!(f, "Not available during {} (needs {})", actual, expected)
            }
            SessionError::UnexpectedServerResponse(detail) => {
                write!(f, "Unexpected server response: {}", detail)
            }
            SessionError::NetworkFailure(detail) => write!(f, "Network failure: {}", detail),
        }
    }
}

/// Reasons an attack was not carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackError {
    WrongPhase(Phase),
    OutOfBounds { row: usize, col: usize },
    Stamina(StaminaError),
    /// The shot was applied locally but the server did not confirm it.
    Network(SessionError),
}

impl From<StaminaError> for AttackError {
    fn from(err: StaminaError) -> Self {
        AttackError::Stamina(err)
    }
}

impl fmt::Display for AttackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackError::WrongPhase(phase) => write!(f, "Cannot attack during {}", phase),
            AttackError::OutOfBounds { row, col } => {
                write!(f, "Target ({}, {}) is outside the sea", row, col)
            }
            AttackError::Stamina(e) => write!(f, "{}", e),
            AttackError::Network(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PlacementError {}
#[cfg(feature = "std")]
impl std::error::Error for StaminaError {}
#[cfg(feature = "std")]
impl std::error::Error for SessionError {}
#[cfg(feature = "std")]
impl std::error::Error for AttackError {}
#[cfg(feature = "std")]
impl std::error::Error for GridError {}

/// Opaque identifier the server uses for a player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(transparent))]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    /// A fresh 16-digit hex id.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        use core::fmt::Write;
        let mut id = String::with_capacity(16);
        let _ = write!(id, "{:016x}", rng.random::<u64>());
        PlayerId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
