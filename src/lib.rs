#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod battle;
mod common;
mod config;
mod grid;
mod placement;
mod reconcile;
mod ship;
mod stamina;

#[cfg(feature = "std")]
mod bot;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
mod poller;
#[cfg(feature = "std")]
pub mod prelude;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;

pub use battle::*;
pub use common::*;
pub use config::*;
pub use grid::*;
pub use placement::*;
pub use reconcile::*;
pub use ship::*;
pub use stamina::*;

#[cfg(feature = "std")]
pub use bot::{Autopilot, MatchSummary};
#[cfg(feature = "std")]
pub use logging::{init_logging, level_from, LOG_ENV};
#[cfg(feature = "std")]
pub use poller::{PollConcern, PollEvent, PollPayload, Poller};
#[cfg(feature = "std")]
pub use session::{ControllerEvent, SessionController};
#[cfg(feature = "std")]
pub use transport::{http::HttpSessionApi, in_memory::InMemorySessionServer, SessionApi};
