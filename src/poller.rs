//! Repeating fetch tasks bound to a session phase.
//!
//! A poller only fetches and forwards: every tick it calls the server and sends
//! the outcome, stamped with the generation it was started under, over the
//! controller's channel. Dropping the poller aborts its task.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::common::{PlayerId, SessionError};
use crate::protocol::{GameStateResponse, ReadyEntry};
use crate::transport::SessionApi;

/// What a poller fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollConcern {
    /// `GET /session/join`, during Lobby.
    Players,
    /// `GET /session/ready`, during Placement.
    Ready,
    /// `GET /game/state`, during Battle.
    GameState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollPayload {
    Players(Vec<PlayerId>),
    Ready(Vec<ReadyEntry>),
    GameState(GameStateResponse),
}

/// One tick's outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct PollEvent {
    pub generation: u64,
    pub concern: PollConcern,
    pub payload: Result<PollPayload, SessionError>,
}

pub struct Poller {
    concern: PollConcern,
    generation: u64,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Start polling `concern` every `period`, first fetch immediately.
    pub fn spawn(
        api: Arc<dyn SessionApi>,
        player: PlayerId,
        concern: PollConcern,
        generation: u64,
        period: Duration,
        tx: UnboundedSender<PollEvent>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let payload = fetch(api.as_ref(), &player, concern).await;
                let event = PollEvent {
                    generation,
                    concern,
                    payload,
                };
                if tx.send(event).is_err() {
                    debug!("[Poller] {:?} receiver gone, stopping", concern);
                    break;
                }
            }
        });
        Self {
            concern,
            generation,
            handle,
        }
    }

    pub fn concern(&self) -> PollConcern {
        self.concern
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn fetch(
    api: &dyn SessionApi,
    player: &PlayerId,
    concern: PollConcern,
) -> Result<PollPayload, SessionError> {
    match concern {
        PollConcern::Players => api
            .players()
            .await
            .map(|r| PollPayload::Players(r.player_ids)),
        PollConcern::Ready => api.ready_states().await.map(PollPayload::Ready),
        PollConcern::GameState => api.game_state(player).await.map(PollPayload::GameState),
    }
}
