//! Client side of one game session: Lobby, then Placement, then Battle.
//!
//! The controller is the only owner of the placement grid, the battle board
//! and the stamina budget. Pollers run as spawned tasks and hand their results
//! back through a channel; the controller applies them in [`SessionController::next_event`].
//! Every phase transition cancels the outgoing phase's pollers and timers before
//! the incoming phase starts its own, and bumps the generation so results that
//! were already in flight are dropped.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval_at, sleep_until, Instant, Interval};

use crate::battle::BattleBoard;
use crate::common::{AttackError, HitOutcome, Phase, PlayerId, SessionError, StaminaError};
use crate::config::{ClientConfig, MAX_PLAYERS, MIN_PLAYER_NAME_LEN};
use crate::placement::{PlacementEngine, PlacementGrid};
use crate::poller::{PollConcern, PollEvent, PollPayload, Poller};
use crate::protocol::{
    GameStateResponse, HitRequest, JoinRequest, JoinStatus, PlaceShipsRequest, ReadyEntry, ShipPayload,
};
use crate::reconcile::{reconcile, ReconcileError, ReconcileReport};
use crate::stamina::StaminaBudget;
use crate::transport::SessionApi;

/// Something [`SessionController::next_event`] applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    PhaseChanged { from: Phase, to: Phase },
    /// A poll result arrived and changed nothing visible.
    Polled(PollConcern),
    /// Both players are ready; battle starts after the grace period.
    BattleCountdown { starts_in: Duration },
    BoardSynced(ReconcileReport),
    StaminaRegenerated(u32),
    /// A poll failed. The poller keeps running and retries on its next tick.
    PollFailed { concern: PollConcern, error: SessionError },
}

enum Wake {
    Poll(PollEvent),
    Grace,
    Stamina,
}

pub struct SessionController {
    api: Arc<dyn SessionApi>,
    config: ClientConfig,
    player: PlayerId,
    player_name: Option<String>,
    phase: Phase,
    generation: u64,
    joined: bool,
    departed: bool,
    opponent: Option<PlayerId>,
    placement: Option<PlacementEngine>,
    ready_submitted: bool,
    own_layout: Option<PlacementGrid>,
    board: Option<BattleBoard>,
    stamina: StaminaBudget,
    battle_at: Option<Instant>,
    poller: Option<Poller>,
    stamina_timer: Option<Interval>,
    events_tx: UnboundedSender<PollEvent>,
    events_rx: UnboundedReceiver<PollEvent>,
    status: Option<String>,
    sunk_ships: Vec<String>,
}

impl SessionController {
    pub fn new(api: Arc<dyn SessionApi>, player: PlayerId, config: ClientConfig) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        let stamina = StaminaBudget::new(config.stamina_max, config.stamina_cost, config.stamina_regen);
        Self {
            api,
            config,
            player,
            player_name: None,
            phase: Phase::Lobby,
            generation: 0,
            joined: false,
            departed: false,
            opponent: None,
            placement: None,
            ready_submitted: false,
            own_layout: None,
            board: None,
            stamina,
            battle_at: None,
            poller: None,
            stamina_timer: None,
            events_tx,
            events_rx,
            status: None,
            sunk_ships: Vec::new(),
        }
    }

    /// Controller with a freshly generated player id.
    pub fn with_random_id(api: Arc<dyn SessionApi>, config: ClientConfig) -> Self {
        let player = PlayerId::random(&mut rand::rng());
        Self::new(api, player, config)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    pub fn opponent(&self) -> Option<&PlayerId> {
        self.opponent.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn is_ready_submitted(&self) -> bool {
        self.ready_submitted
    }

    /// The placement engine, during Placement.
    pub fn placement(&self) -> Option<&PlacementEngine> {
        self.placement.as_ref()
    }

    /// Mutable placement engine. `None` once the layout has been submitted.
    pub fn placement_mut(&mut self) -> Option<&mut PlacementEngine> {
        if self.ready_submitted {
            return None;
        }
        self.placement.as_mut()
    }

    /// Our own submitted layout, during Battle.
    pub fn own_layout(&self) -> Option<&PlacementGrid> {
        self.own_layout.as_ref()
    }

    /// The opponent's sea as we know it, during Battle.
    pub fn board(&self) -> Option<&BattleBoard> {
        self.board.as_ref()
    }

    pub fn stamina(&self) -> &StaminaBudget {
        &self.stamina
    }

    /// Last user-visible error, cleared by the next successful action.
    pub fn status_message(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Ships the server reported sunk, in order.
    pub fn sunk_ships(&self) -> &[String] {
        &self.sunk_ships
    }

    pub fn active_poll(&self) -> Option<PollConcern> {
        self.poller.as_ref().map(Poller::concern)
    }

    /// Time left before battle starts, once both players are ready.
    pub fn battle_countdown(&self) -> Option<Duration> {
        self.battle_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    fn fail<T>(&mut self, err: SessionError) -> Result<T, SessionError> {
        warn!("[SessionController] {}", err);
        self.status = Some(err.to_string());
        Err(err)
    }

    fn expect_phase(&mut self, expected: Phase) -> Result<(), SessionError> {
        if self.phase != expected {
            return self.fail(SessionError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// Join the session as `name`. On acceptance the lobby poll starts.
    pub async fn join(&mut self, name: &str) -> Result<(), SessionError> {
        self.expect_phase(Phase::Lobby)?;
        let name = name.trim();
        if name.chars().count() < MIN_PLAYER_NAME_LEN {
            return self.fail(SessionError::InvalidPlayerName);
        }

        let request = JoinRequest {
            player_name: name.to_string(),
        };
        let response = match self.api.join(&self.player, request).await {
            Ok(response) => response,
            Err(e) => return self.fail(e),
        };
        match response.join_status() {
            JoinStatus::Accepted => {
                info!("[SessionController] {} joined as {:?}", self.player, name);
                self.joined = true;
                self.departed = false;
                self.player_name = Some(name.to_string());
                self.status = None;
                if self.poller.is_none() {
                    self.start_poll(PollConcern::Players);
                }
                Ok(())
            }
            JoinStatus::SessionFull => self.fail(SessionError::SessionFull),
            JoinStatus::Other(status) => self.fail(SessionError::UnexpectedServerResponse(format!(
                "join status {:?}",
                status
            ))),
        }
    }

    /// Submit the layout and start waiting for the opponent. Submits at most once.
    pub async fn submit_ready(&mut self) -> Result<(), SessionError> {
        self.expect_phase(Phase::Placement)?;
        if self.ready_submitted {
            return Ok(());
        }
        let ships: Vec<ShipPayload> = match self.placement.as_ref() {
            Some(engine) if engine.all_placed() => {
                engine.describe_fleet().iter().map(ShipPayload::from).collect()
            }
            _ => return self.fail(SessionError::FleetIncomplete),
        };

        let count = ships.len();
        if let Err(e) = self.api.place_ships(&self.player, PlaceShipsRequest { ships }).await {
            return self.fail(e);
        }
        info!("[SessionController] {} submitted {} ships", self.player, count);
        self.ready_submitted = true;
        self.status = None;
        self.start_poll(PollConcern::Ready);
        Ok(())
    }

    /// Fire at (`row`, `col`) on the opponent's sea.
    ///
    /// The shot is applied locally first and then sent; the server's verdict
    /// overwrites the local prediction. A rejected attack changes nothing.
    /// When the request itself fails the prediction stays in place and the
    /// stamina is not refunded; the next game-state poll corrects the cell.
    pub async fn attack(&mut self, row: usize, col: usize) -> Result<HitOutcome, AttackError> {
        if self.phase != Phase::Battle {
            return Err(AttackError::WrongPhase(self.phase));
        }
        let generation = self.generation;
        let Some(board) = self.board.as_mut() else {
            return Err(AttackError::WrongPhase(self.phase));
        };
        if board.get(row, col).is_none() {
            return Err(AttackError::OutOfBounds { row, col });
        }
        if !self.stamina.can_afford() {
            let err = StaminaError::Exhausted {
                available: self.stamina.value(),
                cost: self.stamina.cost(),
            };
            self.status = Some(err.to_string());
            return Err(err.into());
        }

        let predicted = board
            .apply_hit(row, col)
            .map_err(|_| AttackError::OutOfBounds { row, col })?;
        if predicted == HitOutcome::AlreadyResolved {
            return Ok(HitOutcome::AlreadyResolved);
        }
        self.stamina.try_spend()?;
        debug!(
            "[SessionController] fired at ({}, {}), predicted {:?}, stamina {}",
            row,
            col,
            predicted,
            self.stamina.value()
        );

        let response = match self.api.hit(&self.player, HitRequest::at(row, col)).await {
            Ok(response) => response,
            Err(e) => {
                warn!("[SessionController] hit at ({}, {}) unconfirmed: {}", row, col, e);
                self.status = Some(e.to_string());
                return Err(AttackError::Network(e));
            }
        };
        if self.generation == generation {
            if let Some(board) = self.board.as_mut() {
                let _ = board.resolve(row, col, response.result.cell());
            }
        }
        if let Some(name) = response.sunk_ship {
            if !self.sunk_ships.contains(&name) {
                info!("[SessionController] sank {}", name);
                self.sunk_ships.push(name);
            }
        }
        self.status = None;
        Ok(response.result.outcome())
    }

    /// Wait for the next poll result or timer and apply it.
    ///
    /// Returns `None` when nothing is running that could produce an event.
    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        loop {
            let wake = match self.events_rx.try_recv() {
                Ok(event) => Wake::Poll(event),
                Err(_) => {
                    if self.poller.is_none() && self.battle_at.is_none() && self.stamina_timer.is_none() {
                        return None;
                    }
                    let polling = self.poller.is_some();
                    tokio::select! {
                        biased;
                        event = recv_while(&mut self.events_rx, polling) => match event {
                            Some(event) => Wake::Poll(event),
                            None => return None,
                        },
                        _ = sleep_until_deadline(self.battle_at) => Wake::Grace,
                        _ = tick(self.stamina_timer.as_mut()) => Wake::Stamina,
                    }
                }
            };

            match wake {
                Wake::Poll(event) => {
                    if event.generation != self.generation {
                        debug!(
                            "[SessionController] discarding {:?} result from generation {} (now {})",
                            event.concern, event.generation, self.generation
                        );
                        continue;
                    }
                    return Some(self.apply_poll(event));
                }
                Wake::Grace => {
                    self.battle_at = None;
                    return Some(self.transition(Phase::Battle));
                }
                Wake::Stamina => {
                    let value = self.stamina.regenerate();
                    return Some(ControllerEvent::StaminaRegenerated(value));
                }
            }
        }
    }

    fn apply_poll(&mut self, event: PollEvent) -> ControllerEvent {
        let concern = event.concern;
        match event.payload {
            Err(error) => {
                warn!("[SessionController] {:?} poll failed, retrying: {}", concern, error);
                ControllerEvent::PollFailed { concern, error }
            }
            Ok(PollPayload::Players(ids)) => self.observe_players(ids),
            Ok(PollPayload::Ready(entries)) => self.observe_ready(&entries),
            Ok(PollPayload::GameState(state)) => self.observe_game_state(&state),
        }
    }

    fn observe_players(&mut self, ids: Vec<PlayerId>) -> ControllerEvent {
        if self.phase != Phase::Lobby {
            return ControllerEvent::Polled(PollConcern::Players);
        }
        debug!("[SessionController] {} player(s) in session", ids.len());
        if ids.len() < MAX_PLAYERS || !ids.contains(&self.player) {
            return ControllerEvent::Polled(PollConcern::Players);
        }
        match ids.into_iter().find(|id| id != &self.player) {
            Some(opponent) => {
                info!("[SessionController] opponent {} found", opponent);
                self.opponent = Some(opponent);
                self.transition(Phase::Placement)
            }
            None => ControllerEvent::Polled(PollConcern::Players),
        }
    }

    fn observe_ready(&mut self, entries: &[ReadyEntry]) -> ControllerEvent {
        let everyone_ready = entries.len() >= MAX_PLAYERS
            && entries.iter().any(|e| e.id == self.player)
            && entries.iter().all(|e| e.ready_for_battle);
        if self.phase != Phase::Placement || !everyone_ready || self.battle_at.is_some() {
            return ControllerEvent::Polled(PollConcern::Ready);
        }
        let grace = self.config.battle_grace;
        info!("[SessionController] both players ready, battle in {:?}", grace);
        self.poller = None;
        self.battle_at = Some(Instant::now() + grace);
        ControllerEvent::BattleCountdown { starts_in: grace }
    }

    fn observe_game_state(&mut self, state: &GameStateResponse) -> ControllerEvent {
        let Some(board) = self.board.as_mut() else {
            return ControllerEvent::Polled(PollConcern::GameState);
        };
        let result = state.to_grid().and_then(|snapshot| {
            reconcile(board, &snapshot).map_err(|ReconcileError::DimensionMismatch { local, server }| {
                SessionError::UnexpectedServerResponse(format!(
                    "game state is {}x{}, board is {}x{}",
                    server.0, server.1, local.0, local.1
                ))
            })
        });
        match result {
            Ok(report) => {
                if !report.is_noop() {
                    debug!(
                        "[SessionController] server corrected {} cell(s), {} stale",
                        report.corrected, report.stale_ignored
                    );
                }
                ControllerEvent::BoardSynced(report)
            }
            Err(error) => {
                warn!("[SessionController] rejected game state: {}", error);
                self.status = Some(error.to_string());
                ControllerEvent::PollFailed {
                    concern: PollConcern::GameState,
                    error,
                }
            }
        }
    }

    fn start_poll(&mut self, concern: PollConcern) {
        self.poller = Some(Poller::spawn(
            Arc::clone(&self.api),
            self.player.clone(),
            concern,
            self.generation,
            self.config.poll_period,
            self.events_tx.clone(),
        ));
    }

    fn cancel_timers(&mut self) {
        self.poller = None;
        self.stamina_timer = None;
        self.battle_at = None;
    }

    fn transition(&mut self, to: Phase) -> ControllerEvent {
        let from = self.phase;
        self.cancel_timers();
        self.generation += 1;
        self.phase = to;
        info!("[SessionController] {} -> {}", from, to);

        match to {
            Phase::Lobby => {}
            Phase::Placement => {
                self.placement = Some(PlacementEngine::new(
                    self.config.placement_rows,
                    self.config.placement_cols,
                    self.config.fleet.clone(),
                ));
                self.ready_submitted = false;
            }
            Phase::Battle => {
                self.own_layout = self.placement.take().map(PlacementEngine::into_grid);
                self.board = Some(BattleBoard::new(self.config.battle_rows, self.config.battle_cols));
                self.stamina = StaminaBudget::new(
                    self.config.stamina_max,
                    self.config.stamina_cost,
                    self.config.stamina_regen,
                );
                let tick = self.config.stamina_tick;
                self.stamina_timer = Some(interval_at(Instant::now() + tick, tick));
                self.start_poll(PollConcern::GameState);
            }
        }
        ControllerEvent::PhaseChanged { from, to }
    }

    /// Leave the session and wait for the server to acknowledge.
    ///
    /// Once acknowledged the controller is back in an empty Lobby and can
    /// join again. A failed leave keeps us seated, so it can be retried and
    /// a later drop still sends the departure beacon.
    pub async fn leave(&mut self) -> Result<(), SessionError> {
        self.cancel_timers();
        self.generation += 1;
        if !self.joined || self.departed {
            return Ok(());
        }
        match self.api.leave(&self.player).await {
            Ok(()) => {
                info!("[SessionController] {} left the session", self.player);
                self.reset_session();
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    fn reset_session(&mut self) {
        self.phase = Phase::Lobby;
        self.joined = false;
        self.player_name = None;
        self.opponent = None;
        self.placement = None;
        self.ready_submitted = false;
        self.own_layout = None;
        self.board = None;
        self.stamina = StaminaBudget::new(
            self.config.stamina_max,
            self.config.stamina_cost,
            self.config.stamina_regen,
        );
        self.sunk_ships.clear();
        self.status = None;
    }

    /// Stop every poller and timer and tell the server we are gone, once.
    /// Does not wait for a reply.
    pub fn shutdown(&mut self) {
        self.cancel_timers();
        self.generation += 1;
        if self.joined && !self.departed {
            self.departed = true;
            info!("[SessionController] {} departing", self.player);
            self.api.send_departure_beacon(&self.player);
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn recv_while(rx: &mut UnboundedReceiver<PollEvent>, polling: bool) -> Option<PollEvent> {
    if polling {
        rx.recv().await
    } else {
        pending().await
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn tick(timer: Option<&mut Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::in_memory::InMemorySessionServer;

    fn controller(id: &str) -> SessionController {
        let server = InMemorySessionServer::new(10, 10);
        SessionController::new(Arc::new(server), PlayerId::new(id), ClientConfig::fast())
    }

    #[tokio::test]
    async fn idle_controller_has_no_events() {
        let mut c = controller("alice");
        assert_eq!(c.next_event().await, None);
    }

    #[tokio::test]
    async fn results_from_an_earlier_generation_are_discarded() {
        let mut c = controller("alice");
        c.generation = 3;
        let stale = PollEvent {
            generation: 2,
            concern: PollConcern::Players,
            payload: Ok(PollPayload::Players(vec![PlayerId::new("alice"), PlayerId::new("bob")])),
        };
        c.events_tx.send(stale).unwrap();
        assert_eq!(c.next_event().await, None);
        assert_eq!(c.phase(), Phase::Lobby);
        assert!(c.opponent().is_none());
    }

    #[tokio::test]
    async fn current_generation_players_result_moves_to_placement() {
        let mut c = controller("alice");
        let event = PollEvent {
            generation: c.generation,
            concern: PollConcern::Players,
            payload: Ok(PollPayload::Players(vec![PlayerId::new("bob"), PlayerId::new("alice")])),
        };
        c.events_tx.send(event).unwrap();
        assert_eq!(
            c.next_event().await,
            Some(ControllerEvent::PhaseChanged {
                from: Phase::Lobby,
                to: Phase::Placement
            })
        );
        assert_eq!(c.opponent(), Some(&PlayerId::new("bob")));
        assert!(c.placement().is_some());
        assert_eq!(c.generation(), 1);
    }

    #[tokio::test]
    async fn lobby_waits_for_two_players_including_us() {
        let mut c = controller("alice");
        let lists = [
            vec![],
            vec![PlayerId::new("alice")],
            vec![PlayerId::new("bob"), PlayerId::new("carol")],
        ];
        for ids in lists {
            let event = PollEvent {
                generation: c.generation,
                concern: PollConcern::Players,
                payload: Ok(PollPayload::Players(ids)),
            };
            c.events_tx.send(event).unwrap();
            assert_eq!(
                c.next_event().await,
                Some(ControllerEvent::Polled(PollConcern::Players))
            );
            assert_eq!(c.phase(), Phase::Lobby);
        }
        assert!(c.opponent().is_none());
    }

    #[tokio::test]
    async fn game_state_for_a_battle_board_left_behind_is_ignored() {
        let mut c = controller("alice");
        let grid = BattleBoard::new(10, 10).into_grid();
        let event = PollEvent {
            generation: c.generation,
            concern: PollConcern::GameState,
            payload: Ok(PollPayload::GameState(GameStateResponse::from_grid(&grid))),
        };
        c.events_tx.send(event).unwrap();
        assert_eq!(
            c.next_event().await,
            Some(ControllerEvent::Polled(PollConcern::GameState))
        );
        assert!(c.board().is_none());
    }
}
