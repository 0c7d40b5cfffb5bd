use core::time::Duration;

use crate::ship::{Fleet, ShipClass};

pub const PLACEMENT_ROWS: usize = 10;
pub const PLACEMENT_COLS: usize = 10;
pub const BATTLE_ROWS: usize = 33;
pub const BATTLE_COLS: usize = 55;

pub const NUM_SHIPS: usize = 3;
pub const FLEET: [ShipClass; NUM_SHIPS] = [
    ShipClass::fixed("Destroyer", 2),
    ShipClass::fixed("Submarine", 3),
    ShipClass::fixed("Battleship", 5),
];

pub const MAX_PLAYERS: usize = 2;
/// Shortest player name the session accepts.
pub const MIN_PLAYER_NAME_LEN: usize = 3;

pub const STAMINA_MAX: u32 = 100;
pub const STAMINA_ATTACK_COST: u32 = 12;
pub const STAMINA_REGEN: u32 = 6;
pub const STAMINA_TICK: Duration = Duration::from_secs(1);

pub const POLL_PERIOD: Duration = Duration::from_secs(2);
/// Delay between seeing both players ready and entering battle.
pub const BATTLE_GRACE: Duration = Duration::from_secs(2);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const BEACON_TIMEOUT: Duration = Duration::from_millis(500);

/// Random placement gives up on a ship after this many candidates.
pub const PLACEMENT_ATTEMPTS: usize = 100;

pub const DEFAULT_SERVER_URL: &str = "https://battleshiproyale.onrender.com/api/v1";

/// Tunables for one client. `Default` gives the standard game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub placement_rows: usize,
    pub placement_cols: usize,
    pub battle_rows: usize,
    pub battle_cols: usize,
    pub fleet: Fleet,
    pub stamina_max: u32,
    pub stamina_cost: u32,
    pub stamina_regen: u32,
    pub stamina_tick: Duration,
    pub poll_period: Duration,
    pub battle_grace: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            placement_rows: PLACEMENT_ROWS,
            placement_cols: PLACEMENT_COLS,
            battle_rows: BATTLE_ROWS,
            battle_cols: BATTLE_COLS,
            fleet: Fleet::standard(),
            stamina_max: STAMINA_MAX,
            stamina_cost: STAMINA_ATTACK_COST,
            stamina_regen: STAMINA_REGEN,
            stamina_tick: STAMINA_TICK,
            poll_period: POLL_PERIOD,
            battle_grace: BATTLE_GRACE,
        }
    }
}

impl ClientConfig {
    /// Same game with every timer scaled down, for simulations.
    pub fn fast() -> Self {
        Self {
            stamina_tick: Duration::from_millis(20),
            poll_period: Duration::from_millis(50),
            battle_grace: Duration::from_millis(100),
            ..Self::default()
        }
    }
}
