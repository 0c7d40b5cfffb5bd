//! Scripted player that drives a [`SessionController`] through a whole match.

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::battle::{BattleBoard, BattleCell};
use crate::common::{AttackError, HitOutcome, Phase};
use crate::session::SessionController;

/// What one autopilot did during a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub player: String,
    pub attacks: usize,
    pub hits: usize,
    pub misses: usize,
    pub unconfirmed: usize,
    pub sunk: Vec<String>,
}

pub struct Autopilot {
    rng: SmallRng,
}

impl Autopilot {
    pub fn new(rng: SmallRng) -> Self {
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    /// Join as `name`, place the fleet at random, ready up and attack until
    /// `max_attacks` shots were fired or every enemy ship is sunk.
    pub async fn run(
        &mut self,
        controller: &mut SessionController,
        name: &str,
        max_attacks: usize,
    ) -> anyhow::Result<MatchSummary> {
        controller.join(name).await?;
        wait_for_phase(controller, Phase::Placement).await?;

        let engine = controller
            .placement_mut()
            .ok_or_else(|| anyhow::anyhow!("placement engine unavailable"))?;
        engine.place_randomly(&mut self.rng)?;
        controller.submit_ready().await?;
        wait_for_phase(controller, Phase::Battle).await?;

        let mut summary = MatchSummary {
            player: name.to_string(),
            ..MatchSummary::default()
        };
        let fleet_size = controller.config().fleet.len();
        while summary.attacks < max_attacks && controller.sunk_ships().len() < fleet_size {
            if !controller.stamina().can_afford() {
                wait_for_stamina(controller).await?;
                continue;
            }
            let target = match controller.board() {
                Some(board) => self.select_target(board),
                None => None,
            };
            let Some((row, col)) = target else {
                info!("[Autopilot] {} has no cells left to fire at", name);
                break;
            };
            match controller.attack(row, col).await {
                Ok(HitOutcome::Hit) | Ok(HitOutcome::Sunk) => summary.hits += 1,
                Ok(HitOutcome::Miss) => summary.misses += 1,
                Ok(HitOutcome::AlreadyResolved) => continue,
                Err(AttackError::Stamina(_)) => {
                    wait_for_stamina(controller).await?;
                    continue;
                }
                Err(AttackError::Network(e)) => {
                    warn!("[Autopilot] {} shot at ({}, {}) unconfirmed: {}", name, row, col, e);
                    summary.unconfirmed += 1;
                }
                Err(e) => return Err(e.into()),
            }
            summary.attacks += 1;
        }

        summary.sunk = controller.sunk_ships().to_vec();
        info!(
            "[Autopilot] {} done: {} attacks, {} hits, {} sunk",
            name,
            summary.attacks,
            summary.hits,
            summary.sunk.len()
        );
        Ok(summary)
    }

    /// Untried water next to a known hit if there is any, otherwise any
    /// untried water.
    pub fn select_target(&mut self, board: &BattleBoard) -> Option<(usize, usize)> {
        let grid = board.grid();
        let mut follow_ups: Vec<(usize, usize)> = grid
            .iter()
            .filter(|(_, cell)| **cell == BattleCell::HitShip)
            .flat_map(|((row, col), _)| grid.neighbors(row, col))
            .filter(|&(row, col)| board.get(row, col) == Some(BattleCell::Water))
            .collect();
        follow_ups.sort_unstable();
        follow_ups.dedup();
        if let Some(&target) = follow_ups.choose(&mut self.rng) {
            return Some(target);
        }

        let open: Vec<(usize, usize)> = grid
            .iter()
            .filter(|(_, cell)| **cell == BattleCell::Water)
            .map(|(pos, _)| pos)
            .collect();
        open.choose(&mut self.rng).copied()
    }
}

async fn wait_for_phase(controller: &mut SessionController, phase: Phase) -> anyhow::Result<()> {
    while controller.phase() != phase {
        match controller.next_event().await {
            Some(event) => debug!("[Autopilot] {:?}", event),
            None => anyhow::bail!("session stalled in {} waiting for {}", controller.phase(), phase),
        }
    }
    Ok(())
}

async fn wait_for_stamina(controller: &mut SessionController) -> anyhow::Result<()> {
    while !controller.stamina().can_afford() {
        if controller.next_event().await.is_none() {
            anyhow::bail!("stamina timer stopped");
        }
    }
    Ok(())
}
