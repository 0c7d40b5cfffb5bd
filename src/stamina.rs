//! Local attack rate limiter.

use crate::common::StaminaError;
use crate::config::{STAMINA_ATTACK_COST, STAMINA_MAX, STAMINA_REGEN};

/// Stamina in `[0, max]`: each attack costs `cost`, each regeneration tick
/// restores `regen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaminaBudget {
    value: u32,
    max: u32,
    cost: u32,
    regen: u32,
}

impl StaminaBudget {
    /// A full budget.
    pub fn new(max: u32, cost: u32, regen: u32) -> Self {
        Self {
            value: max,
            max,
            cost,
            regen,
        }
    }

    pub fn standard() -> Self {
        Self::new(STAMINA_MAX, STAMINA_ATTACK_COST, STAMINA_REGEN)
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn can_afford(&self) -> bool {
        self.value >= self.cost
    }

    /// Pay for one attack. Leaves the budget untouched when it cannot.
    pub fn try_spend(&mut self) -> Result<u32, StaminaError> {
        if !self.can_afford() {
            return Err(StaminaError::Exhausted {
                available: self.value,
                cost: self.cost,
            });
        }
        self.value -= self.cost;
        Ok(self.value)
    }

    /// One regeneration tick, capped at `max`.
    pub fn regenerate(&mut self) -> u32 {
        self.value = self.value.saturating_add(self.regen).min(self.max);
        self.value
    }

    /// Fill level in percent, for a stamina bar.
    pub fn percent(&self) -> u32 {
        if self.max == 0 {
            return 0;
        }
        let percent = u64::from(self.value) * 100 / u64::from(self.max);
        u32::try_from(percent).unwrap_or(100)
    }
}

impl Default for StaminaBudget {
    fn default() -> Self {
        Self::standard()
    }
}
