//! Resource Ledger
//!
//! Scalar economy values. Fields are private so every mutation goes through a
//! clamping path: cash never drops below zero and the percentage values stay
//! within 0-100.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use syndicate_events::LedgerSnapshot;

use crate::config::EconomyConfig;
use crate::error::CommandError;

/// Clamp any signed value into the 0-100 percentage range.
pub fn clamp_percent(value: i64) -> i32 {
    value.clamp(0, 100) as i32
}

/// Signed change to apply to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceDelta {
    pub cash: i64,
    pub reputation: i32,
    pub heat: i32,
    pub intel: i32,
    pub influence: i32,
}

impl ResourceDelta {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn cash(cash: i64) -> Self {
        Self {
            cash,
            ..Self::default()
        }
    }

    pub fn with_cash(mut self, cash: i64) -> Self {
        self.cash = cash;
        self
    }

    pub fn with_reputation(mut self, reputation: i32) -> Self {
        self.reputation = reputation;
        self
    }

    pub fn with_heat(mut self, heat: i32) -> Self {
        self.heat = heat;
        self
    }

    pub fn with_intel(mut self, intel: i32) -> Self {
        self.intel = intel;
        self
    }

    pub fn with_influence(mut self, influence: i32) -> Self {
        self.influence = influence;
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Minimum balances a choice requires, or the price of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cost {
    pub cash: i64,
    pub reputation: i32,
    pub intel: i32,
    pub influence: i32,
}

impl Cost {
    pub fn free() -> Self {
        Self::default()
    }

    pub fn cash(cash: i64) -> Self {
        Self {
            cash,
            ..Self::default()
        }
    }

    pub fn influence(influence: i32) -> Self {
        Self {
            influence,
            ..Self::default()
        }
    }

    pub fn with_cash(mut self, cash: i64) -> Self {
        self.cash = cash;
        self
    }

    pub fn with_reputation(mut self, reputation: i32) -> Self {
        self.reputation = reputation;
        self
    }

    pub fn with_intel(mut self, intel: i32) -> Self {
        self.intel = intel;
        self
    }

    pub fn with_influence(mut self, influence: i32) -> Self {
        self.influence = influence;
        self
    }
}

/// Resource: the organization's books
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    cash: i64,
    reputation: i32,
    heat: i32,
    intel: i32,
    influence: i32,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::from_config(&EconomyConfig::default())
    }
}

impl Ledger {
    pub fn new(cash: i64, reputation: i32, heat: i32, intel: i32, influence: i32) -> Self {
        Self {
            cash: cash.max(0),
            reputation: clamp_percent(reputation as i64),
            heat: clamp_percent(heat as i64),
            intel: clamp_percent(intel as i64),
            influence: clamp_percent(influence as i64),
        }
    }

    pub fn from_config(config: &EconomyConfig) -> Self {
        Self::new(
            config.starting_cash,
            config.starting_reputation,
            config.starting_heat,
            config.starting_intel,
            config.starting_influence,
        )
    }

    pub fn cash(&self) -> i64 {
        self.cash
    }

    pub fn reputation(&self) -> i32 {
        self.reputation
    }

    pub fn heat(&self) -> i32 {
        self.heat
    }

    pub fn intel(&self) -> i32 {
        self.intel
    }

    pub fn influence(&self) -> i32 {
        self.influence
    }

    /// Apply a signed delta, clamping every field.
    pub fn apply(&mut self, delta: &ResourceDelta) {
        self.cash = self.cash.saturating_add(delta.cash).max(0);
        self.reputation = clamp_percent(self.reputation as i64 + delta.reputation as i64);
        self.heat = clamp_percent(self.heat as i64 + delta.heat as i64);
        self.intel = clamp_percent(self.intel as i64 + delta.intel as i64);
        self.influence = clamp_percent(self.influence as i64 + delta.influence as i64);
    }

    pub fn add_cash(&mut self, amount: i64) {
        self.apply(&ResourceDelta::cash(amount));
    }

    pub fn adjust_heat(&mut self, amount: i32) {
        self.apply(&ResourceDelta::none().with_heat(amount));
    }

    pub fn adjust_reputation(&mut self, amount: i32) {
        self.apply(&ResourceDelta::none().with_reputation(amount));
    }

    pub fn adjust_influence(&mut self, amount: i32) {
        self.apply(&ResourceDelta::none().with_influence(amount));
    }

    /// Check balances against minimums without changing anything.
    pub fn check(&self, cost: &Cost) -> Result<(), CommandError> {
        let checks: [(&'static str, i64, i64); 4] = [
            ("cash", cost.cash, self.cash),
            ("reputation", cost.reputation as i64, self.reputation as i64),
            ("intel", cost.intel as i64, self.intel as i64),
            ("influence", cost.influence as i64, self.influence as i64),
        ];
        for (resource, required, available) in checks {
            if required > available {
                return Err(CommandError::InsufficientResources {
                    resource,
                    required,
                    available,
                });
            }
        }
        Ok(())
    }

    pub fn can_afford(&self, cost: &Cost) -> bool {
        self.check(cost).is_ok()
    }

    /// All-or-nothing spend. Reputation is a threshold, not a currency.
    pub fn try_spend(&mut self, cost: &Cost) -> Result<(), CommandError> {
        self.check(cost)?;
        self.apply(&ResourceDelta {
            cash: -cost.cash,
            reputation: 0,
            heat: 0,
            intel: -cost.intel,
            influence: -cost.influence,
        });
        Ok(())
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            cash: self.cash,
            reputation: self.reputation,
            heat: self.heat,
            intel: self.intel,
            influence: self.influence,
        }
    }
}
