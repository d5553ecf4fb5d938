//! Reward budget bookkeeping
//!
//! This module handles:
//! - The fixed reward ceiling set at construction
//! - The cumulative amount of budget committed by the reward engine
//! - The guarded remaining-budget report consumed by the accrual engine
//!
//! The accrual formula itself lives in the external reward engine; this
//! crate only reports `total_shares` and the remaining budget, and records
//! commitments against the ceiling.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Fixed reward ceiling and the cumulative amount committed against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBudget {
    /// Immutable ceiling on rewards, in primary-token base units.
    rewards_max: u128,

    /// Cumulative rewards committed so far.
    rewards_given: u128,
}

impl RewardBudget {
    /// Create a fresh budget with the given ceiling and nothing committed.
    pub fn new(rewards_max: u128) -> Self {
        Self {
            rewards_max,
            rewards_given: 0,
        }
    }

    /// The immutable reward ceiling.
    pub fn rewards_max(&self) -> u128 {
        self.rewards_max
    }

    /// Cumulative rewards committed so far.
    pub fn rewards_given(&self) -> u128 {
        self.rewards_given
    }

    /// Budget still available to the reward engine.
    ///
    /// Never exceeds the ceiling and never underflows: if the committed
    /// amount is ever found above the ceiling the report clamps to zero
    /// and logs the inconsistency.
    pub fn remaining(&self) -> u128 {
        if self.rewards_given > self.rewards_max {
            warn!(
                "Reward bookkeeping inconsistent: given {} exceeds ceiling {}",
                self.rewards_given, self.rewards_max
            );
            return 0;
        }

        self.rewards_max - self.rewards_given
    }

    /// Record `amount` as committed, refusing to cross the ceiling.
    pub fn record_given(&mut self, amount: u128) -> Result<()> {
        let remaining = self.remaining();
        if amount > remaining {
            return Err(Error::RewardBudgetExceeded {
                requested: amount,
                remaining,
            });
        }

        self.rewards_given += amount;
        info!(
            "Committed {} of reward budget ({} remaining)",
            amount,
            self.remaining()
        );

        Ok(())
    }
}
