//! Ledger construction parameters
//!
//! Everything immutable-after-construction lives here: the staking window,
//! the two exchange rates, the reward ceiling, and the identities the
//! ledger needs to move value. The struct is serde-derived so deployments
//! can load it from configuration files; validation happens when the
//! ledger is built from it.

use crate::conversion::ConversionRates;
use crate::error::{Error, Result};
use crate::phase::StakingWindow;
use crate::types::Address;
use serde::{Deserialize, Serialize};

/// Immutable parameters the staking ledger is constructed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    /// Identity of the ledger itself; inbound pulls land here and held
    /// balances are read against it.
    pub ledger_address: Address,

    /// Identity of the stable asset accepted during phase 1.
    pub stable_asset: Address,

    /// First timestamp at which staking is accepted.
    pub window_start: u64,

    /// Last timestamp at which staking is accepted.
    pub window_end: u64,

    /// USD cents per whole primary token.
    pub stable_per_token: u128,

    /// Primary-token base units per whole talent token.
    pub token_per_talent: u128,

    /// Fixed ceiling on the reward budget, in primary-token base units.
    pub rewards_max: u128,
}

impl StakingConfig {
    /// Validate and build the staking window.
    pub fn window(&self) -> Result<StakingWindow> {
        StakingWindow::new(self.window_start, self.window_end)
    }

    /// Validate and build the conversion rates.
    pub fn rates(&self) -> Result<ConversionRates> {
        ConversionRates::new(self.stable_per_token, self.token_per_talent)
    }

    /// Check the configured identities.
    pub fn validate_addresses(&self) -> Result<()> {
        if self.ledger_address.is_zero() || self.stable_asset.is_zero() {
            return Err(Error::ZeroAddress);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::TOKEN_SCALE;

    fn config() -> StakingConfig {
        StakingConfig {
            ledger_address: Address::new([0xaa; 20]),
            stable_asset: Address::new([0xbb; 20]),
            window_start: 100,
            window_end: 1_000,
            stable_per_token: 50,
            token_per_talent: 50 * TOKEN_SCALE,
            rewards_max: 1_000_000 * TOKEN_SCALE,
        }
    }

    #[test]
    fn test_valid_config_builds() {
        let cfg = config();
        assert!(cfg.validate_addresses().is_ok());
        assert!(cfg.window().is_ok());
        assert!(cfg.rates().is_ok());
    }

    #[test]
    fn test_invalid_fields_are_rejected() {
        let mut cfg = config();
        cfg.ledger_address = Address::ZERO;
        assert_eq!(cfg.validate_addresses(), Err(Error::ZeroAddress));

        let mut cfg = config();
        cfg.window_end = cfg.window_start - 1;
        assert_eq!(cfg.window(), Err(Error::InvalidWindow));

        let mut cfg = config();
        cfg.stable_per_token = 0;
        assert_eq!(cfg.rates(), Err(Error::InvalidRate));
    }
}
