//! Conversion arithmetic between the three value domains
//!
//! This module handles:
//! - Stable-asset (USD cents) to primary-token conversion
//! - Primary-token to derivative talent-token conversion and back
//! - Fixed-point scaling with one whole token = [`TOKEN_SCALE`] base units
//!
//! All conversions use truncating integer division: fractional remainders
//! are lost, so repeated small deposits lose value to rounding. Rounding is
//! always downward, never upward, and downstream bookkeeping relies on that
//! direction.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Base units in one whole token (10^18).
pub const TOKEN_SCALE: u128 = 1_000_000_000_000_000_000;

/// Exchange rates fixed at construction.
///
/// `stable_per_token` is the price of one whole primary token in USD cents.
/// `token_per_talent` is the price of one whole talent token in primary-token
/// base units. Both must be strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRates {
    /// USD cents per whole primary token.
    stable_per_token: u128,

    /// Primary-token base units per whole talent token.
    token_per_talent: u128,
}

impl ConversionRates {
    /// Create a validated rate pair.
    pub fn new(stable_per_token: u128, token_per_talent: u128) -> Result<Self> {
        if stable_per_token == 0 || token_per_talent == 0 {
            return Err(Error::InvalidRate);
        }

        Ok(Self {
            stable_per_token,
            token_per_talent,
        })
    }

    /// USD cents per whole primary token.
    pub fn stable_per_token(&self) -> u128 {
        self.stable_per_token
    }

    /// Primary-token base units per whole talent token.
    pub fn token_per_talent(&self) -> u128 {
        self.token_per_talent
    }

    /// Convert a stable-asset amount in USD cents to primary-token base units.
    ///
    /// Truncates toward zero: cents that do not amount to a whole token price
    /// step are lost.
    pub fn stable_to_primary(&self, usd_cents: u128) -> u128 {
        (usd_cents / self.stable_per_token).saturating_mul(TOKEN_SCALE)
    }

    /// Convert primary-token base units to talent-token base units.
    pub fn primary_to_talent(&self, primary: u128) -> u128 {
        (primary / self.token_per_talent).saturating_mul(TOKEN_SCALE)
    }

    /// Convert talent-token base units back to primary-token base units.
    pub fn talent_to_primary(&self, talent: u128) -> u128 {
        talent.saturating_mul(self.token_per_talent) / TOKEN_SCALE
    }

    /// Convert a stable-asset amount in USD cents straight to talent-token
    /// base units.
    pub fn stable_to_talent(&self, usd_cents: u128) -> u128 {
        self.primary_to_talent(self.stable_to_primary(usd_cents))
    }
}
