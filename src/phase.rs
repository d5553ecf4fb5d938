//! Phase and staking-window gating
//!
//! This module handles:
//! - The staking window (inclusive start/end timestamps)
//! - The two-phase deposit gate: stable-asset phase until the primary token
//!   is designated, token phase permanently thereafter
//! - The clock capability used to read the current time
//!
//! The phase gate and clock are capability traits so the ledger can be
//! driven against fakes in tests instead of ambient global state.

use crate::error::{Error, Result};
use crate::types::Address;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Source of the current unix time in seconds.
pub trait Clock: Send + Sync {
    /// Current unix timestamp in seconds.
    fn unix_now(&self) -> u64;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }
}

/// Staking window bounds, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingWindow {
    /// First timestamp at which staking is accepted.
    pub start: u64,

    /// Last timestamp at which staking is accepted.
    pub end: u64,
}

impl StakingWindow {
    /// Create a window, rejecting an end that precedes the start.
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidWindow);
        }

        Ok(Self { start, end })
    }

    /// Whether the window is open at `now`.
    pub fn is_open(&self, now: u64) -> bool {
        now >= self.start && now <= self.end
    }

    /// Fail with the window-specific error if the window is not open at `now`.
    pub fn ensure_open(&self, now: u64) -> Result<()> {
        if now < self.start {
            return Err(Error::NotYetStarted);
        }

        if now > self.end {
            return Err(Error::AlreadyFinished);
        }

        Ok(())
    }
}

/// Reports which deposit phase is active.
///
/// The stable-asset phase lasts exactly until a primary token is designated;
/// from then on the token phase is active permanently. Implementations must
/// never revert a designation.
pub trait PhaseGate: Send + Sync {
    /// The designated primary token, if the token phase has been reached.
    fn primary_token(&self) -> Option<Address>;

    /// Whether stable-asset deposits are currently permitted.
    fn is_stable_phase_active(&self) -> bool {
        self.primary_token().is_none()
    }

    /// Whether the one-way transition to the token phase has happened.
    fn is_primary_token_designated(&self) -> bool {
        self.primary_token().is_some()
    }
}

/// Production phase gate: a set-once cell holding the primary token address.
///
/// Designation is irreversible. The cell is shared between the ledger (which
/// reads it) and the administrative path that performs the designation.
#[derive(Debug, Default)]
pub struct TokenDesignation {
    token: RwLock<Option<Address>>,
}

impl TokenDesignation {
    /// Create an undesignated gate (stable-asset phase).
    pub fn new() -> Self {
        Self {
            token: RwLock::new(None),
        }
    }

    /// Designate the primary token, switching to the token phase permanently.
    pub fn designate(&self, token: Address) -> Result<()> {
        if token.is_zero() {
            return Err(Error::ZeroAddress);
        }

        let mut slot = self.token.write();
        if slot.is_some() {
            return Err(Error::AlreadyDesignated);
        }

        *slot = Some(token);
        info!("Primary token designated as {}", token);

        Ok(())
    }
}

impl PhaseGate for TokenDesignation {
    fn primary_token(&self) -> Option<Address> {
        *self.token.read()
    }
}
