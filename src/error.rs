//! Ledger error taxonomy
//!
//! Every failure is a synchronous, atomic abort: an operation that returns
//! an error has made no ledger-state mutation. There is no retry and no
//! background recovery; callers decide how to proceed.

use crate::types::Address;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All failures the staking ledger can surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The staking window has not opened yet.
    #[error("staking has not yet started")]
    NotYetStarted,

    /// The staking window has already closed.
    #[error("staking has already finished")]
    AlreadyFinished,

    /// The operation is only available while stable-asset deposits are accepted.
    #[error("operation requires the stable-asset phase")]
    StablePhaseRequired,

    /// The operation requires the primary token to have been designated.
    #[error("primary token has not been designated")]
    PrimaryTokenNotDesignated,

    /// The primary token was already designated; the transition is one-way.
    #[error("primary token already designated")]
    AlreadyDesignated,

    /// The zero address was supplied where a real identity is required.
    #[error("the zero address is not a valid identity")]
    ZeroAddress,

    /// A deposit or conversion produced a zero amount.
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// The owner already has an active stake; only one is allowed.
    #[error("stake already exists for {0}")]
    StakeAlreadyExists(Address),

    /// No stake record exists for the owner.
    #[error("no stake exists for {0}")]
    StakeNotFound(Address),

    /// The supplied talent token or amount does not exactly match the stored
    /// stake record.
    #[error("stake record does not match the supplied talent token and amount")]
    StakeMismatch,

    /// The reporting asset is neither the primary token nor a recognized
    /// derivative token.
    #[error("asset {0} is not recognized by this ledger")]
    UnrecognizedAsset(Address),

    /// The address is not a derivative token known to the factory.
    #[error("{0} is not a recognized derivative token")]
    NotDerivativeToken(Address),

    /// The caller does not hold administrative privilege.
    #[error("caller lacks administrative privilege")]
    AdminRequired,

    /// A reconciliation request exceeds the stable amount currently held.
    #[error("requested {requested} exceeds stable holdings {held}")]
    ExceedsStableHeld {
        /// Stable amount requested for withdrawal, in cents.
        requested: u128,
        /// Stable amount currently held, in cents.
        held: u128,
    },

    /// A held balance is too small to fulfil a withdrawal or refund.
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance {
        /// Amount the operation needs.
        needed: u128,
        /// Amount actually available.
        available: u128,
    },

    /// An inbound transfer payload could not be decoded as a talent reference.
    #[error("payload must be exactly {expected} bytes, got {actual}")]
    PayloadLength {
        /// Required payload length in bytes.
        expected: usize,
        /// Length actually received.
        actual: usize,
    },

    /// An exchange rate outside the strictly positive range was supplied.
    #[error("exchange rate must be strictly positive")]
    InvalidRate,

    /// The staking window end precedes its start.
    #[error("staking window end precedes start")]
    InvalidWindow,

    /// Committing the requested reward amount would cross the fixed ceiling.
    #[error("reward budget exceeded: committing {requested} leaves only {remaining}")]
    RewardBudgetExceeded {
        /// Reward amount the engine asked to commit.
        requested: u128,
        /// Budget still available before the request.
        remaining: u128,
    },
}
