//! # Talent Staking
//!
//! Phase-gated staking ledger with derivative talent-token issuance.
//!
//! This crate implements:
//! - Stake creation from stable-asset deposits (phase 1) and primary-token
//!   deposits (phase 2)
//! - Derivative talent-token minting and burning coordination
//! - An inbound transfer entry point that classifies the reporting asset
//!   and routes it to stake or unstake
//! - Phase-1 reconciliation of the stable-asset float into primary tokens
//! - Total-shares and reward-budget reporting for the reward engine
//!
//! Value transport, derivative-token supply control, phase detection,
//! privilege checks and the clock are consumed through capability traits so
//! the ledger can be embedded against any host and driven with fakes in
//! tests.

#![warn(missing_docs, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod config;
pub mod conversion;
pub mod error;
pub mod phase;
pub mod reconcile;
pub mod rewards;
pub mod router;
pub mod staking;
pub mod tokens;
pub mod types;

pub use config::StakingConfig;
pub use conversion::{ConversionRates, TOKEN_SCALE};
pub use error::{Error, Result};
pub use phase::{Clock, PhaseGate, StakingWindow, SystemClock, TokenDesignation};
pub use rewards::RewardBudget;
pub use router::{InboundAsset, TRANSFER_ACK};
pub use staking::{Stake, StakingLedger};
pub use tokens::{AdminPrivileges, AssetTransfer, DerivativeTokens};
pub use types::Address;
