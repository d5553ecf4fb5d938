//! Inbound transfer classification
//!
//! This module handles:
//! - Resolving which asset reported an inbound transfer (primary token,
//!   derivative token, or neither) into an explicit variant
//! - Decoding the talent reference carried in a stake payload
//! - The acknowledgement value returned to the transfer protocol
//!
//! Classification is resolved exactly once per notification; the ledger
//! dispatches on the resulting variant instead of re-querying the
//! collaborators.

use crate::error::{Error, Result};
use crate::phase::PhaseGate;
use crate::tokens::DerivativeTokens;
use crate::types::Address;

/// Acknowledgement returned to the calling transfer protocol when an
/// inbound transfer was accepted. A compliant asset contract aborts the
/// whole transfer when it receives anything else.
pub const TRANSFER_ACK: [u8; 4] = [0x88, 0xa7, 0xca, 0x5c];

/// The role of the asset that reported an inbound transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundAsset {
    /// The designated primary token: the transfer is a stake deposit.
    Primary,

    /// A recognized derivative token: the transfer is an unstake/refund.
    Derivative,

    /// Anything else; the transfer must be rejected.
    Unrecognized,
}

/// Resolve the reporting asset into its [`InboundAsset`] role.
pub fn classify(
    asset: Address,
    phase: &dyn PhaseGate,
    derivatives: &dyn DerivativeTokens,
) -> InboundAsset {
    if phase.primary_token() == Some(asset) {
        return InboundAsset::Primary;
    }

    if derivatives.is_recognized(asset) {
        return InboundAsset::Derivative;
    }

    InboundAsset::Unrecognized
}

/// Decode a talent-token reference from a stake payload.
///
/// The payload must be exactly one address long; anything shorter or longer
/// is a malformed notification.
pub fn decode_talent_ref(payload: &[u8]) -> Result<Address> {
    if payload.len() != Address::LEN {
        return Err(Error::PayloadLength {
            expected: Address::LEN,
            actual: payload.len(),
        });
    }

    let mut bytes = [0u8; Address::LEN];
    bytes.copy_from_slice(payload);

    Ok(Address::new(bytes))
}
