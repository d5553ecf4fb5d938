//! Capability contracts implemented by external collaborators
//!
//! The ledger never moves value or mints tokens itself; it drives these
//! capabilities and assumes each call either fully succeeds or fails with
//! no effect. Implementations are host bindings in production and in-memory
//! fakes in tests.

use crate::error::Result;
use crate::types::Address;

/// Moves asset value between holders.
///
/// `transfer` spends from the ledger's own holdings; `transfer_from` pulls
/// from a third party that has approved the ledger. Both fail the whole
/// operation on insufficient balance or allowance.
pub trait AssetTransfer: Send + Sync {
    /// Transfer `amount` of `asset` out of the ledger's holdings to `to`.
    fn transfer(&self, asset: Address, to: Address, amount: u128) -> Result<()>;

    /// Pull `amount` of `asset` from `from` into `to`.
    fn transfer_from(&self, asset: Address, from: Address, to: Address, amount: u128)
        -> Result<()>;

    /// Current balance of `holder` in `asset`.
    fn balance_of(&self, asset: Address, holder: Address) -> u128;
}

/// Derivative-token factory lookup and supply control.
pub trait DerivativeTokens: Send + Sync {
    /// Whether `token` is a derivative token issued by the factory.
    fn is_recognized(&self, token: Address) -> bool;

    /// Mint `amount` of `token` to `to`.
    fn mint(&self, token: Address, to: Address, amount: u128) -> Result<()>;

    /// Burn `amount` of `token` held by `from`.
    fn burn(&self, token: Address, from: Address, amount: u128) -> Result<()>;
}

/// Administrative privilege lookup.
pub trait AdminPrivileges: Send + Sync {
    /// Whether `who` holds administrative privilege over the ledger.
    fn is_admin(&self, who: Address) -> bool;
}
