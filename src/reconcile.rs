//! Phase-1 reconciliation
//!
//! During phase 1 the ledger accumulates stable-asset deposits while stakes
//! are recorded in primary-token terms. Once the primary token is
//! designated, an administrator exchanges the stable float for the
//! equivalent primary-token amount so that unstakes can be fulfilled. The
//! exchange never touches individual stake records.

use crate::error::{Error, Result};
use crate::staking::StakingLedger;
use crate::types::Address;
use tracing::info;

impl StakingLedger {
    /// Exchange up to `usd_cents` of held stable asset for its primary-token
    /// equivalent supplied by the administrator.
    ///
    /// Pulls the converted primary amount from `caller` into the ledger's
    /// holdings, pays `usd_cents` of the stable asset out to `caller`, and
    /// reduces the unreconciled stable float accordingly. Requires
    /// administrative privilege and the token phase.
    pub fn reconcile_phase1(&mut self, caller: Address, usd_cents: u128) -> Result<()> {
        if !self.admins.is_admin(caller) {
            return Err(Error::AdminRequired);
        }

        if !self.phase.is_primary_token_designated() {
            return Err(Error::PrimaryTokenNotDesignated);
        }

        if usd_cents > self.total_stable_held {
            return Err(Error::ExceedsStableHeld {
                requested: usd_cents,
                held: self.total_stable_held,
            });
        }

        let primary = self
            .phase
            .primary_token()
            .ok_or(Error::PrimaryTokenNotDesignated)?;
        let token_equivalent = self.rates.stable_to_primary(usd_cents);

        self.assets
            .transfer_from(primary, caller, self.ledger_address, token_equivalent)?;
        self.assets.transfer(self.stable_asset, caller, usd_cents)?;

        self.total_stable_held -= usd_cents;

        info!(
            "Reconciled {} stable cents for {} primary units ({} cents still held)",
            usd_cents, token_equivalent, self.total_stable_held
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::conversion::TOKEN_SCALE;
    use crate::error::Error;
    use crate::staking::testkit::*;
    use crate::tokens::AssetTransfer;
    use crate::types::Address;

    fn alice() -> Address {
        addr([1; 20])
    }

    fn funded_harness() -> Harness {
        let mut h = harness();
        h.assets.credit(addr(STABLE), alice(), 5_000);
        h.ledger
            .stake_with_stable_asset(alice(), addr(TALENT), 5_000)
            .unwrap();
        h
    }

    #[test]
    fn test_reconciliation_requires_admin() {
        let mut h = funded_harness();
        h.gate.designate(addr(PRIMARY)).unwrap();

        let err = h.ledger.reconcile_phase1(alice(), 5_000).unwrap_err();
        assert_eq!(err, Error::AdminRequired);
    }

    #[test]
    fn test_reconciliation_requires_token_phase() {
        let mut h = funded_harness();

        let err = h.ledger.reconcile_phase1(addr(ADMIN), 5_000).unwrap_err();
        assert_eq!(err, Error::PrimaryTokenNotDesignated);
        assert_eq!(h.ledger.total_stable_held(), 5_000);
    }

    #[test]
    fn test_reconciliation_cannot_exceed_held_float() {
        let mut h = funded_harness();
        h.gate.designate(addr(PRIMARY)).unwrap();
        h.assets
            .credit(addr(PRIMARY), addr(ADMIN), 1_000 * TOKEN_SCALE);

        let err = h.ledger.reconcile_phase1(addr(ADMIN), 5_001).unwrap_err();
        assert_eq!(
            err,
            Error::ExceedsStableHeld {
                requested: 5_001,
                held: 5_000,
            }
        );

        // The failed request left the float untouched
        assert_eq!(h.ledger.total_stable_held(), 5_000);
    }

    #[test]
    fn test_reconciliation_swaps_float_without_touching_stakes() {
        let mut h = funded_harness();
        h.gate.designate(addr(PRIMARY)).unwrap();
        h.assets
            .credit(addr(PRIMARY), addr(ADMIN), 1_000 * TOKEN_SCALE);

        h.ledger.reconcile_phase1(addr(ADMIN), 5_000).unwrap();

        // Stable float paid out to the administrator
        assert_eq!(h.ledger.total_stable_held(), 0);
        assert_eq!(h.assets.balance_of(addr(STABLE), addr(ADMIN)), 5_000);
        assert_eq!(h.assets.balance_of(addr(STABLE), addr(LEDGER)), 0);

        // Equivalent primary amount now held by the ledger
        assert_eq!(
            h.assets.balance_of(addr(PRIMARY), addr(LEDGER)),
            100 * TOKEN_SCALE
        );
        assert_eq!(
            h.assets.balance_of(addr(PRIMARY), addr(ADMIN)),
            900 * TOKEN_SCALE
        );

        // Stake records and aggregates are untouched
        let stake = h.ledger.get_stake(&alice()).unwrap();
        assert_eq!(stake.principal_amount, 100 * TOKEN_SCALE);
        assert_eq!(h.ledger.total_shares(), 100 * TOKEN_SCALE);
    }

    #[test]
    fn test_partial_reconciliation() {
        let mut h = funded_harness();
        h.gate.designate(addr(PRIMARY)).unwrap();
        h.assets
            .credit(addr(PRIMARY), addr(ADMIN), 1_000 * TOKEN_SCALE);

        h.ledger.reconcile_phase1(addr(ADMIN), 2_500).unwrap();
        assert_eq!(h.ledger.total_stable_held(), 2_500);
        assert_eq!(
            h.assets.balance_of(addr(PRIMARY), addr(LEDGER)),
            50 * TOKEN_SCALE
        );

        h.ledger.reconcile_phase1(addr(ADMIN), 2_500).unwrap();
        assert_eq!(h.ledger.total_stable_held(), 0);
        assert_eq!(
            h.assets.balance_of(addr(PRIMARY), addr(LEDGER)),
            100 * TOKEN_SCALE
        );
    }
}
