//! Staking ledger with phase-gated deposits and derivative issuance
//!
//! This module handles:
//! - Stake creation from phase-1 stable deposits and phase-2 token deposits
//! - The inbound transfer entry point and its classification dispatch
//! - Full unstake with exact-match checking and principal return
//! - Aggregate counters and the reporting surface for the reward engine
//!
//! All mutating operations take `&mut self`; the embedding host is expected
//! to serialize calls, and no operation suspends mid-execution. Ledger
//! state is only written after every precondition and collaborator call has
//! succeeded, so a failed operation leaves no partial effect behind.

use crate::config::StakingConfig;
use crate::conversion::ConversionRates;
use crate::error::{Error, Result};
use crate::phase::{Clock, PhaseGate, StakingWindow};
use crate::rewards::RewardBudget;
use crate::router::{self, InboundAsset, TRANSFER_ACK};
use crate::tokens::{AdminPrivileges, AssetTransfer, DerivativeTokens};
use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One staker's active position. At most one exists per owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    /// The staker.
    pub owner: Address,

    /// The derivative-token contract this stake is associated with.
    pub talent_ref: Address,

    /// Staked principal in primary-token base units (post phase-1
    /// conversion).
    pub principal_amount: u128,

    /// Derivative amount minted against this stake.
    pub derivative_amount: u128,

    /// Unix timestamp up to which reward accrual has been settled. The
    /// reward engine must only accrue forward of this point.
    pub last_checkpoint_at: u64,
}

impl Stake {
    fn new(
        owner: Address,
        talent_ref: Address,
        principal_amount: u128,
        derivative_amount: u128,
        now: u64,
    ) -> Self {
        Self {
            owner,
            talent_ref,
            principal_amount,
            derivative_amount,
            last_checkpoint_at: now,
        }
    }
}

/// The staking ledger.
///
/// Owns the per-staker records and the aggregate counters, accepts deposits
/// through the two phase-dependent paths, and drives the external
/// collaborators for value movement, derivative supply control and
/// privilege checks.
pub struct StakingLedger {
    /// Active stakes indexed by owner. Absence of a key is the
    /// "no stake exists" sentinel.
    pub(crate) stakes: HashMap<Address, Stake>,

    /// Stable cents received during phase 1 and not yet reconciled.
    pub(crate) total_stable_held: u128,

    /// Running sum of all active stakes' principal.
    pub(crate) total_principal_staked: u128,

    /// Reward ceiling bookkeeping.
    pub(crate) budget: RewardBudget,

    /// Exchange rates fixed at construction.
    pub(crate) rates: ConversionRates,

    /// Staking window fixed at construction.
    pub(crate) window: StakingWindow,

    /// The ledger's own identity; pulls land here.
    pub(crate) ledger_address: Address,

    /// The stable asset accepted during phase 1.
    pub(crate) stable_asset: Address,

    /// Phase gate collaborator.
    pub(crate) phase: Arc<dyn PhaseGate>,

    /// Value transport collaborator.
    pub(crate) assets: Arc<dyn AssetTransfer>,

    /// Derivative factory and supply control collaborator.
    pub(crate) derivatives: Arc<dyn DerivativeTokens>,

    /// Privilege lookup collaborator.
    pub(crate) admins: Arc<dyn AdminPrivileges>,

    /// Time source.
    pub(crate) clock: Arc<dyn Clock>,
}

impl StakingLedger {
    /// Build a ledger from validated configuration and its collaborators.
    pub fn new(
        config: &StakingConfig,
        phase: Arc<dyn PhaseGate>,
        assets: Arc<dyn AssetTransfer>,
        derivatives: Arc<dyn DerivativeTokens>,
        admins: Arc<dyn AdminPrivileges>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate_addresses()?;
        let window = config.window()?;
        let rates = config.rates()?;

        info!(
            "Staking ledger created: window [{}, {}], rewards ceiling {}",
            window.start, window.end, config.rewards_max
        );

        Ok(Self {
            stakes: HashMap::new(),
            total_stable_held: 0,
            total_principal_staked: 0,
            budget: RewardBudget::new(config.rewards_max),
            rates,
            window,
            ledger_address: config.ledger_address,
            stable_asset: config.stable_asset,
            phase,
            assets,
            derivatives,
            admins,
            clock,
        })
    }

    /// Stake a stable-asset deposit during phase 1.
    ///
    /// Pulls `usd_cents` of the stable asset from `owner`, converts it to
    /// its primary-token equivalent, records the stake and mints the
    /// corresponding derivative amount of `talent_ref` to `owner`. The
    /// conversion truncates: cents that do not cover a whole token price
    /// step are lost to rounding.
    pub fn stake_with_stable_asset(
        &mut self,
        owner: Address,
        talent_ref: Address,
        usd_cents: u128,
    ) -> Result<()> {
        let now = self.clock.unix_now();
        self.window.ensure_open(now)?;

        if !self.phase.is_stable_phase_active() {
            return Err(Error::StablePhaseRequired);
        }

        if usd_cents == 0 {
            return Err(Error::ZeroAmount);
        }

        let principal = self.rates.stable_to_primary(usd_cents);
        let derivative = self.check_new_stake(owner, talent_ref, principal)?;

        self.assets
            .transfer_from(self.stable_asset, owner, self.ledger_address, usd_cents)?;
        self.derivatives.mint(talent_ref, owner, derivative)?;

        self.commit_new_stake(owner, talent_ref, principal, derivative, now);
        self.total_stable_held += usd_cents;

        info!(
            "Stable deposit of {} cents from {} staked as {} principal",
            usd_cents, owner, principal
        );

        Ok(())
    }

    /// Entry point invoked by a compliant asset contract after it has moved
    /// value into the ledger.
    ///
    /// The reporting asset decides the meaning of the transfer: the
    /// designated primary token reports a stake deposit (the payload must
    /// carry the target talent-token address), a recognized derivative
    /// token reports an unstake/refund of itself. Returns [`TRANSFER_ACK`]
    /// on success; any error aborts the enclosing transfer.
    pub fn on_value_received(
        &mut self,
        asset: Address,
        operator: Address,
        sender: Address,
        amount: u128,
        payload: &[u8],
    ) -> Result<[u8; 4]> {
        let now = self.clock.unix_now();
        self.window.ensure_open(now)?;

        match router::classify(asset, self.phase.as_ref(), self.derivatives.as_ref()) {
            InboundAsset::Primary => {
                let talent_ref = router::decode_talent_ref(payload)?;
                debug!(
                    "Inbound stake: {} primary units from {} (operator {})",
                    amount, sender, operator
                );
                self.stake(sender, talent_ref, amount, now)?;
            }
            InboundAsset::Derivative => {
                if !self.phase.is_primary_token_designated() {
                    return Err(Error::PrimaryTokenNotDesignated);
                }
                debug!(
                    "Inbound refund: {} units of {} from {}",
                    amount, asset, sender
                );
                self.unstake(sender, asset, amount)?;
            }
            InboundAsset::Unrecognized => {
                warn!("Rejected transfer of {} from unrecognized asset {}", amount, asset);
                return Err(Error::UnrecognizedAsset(asset));
            }
        }

        Ok(TRANSFER_ACK)
    }

    /// Create a stake from an already-delivered primary-token deposit.
    fn stake(
        &mut self,
        owner: Address,
        talent_ref: Address,
        principal: u128,
        now: u64,
    ) -> Result<()> {
        let derivative = self.check_new_stake(owner, talent_ref, principal)?;

        self.derivatives.mint(talent_ref, owner, derivative)?;
        self.commit_new_stake(owner, talent_ref, principal, derivative, now);

        Ok(())
    }

    /// Validate the preconditions of a new stake and compute the derivative
    /// amount it would be issued. No effects.
    fn check_new_stake(
        &self,
        owner: Address,
        talent_ref: Address,
        principal: u128,
    ) -> Result<u128> {
        if !self.derivatives.is_recognized(talent_ref) {
            return Err(Error::NotDerivativeToken(talent_ref));
        }

        if self.stakes.contains_key(&owner) {
            return Err(Error::StakeAlreadyExists(owner));
        }

        if principal == 0 {
            return Err(Error::ZeroAmount);
        }

        Ok(self.rates.primary_to_talent(principal))
    }

    /// Write the stake record and aggregate after all external calls
    /// succeeded.
    fn commit_new_stake(
        &mut self,
        owner: Address,
        talent_ref: Address,
        principal: u128,
        derivative: u128,
        now: u64,
    ) {
        self.stakes.insert(
            owner,
            Stake::new(owner, talent_ref, principal, derivative, now),
        );

        // Aggregate is maintained as a running sum over active stakes
        self.total_principal_staked += principal;

        info!(
            "Stake created: owner {}, talent {}, principal {}, derivative {}",
            owner, talent_ref, principal, derivative
        );
    }

    /// Unstake a full position.
    ///
    /// The refunded derivative tokens are already in the ledger's custody
    /// when this runs; they are burned from the ledger's own holdings and
    /// the recorded principal is transferred back to `owner`. Only the
    /// exact stored `talent_ref`/`derivative_amount` pair is accepted;
    /// there is no partial redemption. Accrued rewards are not settled
    /// here; settlement awaits the reward-engine integration.
    fn unstake(
        &mut self,
        owner: Address,
        talent_ref: Address,
        derivative_amount: u128,
    ) -> Result<()> {
        if !self.derivatives.is_recognized(talent_ref) {
            return Err(Error::NotDerivativeToken(talent_ref));
        }

        let stake = self
            .stakes
            .get(&owner)
            .ok_or(Error::StakeNotFound(owner))?;

        if stake.talent_ref != talent_ref || stake.derivative_amount != derivative_amount {
            return Err(Error::StakeMismatch);
        }

        let principal = stake.principal_amount;
        let primary = self
            .phase
            .primary_token()
            .ok_or(Error::PrimaryTokenNotDesignated)?;

        let held = self.assets.balance_of(primary, self.ledger_address);
        if held < principal {
            warn!(
                "Cannot fulfil unstake for {}: need {} primary units, hold {}",
                owner, principal, held
            );
            return Err(Error::InsufficientBalance {
                needed: principal,
                available: held,
            });
        }

        self.derivatives
            .burn(talent_ref, self.ledger_address, derivative_amount)?;
        self.assets.transfer(primary, owner, principal)?;

        self.stakes.remove(&owner);
        self.total_principal_staked -= principal;

        info!(
            "Unstaked {}: burned {} of {}, returned {} principal",
            owner, derivative_amount, talent_ref, principal
        );

        Ok(())
    }

    /// Total staked shares reported to the reward engine.
    pub fn total_shares(&self) -> u128 {
        self.total_principal_staked
    }

    /// Reward budget still available to the reward engine.
    pub fn rewards_left(&self) -> u128 {
        self.budget.remaining()
    }

    /// The immutable reward ceiling.
    pub fn rewards_max(&self) -> u128 {
        self.budget.rewards_max()
    }

    /// Commit reward budget on behalf of the reward engine.
    pub fn record_rewards_given(&mut self, amount: u128) -> Result<()> {
        self.budget.record_given(amount)
    }

    /// Stable cents received during phase 1 and not yet reconciled.
    pub fn total_stable_held(&self) -> u128 {
        self.total_stable_held
    }

    /// Look up the active stake of `owner`.
    pub fn get_stake(&self, owner: &Address) -> Option<&Stake> {
        self.stakes.get(owner)
    }

    /// Number of active stakes.
    pub fn stake_count(&self) -> usize {
        self.stakes.len()
    }

    /// Owners with an active stake.
    pub fn staked_owners(&self) -> Vec<Address> {
        self.stakes.keys().copied().collect()
    }

    /// The conversion rates in effect.
    pub fn rates(&self) -> &ConversionRates {
        &self.rates
    }

    /// The staking window in effect.
    pub fn window(&self) -> StakingWindow {
        self.window
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    //! In-memory fakes of the collaborator capabilities, shared by the
    //! unit tests of this module and of the reconciliation module.

    use super::*;
    use crate::conversion::TOKEN_SCALE;
    use crate::phase::TokenDesignation;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};

    pub(crate) const LEDGER: [u8; 20] = [0xee; 20];
    pub(crate) const STABLE: [u8; 20] = [0x51; 20];
    pub(crate) const PRIMARY: [u8; 20] = [0x7a; 20];
    pub(crate) const TALENT: [u8; 20] = [0x7b; 20];
    pub(crate) const TALENT_2: [u8; 20] = [0x7c; 20];
    pub(crate) const ADMIN: [u8; 20] = [0xad; 20];

    pub(crate) fn addr(bytes: [u8; 20]) -> Address {
        Address::new(bytes)
    }

    /// Balance-tracking asset transport.
    pub(crate) struct FakeAssets {
        ledger: Address,
        balances: Mutex<HashMap<(Address, Address), u128>>,
    }

    impl FakeAssets {
        pub(crate) fn new(ledger: Address) -> Self {
            Self {
                ledger,
                balances: Mutex::new(HashMap::new()),
            }
        }

        pub(crate) fn credit(&self, asset: Address, holder: Address, amount: u128) {
            *self.balances.lock().entry((asset, holder)).or_insert(0) += amount;
        }

        fn move_value(
            &self,
            asset: Address,
            from: Address,
            to: Address,
            amount: u128,
        ) -> Result<()> {
            let mut balances = self.balances.lock();
            let from_balance = balances.get(&(asset, from)).copied().unwrap_or(0);
            if from_balance < amount {
                return Err(Error::InsufficientBalance {
                    needed: amount,
                    available: from_balance,
                });
            }

            balances.insert((asset, from), from_balance - amount);
            *balances.entry((asset, to)).or_insert(0) += amount;

            Ok(())
        }
    }

    impl AssetTransfer for FakeAssets {
        fn transfer(&self, asset: Address, to: Address, amount: u128) -> Result<()> {
            self.move_value(asset, self.ledger, to, amount)
        }

        fn transfer_from(
            &self,
            asset: Address,
            from: Address,
            to: Address,
            amount: u128,
        ) -> Result<()> {
            self.move_value(asset, from, to, amount)
        }

        fn balance_of(&self, asset: Address, holder: Address) -> u128 {
            self.balances
                .lock()
                .get(&(asset, holder))
                .copied()
                .unwrap_or(0)
        }
    }

    /// Factory fake tracking derivative holdings per (token, holder).
    pub(crate) struct FakeDerivatives {
        recognized: HashSet<Address>,
        holdings: Mutex<HashMap<(Address, Address), u128>>,
    }

    impl FakeDerivatives {
        pub(crate) fn new(recognized: impl IntoIterator<Item = Address>) -> Self {
            Self {
                recognized: recognized.into_iter().collect(),
                holdings: Mutex::new(HashMap::new()),
            }
        }

        pub(crate) fn holding(&self, token: Address, holder: Address) -> u128 {
            self.holdings
                .lock()
                .get(&(token, holder))
                .copied()
                .unwrap_or(0)
        }

        /// Simulate a holder sending derivative tokens to another holder,
        /// as the refund transfer does before the notification fires.
        pub(crate) fn transfer(
            &self,
            token: Address,
            from: Address,
            to: Address,
            amount: u128,
        ) -> Result<()> {
            let mut holdings = self.holdings.lock();
            let from_holding = holdings.get(&(token, from)).copied().unwrap_or(0);
            if from_holding < amount {
                return Err(Error::InsufficientBalance {
                    needed: amount,
                    available: from_holding,
                });
            }

            holdings.insert((token, from), from_holding - amount);
            *holdings.entry((token, to)).or_insert(0) += amount;

            Ok(())
        }
    }

    impl DerivativeTokens for FakeDerivatives {
        fn is_recognized(&self, token: Address) -> bool {
            self.recognized.contains(&token)
        }

        fn mint(&self, token: Address, to: Address, amount: u128) -> Result<()> {
            *self.holdings.lock().entry((token, to)).or_insert(0) += amount;
            Ok(())
        }

        fn burn(&self, token: Address, from: Address, amount: u128) -> Result<()> {
            let mut holdings = self.holdings.lock();
            let holding = holdings.get(&(token, from)).copied().unwrap_or(0);
            if holding < amount {
                return Err(Error::InsufficientBalance {
                    needed: amount,
                    available: holding,
                });
            }

            holdings.insert((token, from), holding - amount);
            Ok(())
        }
    }

    /// Fixed admin set.
    pub(crate) struct FakeAdmins {
        admins: HashSet<Address>,
    }

    impl FakeAdmins {
        pub(crate) fn new(admins: impl IntoIterator<Item = Address>) -> Self {
            Self {
                admins: admins.into_iter().collect(),
            }
        }
    }

    impl AdminPrivileges for FakeAdmins {
        fn is_admin(&self, who: Address) -> bool {
            self.admins.contains(&who)
        }
    }

    /// Settable clock.
    pub(crate) struct ManualClock {
        now: AtomicU64,
    }

    impl ManualClock {
        pub(crate) fn at(now: u64) -> Self {
            Self {
                now: AtomicU64::new(now),
            }
        }

        pub(crate) fn set(&self, now: u64) {
            self.now.store(now, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn unix_now(&self) -> u64 {
            self.now.load(Ordering::SeqCst)
        }
    }

    /// Fully wired ledger plus handles to the fakes driving it.
    pub(crate) struct Harness {
        pub(crate) ledger: StakingLedger,
        pub(crate) gate: Arc<TokenDesignation>,
        pub(crate) assets: Arc<FakeAssets>,
        pub(crate) derivatives: Arc<FakeDerivatives>,
        pub(crate) clock: Arc<ManualClock>,
    }

    pub(crate) fn harness() -> Harness {
        let config = StakingConfig {
            ledger_address: addr(LEDGER),
            stable_asset: addr(STABLE),
            window_start: 100,
            window_end: 1_000,
            stable_per_token: 50,
            token_per_talent: 50 * TOKEN_SCALE,
            rewards_max: 600 * TOKEN_SCALE,
        };

        let gate = Arc::new(TokenDesignation::new());
        let assets = Arc::new(FakeAssets::new(addr(LEDGER)));
        let derivatives = Arc::new(FakeDerivatives::new([addr(TALENT), addr(TALENT_2)]));
        let admins = Arc::new(FakeAdmins::new([addr(ADMIN)]));
        let clock = Arc::new(ManualClock::at(500));

        let ledger = StakingLedger::new(
            &config,
            gate.clone(),
            assets.clone(),
            derivatives.clone(),
            admins.clone(),
            clock.clone(),
        )
        .unwrap();

        Harness {
            ledger,
            gate,
            assets,
            derivatives,
            clock,
        }
    }
}
