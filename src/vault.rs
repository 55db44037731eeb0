//! Synthetic dollar vault: fixed-term CSPR-collateralized sUSD positions.
//!
//! - Users lock CSPR and mint sUSD up to 66% LTV for a fixed term
//! - A position is repaid in full by its owner, rolled forward for a
//!   pro-rated fee (5% APR), or liquidated once its health factor drops
//!   below 1.0 or it passes maturity
//! - Liquidators burn the whole debt and receive its value in CSPR plus a
//!   10% bonus; whatever is left goes back to the owner
//!
//! ## Units
//! - CSPR: motes (U512), 1 CSPR = 1e9 motes
//! - sUSD, prices, health factor: wad (U256), 18 decimals
//! - Time: seconds (block time is read in milliseconds)

use alloc::vec::Vec;
use odra::casper_types::{U256, U512};
use odra::prelude::*;
use odra::ContractRef;

use crate::errors::VaultError;
use crate::ledger::{Position, PositionLedger};
use crate::math::{self, MAX_DURATION_SECS, MIN_DURATION_SECS, WAD};
use crate::oracle::PriceNormalizer;
use crate::tokens::TokenLedgerContractRef;

// ==========================================
// Events
// ==========================================

pub mod events {
    use odra::casper_types::{U256, U512};
    use odra::prelude::*;

    #[odra::event]
    pub struct PositionOpened {
        pub id: u64,
        pub owner: Address,
        pub collateral_motes: U512,
        pub debt_wad: U256,
        pub maturity: u64,
        pub health_factor: U256,
    }

    #[odra::event]
    pub struct CollateralAdded {
        pub id: u64,
        pub owner: Address,
        pub by: Address,
        pub amount_motes: U512,
        pub new_collateral_motes: U512,
    }

    #[odra::event]
    pub struct PositionRepaid {
        pub id: u64,
        pub owner: Address,
        /// Debt as it stood before the position was closed
        pub debt_repaid_wad: U256,
        pub collateral_returned_motes: U512,
    }

    #[odra::event]
    pub struct PositionRolledOver {
        pub id: u64,
        pub owner: Address,
        pub added_duration_secs: u64,
        pub fee_motes: U512,
        pub refund_motes: U512,
        pub new_maturity: u64,
    }

    #[odra::event]
    pub struct PositionLiquidated {
        pub id: u64,
        pub owner: Address,
        pub liquidator: Address,
        pub debt_covered_wad: U256,
        pub reward_motes: U512,
        pub remainder_motes: U512,
        pub health_factor: U256,
        pub expired: bool,
    }

    #[odra::event]
    pub struct Paused {
        pub by: Address,
    }

    #[odra::event]
    pub struct Unpaused {
        pub by: Address,
    }
}

// ==========================================
// Contract
// ==========================================

#[odra::module(
    events = [
        events::PositionOpened,
        events::CollateralAdded,
        events::PositionRepaid,
        events::PositionRolledOver,
        events::PositionLiquidated,
        events::Paused,
        events::Unpaused
    ],
    errors = VaultError
)]
pub struct SyntheticVault {
    susd: Var<Address>,
    oracle: SubModule<PriceNormalizer>,
    ledger: SubModule<PositionLedger>,

    total_debt: Var<U256>,
    total_collateral: Var<U512>,

    // Set for the whole body of every mutating entry point
    locked: Var<bool>,

    // Admin; also receives rollover fees
    owner: Var<Address>,
    paused: Var<bool>,
}

#[odra::module]
impl SyntheticVault {
    /// `susd` must name this vault as minter before the first `open`.
    pub fn init(&mut self, susd: Address, price_feed: Address) {
        self.susd.set(susd);
        self.oracle.init(price_feed);
        self.total_debt.set(U256::zero());
        self.total_collateral.set(U512::zero());
        self.locked.set(false);
        self.owner.set(self.env().caller());
        self.paused.set(false);
    }

    // ==========================================
    // Position Lifecycle
    // ==========================================

    /// Lock the attached CSPR and mint `mint_amount_wad` sUSD to the caller
    /// for `duration_secs`. Returns the new position id.
    #[odra(payable)]
    pub fn open(&mut self, mint_amount_wad: U256, duration_secs: u64) -> u64 {
        self.enter();
        self.require_not_paused();
        let caller = self.env().caller();
        let collateral_in = self.env().attached_value();

        if collateral_in.is_zero()
            || mint_amount_wad.is_zero()
            || duration_secs < MIN_DURATION_SECS
            || duration_secs > MAX_DURATION_SECS
        {
            self.env().revert(VaultError::InvalidInput);
        }

        let price = self.oracle.price();
        let value = math::collateral_value(collateral_in, price);
        if !math::within_max_ltv(mint_amount_wad, value) {
            self.env().revert(VaultError::InsufficientCollateral);
        }

        let now = self.now_secs();
        let maturity = now + duration_secs;
        let id = self.ledger.create(caller, collateral_in, mint_amount_wad, now, maturity);

        let total_debt = self.total_debt.get_or_default();
        self.total_debt.set(total_debt + mint_amount_wad);
        let total_collateral = self.total_collateral.get_or_default();
        self.total_collateral.set(total_collateral + collateral_in);

        // Position is persisted; a failing mint reverts it with everything else
        self.susd_ledger().mint(caller, mint_amount_wad);

        self.env().emit_event(events::PositionOpened {
            id,
            owner: caller,
            collateral_motes: collateral_in,
            debt_wad: mint_amount_wad,
            maturity,
            health_factor: math::health_factor(value, mint_amount_wad),
        });

        self.exit();
        id
    }

    /// Repay the full debt of `id` and take back its collateral.
    /// Requires an sUSD allowance of at least the debt for this vault.
    pub fn repay(&mut self, id: u64) {
        self.enter();
        let caller = self.env().caller();
        let position = self.open_position(id);
        if position.owner != caller {
            self.env().revert(VaultError::NotOwner);
        }

        self.pull_and_burn(caller, position.debt_wad);

        let closed = self.ledger.close(id);
        self.release_totals(&closed);

        // State is final before any CSPR leaves the vault
        self.env().transfer_tokens(&caller, &closed.collateral_motes);

        self.env().emit_event(events::PositionRepaid {
            id,
            owner: caller,
            debt_repaid_wad: closed.debt_wad,
            collateral_returned_motes: closed.collateral_motes,
        });
        self.exit();
    }

    /// Top up the collateral of an open position with the attached CSPR.
    /// Anyone may add collateral to any position.
    #[odra(payable)]
    pub fn add_collateral(&mut self, id: u64) {
        self.enter();
        self.require_not_paused();
        let amount = self.env().attached_value();
        let position = self.open_position(id);
        if amount.is_zero() {
            self.env().revert(VaultError::InvalidInput);
        }

        let new_collateral = self.ledger.add_collateral(id, amount);
        let total_collateral = self.total_collateral.get_or_default();
        self.total_collateral.set(total_collateral + amount);

        self.env().emit_event(events::CollateralAdded {
            id,
            owner: position.owner,
            by: self.env().caller(),
            amount_motes: amount,
            new_collateral_motes: new_collateral,
        });
        self.exit();
    }

    /// Push the maturity of `id` out by `added_duration_secs`, paying the
    /// pro-rated fee with the attached CSPR. Overpayment is refunded.
    #[odra(payable)]
    pub fn roll_over(&mut self, id: u64, added_duration_secs: u64) {
        self.enter();
        self.require_not_paused();
        let caller = self.env().caller();
        let fee_paid = self.env().attached_value();
        let position = self.open_position(id);
        if position.owner != caller {
            self.env().revert(VaultError::NotOwner);
        }

        let now = self.now_secs();
        if now > position.maturity {
            self.env().revert(VaultError::PositionExpired);
        }
        if added_duration_secs < MIN_DURATION_SECS {
            self.env().revert(VaultError::InvalidInput);
        }
        let exceeds_max = position
            .maturity
            .checked_add(added_duration_secs)
            .map_or(true, |maturity| maturity > now + MAX_DURATION_SECS);
        if exceeds_max {
            self.env().revert(VaultError::DurationExceedsMax);
        }

        let price = self.oracle.price();
        let fee_wad = math::rollover_fee(position.debt_wad, price, added_duration_secs);
        let paid_wad = math::motes_to_wad(fee_paid);
        if paid_wad < fee_wad {
            self.env().revert(VaultError::InsufficientFee);
        }
        // Sub-mote dust of the overpayment stays with the fee
        let refund = math::wad_to_motes(paid_wad - fee_wad);
        let fee_motes = fee_paid - refund;

        let new_maturity = self.ledger.extend_maturity(id, added_duration_secs);

        if !refund.is_zero() {
            self.env().transfer_tokens(&caller, &refund);
        }
        if !fee_motes.is_zero() {
            let treasury = self.owner.get_or_revert_with(VaultError::Unauthorized);
            self.env().transfer_tokens(&treasury, &fee_motes);
        }

        self.env().emit_event(events::PositionRolledOver {
            id,
            owner: caller,
            added_duration_secs,
            fee_motes,
            refund_motes: refund,
            new_maturity,
        });
        self.exit();
    }

    /// Close an unhealthy or expired position by burning its whole debt from
    /// the caller's sUSD. The caller receives the debt's worth of CSPR plus
    /// the liquidation bonus, capped at the position's collateral.
    pub fn liquidate(&mut self, id: u64) {
        self.enter();
        let liquidator = self.env().caller();
        let position = self.open_position(id);

        let price = self.oracle.price();
        let value = math::collateral_value(position.collateral_motes, price);
        let health_factor = math::health_factor(value, position.debt_wad);
        let expired = self.now_secs() > position.maturity;
        if health_factor >= U256::from(WAD) && !expired {
            self.env().revert(VaultError::PositionHealthy);
        }

        let split = math::liquidation_split(position.debt_wad, price, position.collateral_motes);

        self.pull_and_burn(liquidator, position.debt_wad);

        let closed = self.ledger.close(id);
        self.release_totals(&closed);

        if !split.reward_motes.is_zero() {
            self.env().transfer_tokens(&liquidator, &split.reward_motes);
        }
        if !split.remainder_motes.is_zero() {
            self.env().transfer_tokens(&closed.owner, &split.remainder_motes);
        }

        self.env().emit_event(events::PositionLiquidated {
            id,
            owner: closed.owner,
            liquidator,
            debt_covered_wad: closed.debt_wad,
            reward_motes: split.reward_motes,
            remainder_motes: split.remainder_motes,
            health_factor,
            expired,
        });
        self.exit();
    }

    // ==========================================
    // View Functions
    // ==========================================

    /// Position by id; unknown ids yield a closed, zero-valued position
    pub fn get_position(&self, id: u64) -> Position {
        self.ledger.get(id)
    }

    /// Every position id `owner` ever opened, including closed ones
    pub fn get_user_positions(&self, owner: Address) -> Vec<u64> {
        self.ledger.ids_for_owner(owner)
    }

    /// Health factor in wad; `U256::MAX` for closed or debt-free positions
    pub fn health_factor(&self, id: u64) -> U256 {
        let position = self.ledger.get(id);
        if !position.is_open() || position.debt_wad.is_zero() {
            return U256::MAX;
        }
        let value = self.collateral_value(position.collateral_motes);
        math::health_factor(value, position.debt_wad)
    }

    /// USD value (wad) of `amount_motes` CSPR at the current price
    pub fn collateral_value(&self, amount_motes: U512) -> U256 {
        math::collateral_value(amount_motes, self.oracle.price())
    }

    pub fn is_liquidatable(&self, id: u64) -> bool {
        let position = self.ledger.get(id);
        if !position.is_open() {
            return false;
        }
        self.now_secs() > position.maturity || self.health_factor(id) < U256::from(WAD)
    }

    /// Rollover fee in CSPR wad for extending `id` by `added_duration_secs`
    /// at the current price. Attach at least this much (rounded up to motes).
    pub fn quote_rollover_fee(&self, id: u64, added_duration_secs: u64) -> U256 {
        let position = self.ledger.get(id);
        if !position.is_open() {
            return U256::zero();
        }
        math::rollover_fee(position.debt_wad, self.oracle.price(), added_duration_secs)
    }

    /// Base asset price in USD wad
    pub fn price(&self) -> U256 {
        self.oracle.price()
    }

    /// Decimals of the raw price source
    pub fn price_feed_decimals(&self) -> u8 {
        self.oracle.source_decimals()
    }

    pub fn price_feed(&self) -> Option<Address> {
        self.oracle.feed()
    }

    /// Outstanding sUSD minted by this vault
    pub fn total_debt(&self) -> U256 {
        self.total_debt.get_or_default()
    }

    /// CSPR held against open positions
    pub fn total_collateral(&self) -> U512 {
        self.total_collateral.get_or_default()
    }

    pub fn position_count(&self) -> u64 {
        self.ledger.count()
    }

    pub fn susd(&self) -> Option<Address> {
        self.susd.get()
    }

    pub fn owner(&self) -> Option<Address> {
        self.owner.get()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    // ==========================================
    // Admin Functions
    // ==========================================

    /// Stop new risk (open, add_collateral, roll_over). Repay and liquidate
    /// stay available.
    pub fn pause(&mut self) {
        self.enter();
        self.require_owner();
        if self.paused.get_or_default() {
            self.env().revert(VaultError::ContractPaused);
        }
        self.paused.set(true);
        self.env().emit_event(events::Paused {
            by: self.env().caller(),
        });
        self.exit();
    }

    pub fn unpause(&mut self) {
        self.enter();
        self.require_owner();
        if !self.paused.get_or_default() {
            self.env().revert(VaultError::NotPaused);
        }
        self.paused.set(false);
        self.env().emit_event(events::Unpaused {
            by: self.env().caller(),
        });
        self.exit();
    }

    // ==========================================
    // Internal Functions
    // ==========================================

    fn enter(&mut self) {
        if self.locked.get_or_default() {
            self.env().revert(VaultError::ReentrantCall);
        }
        self.locked.set(true);
    }

    fn exit(&mut self) {
        self.locked.set(false);
    }

    fn require_not_paused(&self) {
        if self.paused.get_or_default() {
            self.env().revert(VaultError::ContractPaused);
        }
    }

    fn require_owner(&self) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(VaultError::Unauthorized);
        }
    }

    fn open_position(&self, id: u64) -> Position {
        let position = self.ledger.get(id);
        if !position.is_open() {
            self.env().revert(VaultError::PositionNotOpen);
        }
        position
    }

    fn now_secs(&self) -> u64 {
        self.env().get_block_time() / 1000
    }

    fn susd_ledger(&self) -> TokenLedgerContractRef {
        let susd = self.susd.get_or_revert_with(VaultError::TransferFailed);
        TokenLedgerContractRef::new(self.env().clone(), susd)
    }

    /// Take `amount` sUSD from `from` into custody and burn it.
    /// Uses approve -> transfer_from -> burn pattern.
    fn pull_and_burn(&mut self, from: Address, amount: U256) {
        let mut susd = self.susd_ledger();
        let self_address = self.env().self_address();

        if susd.allowance(from, self_address) < amount || susd.balance_of(from) < amount {
            self.env().revert(VaultError::TransferFailed);
        }

        susd.transfer_from(from, self_address, amount);
        susd.burn(self_address, amount);
    }

    fn release_totals(&mut self, closed: &Position) {
        let total_debt = self.total_debt.get_or_default();
        self.total_debt.set(total_debt.saturating_sub(closed.debt_wad));
        let total_collateral = self.total_collateral.get_or_default();
        self.total_collateral.set(total_collateral.saturating_sub(closed.collateral_motes));
    }
}
