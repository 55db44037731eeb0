//! Synthetic dollar ledger
//!
//! - `TokenLedger`: the capability the vault drives (mint, burn, pull)
//! - `SyntheticUsd`: CEP-18 sUSD, only the vault (minter) can mint/burn

use alloc::string::String;
use odra::casper_types::U256;
use odra::prelude::*;
use odra_modules::cep18::events::{
    Burn, DecreaseAllowance, IncreaseAllowance, Mint, SetAllowance, Transfer, TransferFrom,
};
use odra_modules::cep18_token::Cep18;

/// Mint/burn/transfer-from surface the vault needs from the sUSD ledger.
/// Any contract exposing these entry points can back the vault.
#[odra::external_contract]
pub trait TokenLedger {
    /// Create `amount` for `to`. Only the minter may call.
    fn mint(&mut self, to: Address, amount: U256);
    /// Destroy `amount` held by `from`. Only the minter may call.
    fn burn(&mut self, from: Address, amount: U256);
    /// Move `amount` from `owner` to `recipient` using the caller's allowance
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256);
    fn allowance(&self, owner: Address, spender: Address) -> U256;
    fn balance_of(&self, owner: Address) -> U256;
    fn total_supply(&self) -> U256;
}

pub mod events {
    use odra::prelude::*;

    #[odra::event]
    pub struct MinterSet {
        pub old_minter: Option<Address>,
        pub new_minter: Address,
    }
}

/// Errors for token operations (aligned with CEP-18 codes where applicable)
#[odra::odra_error]
pub enum TokenError {
    InsufficientBalance = 60001,
    InsufficientAllowance = 60002,
    CannotTargetSelfUser = 60003,
    Unauthorized = 60004,
}

/// sUSD: synthetic dollar, 18 decimals
#[odra::module(
    events = [
        Mint,
        Burn,
        SetAllowance,
        IncreaseAllowance,
        DecreaseAllowance,
        Transfer,
        TransferFrom,
        events::MinterSet
    ],
    errors = TokenError
)]
pub struct SyntheticUsd {
    token: SubModule<Cep18>,
    minter: Var<Address>,
}

#[odra::module]
impl SyntheticUsd {
    /// Deploy with a temporary minter; hand minting over to the vault with
    /// `set_minter` once it is deployed.
    pub fn init(&mut self, minter: Address) {
        self.token.init("sUSD".to_string(), "Synthetic USD".to_string(), 18u8, U256::zero());
        self.minter.set(minter);
        self.env().emit_event(events::MinterSet {
            old_minter: None,
            new_minter: minter,
        });
    }

    pub fn minter(&self) -> Option<Address> {
        self.minter.get()
    }

    /// Only the current minter can hand over minting rights
    pub fn set_minter(&mut self, new_minter: Address) {
        let caller = self.env().caller();
        let current_minter = self.minter.get();
        if current_minter != Some(caller) {
            self.env().revert(TokenError::Unauthorized);
        }
        self.minter.set(new_minter);
        self.env().emit_event(events::MinterSet {
            old_minter: current_minter,
            new_minter,
        });
    }

    pub fn name(&self) -> String {
        self.token.name()
    }

    pub fn symbol(&self) -> String {
        self.token.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.token.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.token.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.token.balance_of(&owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.token.allowance(&owner, &spender)
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        self.token.transfer(&recipient, &amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        self.token.approve(&spender, &amount);
    }

    pub fn increase_allowance(&mut self, spender: Address, amount: U256) {
        self.token.increase_allowance(&spender, &amount);
    }

    pub fn decrease_allowance(&mut self, spender: Address, amount: U256) {
        self.token.decrease_allowance(&spender, &amount);
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        self.token.transfer_from(&owner, &recipient, &amount);
    }

    pub fn mint(&mut self, to: Address, amount: U256) {
        self.require_minter();
        self.token.raw_mint(&to, &amount);
    }

    /// Burns from `from`; the vault only ever burns its own custody balance
    pub fn burn(&mut self, from: Address, amount: U256) {
        self.require_minter();
        self.token.raw_burn(&from, &amount);
    }

    // Casper 2.0 may hand us the minter as entity or package address
    fn require_minter(&self) {
        let caller = self.env().caller();
        let authorized = match self.minter.get() {
            Some(m) if m == caller => true,
            Some(m) => matches!(
                (m.as_contract_package_hash(), caller.as_contract_package_hash()),
                (Some(m_pkg), Some(caller_pkg)) if m_pkg == caller_pkg
            ),
            None => false,
        };
        if !authorized {
            self.env().revert(TokenError::Unauthorized);
        }
    }
}
