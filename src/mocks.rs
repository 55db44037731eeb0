//! Hostile collaborators for exercising the vault's reentrancy guard.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;
use odra_modules::cep18::events::{Burn, Mint, SetAllowance, Transfer, TransferFrom};
use odra_modules::cep18_token::Cep18;

use crate::vault::SyntheticVaultContractRef;

/// sUSD look-alike that, once armed, calls `repay` on the vault from inside
/// `transfer_from` before moving any tokens. Mint and burn are unrestricted.
#[odra::module(events = [Mint, Burn, SetAllowance, Transfer, TransferFrom])]
pub struct ReentrantLedger {
    token: SubModule<Cep18>,
    vault: Var<Address>,
    target_id: Var<u64>,
    armed: Var<bool>,
}

#[odra::module]
impl ReentrantLedger {
    pub fn init(&mut self) {
        self.token.init("rUSD".to_string(), "Reentrant USD".to_string(), 18u8, U256::zero());
        self.armed.set(false);
    }

    /// Re-enter `vault.repay(target_id)` on the next `transfer_from`
    pub fn arm(&mut self, vault: Address, target_id: u64) {
        self.vault.set(vault);
        self.target_id.set(target_id);
        self.armed.set(true);
    }

    pub fn disarm(&mut self) {
        self.armed.set(false);
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

    pub fn approve(&mut self, spender: Address, amount: U256) {
        self.token.approve(&spender, &amount);
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        if self.armed.get_or_default() {
            if let Some(vault) = self.vault.get() {
                let id = self.target_id.get_or_default();
                SyntheticVaultContractRef::new(self.env(), vault).repay(id);
            }
        }
        self.token.transfer_from(&owner, &recipient, &amount);
    }

    pub fn mint(&mut self, to: Address, amount: U256) {
        self.token.raw_mint(&to, &amount);
    }

    pub fn burn(&mut self, from: Address, amount: U256) {
        self.token.raw_burn(&from, &amount);
    }
}
