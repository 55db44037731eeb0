//! Position ledger
//!
//! Dense table of positions keyed by a monotonically increasing id plus an
//! append-only owner -> ids index. Ids are never reused, closed positions stay
//! in both the table and the index.

use odra::casper_types::account::AccountHash;
use odra::casper_types::{U256, U512};
use odra::prelude::*;

use crate::errors::VaultError;

#[odra::odra_type]
#[derive(Default)]
pub enum PositionStatus {
    #[default]
    Closed = 0,
    Open = 1,
}

/// One fixed-term loan
#[odra::odra_type]
pub struct Position {
    pub id: u64,
    pub owner: Address,
    pub collateral_motes: U512,
    pub debt_wad: U256,
    /// Seconds since epoch
    pub start_time: u64,
    /// Seconds since epoch; liquidatable after this regardless of health
    pub maturity: u64,
    pub status: PositionStatus,
}

impl Position {
    /// Zero-valued, closed position returned for ids that were never created
    pub fn sentinel(id: u64) -> Self {
        Self {
            id,
            owner: Address::Account(AccountHash::new([0u8; 32])),
            collateral_motes: U512::zero(),
            debt_wad: U256::zero(),
            start_time: 0,
            maturity: 0,
            status: PositionStatus::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }
}

#[odra::module]
pub struct PositionLedger {
    next_id: Var<u64>,
    positions: Mapping<u64, Position>,
    owner_positions: Mapping<Address, Vec<u64>>,
}

#[odra::module]
impl PositionLedger {
    /// Store a new open position and index it under `owner`
    pub fn create(
        &mut self,
        owner: Address,
        collateral_motes: U512,
        debt_wad: U256,
        start_time: u64,
        maturity: u64,
    ) -> u64 {
        let id = self.next_id.get_or_default();
        self.next_id.set(id + 1);

        self.positions.set(
            &id,
            Position {
                id,
                owner,
                collateral_motes,
                debt_wad,
                start_time,
                maturity,
                status: PositionStatus::Open,
            },
        );

        let mut ids = self.owner_positions.get(&owner).unwrap_or_default();
        ids.push(id);
        self.owner_positions.set(&owner, ids);

        id
    }

    pub fn get(&self, id: u64) -> Position {
        self.positions.get(&id).unwrap_or_else(|| Position::sentinel(id))
    }

    /// Returns the new collateral amount
    pub fn add_collateral(&mut self, id: u64, delta_motes: U512) -> U512 {
        let mut position = self.get_open(id);
        position.collateral_motes = position.collateral_motes + delta_motes;
        let new_collateral = position.collateral_motes;
        self.positions.set(&id, position);
        new_collateral
    }

    /// Returns the new maturity
    pub fn extend_maturity(&mut self, id: u64, delta_secs: u64) -> u64 {
        let mut position = self.get_open(id);
        position.maturity = position
            .maturity
            .checked_add(delta_secs)
            .unwrap_or_else(|| self.env().revert(VaultError::DurationExceedsMax));
        let new_maturity = position.maturity;
        self.positions.set(&id, position);
        new_maturity
    }

    /// Zero and close a position, returning it as it was before closing
    pub fn close(&mut self, id: u64) -> Position {
        let position = self.get_open(id);
        let mut closed = position.clone();
        closed.collateral_motes = U512::zero();
        closed.debt_wad = U256::zero();
        closed.status = PositionStatus::Closed;
        self.positions.set(&id, closed);
        position
    }

    /// Every id `owner` ever opened, oldest first
    pub fn ids_for_owner(&self, owner: Address) -> Vec<u64> {
        self.owner_positions.get(&owner).unwrap_or_default()
    }

    /// Number of ids handed out so far
    pub fn count(&self) -> u64 {
        self.next_id.get_or_default()
    }

    fn get_open(&self, id: u64) -> Position {
        let position = self.get(id);
        if !position.is_open() {
            self.env().revert(VaultError::PositionNotOpen);
        }
        position
    }
}
