//! Vault error taxonomy.
//!
//! Every failure is terminal to the current call: the entry point reverts and
//! the host discards all state written during it.

use odra::prelude::*;

#[odra::odra_error]
pub enum VaultError {
    /// Zero or out-of-range amount or duration
    InvalidInput = 1,
    PositionNotOpen = 2,
    NotOwner = 3,
    /// Requested mint breaches the opening LTV ceiling
    InsufficientCollateral = 4,
    InsufficientFee = 5,
    DurationExceedsMax = 6,
    /// Liquidation attempted on a safe, unexpired position
    PositionHealthy = 7,
    InvalidPrice = 8,
    StaleData = 9,
    TransferFailed = 10,
    /// Rollover attempted after maturity
    PositionExpired = 11,
    ReentrantCall = 12,
    ContractPaused = 13,
    Unauthorized = 14,
    /// Unpause requested while the vault is running
    NotPaused = 15,
}
