//! Fixed-point risk math for the vault.
//!
//! ## Units
//! - CSPR: motes (U512), 1 CSPR = 1e9 motes
//! - sUSD and prices: wad (U256), 18 decimals
//!
//! Every division floors. Nothing here rounds up.

use odra::casper_types::{U256, U512};

/// 1 wad = 1e18
pub const WAD: u128 = 1_000_000_000_000_000_000;
/// Conversion factor from motes (9 dec) to wad (18 dec) = 1e9
pub const MOTES_TO_WAD_FACTOR: u128 = 1_000_000_000;
/// Canonical price precision
pub const PRICE_DECIMALS: u8 = 18;

/// Opening LTV ceiling = 66%
pub const MAX_LTV_WAD: u128 = 660_000_000_000_000_000;
/// Collateral haircut used by the health factor = 80%
pub const LIQUIDATION_THRESHOLD_WAD: u128 = 800_000_000_000_000_000;
/// Extra collateral paid to liquidators = 10%
pub const LIQUIDATION_BONUS_WAD: u128 = 100_000_000_000_000_000;
/// Rollover fee = 5% APR, simple interest
pub const ROLLOVER_RATE_APR_WAD: u128 = 50_000_000_000_000_000;

/// Seconds per year (365 days)
pub const SECONDS_PER_YEAR: u64 = 31_536_000;
/// Shortest term for open and for a single rollover extension
pub const MIN_DURATION_SECS: u64 = 86_400;
/// Longest term, measured from "now"
pub const MAX_DURATION_SECS: u64 = SECONDS_PER_YEAR;
/// Feed answers at least this old are rejected (3 hours)
pub const PRICE_TIMEOUT_SECS: u64 = 10_800;

/// Convert motes (U512, 9 decimals) to wad (U256, 18 decimals).
/// Saturates above `u128::MAX` motes.
pub fn motes_to_wad(motes: U512) -> U256 {
    if motes > U512::from(u128::MAX) {
        return U256::MAX;
    }
    U256::from(motes.as_u128()) * U256::from(MOTES_TO_WAD_FACTOR)
}

/// Convert wad (U256, 18 decimals) to motes (U512, 9 decimals).
/// Rounds down.
pub fn wad_to_motes(wad: U256) -> U512 {
    U512::from((wad / U256::from(MOTES_TO_WAD_FACTOR)).as_u128())
}

/// USD value (wad) of `collateral_motes` at `price` (wad per CSPR).
pub fn collateral_value(collateral_motes: U512, price: U256) -> U256 {
    motes_to_wad(collateral_motes).saturating_mul(price) / U256::from(WAD)
}

/// `mint * 1e18 <= value * MAX_LTV`. A mint too large to scale is a breach.
pub fn within_max_ltv(mint_wad: U256, collateral_value_wad: U256) -> bool {
    let Some(scaled_mint) = mint_wad.checked_mul(U256::from(WAD)) else {
        return false;
    };
    match collateral_value_wad.checked_mul(U256::from(MAX_LTV_WAD)) {
        Some(ceiling) => scaled_mint <= ceiling,
        None => true,
    }
}

/// Threshold-adjusted collateral value over debt, in wad.
/// Zero debt is infinitely healthy.
pub fn health_factor(collateral_value_wad: U256, debt_wad: U256) -> U256 {
    if debt_wad.is_zero() {
        return U256::MAX;
    }
    let adjusted =
        collateral_value_wad.saturating_mul(U256::from(LIQUIDATION_THRESHOLD_WAD)) / U256::from(WAD);
    match adjusted.checked_mul(U256::from(WAD)) {
        Some(scaled) => scaled / debt_wad,
        None => (adjusted / debt_wad).saturating_mul(U256::from(WAD)),
    }
}

/// Debt expressed in base asset (wad of CSPR).
pub fn debt_in_base(debt_wad: U256, price: U256) -> U256 {
    debt_wad * U256::from(WAD) / price
}

/// Pro-rated rollover fee in base asset (wad of CSPR) for extending a
/// position carrying `debt_wad` by `added_secs`.
pub fn rollover_fee(debt_wad: U256, price: U256, added_secs: u64) -> U256 {
    debt_in_base(debt_wad, price) * U256::from(ROLLOVER_RATE_APR_WAD) * U256::from(added_secs)
        / (U256::from(SECONDS_PER_YEAR) * U256::from(WAD))
}

/// Split of a liquidated position's collateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationSplit {
    /// Collateral paid to the liquidator
    pub reward_motes: U512,
    /// Collateral returned to the position owner
    pub remainder_motes: U512,
}

/// Seize enough collateral to cover `debt_wad` plus the liquidation bonus,
/// capped at what the position holds.
pub fn liquidation_split(debt_wad: U256, price: U256, collateral_motes: U512) -> LiquidationSplit {
    let base_needed = debt_in_base(debt_wad, price);
    let reward_wad = base_needed * (U256::from(WAD) + U256::from(LIQUIDATION_BONUS_WAD))
        / U256::from(WAD);
    let reward_motes = if reward_wad >= motes_to_wad(collateral_motes) {
        collateral_motes
    } else {
        wad_to_motes(reward_wad)
    };
    LiquidationSplit {
        reward_motes,
        remainder_motes: collateral_motes - reward_motes,
    }
}
