//! Fixed-point math and price normalization tests

use odra::casper_types::{U256, U512};

use susd_vault::errors::VaultError;
use susd_vault::math::{
    collateral_value, health_factor, liquidation_split, motes_to_wad, rollover_fee, wad_to_motes,
    within_max_ltv, WAD,
};
use susd_vault::oracle::{normalize_price, RoundData};

const MOTES_PER_CSPR: u64 = 1_000_000_000;

fn cspr(amount: u64) -> U512 {
    U512::from(amount) * U512::from(MOTES_PER_CSPR)
}

fn wad(amount: u64) -> U256 {
    U256::from(amount) * U256::from(WAD)
}

fn round(answer: i64, updated_at: u64) -> RoundData {
    RoundData {
        round_id: 1,
        answer,
        started_at: updated_at,
        updated_at,
        answered_in_round: 1,
    }
}

// ==========================================
// Price Normalization
// ==========================================

#[test]
fn test_normalize_scales_up_low_decimals() {
    // $300 at 8 decimals
    assert!(matches!(
        normalize_price(&round(30_000_000_000, 1_000), 8, 1_000),
        Ok(price) if price == wad(300)
    ));
}

#[test]
fn test_normalize_passes_through_18_decimals() {
    let raw = 1_234_567_890_123_456_789i64;
    assert!(matches!(
        normalize_price(&round(raw, 0), 18, 0),
        Ok(price) if price == U256::from(raw as u64)
    ));
}

#[test]
fn test_normalize_truncates_high_decimals() {
    // 0.5123456789000000009 at 19 decimals, trailing 9 dropped
    assert!(matches!(
        normalize_price(&round(5_123_456_789_000_000_009, 19), 19, 19),
        Ok(price) if price == U256::from(512_345_678_900_000_000u64)
    ));
}

#[test]
fn test_normalize_rejects_non_positive_answer() {
    assert!(matches!(
        normalize_price(&round(0, 0), 8, 0),
        Err(VaultError::InvalidPrice)
    ));
    assert!(matches!(
        normalize_price(&round(-1, 0), 8, 0),
        Err(VaultError::InvalidPrice)
    ));
}

#[test]
fn test_normalize_rejects_answer_that_scales_to_zero() {
    assert!(matches!(
        normalize_price(&round(5, 0), 30, 0),
        Err(VaultError::InvalidPrice)
    ));
}

#[test]
fn test_normalize_staleness_boundary() {
    let updated_at = 50_000;
    // 3 hours minus one second is still fresh
    assert!(normalize_price(&round(100, updated_at), 8, updated_at + 10_799).is_ok());
    // exactly 3 hours is stale
    assert!(matches!(
        normalize_price(&round(100, updated_at), 8, updated_at + 10_800),
        Err(VaultError::StaleData)
    ));
}

#[test]
fn test_normalize_checks_price_before_staleness() {
    assert!(matches!(
        normalize_price(&round(-5, 0), 8, 1_000_000),
        Err(VaultError::InvalidPrice)
    ));
}

// ==========================================
// Valuation and Risk
// ==========================================

#[test]
fn test_unit_conversion_round_down() {
    assert_eq!(motes_to_wad(cspr(1)), wad(1));
    assert_eq!(wad_to_motes(U256::from(1_999_999_999u64)), U512::from(1u64));
}

#[test]
fn test_collateral_value_truncates() {
    // 1 mote (1e9 wad) at 1e8 wad per CSPR is worth 0.1 wad, floored to zero
    let value = collateral_value(U512::from(1u64), U256::from(100_000_000u64));
    assert_eq!(value, U256::zero());
    assert_eq!(collateral_value(cspr(2), wad(300)), wad(600));
}

#[test]
fn test_max_ltv_boundary() {
    let value = wad(300);
    // 66% of $300 = $198
    assert!(within_max_ltv(wad(198), value));
    assert!(!within_max_ltv(wad(198) + U256::one(), value));
    assert!(within_max_ltv(wad(180), value));
}

#[test]
fn test_max_ltv_rejects_mint_too_large_to_scale() {
    assert!(!within_max_ltv(U256::MAX / 2, wad(300)));
    assert!(!within_max_ltv(U256::MAX, U256::MAX));
    // a ceiling that cannot be scaled covers any scalable mint
    assert!(within_max_ltv(wad(1_000_000), U256::MAX));
}

#[test]
fn test_oversized_collateral_saturates() {
    assert_eq!(motes_to_wad(U512::MAX), U256::MAX);
    assert_eq!(collateral_value(U512::MAX, wad(300)), U256::MAX / U256::from(WAD));
    assert!(health_factor(collateral_value(U512::MAX, wad(300)), wad(180)) > U256::from(WAD));
}

#[test]
fn test_health_factor_matches_reference_scenario() {
    // 1 CSPR at $200 against 180 sUSD
    let value = collateral_value(cspr(1), wad(200));
    assert_eq!(health_factor(value, wad(180)), U256::from(888_888_888_888_888_888u64));
}

#[test]
fn test_health_factor_infinite_without_debt() {
    assert_eq!(health_factor(wad(100), U256::zero()), U256::MAX);
}

#[test]
fn test_health_factor_monotonic() {
    let debt = wad(180);
    let mut last = U256::MAX;
    for price in [400u64, 300, 250, 200, 150, 100] {
        let hf = health_factor(collateral_value(cspr(1), wad(price)), debt);
        assert!(hf < last, "health factor must fall with price");
        last = hf;
    }

    let low = health_factor(collateral_value(cspr(1), wad(200)), debt);
    let high = health_factor(collateral_value(cspr(2), wad(200)), debt);
    assert!(high > low);
}

#[test]
fn test_rollover_fee_seven_days() {
    // 150 sUSD at $300 = 0.5 CSPR; 5% APR over 7 days
    let fee = rollover_fee(wad(150), wad(300), 7 * 86_400);
    assert_eq!(fee, U256::from(479_452_054_794_520u64));
}

#[test]
fn test_rollover_fee_full_year() {
    let fee = rollover_fee(wad(150), wad(300), 31_536_000);
    assert_eq!(fee, U256::from(25_000_000_000_000_000u64));
}

#[test]
fn test_liquidation_split_reference_scenario() {
    let split = liquidation_split(wad(180), wad(200), cspr(1));
    assert_eq!(split.reward_motes, U512::from(990_000_000u64));
    assert_eq!(split.remainder_motes, U512::from(10_000_000u64));
}

#[test]
fn test_liquidation_reward_capped_at_collateral() {
    // 1 CSPR at $150 against 180 sUSD: bonus-inflated reward would be 1.32 CSPR
    let split = liquidation_split(wad(180), wad(150), cspr(1));
    assert_eq!(split.reward_motes, cspr(1));
    assert_eq!(split.remainder_motes, U512::zero());
}

#[test]
fn test_liquidation_reward_never_exceeds_collateral() {
    for price in [1u64, 10, 100, 163, 164, 200, 1_000, 10_000] {
        let collateral = cspr(1);
        let split = liquidation_split(wad(180), wad(price), collateral);
        assert!(split.reward_motes <= collateral);
        assert_eq!(split.reward_motes + split.remainder_motes, collateral);
    }
}
