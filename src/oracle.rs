//! Price normalization layer
//!
//! Reads a Chainlink-style round from the configured price source, rejects
//! stale or non-positive answers and rescales the answer to 18 decimals.
//! Nothing is cached; every read hits the source.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::errors::VaultError;
use crate::math::{PRICE_DECIMALS, PRICE_TIMEOUT_SECS};

/// One answer of the price source. Timestamps are in seconds.
#[odra::odra_type]
pub struct RoundData {
    pub round_id: u64,
    pub answer: i64,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: u64,
}

/// Raw USD price source for the base asset
#[odra::external_contract]
pub trait PriceSource {
    /// Latest round of the feed
    fn latest_round_data(&self) -> RoundData;

    /// Number of decimals `answer` is expressed in
    fn decimals(&self) -> u8;
}

/// Validate a round and rescale its answer to 18 decimals.
///
/// Scaling down truncates, so low-order digits of a >18 decimal feed are lost.
pub fn normalize_price(round: &RoundData, decimals: u8, now_secs: u64) -> Result<U256, VaultError> {
    if round.answer <= 0 {
        return Err(VaultError::InvalidPrice);
    }
    if now_secs.saturating_sub(round.updated_at) >= PRICE_TIMEOUT_SECS {
        return Err(VaultError::StaleData);
    }

    let raw = U256::from(round.answer as u64);
    let price = match decimals {
        d if d < PRICE_DECIMALS => raw * U256::exp10((PRICE_DECIMALS - d) as usize),
        d if d > PRICE_DECIMALS => {
            let shift = (d - PRICE_DECIMALS) as usize;
            // i64 answers have at most 19 digits
            if shift > 19 {
                U256::zero()
            } else {
                raw / U256::exp10(shift)
            }
        }
        _ => raw,
    };

    // A feed with more decimals than digits collapses to zero; that price is as
    // unusable as a negative one.
    if price.is_zero() {
        return Err(VaultError::InvalidPrice);
    }
    Ok(price)
}

/// Wraps the price source reference. Used as a submodule of the vault.
#[odra::module]
pub struct PriceNormalizer {
    feed: Var<Address>,
}

#[odra::module]
impl PriceNormalizer {
    pub fn init(&mut self, feed: Address) {
        self.feed.set(feed);
    }

    /// Current base asset price in USD wad. Reverts with `InvalidPrice` or
    /// `StaleData`.
    pub fn price(&self) -> U256 {
        let feed = self.source();
        let round = feed.latest_round_data();
        let now_secs = self.env().get_block_time() / 1000;
        normalize_price(&round, feed.decimals(), now_secs)
            .unwrap_or_else(|err| self.env().revert(err))
    }

    /// Raw decimals of the underlying source
    pub fn source_decimals(&self) -> u8 {
        self.source().decimals()
    }

    pub fn feed(&self) -> Option<Address> {
        self.feed.get()
    }

    fn source(&self) -> PriceSourceContractRef {
        let feed = self.feed.get_or_revert_with(VaultError::InvalidPrice);
        PriceSourceContractRef::new(self.env(), feed)
    }
}
