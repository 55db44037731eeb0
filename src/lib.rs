//! sUSD Vault x Casper: fixed-term synthetic dollar positions (Odra)
//!
//! This crate implements a CSPR-collateralized synthetic dollar on Casper
//! using the Odra framework.
//! - SyntheticVault: position engine (open, add collateral, repay, roll over,
//!   liquidate)
//! - PriceNormalizer: staleness-checked, 18-decimal price reads
//! - SyntheticUsd: sUSD token mintable only by the vault
//! - MockPriceFeed: settable price source for tests and testnet demos

#![cfg_attr(target_arch = "wasm32", no_std)]

extern crate alloc;

pub mod errors;
pub mod math;
pub mod oracle;
pub mod price_feed;
pub mod ledger;
pub mod tokens;
pub mod vault;
#[cfg(not(target_arch = "wasm32"))]
pub mod mocks;
