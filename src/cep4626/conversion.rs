//! Share/asset conversion with explicit rounding
//!
//! An empty vault converts 1:1. Callers pick the rounding direction that
//! favors the vault: deposit and redeem round down, mint and withdraw up.

use odra::casper_types::U256;
use crate::math::{mul_div, Rounding};

/// Shares worth `assets` given the current supply and asset total.
/// `None` on overflow or when shares exist against zero assets.
pub fn to_shares(assets: U256, total_supply: U256, total_assets: U256, rounding: Rounding) -> Option<U256> {
    if total_supply.is_zero() {
        return Some(assets);
    }
    mul_div(assets, total_supply, total_assets, rounding)
}

/// Assets backing `shares` given the current supply and asset total
pub fn to_assets(shares: U256, total_supply: U256, total_assets: U256, rounding: Rounding) -> Option<U256> {
    if total_supply.is_zero() {
        return Some(shares);
    }
    mul_div(shares, total_assets, total_supply, rounding)
}
