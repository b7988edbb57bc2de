//! Events for the leverage wrappers

use odra::prelude::*;
use odra::casper_types::U256;

/// Event emitted when a flash-funded deposit completes
#[odra::event]
pub struct LeveragedDeposit {
    /// Account that provided the input collateral
    pub caller: Address,
    /// Share recipient
    pub receiver: Address,
    /// Target vault
    pub vault: Address,
    /// Collateral provided by the caller
    pub input_assets: U256,
    /// Collateral deposited into the vault
    pub total_assets: U256,
    /// Debt tokens flash-borrowed
    pub flash_amount: U256,
    /// Shares minted to the receiver
    pub shares: U256,
}

/// Event emitted when a flash-funded redemption completes
#[odra::event]
pub struct LeveragedRedeem {
    /// Share owner
    pub caller: Address,
    /// Collateral recipient
    pub receiver: Address,
    /// Target vault
    pub vault: Address,
    /// Shares redeemed
    pub shares: U256,
    /// Debt tokens flash-borrowed to repay the position
    pub flash_amount: U256,
    /// Collateral paid to the receiver
    pub collateral_out: U256,
}

/// Event emitted when leftover tokens above the dust threshold are returned
#[odra::event]
pub struct LeftoverTransferred {
    pub vault: Address,
    pub token: Address,
    pub receiver: Address,
    pub amount: U256,
}

/// Event emitted when a dust threshold changes
#[odra::event]
pub struct MinLeftoverUpdated {
    pub vault: Address,
    pub token: Address,
    pub min_amount: U256,
}
