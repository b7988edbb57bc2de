//! Events for CEP-4626 tokenized vaults

use odra::prelude::*;
use odra::casper_types::U256;

/// Event emitted when assets are deposited into the vault
#[odra::event]
pub struct Deposit {
    /// Address that called deposit or mint
    pub sender: Address,
    /// Address that received the shares
    pub owner: Address,
    /// Collateral supplied by the sender
    pub assets: U256,
    /// Shares minted
    pub shares: U256,
}

/// Event emitted when shares are redeemed from the vault
#[odra::event]
pub struct Withdraw {
    /// Address that called withdraw or redeem
    pub sender: Address,
    /// Address that received the collateral
    pub receiver: Address,
    /// Address whose shares were burned
    pub owner: Address,
    /// Collateral released
    pub assets: U256,
    /// Shares burned
    pub shares: U256,
}
