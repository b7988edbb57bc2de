//! CEP-4626 Tokenized Vault interface
//!
//! Casper adaptation of ERC-4626. Shares are CEP-18 tokens issued by the
//! vault contract itself.

use odra::prelude::*;
use odra::casper_types::U256;

/// Standard entry points of a tokenized vault
#[odra::external_contract]
pub trait Cep4626Vault {
    /// Underlying asset accepted by `deposit`/`mint`
    fn asset(&self) -> Address;

    /// Assets backing the whole share supply
    fn total_assets(&self) -> U256;

    fn max_deposit(&self, receiver: Address) -> U256;

    fn max_mint(&self, receiver: Address) -> U256;

    fn max_withdraw(&self, owner: Address) -> U256;

    fn max_redeem(&self, owner: Address) -> U256;

    fn convert_to_shares(&self, assets: U256) -> U256;

    fn convert_to_assets(&self, shares: U256) -> U256;

    /// Shares minted by `deposit(assets)` right now
    fn preview_deposit(&self, assets: U256) -> U256;

    /// Assets pulled by `mint(shares)` right now
    fn preview_mint(&self, shares: U256) -> U256;

    /// Shares burned by `withdraw(assets)` right now
    fn preview_withdraw(&self, assets: U256) -> U256;

    /// Assets released by `redeem(shares)` right now
    fn preview_redeem(&self, shares: U256) -> U256;

    fn deposit(&mut self, assets: U256, receiver: Address) -> U256;

    fn mint(&mut self, shares: U256, receiver: Address) -> U256;

    fn withdraw(&mut self, assets: U256, receiver: Address, owner: Address) -> U256;

    fn redeem(&mut self, shares: U256, receiver: Address, owner: Address) -> U256;
}
