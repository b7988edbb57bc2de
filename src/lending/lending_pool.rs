//! Lending Pool - Over-collateralized money market backing leveraged vaults
//!
//! Accounts supply listed reserves as collateral and borrow listed reserves
//! against them. Every position change that can reduce account health
//! (borrow, withdraw) is checked against a single pool-wide max
//! loan-to-value, with collateral and debt valued through the price oracle.
//! There is no interest model: balances only move through the four
//! position operations.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use super::errors::LendingError;
use super::events::*;
use super::price_oracle::PriceOracleAdapterContractRef;
use crate::math::{mul_div, one_hundred_percent, Rounding};
use crate::token::Cep18TokenContractRef;

/// Aggregate position of an account in base currency
#[odra::odra_type]
pub struct AccountData {
    /// Value of all supplied collateral
    pub total_collateral_base: U256,
    /// Value of all outstanding debt
    pub total_debt_base: U256,
}

/// Lending Pool contract
#[odra::module(events = [Supplied, Withdrawn, Borrowed, Repaid, ReserveListed])]
pub struct LendingPool {
    /// Price oracle address
    price_oracle: Var<Address>,
    /// Listed reserve assets
    reserves: Var<Vec<Address>>,
    /// Collateral balances: (asset, account) -> amount
    collateral: Mapping<(Address, Address), U256>,
    /// Debt balances: (asset, account) -> amount
    debt: Mapping<(Address, Address), U256>,
    /// Max debt value / collateral value, in ONE_HUNDRED_PERCENT_BPS scale
    max_ltv_bps: Var<U256>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl LendingPool {
    /// Initialize the lending pool
    pub fn init(&mut self, price_oracle: Address, max_ltv_bps: U256) {
        self.validate_ltv(max_ltv_bps);
        let caller = self.env().caller();
        self.price_oracle.set(price_oracle);
        self.reserves.set(Vec::new());
        self.max_ltv_bps.set(max_ltv_bps);
        self.admin.set(caller);
    }

    // ========================================
    // Collateral
    // ========================================

    /// Supply `amount` of `asset` from the caller, credited to `on_behalf_of`
    pub fn supply(&mut self, asset: Address, amount: U256, on_behalf_of: Address) {
        self.ensure_listed(asset);
        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let caller = self.env().caller();
        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer_from(caller, self.env().self_address(), amount);

        let current = self.collateral_balance(asset, on_behalf_of);
        self.collateral.set(&(asset, on_behalf_of), current + amount);

        self.env().emit_event(Supplied {
            asset,
            supplier: caller,
            on_behalf_of,
            amount,
        });
    }

    /// Withdraw the caller's collateral to `to`. `U256::MAX` withdraws
    /// everything. Returns the amount withdrawn.
    pub fn withdraw(&mut self, asset: Address, amount: U256, to: Address) -> U256 {
        self.ensure_listed(asset);
        let caller = self.env().caller();
        let current = self.collateral_balance(asset, caller);

        let amount = if amount == U256::MAX { current } else { amount };
        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }
        if amount > current {
            self.env().revert(LendingError::InsufficientCollateral);
        }

        self.collateral.set(&(asset, caller), current - amount);
        self.ensure_healthy(caller);

        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer(to, amount);

        self.env().emit_event(Withdrawn {
            asset,
            account: caller,
            to,
            amount,
        });

        amount
    }

    // ========================================
    // Debt
    // ========================================

    /// Borrow `amount` of `asset` against the caller's collateral, sent to `to`
    pub fn borrow(&mut self, asset: Address, amount: U256, to: Address) {
        self.ensure_listed(asset);
        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        if token.balance_of(self.env().self_address()) < amount {
            self.env().revert(LendingError::InsufficientLiquidity);
        }

        let caller = self.env().caller();
        let current = self.debt_balance(asset, caller);
        self.debt.set(&(asset, caller), current + amount);
        self.ensure_healthy(caller);

        token.transfer(to, amount);

        self.env().emit_event(Borrowed {
            asset,
            borrower: caller,
            to,
            amount,
        });
    }

    /// Repay up to `amount` of `on_behalf_of`'s debt from the caller.
    /// Returns the amount actually repaid.
    pub fn repay(&mut self, asset: Address, amount: U256, on_behalf_of: Address) -> U256 {
        self.ensure_listed(asset);
        let outstanding = self.debt_balance(asset, on_behalf_of);
        let payback = if amount < outstanding { amount } else { outstanding };
        if payback.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let caller = self.env().caller();
        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer_from(caller, self.env().self_address(), payback);

        self.debt.set(&(asset, on_behalf_of), outstanding - payback);

        self.env().emit_event(Repaid {
            asset,
            payer: caller,
            on_behalf_of,
            amount: payback,
        });

        payback
    }

    // ========================================
    // View Functions
    // ========================================

    pub fn collateral_balance(&self, asset: Address, account: Address) -> U256 {
        self.collateral.get(&(asset, account)).unwrap_or_default()
    }

    pub fn debt_balance(&self, asset: Address, account: Address) -> U256 {
        self.debt.get(&(asset, account)).unwrap_or_default()
    }

    /// Collateral and debt of `account` valued in base currency
    pub fn get_account_data(&self, account: Address) -> AccountData {
        let mut total_collateral_base = U256::zero();
        let mut total_debt_base = U256::zero();

        for asset in self.reserves.get_or_default() {
            let collateral = self.collateral_balance(asset, account);
            if !collateral.is_zero() {
                total_collateral_base += self.value_in_base(asset, collateral);
            }
            let debt = self.debt_balance(asset, account);
            if !debt.is_zero() {
                total_debt_base += self.value_in_base(asset, debt);
            }
        }

        AccountData {
            total_collateral_base,
            total_debt_base,
        }
    }

    pub fn get_reserves(&self) -> Vec<Address> {
        self.reserves.get_or_default()
    }

    pub fn get_max_ltv_bps(&self) -> U256 {
        self.max_ltv_bps.get_or_default()
    }

    // ========================================
    // Admin Functions
    // ========================================

    /// List a new reserve asset
    pub fn list_reserve(&mut self, asset: Address) {
        self.only_admin();
        let mut reserves = self.reserves.get_or_default();
        if reserves.contains(&asset) {
            self.env().revert(LendingError::ReserveAlreadyListed);
        }
        reserves.push(asset);
        self.reserves.set(reserves);

        self.env().emit_event(ReserveListed { asset });
    }

    /// Update the max loan-to-value
    pub fn set_max_ltv_bps(&mut self, max_ltv_bps: U256) {
        self.only_admin();
        self.validate_ltv(max_ltv_bps);
        self.max_ltv_bps.set(max_ltv_bps);
    }

    // ========================================
    // Internal Functions
    // ========================================

    fn value_in_base(&self, asset: Address, amount: U256) -> U256 {
        let oracle_address = self.price_oracle.get_or_revert_with(LendingError::InvalidConfiguration);
        let price = PriceOracleAdapterContractRef::new(self.env(), oracle_address).get_asset_price(asset);
        let decimals = Cep18TokenContractRef::new(self.env(), asset).decimals();
        mul_div(amount, price, U256::exp10(decimals as usize), Rounding::Down)
            .unwrap_or_revert_with(&self.env(), LendingError::InvalidConfiguration)
    }

    fn ensure_healthy(&self, account: Address) {
        let data = self.get_account_data(account);
        if data.total_debt_base.is_zero() {
            return;
        }
        let max_debt = mul_div(
            data.total_collateral_base,
            self.max_ltv_bps.get_or_default(),
            one_hundred_percent(),
            Rounding::Down,
        )
        .unwrap_or_revert_with(&self.env(), LendingError::InvalidConfiguration);
        if data.total_debt_base > max_debt {
            self.env().revert(LendingError::HealthFactorTooLow);
        }
    }

    fn ensure_listed(&self, asset: Address) {
        if !self.reserves.get_or_default().contains(&asset) {
            self.env().revert(LendingError::ReserveNotListed);
        }
    }

    fn validate_ltv(&self, max_ltv_bps: U256) {
        if max_ltv_bps.is_zero() || max_ltv_bps >= one_hundred_percent() {
            self.env().revert(LendingError::InvalidConfiguration);
        }
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        if caller != admin {
            self.env().revert(LendingError::Unauthorized);
        }
    }
}

/// Lending pool operations consumed by the leveraged vault
#[odra::external_contract]
pub trait LendingPoolAdapter {
    /// Supply collateral from the caller, credited to `on_behalf_of`
    fn supply(&mut self, asset: Address, amount: U256, on_behalf_of: Address);

    /// Borrow against the caller's collateral, tokens sent to `to`
    fn borrow(&mut self, asset: Address, amount: U256, to: Address);

    /// Repay `on_behalf_of`'s debt from the caller; returns amount repaid
    fn repay(&mut self, asset: Address, amount: U256, on_behalf_of: Address) -> U256;

    /// Withdraw the caller's collateral to `to`; returns amount withdrawn
    fn withdraw(&mut self, asset: Address, amount: U256, to: Address) -> U256;

    /// Collateral held for `account`
    fn collateral_balance(&self, asset: Address, account: Address) -> U256;

    /// Debt owed by `account`
    fn debt_balance(&self, asset: Address, account: Address) -> U256;
}
