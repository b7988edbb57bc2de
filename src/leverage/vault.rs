//! Leveraged Vault - CEP-4626 vault holding a leveraged lending position
//!
//! Deposited collateral is supplied to the lending pool and a matching amount
//! of the debt asset is borrowed so the position keeps its leverage:
//! `leverage = collateral * 100% / (collateral - debt)`, valued in the oracle
//! base currency. Leverage is never cached; every call reads live pool
//! balances and oracle prices.
//!
//! Share accounting uses the *leveraged* asset total
//! (`pool collateral * target / 100%`) as `total_assets`, so a first deposit
//! of 100 at 300% mints 300 shares. The target factor cancels between
//! `preview_deposit` and `preview_redeem`, leaving every share a pro-rata
//! claim on the pool collateral.
//!
//! Outside `[lower_bound, upper_bound]` the vault is "too imbalanced":
//! every `max_*` limit drops to zero and deposits and redemptions revert,
//! while anyone may call `increase_leverage` / `decrease_leverage` to move
//! leverage back to target for a capped subsidy.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use super::errors::LeverageError;
use super::events::*;
use super::math::{LeverageMath, RebalanceDirection, RebalanceQuote};
use crate::cep4626::conversion::{to_assets, to_shares};
use crate::cep4626::events::{Deposit, Withdraw};
use crate::events::{Approval, Transfer};
use crate::lending::lending_pool::LendingPoolAdapterContractRef;
use crate::lending::price_oracle::PriceOracleAdapterContractRef;
use crate::math::{mul_div, one_hundred_percent, Rounding, ONE_BPS};
use crate::token::{Cep18TokenContractRef, Token};

/// Pool-side balance moves may differ from the request by this many units
const POOL_DELTA_TOLERANCE: u64 = 1;

/// Vault position valued in oracle base currency
#[odra::odra_type]
pub struct PositionBase {
    /// Collateral supplied to the pool
    pub total_collateral_base: U256,
    /// Debt owed to the pool
    pub total_debt_base: U256,
}

/// Leveraged vault contract
#[odra::module(events = [
    Deposit,
    Withdraw,
    Transfer,
    Approval,
    LeverageIncreased,
    LeverageDecreased,
    LeverageBoundsUpdated,
    MaxSubsidyUpdated,
    MinDepositUpdated,
    TokenRescued
])]
pub struct LeveragedVault {
    /// Share ledger
    shares: SubModule<Token>,
    /// Asset supplied as collateral
    collateral_token: Var<Address>,
    /// Asset borrowed against the collateral
    debt_token: Var<Address>,
    /// Lending pool holding the position
    lending_pool: Var<Address>,
    /// Price oracle valuing the position
    price_oracle: Var<Address>,
    /// Lower imbalance bound
    lower_bound_bps: Var<U256>,
    /// Target leverage
    target_leverage_bps: Var<U256>,
    /// Upper imbalance bound
    upper_bound_bps: Var<U256>,
    /// Cap on the rebalance subsidy
    max_subsidy_bps: Var<U256>,
    /// Smallest deposit accepted, valued in base currency
    min_deposit_base: Var<U256>,
    /// Tokens `rescue_token` may never move
    restricted_tokens: Var<Vec<Address>>,
    /// Owner address
    owner: Var<Address>,
    /// Reentrancy lock
    locked: Var<bool>,
}

#[odra::module]
impl LeveragedVault {
    /// Initialize the vault. Share decimals follow the collateral token.
    /// `min_deposit_base` keeps deposits large enough that base-currency
    /// rounding cannot move the position off its leverage.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        name: String,
        symbol: String,
        collateral_token: Address,
        debt_token: Address,
        lending_pool: Address,
        price_oracle: Address,
        lower_bound_bps: U256,
        target_leverage_bps: U256,
        upper_bound_bps: U256,
        max_subsidy_bps: U256,
        min_deposit_base: U256,
        extra_restricted_tokens: Vec<Address>,
    ) {
        LeverageMath::validate_config(lower_bound_bps, target_leverage_bps, upper_bound_bps, max_subsidy_bps)
            .unwrap_or_revert(&self.env());

        let decimals = Cep18TokenContractRef::new(self.env(), collateral_token).decimals();
        self.shares.init(name, symbol, decimals);

        self.collateral_token.set(collateral_token);
        self.debt_token.set(debt_token);
        self.lending_pool.set(lending_pool);
        self.price_oracle.set(price_oracle);
        self.lower_bound_bps.set(lower_bound_bps);
        self.target_leverage_bps.set(target_leverage_bps);
        self.upper_bound_bps.set(upper_bound_bps);
        self.max_subsidy_bps.set(max_subsidy_bps);
        self.min_deposit_base.set(min_deposit_base);

        let mut restricted = vec![collateral_token, debt_token];
        restricted.extend(extra_restricted_tokens);
        self.restricted_tokens.set(restricted);

        self.owner.set(self.env().caller());
        self.locked.set(false);
    }

    // ========================================
    // CEP-18 Share Token
    // ========================================

    pub fn name(&self) -> String {
        self.shares.name()
    }

    pub fn symbol(&self) -> String {
        self.shares.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.shares.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.shares.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.shares.balance_of(owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.shares.allowance(owner, spender)
    }

    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        self.shares.transfer(to, amount)
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        self.shares.approve(spender, amount)
    }

    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        self.shares.transfer_from(from, to, amount)
    }

    // ========================================
    // CEP-4626 Views
    // ========================================

    pub fn asset(&self) -> Address {
        self.collateral_token()
    }

    /// Leveraged asset total: pool collateral scaled by the target
    pub fn total_assets(&self) -> U256 {
        let collateral = self.pool().collateral_balance(self.collateral_token(), self.env().self_address());
        LeverageMath::leveraged_assets(collateral, self.get_target_leverage_bps())
            .unwrap_or_revert(&self.env())
    }

    pub fn convert_to_shares(&self, assets: U256) -> U256 {
        self.shares_for(assets, Rounding::Down)
    }

    pub fn convert_to_assets(&self, shares: U256) -> U256 {
        self.assets_for(shares, Rounding::Down)
    }

    #[allow(unused_variables)]
    pub fn max_deposit(&self, receiver: Address) -> U256 {
        if self.is_too_imbalanced() { U256::zero() } else { U256::MAX }
    }

    #[allow(unused_variables)]
    pub fn max_mint(&self, receiver: Address) -> U256 {
        if self.is_too_imbalanced() { U256::zero() } else { U256::MAX }
    }

    pub fn max_withdraw(&self, owner: Address) -> U256 {
        if self.is_too_imbalanced() {
            return U256::zero();
        }
        self.preview_redeem(self.shares.balance_of(owner))
    }

    pub fn max_redeem(&self, owner: Address) -> U256 {
        if self.is_too_imbalanced() {
            return U256::zero();
        }
        self.shares.balance_of(owner)
    }

    /// Shares for depositing `assets` of collateral
    pub fn preview_deposit(&self, assets: U256) -> U256 {
        let leveraged = self.get_target_leveraged_assets(assets);
        self.shares_for(leveraged, Rounding::Down)
    }

    /// Collateral needed to mint `shares`
    pub fn preview_mint(&self, shares: U256) -> U256 {
        let leveraged = self.assets_for(shares, Rounding::Up);
        self.unleverage(leveraged, Rounding::Up)
    }

    /// Shares burned to withdraw `assets` of collateral
    pub fn preview_withdraw(&self, assets: U256) -> U256 {
        let leveraged = mul_div(assets, self.get_target_leverage_bps(), one_hundred_percent(), Rounding::Up)
            .unwrap_or_revert_with(&self.env(), LeverageError::MathOverflow);
        self.shares_for(leveraged, Rounding::Up)
    }

    /// Collateral released by redeeming `shares`
    pub fn preview_redeem(&self, shares: U256) -> U256 {
        let leveraged = self.assets_for(shares, Rounding::Down);
        self.unleverage(leveraged, Rounding::Down)
    }

    // ========================================
    // CEP-4626 Actions
    // ========================================

    /// Deposit `assets` of collateral. The borrowed debt tokens and the
    /// minted shares both go to `receiver`.
    pub fn deposit(&mut self, assets: U256, receiver: Address) -> U256 {
        if assets > self.max_deposit(receiver) {
            self.env().revert(LeverageError::ExceededMaxDeposit);
        }
        let shares = self.preview_deposit(assets);
        self.deposit_internal(assets, shares, receiver);
        shares
    }

    /// Mint exactly `shares`, pulling the collateral `preview_mint` quotes
    pub fn mint(&mut self, shares: U256, receiver: Address) -> U256 {
        if shares > self.max_mint(receiver) {
            self.env().revert(LeverageError::ExceededMaxMint);
        }
        let assets = self.preview_mint(shares);
        self.deposit_internal(assets, shares, receiver);
        assets
    }

    /// Withdraw `assets` of collateral, burning `owner`'s shares. The
    /// matching debt repayment is pulled from `owner`.
    pub fn withdraw(&mut self, assets: U256, receiver: Address, owner: Address) -> U256 {
        if assets > self.max_withdraw(owner) {
            self.env().revert(LeverageError::ExceededMaxWithdraw);
        }
        let shares = self.preview_withdraw(assets);
        self.withdraw_internal(assets, shares, receiver, owner);
        shares
    }

    /// Redeem `shares` of `owner` for collateral. The matching debt
    /// repayment is pulled from `owner`. Returns collateral released.
    pub fn redeem(&mut self, shares: U256, receiver: Address, owner: Address) -> U256 {
        if shares > self.max_redeem(owner) {
            self.env().revert(LeverageError::ExceededMaxRedeem);
        }
        let assets = self.preview_redeem(shares);
        self.withdraw_internal(assets, shares, receiver, owner)
    }

    // ========================================
    // Leverage Views
    // ========================================

    pub fn collateral_token(&self) -> Address {
        self.collateral_token.get_or_revert_with(LeverageError::NotInitialized)
    }

    pub fn debt_token(&self) -> Address {
        self.debt_token.get_or_revert_with(LeverageError::NotInitialized)
    }

    pub fn lending_pool(&self) -> Address {
        self.lending_pool.get_or_revert_with(LeverageError::NotInitialized)
    }

    pub fn price_oracle(&self) -> Address {
        self.price_oracle.get_or_revert_with(LeverageError::NotInitialized)
    }

    pub fn get_lower_bound_bps(&self) -> U256 {
        self.lower_bound_bps.get_or_default()
    }

    pub fn get_target_leverage_bps(&self) -> U256 {
        self.target_leverage_bps.get_or_default()
    }

    pub fn get_upper_bound_bps(&self) -> U256 {
        self.upper_bound_bps.get_or_default()
    }

    pub fn get_max_subsidy_bps(&self) -> U256 {
        self.max_subsidy_bps.get_or_default()
    }

    pub fn get_min_deposit_base(&self) -> U256 {
        self.min_deposit_base.get_or_default()
    }

    pub fn get_restricted_tokens(&self) -> Vec<Address> {
        self.restricted_tokens.get_or_default()
    }

    pub fn get_owner(&self) -> Address {
        self.owner.get_or_revert_with(LeverageError::NotInitialized)
    }

    /// Collateral and debt the vault holds at the pool, in base currency
    pub fn get_total_collateral_and_debt_in_base(&self) -> PositionBase {
        let this = self.env().self_address();
        let pool = self.pool();
        let collateral_token = self.collateral_token();
        let debt_token = self.debt_token();

        let collateral = pool.collateral_balance(collateral_token, this);
        let debt = pool.debt_balance(debt_token, this);

        PositionBase {
            total_collateral_base: self.convert_from_token_to_base_currency(collateral, collateral_token),
            total_debt_base: self.convert_from_token_to_base_currency(debt, debt_token),
        }
    }

    /// Current leverage; zero when the vault holds no collateral
    pub fn get_current_leverage_bps(&self) -> U256 {
        let position = self.get_total_collateral_and_debt_in_base();
        LeverageMath::leverage_bps(position.total_collateral_base, position.total_debt_base)
            .unwrap_or_revert(&self.env())
    }

    /// True when an open position sits outside the configured bounds
    pub fn is_too_imbalanced(&self) -> bool {
        LeverageMath::is_out_of_bounds(
            self.get_current_leverage_bps(),
            self.get_lower_bound_bps(),
            self.get_upper_bound_bps(),
        )
    }

    /// Subsidy a rebalancer earns at the current leverage
    pub fn get_current_subsidy_bps(&self) -> U256 {
        self.subsidy_at(self.get_current_leverage_bps())
    }

    /// Exact token amount a rebalancer must provide to restore target
    /// leverage, net of subsidy. With `use_vault_token_balance` the vault's
    /// idle balance of that token is deducted, floored at zero.
    pub fn get_amount_to_reach_target_leverage(&self, use_vault_token_balance: bool) -> RebalanceQuote {
        let position = self.get_total_collateral_and_debt_in_base();
        let leverage = LeverageMath::leverage_bps(position.total_collateral_base, position.total_debt_base)
            .unwrap_or_revert(&self.env());
        let (amount_base, direction) = LeverageMath::rebalance_amount_base(
            position.total_collateral_base,
            position.total_debt_base,
            self.get_target_leverage_bps(),
            self.subsidy_at(leverage),
        )
        .unwrap_or_revert(&self.env());

        let token = match direction {
            RebalanceDirection::Increase => self.collateral_token(),
            RebalanceDirection::Decrease => self.debt_token(),
            RebalanceDirection::None => {
                return RebalanceQuote {
                    token_amount: U256::zero(),
                    direction,
                };
            }
        };

        let mut token_amount = self.convert_from_base_currency_to_token(amount_base, token);
        if use_vault_token_balance {
            let idle = self.token_balance(token);
            token_amount = token_amount.saturating_sub(idle);
        }

        RebalanceQuote {
            token_amount,
            direction,
        }
    }

    /// `assets * target / 100%`
    pub fn get_target_leveraged_assets(&self, assets: U256) -> U256 {
        LeverageMath::leveraged_assets(assets, self.get_target_leverage_bps())
            .unwrap_or_revert(&self.env())
    }

    /// Debt tokens `deposit(assets)` would borrow and hand to the receiver
    pub fn get_borrow_amount_for_deposit(&self, assets: U256) -> U256 {
        let leverage = self.leverage_or_target();
        self.debt_for_collateral(assets, leverage)
    }

    /// Debt tokens `redeem(shares)` would pull from the owner
    pub fn get_repay_amount_for_redeem(&self, shares: U256) -> U256 {
        let total_supply = self.shares.total_supply();
        if !shares.is_zero() && shares == total_supply {
            return self.pool().debt_balance(self.debt_token(), self.env().self_address());
        }
        let leverage = self.get_current_leverage_bps();
        if leverage.is_zero() {
            return U256::zero();
        }
        self.debt_for_collateral(self.preview_redeem(shares), leverage)
    }

    /// Value of `amount` of `token` in base currency
    pub fn convert_from_token_to_base_currency(&self, amount: U256, token: Address) -> U256 {
        let price = self.oracle().get_asset_price(token);
        mul_div(amount, price, self.token_unit(token), Rounding::Down)
            .unwrap_or_revert_with(&self.env(), LeverageError::MathOverflow)
    }

    /// Amount of `token` worth `amount` of base currency
    pub fn convert_from_base_currency_to_token(&self, amount: U256, token: Address) -> U256 {
        let price = self.oracle().get_asset_price(token);
        mul_div(amount, self.token_unit(token), price, Rounding::Down)
            .unwrap_or_revert_with(&self.env(), LeverageError::MathOverflow)
    }

    // ========================================
    // Rebalancing
    // ========================================

    /// Supply collateral (caller's `additional_collateral` plus any idle
    /// collateral) and receive the subsidized debt-token equivalent.
    /// Permissionless; requires leverage below target.
    pub fn increase_leverage(&mut self, additional_collateral: U256, min_output_debt: U256) -> U256 {
        self.lock();
        let leverage_before = self.rebalance_start_leverage();
        let target = self.get_target_leverage_bps();
        if leverage_before >= target {
            self.env().revert(LeverageError::LeverageAlreadyAtOrBeyondTarget);
        }
        let subsidy_bps = self.subsidy_at(leverage_before);

        let caller = self.env().caller();
        let this = self.env().self_address();
        let collateral_token = self.collateral_token();
        let debt_token = self.debt_token();
        if !additional_collateral.is_zero() {
            Cep18TokenContractRef::new(self.env(), collateral_token)
                .transfer_from(caller, this, additional_collateral);
        }

        let collateral_supplied = self.token_balance(collateral_token);
        if collateral_supplied.is_zero() {
            self.env().revert(LeverageError::ZeroAmount);
        }
        self.supply_to_pool(collateral_supplied);

        let value = self.convert_from_token_to_base_currency(collateral_supplied, collateral_token);
        let payout_base = LeverageMath::with_subsidy(value, subsidy_bps).unwrap_or_revert(&self.env());
        let debt_paid = self.convert_from_base_currency_to_token(payout_base, debt_token);
        if debt_paid.is_zero() {
            self.env().revert(LeverageError::ZeroAmount);
        }
        self.borrow_from_pool(debt_paid);

        let leverage_after = self.get_current_leverage_bps();
        if leverage_after <= leverage_before || leverage_after > target + U256::from(ONE_BPS) {
            self.env().revert(LeverageError::RebalanceOutOfRange);
        }
        if debt_paid < min_output_debt {
            self.env().revert(LeverageError::SlippageNotMet);
        }

        Cep18TokenContractRef::new(self.env(), debt_token).transfer(caller, debt_paid);

        self.env().emit_event(LeverageIncreased {
            caller,
            collateral_supplied,
            debt_paid,
            leverage_before,
            leverage_after,
            subsidy_bps,
        });
        self.unlock();
        debt_paid
    }

    /// Repay debt (caller's `additional_debt` plus any idle debt tokens,
    /// capped at the outstanding debt) and receive the subsidized collateral
    /// equivalent. Permissionless; requires leverage above target.
    pub fn decrease_leverage(&mut self, additional_debt: U256, min_output_collateral: U256) -> U256 {
        self.lock();
        let leverage_before = self.rebalance_start_leverage();
        let target = self.get_target_leverage_bps();
        if leverage_before <= target {
            self.env().revert(LeverageError::LeverageAlreadyAtOrBelowTarget);
        }
        let subsidy_bps = self.subsidy_at(leverage_before);

        let caller = self.env().caller();
        let this = self.env().self_address();
        let collateral_token = self.collateral_token();
        let debt_token = self.debt_token();
        if !additional_debt.is_zero() {
            Cep18TokenContractRef::new(self.env(), debt_token).transfer_from(caller, this, additional_debt);
        }

        let idle_debt = self.token_balance(debt_token);
        let outstanding = self.pool().debt_balance(debt_token, this);
        let debt_repaid = if idle_debt < outstanding { idle_debt } else { outstanding };
        if debt_repaid.is_zero() {
            self.env().revert(LeverageError::ZeroAmount);
        }
        self.repay_to_pool(debt_repaid);

        let value = self.convert_from_token_to_base_currency(debt_repaid, debt_token);
        let payout_base = LeverageMath::with_subsidy(value, subsidy_bps).unwrap_or_revert(&self.env());
        let collateral_paid = self.convert_from_base_currency_to_token(payout_base, collateral_token);
        if collateral_paid.is_zero() {
            self.env().revert(LeverageError::ZeroAmount);
        }
        self.withdraw_from_pool(collateral_paid);

        let leverage_after = self.get_current_leverage_bps();
        if leverage_after >= leverage_before || leverage_after + U256::from(ONE_BPS) < target {
            self.env().revert(LeverageError::RebalanceOutOfRange);
        }
        if collateral_paid < min_output_collateral {
            self.env().revert(LeverageError::SlippageNotMet);
        }

        Cep18TokenContractRef::new(self.env(), collateral_token).transfer(caller, collateral_paid);

        self.env().emit_event(LeverageDecreased {
            caller,
            debt_repaid,
            collateral_paid,
            leverage_before,
            leverage_after,
            subsidy_bps,
        });
        self.unlock();
        collateral_paid
    }

    // ========================================
    // Owner Functions
    // ========================================

    /// Update the imbalance bounds and target (owner only)
    pub fn set_leverage_bounds(&mut self, lower_bound_bps: U256, target_leverage_bps: U256, upper_bound_bps: U256) {
        self.only_owner();
        self.lock();
        LeverageMath::validate_config(
            lower_bound_bps,
            target_leverage_bps,
            upper_bound_bps,
            self.get_max_subsidy_bps(),
        )
        .unwrap_or_revert(&self.env());

        self.lower_bound_bps.set(lower_bound_bps);
        self.target_leverage_bps.set(target_leverage_bps);
        self.upper_bound_bps.set(upper_bound_bps);

        self.env().emit_event(LeverageBoundsUpdated {
            lower_bound_bps,
            target_leverage_bps,
            upper_bound_bps,
        });
        self.unlock();
    }

    /// Update the rebalance subsidy cap (owner only)
    pub fn set_max_subsidy_bps(&mut self, max_subsidy_bps: U256) {
        self.only_owner();
        self.lock();
        LeverageMath::validate_config(
            self.get_lower_bound_bps(),
            self.get_target_leverage_bps(),
            self.get_upper_bound_bps(),
            max_subsidy_bps,
        )
        .unwrap_or_revert(&self.env());

        let old_max_subsidy_bps = self.get_max_subsidy_bps();
        self.max_subsidy_bps.set(max_subsidy_bps);

        self.env().emit_event(MaxSubsidyUpdated {
            old_max_subsidy_bps,
            new_max_subsidy_bps: max_subsidy_bps,
        });
        self.unlock();
    }

    /// Update the smallest accepted deposit value (owner only)
    pub fn set_min_deposit_base(&mut self, min_deposit_base: U256) {
        self.only_owner();
        self.lock();
        let old_min_deposit_base = self.get_min_deposit_base();
        self.min_deposit_base.set(min_deposit_base);

        self.env().emit_event(MinDepositUpdated {
            old_min_deposit_base,
            new_min_deposit_base: min_deposit_base,
        });
        self.unlock();
    }

    /// Sweep a token sent to the vault by mistake (owner only). Collateral,
    /// debt and any extra restricted token can never be swept.
    pub fn rescue_token(&mut self, token: Address, to: Address, amount: U256) {
        self.only_owner();
        self.lock();
        if self.get_restricted_tokens().contains(&token) {
            self.env().revert(LeverageError::RestrictedAssetRescue);
        }
        Cep18TokenContractRef::new(self.env(), token).transfer(to, amount);

        self.env().emit_event(TokenRescued { token, to, amount });
        self.unlock();
    }

    // ========================================
    // Internal Functions
    // ========================================

    fn deposit_internal(&mut self, assets: U256, shares: U256, receiver: Address) {
        self.lock();
        if assets.is_zero() || shares.is_zero() {
            self.env().revert(LeverageError::ZeroAmount);
        }
        if self.is_too_imbalanced() {
            self.env().revert(LeverageError::TooImbalanced);
        }

        // below the floor the borrow rounds away in base currency
        let value = self.convert_from_token_to_base_currency(assets, self.collateral_token());
        if value < self.get_min_deposit_base() {
            self.env().revert(LeverageError::DebtBalanceNotIncreased);
        }

        let leverage_before = self.leverage_or_target();
        let caller = self.env().caller();
        let this = self.env().self_address();

        Cep18TokenContractRef::new(self.env(), self.collateral_token()).transfer_from(caller, this, assets);
        self.supply_to_pool(assets);

        let borrow_amount = self.debt_for_collateral(assets, leverage_before);
        if borrow_amount.is_zero() {
            self.env().revert(LeverageError::DebtBalanceNotIncreased);
        }
        self.borrow_from_pool(borrow_amount);
        Cep18TokenContractRef::new(self.env(), self.debt_token()).transfer(receiver, borrow_amount);

        self.shares.mint_internal(receiver, shares);

        self.env().emit_event(Deposit {
            sender: caller,
            owner: receiver,
            assets,
            shares,
        });
        self.unlock();
    }

    fn withdraw_internal(&mut self, assets: U256, shares: U256, receiver: Address, owner: Address) -> U256 {
        self.lock();
        if shares.is_zero() || assets.is_zero() {
            self.env().revert(LeverageError::ZeroAmount);
        }
        if self.shares.balance_of(owner) < shares {
            self.env().revert(LeverageError::InsufficientShares);
        }

        let caller = self.env().caller();
        if caller != owner {
            self.shares.spend_allowance(owner, caller, shares);
        }

        let this = self.env().self_address();
        let pool = self.pool();
        let collateral_token = self.collateral_token();
        let debt_token = self.debt_token();

        // the last shares out close the whole position
        let (collateral_out, repay_amount) = if shares == self.shares.total_supply() {
            (pool.collateral_balance(collateral_token, this), pool.debt_balance(debt_token, this))
        } else {
            let leverage = self.get_current_leverage_bps();
            let repay = if leverage.is_zero() { U256::zero() } else { self.debt_for_collateral(assets, leverage) };
            (assets, repay)
        };

        if !repay_amount.is_zero() {
            let mut debt = Cep18TokenContractRef::new(self.env(), debt_token);
            if debt.allowance(owner, this) < repay_amount {
                self.env().revert(LeverageError::InsufficientAllowance);
            }
            debt.transfer_from(owner, this, repay_amount);
            self.repay_to_pool(repay_amount);
        }

        if collateral_out.is_zero() {
            self.env().revert(LeverageError::ZeroAmount);
        }
        self.withdraw_from_pool(collateral_out);
        self.shares.burn_internal(owner, shares);
        Cep18TokenContractRef::new(self.env(), collateral_token).transfer(receiver, collateral_out);

        self.env().emit_event(Withdraw {
            sender: caller,
            receiver,
            owner,
            assets: collateral_out,
            shares,
        });
        self.unlock();
        collateral_out
    }

    /// Supply collateral held by the vault; pool collateral must rise by `amount`
    fn supply_to_pool(&mut self, amount: U256) {
        let this = self.env().self_address();
        let collateral_token = self.collateral_token();
        let mut pool = self.pool();
        Cep18TokenContractRef::new(self.env(), collateral_token).approve(self.lending_pool(), amount);

        let before = pool.collateral_balance(collateral_token, this);
        pool.supply(collateral_token, amount, this);
        let after = pool.collateral_balance(collateral_token, this);
        self.validate_delta(after.checked_sub(before), amount);
    }

    /// Borrow to the vault; its debt token balance must rise by exactly `amount`
    fn borrow_from_pool(&mut self, amount: U256) {
        let this = self.env().self_address();
        let debt_token = self.debt_token();
        let before = self.token_balance(debt_token);
        self.pool().borrow(debt_token, amount, this);
        let after = self.token_balance(debt_token);

        if after <= before {
            self.env().revert(LeverageError::DebtBalanceNotIncreased);
        }
        if after - before != amount {
            self.env().revert(LeverageError::BalanceDeltaMismatch);
        }
    }

    /// Repay from the vault's debt tokens; pool debt must fall by `amount`
    fn repay_to_pool(&mut self, amount: U256) {
        let this = self.env().self_address();
        let debt_token = self.debt_token();
        let mut pool = self.pool();
        Cep18TokenContractRef::new(self.env(), debt_token).approve(self.lending_pool(), amount);

        let before = pool.debt_balance(debt_token, this);
        pool.repay(debt_token, amount, this);
        let after = pool.debt_balance(debt_token, this);
        self.validate_delta(before.checked_sub(after), amount);
    }

    /// Withdraw to the vault; its collateral balance must rise by `amount`
    fn withdraw_from_pool(&mut self, amount: U256) {
        let this = self.env().self_address();
        let collateral_token = self.collateral_token();
        let before = self.token_balance(collateral_token);
        self.pool().withdraw(collateral_token, amount, this);
        let after = self.token_balance(collateral_token);
        self.validate_delta(after.checked_sub(before), amount);
    }

    /// `moved` is `None` when the balance went the wrong way
    fn validate_delta(&self, moved: Option<U256>, expected: U256) {
        let tolerance = U256::from(POOL_DELTA_TOLERANCE);
        match moved {
            Some(delta) if !delta.is_zero() => {
                let diff = if delta > expected { delta - expected } else { expected - delta };
                if diff > tolerance {
                    self.env().revert(LeverageError::BalanceDeltaMismatch);
                }
            }
            _ => self.env().revert(LeverageError::BalanceDeltaMismatch),
        }
    }

    /// Leverage at the start of a rebalance; reverts without a position
    fn rebalance_start_leverage(&self) -> U256 {
        let position = self.get_total_collateral_and_debt_in_base();
        if position.total_collateral_base.is_zero() {
            self.env().revert(LeverageError::NoPositionToRebalance);
        }
        LeverageMath::leverage_bps(position.total_collateral_base, position.total_debt_base)
            .unwrap_or_revert(&self.env())
    }

    /// Current leverage, or the target for an empty vault
    fn leverage_or_target(&self) -> U256 {
        let leverage = self.get_current_leverage_bps();
        if leverage.is_zero() { self.get_target_leverage_bps() } else { leverage }
    }

    /// Debt tokens matching `collateral_amount` at `leverage_bps`
    fn debt_for_collateral(&self, collateral_amount: U256, leverage_bps: U256) -> U256 {
        let value = self.convert_from_token_to_base_currency(collateral_amount, self.collateral_token());
        let debt_value = LeverageMath::debt_for_collateral(value, leverage_bps).unwrap_or_revert(&self.env());
        self.convert_from_base_currency_to_token(debt_value, self.debt_token())
    }

    fn subsidy_at(&self, leverage_bps: U256) -> U256 {
        LeverageMath::subsidy_bps(leverage_bps, self.get_target_leverage_bps(), self.get_max_subsidy_bps())
            .unwrap_or_revert(&self.env())
    }

    /// Leveraged amount back to collateral units
    fn unleverage(&self, leveraged: U256, rounding: Rounding) -> U256 {
        mul_div(leveraged, one_hundred_percent(), self.get_target_leverage_bps(), rounding)
            .unwrap_or_revert_with(&self.env(), LeverageError::MathOverflow)
    }

    fn shares_for(&self, assets: U256, rounding: Rounding) -> U256 {
        to_shares(assets, self.shares.total_supply(), self.total_assets(), rounding)
            .unwrap_or_revert_with(&self.env(), LeverageError::MathOverflow)
    }

    fn assets_for(&self, shares: U256, rounding: Rounding) -> U256 {
        to_assets(shares, self.shares.total_supply(), self.total_assets(), rounding)
            .unwrap_or_revert_with(&self.env(), LeverageError::MathOverflow)
    }

    fn token_balance(&self, token: Address) -> U256 {
        Cep18TokenContractRef::new(self.env(), token).balance_of(self.env().self_address())
    }

    /// `10^decimals` of `token`
    fn token_unit(&self, token: Address) -> U256 {
        let decimals = Cep18TokenContractRef::new(self.env(), token).decimals();
        U256::exp10(decimals as usize)
    }

    fn pool(&self) -> LendingPoolAdapterContractRef {
        LendingPoolAdapterContractRef::new(self.env(), self.lending_pool())
    }

    fn oracle(&self) -> PriceOracleAdapterContractRef {
        PriceOracleAdapterContractRef::new(self.env(), self.price_oracle())
    }

    fn only_owner(&self) {
        if self.env().caller() != self.get_owner() {
            self.env().revert(LeverageError::Unauthorized);
        }
    }

    fn lock(&mut self) {
        if self.locked.get_or_default() {
            self.env().revert(LeverageError::Locked);
        }
        self.locked.set(true);
    }

    fn unlock(&mut self) {
        self.locked.set(false);
    }
}

/// Leverage-specific entry points consumed by the wrappers and keepers.
/// The CEP-4626 and CEP-18 parts are reached through `Cep4626Vault` and
/// `Cep18Token`.
#[odra::external_contract]
pub trait LeverageVaultAdapter {
    fn collateral_token(&self) -> Address;

    fn debt_token(&self) -> Address;

    fn get_target_leveraged_assets(&self, assets: U256) -> U256;

    fn get_borrow_amount_for_deposit(&self, assets: U256) -> U256;

    fn get_repay_amount_for_redeem(&self, shares: U256) -> U256;

    fn convert_from_token_to_base_currency(&self, amount: U256, token: Address) -> U256;

    fn convert_from_base_currency_to_token(&self, amount: U256, token: Address) -> U256;

    fn get_current_leverage_bps(&self) -> U256;

    fn is_too_imbalanced(&self) -> bool;

    fn get_amount_to_reach_target_leverage(&self, use_vault_token_balance: bool) -> RebalanceQuote;

    fn increase_leverage(&mut self, additional_collateral: U256, min_output_debt: U256) -> U256;

    fn decrease_leverage(&mut self, additional_debt: U256, min_output_collateral: U256) -> U256;
}
