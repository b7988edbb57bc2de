//! Leveraged Depositor - one-step leveraged entry into a vault
//!
//! The caller brings only equity. The wrapper flash-borrows the debt the
//! vault will hand out for the full leveraged deposit, swaps it into the
//! missing collateral, deposits everything and repays the loan out of the
//! debt tokens the vault returns. Shares go to the receiver.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::casper_types::bytesrepr::Bytes;
use odra::ContractRef;
use super::errors::WrapperError;
use super::events::{LeftoverTransferred, LeveragedDeposit, MinLeftoverUpdated};
use super::leftovers::LeftoverPolicy;
use crate::cep4626::Cep4626VaultContractRef;
use crate::dex::DexAdapterContractRef;
use crate::flash::FlashLoanAdapterContractRef;
use crate::leverage::events::TokenRescued;
use crate::leverage::LeverageVaultAdapterContractRef;
use crate::math::{mul_div, one_hundred_percent, Rounding};
use crate::token::Cep18TokenContractRef;

/// State carried from `deposit` into the flash loan callback
#[odra::odra_type]
pub struct DepositContext {
    pub vault: Address,
    pub receiver: Address,
    pub input_assets: U256,
    pub total_assets: U256,
    pub swap_payload: Bytes,
}

/// Leveraged Depositor contract
#[odra::module(events = [LeveragedDeposit, LeftoverTransferred, MinLeftoverUpdated, TokenRescued])]
pub struct LeveragedDepositor {
    /// Flash loan provider
    flash_lender: Var<Address>,
    /// Swap venue for debt -> collateral
    dex: Var<Address>,
    /// Dust thresholds and leftover returns
    leftovers: SubModule<LeftoverPolicy>,
    /// Set only while a deposit's flash loan is outstanding
    context: Var<Option<DepositContext>>,
    /// Owner address
    owner: Var<Address>,
    /// Reentrancy lock
    locked: Var<bool>,
}

#[odra::module]
impl LeveragedDepositor {
    pub fn init(&mut self, flash_lender: Address, dex: Address) {
        self.flash_lender.set(flash_lender);
        self.dex.set(dex);
        self.context.set(None);
        self.owner.set(self.env().caller());
        self.locked.set(false);
    }

    /// Deposit `input_assets` of collateral into `vault` at its leverage.
    /// Reverts `SlippageNotMet` when `receiver` ends up with fewer than
    /// `min_output_shares` new shares. Returns shares received.
    pub fn deposit(
        &mut self,
        input_assets: U256,
        receiver: Address,
        min_output_shares: U256,
        swap_payload: Bytes,
        vault: Address,
    ) -> U256 {
        self.lock();
        if input_assets.is_zero() {
            self.env().revert(WrapperError::ZeroAmount);
        }

        let caller = self.env().caller();
        let this = self.env().self_address();
        let vault_ref = LeverageVaultAdapterContractRef::new(self.env(), vault);
        let collateral_token = vault_ref.collateral_token();
        let debt_token = vault_ref.debt_token();

        let collateral_before = self.token_balance(collateral_token);
        let debt_before = self.token_balance(debt_token);
        Cep18TokenContractRef::new(self.env(), collateral_token).transfer_from(caller, this, input_assets);

        // deposit enough to cover the minimum; the slippage budget lowers
        // effective leverage instead of starving the repayment
        let required = Cep4626VaultContractRef::new(self.env(), vault).preview_mint(min_output_shares);
        let total_assets = if required > input_assets { required } else { input_assets };

        let borrow_amount = vault_ref.get_borrow_amount_for_deposit(total_assets);
        let mut lender = self.lender();
        let fee = lender.flash_fee(debt_token, borrow_amount);
        let flash_amount = borrow_amount.saturating_sub(fee);
        if flash_amount.is_zero() {
            self.env().revert(WrapperError::ZeroAmount);
        }

        let shares_ref = Cep18TokenContractRef::new(self.env(), vault);
        let shares_before = shares_ref.balance_of(receiver);

        self.context.set(Some(DepositContext {
            vault,
            receiver,
            input_assets,
            total_assets,
            swap_payload,
        }));
        lender.flash_loan(this, debt_token, flash_amount, Bytes::new());
        self.context.set(None);

        let shares = shares_ref.balance_of(receiver).saturating_sub(shares_before);
        if shares < min_output_shares {
            self.env().revert(WrapperError::SlippageNotMet);
        }

        self.leftovers.sweep(vault, collateral_token, collateral_before, receiver);
        self.leftovers.sweep(vault, debt_token, debt_before, receiver);

        self.env().emit_event(LeveragedDeposit {
            caller,
            receiver,
            vault,
            input_assets,
            total_assets,
            flash_amount,
            shares,
        });
        self.unlock();
        shares
    }

    /// Flash loan callback: swap the loan into collateral, deposit, forward
    /// shares and approve repayment
    #[allow(unused_variables)]
    pub fn on_flash_loan(
        &mut self,
        initiator: Address,
        token: Address,
        amount: U256,
        fee: U256,
        data: Bytes,
    ) -> bool {
        let this = self.env().self_address();
        if self.env().caller() != self.get_flash_lender() {
            self.env().revert(WrapperError::UnauthorizedFlashLender);
        }
        if initiator != this {
            self.env().revert(WrapperError::UnexpectedFlashInitiator);
        }
        let ctx = self
            .context
            .get()
            .flatten()
            .unwrap_or_revert_with(&self.env(), WrapperError::NoOperationInProgress);

        let collateral_token = LeverageVaultAdapterContractRef::new(self.env(), ctx.vault).collateral_token();
        let mut debt = Cep18TokenContractRef::new(self.env(), token);

        let missing = ctx.total_assets - ctx.input_assets;
        if !missing.is_zero() {
            let dex = self.get_dex();
            debt.approve(dex, amount);
            DexAdapterContractRef::new(self.env(), dex).swap_exact_output(
                token,
                collateral_token,
                missing,
                amount,
                ctx.swap_payload,
            );
        }

        Cep18TokenContractRef::new(self.env(), collateral_token).approve(ctx.vault, ctx.total_assets);
        let shares = Cep4626VaultContractRef::new(self.env(), ctx.vault).deposit(ctx.total_assets, this);
        Cep18TokenContractRef::new(self.env(), ctx.vault).transfer(ctx.receiver, shares);

        let owed = amount + fee;
        if debt.balance_of(this) < owed {
            self.env().revert(WrapperError::FlashLoanShortfall);
        }
        debt.approve(self.get_flash_lender(), owed);
        true
    }

    /// Shares `deposit(input_assets)` should yield at full target leverage,
    /// discounted by `slippage_bps`
    pub fn calculate_min_output_shares(&self, input_assets: U256, slippage_bps: U256, vault: Address) -> U256 {
        let keep = one_hundred_percent()
            .checked_sub(slippage_bps)
            .unwrap_or_revert_with(&self.env(), WrapperError::InvalidSlippage);
        let leveraged = LeverageVaultAdapterContractRef::new(self.env(), vault).get_target_leveraged_assets(input_assets);
        let expected = Cep4626VaultContractRef::new(self.env(), vault).preview_deposit(leveraged);
        mul_div(expected, keep, one_hundred_percent(), Rounding::Down)
            .unwrap_or_revert_with(&self.env(), WrapperError::InvalidSlippage)
    }

    // ========================================
    // Configuration
    // ========================================

    pub fn get_flash_lender(&self) -> Address {
        self.flash_lender.get_or_revert_with(WrapperError::NotInitialized)
    }

    pub fn get_dex(&self) -> Address {
        self.dex.get_or_revert_with(WrapperError::NotInitialized)
    }

    pub fn get_owner(&self) -> Address {
        self.owner.get_or_revert_with(WrapperError::NotInitialized)
    }

    pub fn get_min_leftover_amount(&self, vault: Address, token: Address) -> U256 {
        self.leftovers.get_min_leftover(vault, token)
    }

    /// Set the dust threshold for `token` left over from `vault` operations (owner only)
    pub fn set_min_leftover_amount(&mut self, vault: Address, token: Address, min_amount: U256) {
        self.only_owner();
        self.lock();
        self.leftovers.set_min_leftover(vault, token, min_amount);
        self.unlock();
    }

    /// Sweep any token held by the wrapper (owner only)
    pub fn rescue_token(&mut self, token: Address, to: Address, amount: U256) {
        self.only_owner();
        self.lock();
        Cep18TokenContractRef::new(self.env(), token).transfer(to, amount);
        self.env().emit_event(TokenRescued { token, to, amount });
        self.unlock();
    }

    // ========================================
    // Internal Functions
    // ========================================

    fn lender(&self) -> FlashLoanAdapterContractRef {
        FlashLoanAdapterContractRef::new(self.env(), self.get_flash_lender())
    }

    fn token_balance(&self, token: Address) -> U256 {
        Cep18TokenContractRef::new(self.env(), token).balance_of(self.env().self_address())
    }

    fn only_owner(&self) {
        if self.env().caller() != self.get_owner() {
            self.env().revert(WrapperError::Unauthorized);
        }
    }

    fn lock(&mut self) {
        if self.locked.get_or_default() {
            self.env().revert(WrapperError::Locked);
        }
        self.locked.set(true);
    }

    fn unlock(&mut self) {
        self.locked.set(false);
    }
}
