//! Leveraged Redeemer - one-step exit from a vault
//!
//! The vault only releases collateral once the matching debt is repaid. The
//! wrapper flash-borrows that debt, redeems the caller's shares, sells just
//! enough of the released collateral to repay the loan and hands the rest
//! to the receiver.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::casper_types::bytesrepr::Bytes;
use odra::ContractRef;
use super::errors::WrapperError;
use super::events::{LeftoverTransferred, LeveragedRedeem, MinLeftoverUpdated};
use super::leftovers::LeftoverPolicy;
use crate::cep4626::Cep4626VaultContractRef;
use crate::dex::DexAdapterContractRef;
use crate::flash::FlashLoanAdapterContractRef;
use crate::leverage::events::TokenRescued;
use crate::leverage::LeverageVaultAdapterContractRef;
use crate::math::{mul_div, one_hundred_percent, Rounding};
use crate::token::Cep18TokenContractRef;

/// State carried from `redeem` into the flash loan callback
#[odra::odra_type]
pub struct RedeemContext {
    pub vault: Address,
    pub shares: U256,
    pub min_output_collateral: U256,
    pub swap_payload: Bytes,
}

/// Leveraged Redeemer contract
#[odra::module(events = [LeveragedRedeem, LeftoverTransferred, MinLeftoverUpdated, TokenRescued])]
pub struct LeveragedRedeemer {
    /// Flash loan provider
    flash_lender: Var<Address>,
    /// Swap venue for collateral -> debt
    dex: Var<Address>,
    /// Dust thresholds and leftover returns
    leftovers: SubModule<LeftoverPolicy>,
    /// Set only while a redemption's flash loan is outstanding
    context: Var<Option<RedeemContext>>,
    /// Owner address
    owner: Var<Address>,
    /// Reentrancy lock
    locked: Var<bool>,
}

#[odra::module]
impl LeveragedRedeemer {
    pub fn init(&mut self, flash_lender: Address, dex: Address) {
        self.flash_lender.set(flash_lender);
        self.dex.set(dex);
        self.context.set(None);
        self.owner.set(self.env().caller());
        self.locked.set(false);
    }

    /// Redeem the caller's `shares` of `vault` (approved to this wrapper)
    /// and send the net collateral to `receiver`. Reverts
    /// `BelowMinimumReceive` under `min_output_collateral`. Returns the
    /// collateral sent.
    pub fn redeem(
        &mut self,
        shares: U256,
        receiver: Address,
        min_output_collateral: U256,
        swap_payload: Bytes,
        vault: Address,
    ) -> U256 {
        self.lock();
        if shares.is_zero() {
            self.env().revert(WrapperError::ZeroAmount);
        }

        let caller = self.env().caller();
        let this = self.env().self_address();
        let vault_ref = LeverageVaultAdapterContractRef::new(self.env(), vault);
        let collateral_token = vault_ref.collateral_token();
        let debt_token = vault_ref.debt_token();

        let collateral_before = self.token_balance(collateral_token);
        let debt_before = self.token_balance(debt_token);
        Cep18TokenContractRef::new(self.env(), vault).transfer_from(caller, this, shares);

        let flash_amount = vault_ref.get_repay_amount_for_redeem(shares);
        if flash_amount.is_zero() {
            // nothing to repay, the vault releases collateral directly
            Cep4626VaultContractRef::new(self.env(), vault).redeem(shares, this, this);
        } else {
            self.context.set(Some(RedeemContext {
                vault,
                shares,
                min_output_collateral,
                swap_payload,
            }));
            self.lender().flash_loan(this, debt_token, flash_amount, Bytes::new());
            self.context.set(None);
        }

        let collateral_out = self.token_balance(collateral_token).saturating_sub(collateral_before);
        if collateral_out < min_output_collateral {
            self.env().revert(WrapperError::BelowMinimumReceive);
        }
        Cep18TokenContractRef::new(self.env(), collateral_token).transfer(receiver, collateral_out);
        self.leftovers.sweep(vault, debt_token, debt_before, receiver);

        self.env().emit_event(LeveragedRedeem {
            caller,
            receiver,
            vault,
            shares,
            flash_amount,
            collateral_out,
        });
        self.unlock();
        collateral_out
    }

    /// Flash loan callback: repay the position, buy back the loan in debt
    /// tokens and approve repayment
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

        // the vault pulls the repayment from its owner, which is us
        debt.approve(ctx.vault, amount);
        let released = Cep4626VaultContractRef::new(self.env(), ctx.vault).redeem(ctx.shares, this, this);
        if released < ctx.min_output_collateral {
            self.env().revert(WrapperError::BelowMinimumReceive);
        }

        let owed = amount + fee;
        let max_collateral_in = released - ctx.min_output_collateral;
        let dex = self.get_dex();
        Cep18TokenContractRef::new(self.env(), collateral_token).approve(dex, max_collateral_in);
        DexAdapterContractRef::new(self.env(), dex).swap_exact_output(
            collateral_token,
            token,
            owed,
            max_collateral_in,
            ctx.swap_payload,
        );

        if debt.balance_of(this) < owed {
            self.env().revert(WrapperError::FlashLoanShortfall);
        }
        debt.approve(self.get_flash_lender(), owed);
        true
    }

    /// Collateral `redeem(shares)` should yield after buying back the flash
    /// loan at oracle prices, discounted by `slippage_bps`
    pub fn calculate_min_output_collateral(&self, shares: U256, slippage_bps: U256, vault: Address) -> U256 {
        let keep = one_hundred_percent()
            .checked_sub(slippage_bps)
            .unwrap_or_revert_with(&self.env(), WrapperError::InvalidSlippage);

        let vault_ref = LeverageVaultAdapterContractRef::new(self.env(), vault);
        let collateral_token = vault_ref.collateral_token();
        let debt_token = vault_ref.debt_token();

        let released = Cep4626VaultContractRef::new(self.env(), vault).preview_redeem(shares);
        let repay = vault_ref.get_repay_amount_for_redeem(shares);
        let owed = repay + self.lender().flash_fee(debt_token, repay);
        let owed_base = vault_ref.convert_from_token_to_base_currency(owed, debt_token);
        let owed_in_collateral = vault_ref.convert_from_base_currency_to_token(owed_base, collateral_token);

        mul_div(released.saturating_sub(owed_in_collateral), keep, one_hundred_percent(), Rounding::Down)
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
