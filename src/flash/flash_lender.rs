//! Flash Lender - Single-transaction loans of any held CEP-18 token
//!
//! The lender transfers the principal to the receiver, invokes the
//! receiver's `on_flash_loan` callback and then pulls principal plus fee
//! back with `transfer_from`. The receiver must approve the lender for
//! `amount + fee` before returning from the callback.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::casper_types::bytesrepr::Bytes;
use odra::ContractRef;
use super::errors::FlashError;
use super::events::{FlashLoan, FlashFeeUpdated};
use crate::math::{mul_div, one_hundred_percent, Rounding};
use crate::token::Cep18TokenContractRef;

/// Flash Lender contract
#[odra::module(events = [FlashLoan, FlashFeeUpdated])]
pub struct FlashLender {
    /// Fee charged on the principal, in ONE_HUNDRED_PERCENT_BPS scale
    fee_bps: Var<U256>,
    /// Admin address
    admin: Var<Address>,
    /// Reentrancy lock
    locked: Var<bool>,
}

#[odra::module]
impl FlashLender {
    /// Initialize the flash lender
    pub fn init(&mut self, fee_bps: U256) {
        self.validate_fee(fee_bps);
        let caller = self.env().caller();
        self.fee_bps.set(fee_bps);
        self.admin.set(caller);
        self.locked.set(false);
    }

    /// Lend `amount` of `token` to `receiver` for the duration of its
    /// `on_flash_loan` callback
    pub fn flash_loan(&mut self, receiver: Address, token: Address, amount: U256, data: Bytes) -> bool {
        self.lock();
        if amount.is_zero() {
            self.env().revert(FlashError::ZeroAmount);
        }
        if amount > self.max_flash_loan(token) {
            self.env().revert(FlashError::InsufficientLiquidity);
        }

        let initiator = self.env().caller();
        let this = self.env().self_address();
        let fee = self.flash_fee(token, amount);
        let mut token_ref = Cep18TokenContractRef::new(self.env(), token);
        let balance_before = token_ref.balance_of(this);

        token_ref.transfer(receiver, amount);

        let mut borrower = FlashBorrowerContractRef::new(self.env(), receiver);
        if !borrower.on_flash_loan(initiator, token, amount, fee, data) {
            self.env().revert(FlashError::CallbackFailed);
        }

        token_ref.transfer_from(receiver, this, amount + fee);
        if token_ref.balance_of(this) < balance_before + fee {
            self.env().revert(FlashError::FlashLoanShortfall);
        }

        self.env().emit_event(FlashLoan {
            initiator,
            receiver,
            token,
            amount,
            fee,
        });
        self.unlock();
        true
    }

    /// Fee charged for borrowing `amount` of `token`
    #[allow(unused_variables)]
    pub fn flash_fee(&self, token: Address, amount: U256) -> U256 {
        mul_div(amount, self.fee_bps.get_or_default(), one_hundred_percent(), Rounding::Up)
            .unwrap_or_revert_with(&self.env(), FlashError::InsufficientLiquidity)
    }

    /// Largest loan available in `token`
    pub fn max_flash_loan(&self, token: Address) -> U256 {
        Cep18TokenContractRef::new(self.env(), token).balance_of(self.env().self_address())
    }

    pub fn get_fee_bps(&self) -> U256 {
        self.fee_bps.get_or_default()
    }

    /// Update the flash fee (admin only)
    pub fn set_fee_bps(&mut self, fee_bps: U256) {
        self.only_admin();
        self.validate_fee(fee_bps);
        let old_fee_bps = self.fee_bps.get_or_default();
        self.fee_bps.set(fee_bps);

        self.env().emit_event(FlashFeeUpdated {
            old_fee_bps,
            new_fee_bps: fee_bps,
        });
    }

    // ========================================
    // Internal Functions
    // ========================================

    fn validate_fee(&self, fee_bps: U256) {
        if fee_bps > one_hundred_percent() {
            self.env().revert(FlashError::InvalidFee);
        }
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(FlashError::Unauthorized);
        if caller != admin {
            self.env().revert(FlashError::Unauthorized);
        }
    }

    fn lock(&mut self) {
        if self.locked.get_or_default() {
            self.env().revert(FlashError::Locked);
        }
        self.locked.set(true);
    }

    fn unlock(&mut self) {
        self.locked.set(false);
    }
}

/// Flash loan provider consumed by the leverage wrappers
#[odra::external_contract]
pub trait FlashLoanAdapter {
    /// Lend `amount` of `token` to `receiver` for one callback
    fn flash_loan(&mut self, receiver: Address, token: Address, amount: U256, data: Bytes) -> bool;

    /// Fee for borrowing `amount` of `token`
    fn flash_fee(&self, token: Address, amount: U256) -> U256;

    /// Largest loan available in `token`
    fn max_flash_loan(&self, token: Address) -> U256;
}

/// Callback implemented by flash loan receivers
#[odra::external_contract]
pub trait FlashBorrower {
    /// Called by the lender once `amount` has been transferred. Must approve
    /// the lender for `amount + fee` and return true.
    fn on_flash_loan(
        &mut self,
        initiator: Address,
        token: Address,
        amount: U256,
        fee: U256,
        data: Bytes,
    ) -> bool;
}
