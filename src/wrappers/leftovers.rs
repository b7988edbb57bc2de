//! Leftover handling shared by the wrappers
//!
//! A wrapper operation can end with a few tokens it did not need (a swap
//! that filled cheaper than quoted, a rounding remainder). Anything gained
//! above the per-(vault, token) dust threshold goes back to the operation's
//! receiver; anything at or below it stays in the wrapper.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use super::events::{LeftoverTransferred, MinLeftoverUpdated};
use crate::token::Cep18TokenContractRef;

#[odra::module(events = [LeftoverTransferred, MinLeftoverUpdated])]
pub struct LeftoverPolicy {
    /// Dust threshold: (vault, token) -> amount
    min_leftover: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl LeftoverPolicy {
    pub fn get_min_leftover(&self, vault: Address, token: Address) -> U256 {
        self.min_leftover.get(&(vault, token)).unwrap_or_default()
    }
}

// Called by the owning wrapper after its own checks.
impl LeftoverPolicy {
    pub(crate) fn set_min_leftover(&mut self, vault: Address, token: Address, min_amount: U256) {
        self.min_leftover.set(&(vault, token), min_amount);
        self.env().emit_event(MinLeftoverUpdated {
            vault,
            token,
            min_amount,
        });
    }

    /// Returns whatever `token` balance the wrapper gained since
    /// `balance_before` to `receiver`, when it exceeds the threshold.
    /// Returns the amount sent.
    pub(crate) fn sweep(&mut self, vault: Address, token: Address, balance_before: U256, receiver: Address) -> U256 {
        let mut token_ref = Cep18TokenContractRef::new(self.env(), token);
        let gained = token_ref
            .balance_of(self.env().self_address())
            .saturating_sub(balance_before);
        if gained.is_zero() || gained <= self.get_min_leftover(vault, token) {
            return U256::zero();
        }

        token_ref.transfer(receiver, gained);
        self.env().emit_event(LeftoverTransferred {
            vault,
            token,
            receiver,
            amount: gained,
        });
        gained
    }
}
