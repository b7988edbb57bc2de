//! Two-token constant-product swap pool
//!
//! Quotes with the 0.3% fee `AmmMath` formulas and settles by pulling the
//! input with `transfer_from` and pushing the output with `transfer`. The
//! routing `payload` accepted by the swap entry points is ignored; it exists
//! so callers can pass through an opaque blob meant for richer routers.
use odra::prelude::*;
use odra::casper_types::U256;
use odra::casper_types::bytesrepr::Bytes;
use odra::ContractRef;
use crate::errors::DexError;
use crate::events::{LiquidityAdded, Swap, Sync};
use crate::math::AmmMath;
use crate::token::Cep18TokenContractRef;

/// Swap pool contract
#[odra::module(events = [LiquidityAdded, Swap, Sync])]
pub struct SwapPool {
    /// Address of token0
    token0: Var<Address>,
    /// Address of token1
    token1: Var<Address>,
    /// Reserve of token0
    reserve0: Var<U256>,
    /// Reserve of token1
    reserve1: Var<U256>,
    /// Reentrancy lock
    locked: Var<bool>,
}

#[odra::module]
impl SwapPool {
    /// Initialize the pool with two token addresses
    pub fn init(&mut self, token_a: Address, token_b: Address) {
        if token_a == token_b {
            self.env().revert(DexError::IdenticalAddresses);
        }
        let (t0, t1) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };

        self.token0.set(t0);
        self.token1.set(t1);
        self.reserve0.set(U256::zero());
        self.reserve1.set(U256::zero());
        self.locked.set(false);
    }

    pub fn token0(&self) -> Address {
        self.token0.get_or_revert_with(DexError::InvalidPair)
    }

    pub fn token1(&self) -> Address {
        self.token1.get_or_revert_with(DexError::InvalidPair)
    }

    /// Get current reserves
    pub fn get_reserves(&self) -> (U256, U256) {
        (self.reserve0.get_or_default(), self.reserve1.get_or_default())
    }

    /// Pull `amount0`/`amount1` from the caller into the reserves
    pub fn add_liquidity(&mut self, amount0: U256, amount1: U256) {
        self.lock();
        if amount0.is_zero() || amount1.is_zero() {
            self.env().revert(DexError::InsufficientInputAmount);
        }

        let caller = self.env().caller();
        let this = self.env().self_address();
        Cep18TokenContractRef::new(self.env(), self.token0()).transfer_from(caller, this, amount0);
        Cep18TokenContractRef::new(self.env(), self.token1()).transfer_from(caller, this, amount1);

        let (reserve0, reserve1) = self.get_reserves();
        self.update_reserves(reserve0 + amount0, reserve1 + amount1);

        self.env().emit_event(LiquidityAdded {
            provider: caller,
            amount0,
            amount1,
        });
        self.unlock();
    }

    /// Output received for selling `amount_in` of `token_in`
    pub fn get_amount_out(&self, token_in: Address, amount_in: U256) -> U256 {
        let (reserve_in, reserve_out, _) = self.oriented_reserves(token_in);
        AmmMath::get_amount_out(amount_in, reserve_in, reserve_out).unwrap_or_revert(&self.env())
    }

    /// Input needed to buy `amount_out` of `token_out`
    pub fn get_amount_in(&self, token_out: Address, amount_out: U256) -> U256 {
        let (reserve_out, reserve_in, _) = self.oriented_reserves(token_out);
        AmmMath::get_amount_in(amount_out, reserve_in, reserve_out).unwrap_or_revert(&self.env())
    }

    /// Sell exactly `amount_in` of `token_in`; reverts if the output is
    /// below `min_amount_out`. Returns the output amount.
    #[allow(unused_variables)]
    pub fn swap_exact_input(
        &mut self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        min_amount_out: U256,
        payload: Bytes,
    ) -> U256 {
        self.lock();
        let (reserve_in, reserve_out, token_in_is_0) = self.route(token_in, token_out);

        let amount_out = AmmMath::get_amount_out(amount_in, reserve_in, reserve_out)
            .unwrap_or_revert(&self.env());
        if amount_out < min_amount_out {
            self.env().revert(DexError::InsufficientOutputAmount);
        }

        self.settle(token_in, token_out, amount_in, amount_out, token_in_is_0);
        self.unlock();
        amount_out
    }

    /// Buy exactly `amount_out` of `token_out`; reverts if the required
    /// input exceeds `max_amount_in`. Returns the input amount.
    #[allow(unused_variables)]
    pub fn swap_exact_output(
        &mut self,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
        max_amount_in: U256,
        payload: Bytes,
    ) -> U256 {
        self.lock();
        let (reserve_in, reserve_out, token_in_is_0) = self.route(token_in, token_out);

        let amount_in = AmmMath::get_amount_in(amount_out, reserve_in, reserve_out)
            .unwrap_or_revert(&self.env());
        if amount_in > max_amount_in {
            self.env().revert(DexError::ExcessiveInputAmount);
        }

        self.settle(token_in, token_out, amount_in, amount_out, token_in_is_0);
        self.unlock();
        amount_in
    }

    // ============ Internal Functions ============

    /// (reserve_in, reserve_out, token_in_is_token0) for a swap direction
    fn route(&self, token_in: Address, token_out: Address) -> (U256, U256, bool) {
        if token_in == token_out {
            self.env().revert(DexError::IdenticalAddresses);
        }
        let (reserve_in, reserve_out, token_in_is_0) = self.oriented_reserves(token_in);
        let expected_out = if token_in_is_0 { self.token1() } else { self.token0() };
        if token_out != expected_out {
            self.env().revert(DexError::InvalidPair);
        }
        (reserve_in, reserve_out, token_in_is_0)
    }

    /// Reserves ordered as (reserve of `token`, reserve of the other token)
    fn oriented_reserves(&self, token: Address) -> (U256, U256, bool) {
        let (reserve0, reserve1) = self.get_reserves();
        if token == self.token0() {
            (reserve0, reserve1, true)
        } else if token == self.token1() {
            (reserve1, reserve0, false)
        } else {
            self.env().revert(DexError::InvalidPair)
        }
    }

    fn settle(
        &mut self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        amount_out: U256,
        token_in_is_0: bool,
    ) {
        let caller = self.env().caller();
        let this = self.env().self_address();
        Cep18TokenContractRef::new(self.env(), token_in).transfer_from(caller, this, amount_in);
        Cep18TokenContractRef::new(self.env(), token_out).transfer(caller, amount_out);

        let (reserve0, reserve1) = self.get_reserves();
        if token_in_is_0 {
            self.update_reserves(reserve0 + amount_in, reserve1 - amount_out);
        } else {
            self.update_reserves(reserve0 - amount_out, reserve1 + amount_in);
        }

        self.env().emit_event(Swap {
            sender: caller,
            token_in,
            token_out,
            amount_in,
            amount_out,
        });
    }

    /// Update reserves and emit Sync event
    fn update_reserves(&mut self, reserve0: U256, reserve1: U256) {
        self.reserve0.set(reserve0);
        self.reserve1.set(reserve1);

        self.env().emit_event(Sync { reserve0, reserve1 });
    }

    /// Reentrancy lock
    fn lock(&mut self) {
        if self.locked.get_or_default() {
            self.env().revert(DexError::Locked);
        }
        self.locked.set(true);
    }

    /// Reentrancy unlock
    fn unlock(&mut self) {
        self.locked.set(false);
    }
}

/// Swap venue consumed by the leverage wrappers
#[odra::external_contract]
pub trait DexAdapter {
    /// Sell exactly `amount_in`; returns the amount bought
    fn swap_exact_input(
        &mut self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        min_amount_out: U256,
        payload: Bytes,
    ) -> U256;

    /// Buy exactly `amount_out`; returns the amount sold
    fn swap_exact_output(
        &mut self,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
        max_amount_in: U256,
        payload: Bytes,
    ) -> U256;
}
