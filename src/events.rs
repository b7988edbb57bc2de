//! Event definitions for the CEP-18 tokens and the swap pool
use odra::prelude::*;
use odra::casper_types::U256;
use odra::prelude::Address;

/// Event emitted when liquidity is added to the swap pool
#[odra::event]
pub struct LiquidityAdded {
    /// Address of the liquidity provider
    pub provider: Address,
    /// Amount of token0 added
    pub amount0: U256,
    /// Amount of token1 added
    pub amount1: U256,
}

/// Event emitted when a swap occurs
#[odra::event]
pub struct Swap {
    /// Address of the sender
    pub sender: Address,
    /// Token sold
    pub token_in: Address,
    /// Token bought
    pub token_out: Address,
    /// Amount sold
    pub amount_in: U256,
    /// Amount bought
    pub amount_out: U256,
}

/// Event emitted when reserves are synced
#[odra::event]
pub struct Sync {
    /// Reserve of token0
    pub reserve0: U256,
    /// Reserve of token1
    pub reserve1: U256,
}

/// Event emitted when tokens are transferred
#[odra::event]
pub struct Transfer {
    /// From address
    pub from: Address,
    /// To address
    pub to: Address,
    /// Amount transferred
    pub value: U256,
}

/// Event emitted when approval is granted
#[odra::event]
pub struct Approval {
    /// Owner address
    pub owner: Address,
    /// Spender address
    pub spender: Address,
    /// Amount approved
    pub value: U256,
}
