//! Error definitions for the swap pool and the CEP-18 tokens
use odra::prelude::*;

/// Custom errors for the swap pool
#[odra::odra_error]
pub enum DexError {
    /// Insufficient liquidity in the pool
    InsufficientLiquidity = 1,

    /// Insufficient input amount for swap
    InsufficientInputAmount = 2,

    /// Insufficient output amount for swap
    InsufficientOutputAmount = 3,

    /// Token is not one of the pool's pair
    InvalidPair = 4,

    /// Identical addresses provided
    IdenticalAddresses = 8,

    /// Swap would need more input than the caller allowed
    ExcessiveInputAmount = 12,

    /// Overflow error
    Overflow = 13,

    /// Underflow error
    Underflow = 14,

    /// Division by zero
    DivisionByZero = 15,

    /// Locked - reentrancy guard
    Locked = 21,
}

/// Custom errors for the CEP-18 tokens
#[odra::odra_error]
pub enum TokenError {
    /// Insufficient allowance for transfer
    InsufficientAllowance = 100,

    /// Insufficient balance for operation
    InsufficientBalance = 101,
}
