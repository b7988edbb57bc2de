//! Error types for flash loans

use odra::prelude::*;

/// Errors that can occur while issuing a flash loan
#[odra::odra_error]
pub enum FlashError {
    /// Lender balance did not grow by the fee after settlement
    FlashLoanShortfall = 300,
    /// Lender holds less than the requested amount
    InsufficientLiquidity = 301,
    /// Borrower callback returned false
    CallbackFailed = 302,
    /// Zero amount not allowed
    ZeroAmount = 303,
    /// Caller is not authorized
    Unauthorized = 304,
    /// Reentrancy guard
    Locked = 305,
    /// Fee above 100%
    InvalidFee = 306,
}
