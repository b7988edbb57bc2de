//! Error types for the leverage wrappers

use odra::prelude::*;

/// Errors that can occur in the depositor and redeemer wrappers
#[odra::odra_error]
pub enum WrapperError {
    // Outcome Errors
    /// Receiver got fewer shares than requested
    SlippageNotMet = 500,
    /// Receiver got less collateral than requested
    BelowMinimumReceive = 501,
    /// Not enough debt tokens to settle the flash loan
    FlashLoanShortfall = 502,

    // Callback Errors
    /// Flash callback not sent by the configured lender
    UnauthorizedFlashLender = 510,
    /// Flash loan initiated by another contract
    UnexpectedFlashInitiator = 511,
    /// Flash callback outside a wrapper operation
    NoOperationInProgress = 512,

    // Input Errors
    /// Zero amount not allowed
    ZeroAmount = 520,
    /// Slippage above 100%
    InvalidSlippage = 521,

    // Access Errors
    /// Caller is not the owner
    Unauthorized = 530,
    /// Reentrant call
    Locked = 531,

    // Configuration Errors
    /// Configuration read before `init`
    NotInitialized = 540,
}
