//! Error types for the leveraged vault

use odra::prelude::*;

/// Errors that can occur in the leveraged vault
#[odra::odra_error]
pub enum LeverageError {
    // Input Errors
    /// Zero amount not allowed
    ZeroAmount = 400,
    /// Share balance too small for the operation
    InsufficientShares = 401,
    /// Owner did not approve enough debt tokens for the repayment
    InsufficientAllowance = 402,

    // Tokenized Vault Limits
    /// Deposit above `max_deposit`
    ExceededMaxDeposit = 410,
    /// Mint above `max_mint`
    ExceededMaxMint = 411,
    /// Withdraw above `max_withdraw`
    ExceededMaxWithdraw = 412,
    /// Redeem above `max_redeem`
    ExceededMaxRedeem = 413,

    // Position Errors
    /// Leverage outside the configured bounds
    TooImbalanced = 420,
    /// Collateral value equals debt value
    InfiniteLeverage = 421,
    /// Collateral value below debt value
    CollateralBelowDebt = 422,
    /// Debt exists without any collateral
    ZeroCollateralWithDebt = 423,

    // Lending Pool Integrity
    /// Pool call moved a balance in the wrong direction or by the wrong amount
    BalanceDeltaMismatch = 430,
    /// Borrow did not increase the vault's debt token balance
    DebtBalanceNotIncreased = 431,

    // Rebalance Errors
    /// Increase requested while leverage is at or above target
    LeverageAlreadyAtOrBeyondTarget = 440,
    /// Decrease requested while leverage is at or below target
    LeverageAlreadyAtOrBelowTarget = 441,
    /// Rebalance would overshoot target or fail to move toward it
    RebalanceOutOfRange = 442,
    /// Output below the caller's minimum
    SlippageNotMet = 443,
    /// Vault has no position to rebalance
    NoPositionToRebalance = 444,

    // Configuration Errors
    /// Bounds must satisfy 100% <= lower <= target <= upper and 100% < target
    InvalidLeverageBounds = 450,
    /// Max subsidy too large for the target leverage
    InvalidSubsidy = 451,
    /// Configuration read before `init`
    NotInitialized = 452,

    // Access Control Errors
    /// Caller is not the owner
    Unauthorized = 460,
    /// Token is collateral, debt or otherwise restricted
    RestrictedAssetRescue = 461,
    /// Reentrancy guard
    Locked = 462,

    // Math Errors
    /// Arithmetic overflow or division by zero
    MathOverflow = 470,
}
