//! Error types for the lending pool and the price oracle

use odra::prelude::*;

/// Errors that can occur in the lending pool or the price oracle
#[odra::odra_error]
pub enum LendingError {
    // Price Oracle Errors
    /// No usable price: feed missing, zero, disabled or stale
    PriceUnavailable = 200,
    /// Price must be non-zero
    InvalidPrice = 201,

    // Access Control Errors
    /// Caller is not authorized
    Unauthorized = 210,

    // Reserve Errors
    /// Asset is not a listed reserve
    ReserveNotListed = 220,
    /// Asset is already listed
    ReserveAlreadyListed = 221,
    /// Pool does not hold enough of the asset
    InsufficientLiquidity = 222,

    // Position Errors
    /// Withdrawal exceeds supplied collateral
    InsufficientCollateral = 230,
    /// Operation would push debt above the max loan-to-value
    HealthFactorTooLow = 231,

    // General Errors
    /// Zero amount not allowed
    ZeroAmount = 240,
    /// Invalid configuration parameter
    InvalidConfiguration = 241,
}
