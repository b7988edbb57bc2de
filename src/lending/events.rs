//! Events for the lending pool and the price oracle

use odra::prelude::*;
use odra::casper_types::U256;

// ============================================================================
// Collateral Events
// ============================================================================

/// Event emitted when collateral is supplied to the pool
#[odra::event]
pub struct Supplied {
    /// Reserve asset
    pub asset: Address,
    /// Address that paid the tokens
    pub supplier: Address,
    /// Account credited with the collateral
    pub on_behalf_of: Address,
    /// Amount supplied
    pub amount: U256,
}

/// Event emitted when collateral is withdrawn from the pool
#[odra::event]
pub struct Withdrawn {
    /// Reserve asset
    pub asset: Address,
    /// Account whose collateral was reduced
    pub account: Address,
    /// Recipient of the tokens
    pub to: Address,
    /// Amount withdrawn
    pub amount: U256,
}

// ============================================================================
// Debt Events
// ============================================================================

/// Event emitted when an account borrows
#[odra::event]
pub struct Borrowed {
    /// Reserve asset
    pub asset: Address,
    /// Account charged with the debt
    pub borrower: Address,
    /// Recipient of the tokens
    pub to: Address,
    /// Amount borrowed
    pub amount: U256,
}

/// Event emitted when debt is repaid
#[odra::event]
pub struct Repaid {
    /// Reserve asset
    pub asset: Address,
    /// Address that paid the tokens
    pub payer: Address,
    /// Account whose debt was reduced
    pub on_behalf_of: Address,
    /// Amount actually repaid (capped at outstanding debt)
    pub amount: U256,
}

/// Event emitted when a reserve is listed
#[odra::event]
pub struct ReserveListed {
    /// Reserve asset
    pub asset: Address,
}

// ============================================================================
// Oracle Events
// ============================================================================

/// Event emitted when an asset price is set
#[odra::event]
pub struct PriceUpdated {
    /// Asset address
    pub asset: Address,
    /// New price in base currency units
    pub price: U256,
    /// Block time of the update
    pub timestamp: u64,
}
