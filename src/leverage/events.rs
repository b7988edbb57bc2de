//! Events for the leveraged vault

use odra::prelude::*;
use odra::casper_types::U256;

// ============================================================================
// Rebalance Events
// ============================================================================

/// Event emitted when a caller moves leverage up toward target
#[odra::event]
pub struct LeverageIncreased {
    /// Rebalancer
    pub caller: Address,
    /// Collateral supplied to the pool (caller funds plus idle balance)
    pub collateral_supplied: U256,
    /// Debt tokens borrowed and paid to the caller
    pub debt_paid: U256,
    /// Leverage before the operation
    pub leverage_before: U256,
    /// Leverage after the operation
    pub leverage_after: U256,
    /// Subsidy applied
    pub subsidy_bps: U256,
}

/// Event emitted when a caller moves leverage down toward target
#[odra::event]
pub struct LeverageDecreased {
    /// Rebalancer
    pub caller: Address,
    /// Debt repaid to the pool (caller funds plus idle balance)
    pub debt_repaid: U256,
    /// Collateral withdrawn and paid to the caller
    pub collateral_paid: U256,
    /// Leverage before the operation
    pub leverage_before: U256,
    /// Leverage after the operation
    pub leverage_after: U256,
    /// Subsidy applied
    pub subsidy_bps: U256,
}

// ============================================================================
// Configuration Events
// ============================================================================

/// Event emitted when leverage bounds change
#[odra::event]
pub struct LeverageBoundsUpdated {
    /// Lower bound
    pub lower_bound_bps: U256,
    /// Target leverage
    pub target_leverage_bps: U256,
    /// Upper bound
    pub upper_bound_bps: U256,
}

/// Event emitted when the subsidy cap changes
#[odra::event]
pub struct MaxSubsidyUpdated {
    /// Previous cap
    pub old_max_subsidy_bps: U256,
    /// New cap
    pub new_max_subsidy_bps: U256,
}

/// Event emitted when the deposit floor changes
#[odra::event]
pub struct MinDepositUpdated {
    /// Previous floor, in base currency
    pub old_min_deposit_base: U256,
    /// New floor, in base currency
    pub new_min_deposit_base: U256,
}

/// Event emitted when the owner sweeps a stray token
#[odra::event]
pub struct TokenRescued {
    /// Token swept
    pub token: Address,
    /// Recipient
    pub to: Address,
    /// Amount swept
    pub amount: U256,
}
