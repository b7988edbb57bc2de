//! Leveraged vault core
//!
//! A CEP-4626 vault that keeps a lending position at a target leverage,
//! gates deposits and redemptions while the position drifts out of bounds,
//! and pays permissionless rebalancers a capped subsidy for restoring it.

pub mod vault;
pub mod math;
pub mod errors;
pub mod events;

#[cfg(test)]
mod tests;

pub use vault::{LeveragedVault, LeverageVaultAdapter, LeverageVaultAdapterContractRef, PositionBase};
pub use math::{LeverageMath, RebalanceDirection, RebalanceQuote};
pub use errors::LeverageError;
pub use events::*;
