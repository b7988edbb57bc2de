//! Flash-loan wrappers around the leveraged vault
//!
//! `LeveragedDepositor` turns plain collateral into a fully leveraged vault
//! position in one call, `LeveragedRedeemer` unwinds a position back into
//! collateral. Both borrow the debt leg from a flash lender and route the
//! swap through a DEX adapter.

pub mod depositor;
pub mod redeemer;
pub mod leftovers;
pub mod errors;
pub mod events;


pub use depositor::{DepositContext, LeveragedDepositor};
pub use redeemer::{LeveragedRedeemer, RedeemContext};
pub use leftovers::LeftoverPolicy;
pub use errors::WrapperError;
pub use events::*;
