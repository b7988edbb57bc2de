//! Flash loans
//!
//! Single-transaction loans settled through a borrower callback, used by the
//! leverage wrappers to fund the debt leg of a position before it exists.

pub mod flash_lender;
pub mod errors;
pub mod events;

pub use flash_lender::{
    FlashLender, FlashLoanAdapter, FlashLoanAdapterContractRef, FlashBorrower,
    FlashBorrowerContractRef,
};
pub use errors::FlashError;
pub use events::*;
