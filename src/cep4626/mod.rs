//! CEP-4626: Tokenized Vault Standard for Casper
//!
//! Standard interface, events and rounding helpers shared by vaults whose
//! shares are CEP-18 tokens representing a claim on a single asset.

pub mod vault;
pub mod events;
pub mod conversion;

pub use vault::{Cep4626Vault, Cep4626VaultContractRef};
pub use events::*;
