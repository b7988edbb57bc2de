//! DEX collaborator of the leverage wrappers
//!
//! A single constant-product pool is enough to route between a vault's
//! collateral and debt tokens. Wrappers reach it through `DexAdapter`.

pub mod swap_pool;

pub use swap_pool::{SwapPool, DexAdapter, DexAdapterContractRef};
