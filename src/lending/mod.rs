//! Lending collaborators of the leveraged vault
//!
//! A minimal over-collateralized lending pool and the owner-fed price oracle
//! it values positions with. The vault talks to both only through the
//! `LendingPoolAdapter` and `PriceOracleAdapter` interfaces, so any pool or
//! oracle exposing the same entry points can be plugged in at deployment.

pub mod lending_pool;
pub mod price_oracle;
pub mod errors;
pub mod events;

pub use lending_pool::{LendingPool, LendingPoolAdapter, LendingPoolAdapterContractRef};
pub use price_oracle::{PriceOracle, PriceOracleAdapter, PriceOracleAdapterContractRef};
pub use errors::LendingError;
pub use events::*;
