#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]
extern crate alloc;

// Shared primitives
pub mod token;
pub mod errors;
pub mod events;
pub mod math;

// CEP-4626: Tokenized Vault Standard
pub mod cep4626;

// Collaborators: swap venue, lending market, flash loans
pub mod dex;
pub mod lending;
pub mod flash;

// Leveraged vault and its wrappers
pub mod leverage;
pub mod wrappers;

#[cfg(test)]
pub(crate) mod test_env;
