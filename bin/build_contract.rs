//! Binary for building WASM contracts from odra modules.
#![doc = "Binary for building WASM contracts from odra modules."]

#[allow(unused_imports)]
use leverage_vault_contracts;

fn main() {
    // Invoked by the Odra build system; odra-build does the actual compilation
}
