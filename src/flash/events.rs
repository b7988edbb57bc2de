//! Events for flash loans

use odra::prelude::*;
use odra::casper_types::U256;

/// Event emitted when a flash loan is settled
#[odra::event]
pub struct FlashLoan {
    /// Address that requested the loan
    pub initiator: Address,
    /// Contract that received the funds and the callback
    pub receiver: Address,
    /// Token lent
    pub token: Address,
    /// Principal
    pub amount: U256,
    /// Fee collected on top of the principal
    pub fee: U256,
}

/// Event emitted when the flash fee changes
#[odra::event]
pub struct FlashFeeUpdated {
    /// Old fee
    pub old_fee_bps: U256,
    /// New fee
    pub new_fee_bps: U256,
}
