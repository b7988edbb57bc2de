//! Price Oracle - Owner-fed asset prices in a common base currency
//!
//! Prices are quoted per whole token (`10^decimals` smallest units) and
//! scaled by `base_currency_unit` (e.g. 1e8 means "$1.00" is `100_000_000`).

use odra::prelude::*;
use odra::casper_types::U256;
use super::errors::LendingError;
use super::events::PriceUpdated;

/// Price feed data for an asset
#[odra::odra_type]
pub struct PriceFeed {
    /// Price in base currency units
    pub price: U256,
    /// Block time of the last update
    pub last_update: u64,
    /// Whether the feed is active
    pub is_active: bool,
}

/// Price Oracle contract
#[odra::module(events = [PriceUpdated])]
pub struct PriceOracle {
    /// Price feeds for each asset
    price_feeds: Mapping<Address, PriceFeed>,
    /// Admin address
    admin: Var<Address>,
    /// Maximum price age; 0 disables the staleness check
    max_staleness: Var<u64>,
    /// Value of one unit of base currency
    base_currency_unit: Var<U256>,
}

#[odra::module]
impl PriceOracle {
    /// Initialize the price oracle
    pub fn init(&mut self, base_currency_unit: U256) {
        if base_currency_unit.is_zero() {
            self.env().revert(LendingError::InvalidConfiguration);
        }
        let caller = self.env().caller();
        self.admin.set(caller);
        self.max_staleness.set(0);
        self.base_currency_unit.set(base_currency_unit);
    }

    /// Set price for an asset (admin only)
    pub fn set_price(&mut self, asset: Address, price: U256) {
        self.only_admin();

        if price.is_zero() {
            self.env().revert(LendingError::InvalidPrice);
        }

        let timestamp = self.env().get_block_time();
        self.price_feeds.set(&asset, PriceFeed {
            price,
            last_update: timestamp,
            is_active: true,
        });

        self.env().emit_event(PriceUpdated {
            asset,
            price,
            timestamp,
        });
    }

    /// Price of one whole `asset` token in base currency units.
    /// Reverts `PriceUnavailable` rather than ever returning zero.
    pub fn get_asset_price(&self, asset: Address) -> U256 {
        let feed = self.price_feeds.get(&asset)
            .unwrap_or_revert_with(&self.env(), LendingError::PriceUnavailable);

        if !feed.is_active || feed.price.is_zero() {
            self.env().revert(LendingError::PriceUnavailable);
        }

        let max_staleness = self.max_staleness.get_or_default();
        if max_staleness > 0 {
            let age = self.env().get_block_time().saturating_sub(feed.last_update);
            if age > max_staleness {
                self.env().revert(LendingError::PriceUnavailable);
            }
        }

        feed.price
    }

    pub fn base_currency_unit(&self) -> U256 {
        self.base_currency_unit.get_or_revert_with(LendingError::InvalidConfiguration)
    }

    /// Disable a price feed (admin only)
    pub fn disable_feed(&mut self, asset: Address) {
        self.only_admin();
        self.set_feed_active(asset, false);
    }

    /// Enable a price feed (admin only)
    pub fn enable_feed(&mut self, asset: Address) {
        self.only_admin();
        self.set_feed_active(asset, true);
    }

    /// Update max staleness period (admin only)
    pub fn set_max_staleness(&mut self, max_staleness: u64) {
        self.only_admin();
        self.max_staleness.set(max_staleness);
    }

    pub fn get_max_staleness(&self) -> u64 {
        self.max_staleness.get_or_default()
    }

    /// Get admin address
    pub fn get_admin(&self) -> Address {
        self.admin.get_or_revert_with(LendingError::Unauthorized)
    }

    fn set_feed_active(&mut self, asset: Address, is_active: bool) {
        let mut feed = self.price_feeds.get(&asset)
            .unwrap_or_revert_with(&self.env(), LendingError::PriceUnavailable);
        feed.is_active = is_active;
        self.price_feeds.set(&asset, feed);
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        if caller != admin {
            self.env().revert(LendingError::Unauthorized);
        }
    }
}

/// Price source consumed by the lending pool and the leveraged vault
#[odra::external_contract]
pub trait PriceOracleAdapter {
    /// Price of one whole token in base currency units
    fn get_asset_price(&self, asset: Address) -> U256;

    /// Value of one unit of base currency
    fn base_currency_unit(&self) -> U256;
}
