//! Leverage arithmetic
//!
//! All ratios use the `ONE_HUNDRED_PERCENT_BPS` fixed-point scale, where
//! 100% means "no leverage". Values named `*_base` are oracle base currency
//! amounts. Everything here is pure and returns `Result` so the vault can
//! surface failures with `unwrap_or_revert`.
use odra::prelude::*;
use odra::casper_types::U256;
use super::errors::LeverageError;
use crate::math::{mul_div, one_hundred_percent, Rounding};

/// Which way a rebalance has to move leverage
#[odra::odra_type]
#[derive(Default)]
pub enum RebalanceDirection {
    /// Already at target (or no position)
    #[default]
    None = 0,
    /// Supply collateral, receive debt
    Increase = 1,
    /// Repay debt, receive collateral
    Decrease = 2,
}

/// Token amount a rebalancer must provide to restore target leverage
#[odra::odra_type]
pub struct RebalanceQuote {
    /// Collateral tokens for `Increase`, debt tokens for `Decrease`
    pub token_amount: U256,
    pub direction: RebalanceDirection,
}

/// Pure leverage formulas
pub struct LeverageMath;

impl LeverageMath {
    /// `collateral * 100% / (collateral - debt)`; zero without collateral
    pub fn leverage_bps(collateral_base: U256, debt_base: U256) -> Result<U256, LeverageError> {
        if collateral_base.is_zero() {
            return Ok(U256::zero());
        }
        if collateral_base < debt_base {
            return Err(LeverageError::CollateralBelowDebt);
        }
        if collateral_base == debt_base {
            return Err(LeverageError::InfiniteLeverage);
        }
        Self::mul_div_down(collateral_base, one_hundred_percent(), collateral_base - debt_base)
    }

    /// True when an open position sits outside `[lower, upper]`
    pub fn is_out_of_bounds(leverage_bps: U256, lower_bound_bps: U256, upper_bound_bps: U256) -> bool {
        !leverage_bps.is_zero() && (leverage_bps < lower_bound_bps || leverage_bps > upper_bound_bps)
    }

    /// Total exposure a deposit of `assets` creates at `target_leverage_bps`
    pub fn leveraged_assets(assets: U256, target_leverage_bps: U256) -> Result<U256, LeverageError> {
        Self::mul_div_down(assets, target_leverage_bps, one_hundred_percent())
    }

    /// Debt that keeps `leverage_bps` unchanged when `amount` of collateral
    /// enters or leaves the position: `amount * (L - 100%) / L`
    pub fn debt_for_collateral(amount: U256, leverage_bps: U256) -> Result<U256, LeverageError> {
        let excess = leverage_bps
            .checked_sub(one_hundred_percent())
            .ok_or(LeverageError::MathOverflow)?;
        Self::mul_div_down(amount, excess, leverage_bps)
    }

    /// `amount * (100% + subsidy) / 100%`
    pub fn with_subsidy(amount: U256, subsidy_bps: U256) -> Result<U256, LeverageError> {
        let factor = one_hundred_percent()
            .checked_add(subsidy_bps)
            .ok_or(LeverageError::MathOverflow)?;
        Self::mul_div_down(amount, factor, one_hundred_percent())
    }

    /// Linear ramp: relative distance from target, capped at `max_subsidy_bps`
    pub fn subsidy_bps(
        leverage_bps: U256,
        target_leverage_bps: U256,
        max_subsidy_bps: U256,
    ) -> Result<U256, LeverageError> {
        if leverage_bps.is_zero() {
            return Ok(U256::zero());
        }
        let distance = if leverage_bps > target_leverage_bps {
            leverage_bps - target_leverage_bps
        } else {
            target_leverage_bps - leverage_bps
        };
        let subsidy = Self::mul_div_down(distance, one_hundred_percent(), target_leverage_bps)?;
        Ok(if subsidy < max_subsidy_bps { subsidy } else { max_subsidy_bps })
    }

    /// Base currency amount that restores target leverage, net of subsidy.
    ///
    /// Increase: supplying `X` collateral value pays out `X(1+s)` debt value,
    /// so `X = (T(C-D) - C*100%) * 100% / (100%^2 + T*S)`.
    /// Decrease: repaying `Y` debt value pays out `Y(1+s)` collateral value,
    /// so `Y = (C*100% - T(C-D)) * 100% / (100%^2 - S(T-100%))`.
    pub fn rebalance_amount_base(
        collateral_base: U256,
        debt_base: U256,
        target_leverage_bps: U256,
        subsidy_bps: U256,
    ) -> Result<(U256, RebalanceDirection), LeverageError> {
        if collateral_base.is_zero() {
            if debt_base.is_zero() {
                return Ok((U256::zero(), RebalanceDirection::None));
            }
            return Err(LeverageError::ZeroCollateralWithDebt);
        }

        let leverage = Self::leverage_bps(collateral_base, debt_base)?;
        let one = one_hundred_percent();
        let one_squared = one * one;
        let equity = collateral_base - debt_base;
        let target_exposure = Self::mul(target_leverage_bps, equity)?;
        let current_exposure = Self::mul(collateral_base, one)?;

        if leverage < target_leverage_bps {
            let numerator = target_exposure
                .checked_sub(current_exposure)
                .ok_or(LeverageError::MathOverflow)?;
            let denominator = one_squared
                .checked_add(Self::mul(target_leverage_bps, subsidy_bps)?)
                .ok_or(LeverageError::MathOverflow)?;
            Ok((Self::mul_div_down(numerator, one, denominator)?, RebalanceDirection::Increase))
        } else if leverage > target_leverage_bps {
            let numerator = current_exposure
                .checked_sub(target_exposure)
                .ok_or(LeverageError::MathOverflow)?;
            let denominator = one_squared
                .checked_sub(Self::mul(subsidy_bps, target_leverage_bps - one)?)
                .filter(|d| !d.is_zero())
                .ok_or(LeverageError::InvalidSubsidy)?;
            Ok((Self::mul_div_down(numerator, one, denominator)?, RebalanceDirection::Decrease))
        } else {
            Ok((U256::zero(), RebalanceDirection::None))
        }
    }

    /// Checks `100% < target`, `100% <= lower <= target <= upper` and
    /// `max_subsidy * (target - 100%) < 100%^2`
    pub fn validate_config(
        lower_bound_bps: U256,
        target_leverage_bps: U256,
        upper_bound_bps: U256,
        max_subsidy_bps: U256,
    ) -> Result<(), LeverageError> {
        let one = one_hundred_percent();
        if target_leverage_bps <= one
            || lower_bound_bps < one
            || lower_bound_bps > target_leverage_bps
            || target_leverage_bps > upper_bound_bps
        {
            return Err(LeverageError::InvalidLeverageBounds);
        }
        let exposure = max_subsidy_bps
            .checked_mul(target_leverage_bps - one)
            .ok_or(LeverageError::InvalidSubsidy)?;
        if exposure >= one * one {
            return Err(LeverageError::InvalidSubsidy);
        }
        Ok(())
    }

    fn mul(a: U256, b: U256) -> Result<U256, LeverageError> {
        a.checked_mul(b).ok_or(LeverageError::MathOverflow)
    }

    fn mul_div_down(a: U256, b: U256, denominator: U256) -> Result<U256, LeverageError> {
        mul_div(a, b, denominator, Rounding::Down).ok_or(LeverageError::MathOverflow)
    }
}
