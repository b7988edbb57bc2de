//! Fixed-point constants and safe math shared by the vault, the wrappers
//! and the swap pool
use odra::casper_types::U256;
use crate::errors::DexError;

/// One basis point in the vault's fixed-point scale
pub const ONE_BPS: u64 = 100;

/// One percent in the vault's fixed-point scale
pub const ONE_PERCENT_BPS: u64 = 100 * ONE_BPS;

/// 100% ("no leverage")
pub const ONE_HUNDRED_PERCENT_BPS: u64 = 100 * ONE_PERCENT_BPS;

/// Fee denominator (0.3% fee = 3/1000)
pub const FEE_DENOMINATOR: u128 = 1000;

/// Fee numerator (0.3% fee)
pub const FEE_NUMERATOR: u128 = 3;

/// `ONE_HUNDRED_PERCENT_BPS` as a U256
pub fn one_hundred_percent() -> U256 {
    U256::from(ONE_HUNDRED_PERCENT_BPS)
}

/// Rounding direction for `mul_div`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// Computes `a * b / denominator` with the requested rounding.
/// Returns `None` on overflow or a zero denominator.
pub fn mul_div(a: U256, b: U256, denominator: U256, rounding: Rounding) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let product = a.checked_mul(b)?;
    let quotient = product / denominator;
    match rounding {
        Rounding::Up if !(product % denominator).is_zero() => quotient.checked_add(U256::one()),
        _ => Some(quotient),
    }
}

/// Safe math operations for U256
pub struct SafeMath;

impl SafeMath {
    /// Safe addition with overflow check
    pub fn add(a: U256, b: U256) -> Result<U256, DexError> {
        a.checked_add(b).ok_or(DexError::Overflow)
    }

    /// Safe subtraction with underflow check
    pub fn sub(a: U256, b: U256) -> Result<U256, DexError> {
        a.checked_sub(b).ok_or(DexError::Underflow)
    }

    /// Safe multiplication with overflow check
    pub fn mul(a: U256, b: U256) -> Result<U256, DexError> {
        a.checked_mul(b).ok_or(DexError::Overflow)
    }

    /// Safe division with zero check
    pub fn div(a: U256, b: U256) -> Result<U256, DexError> {
        if b.is_zero() {
            return Err(DexError::DivisionByZero);
        }
        Ok(a / b)
    }
}

/// Constant-product swap quotes
pub struct AmmMath;

impl AmmMath {
    /// Output tokens for a given input amount.
    /// amount_out = (amount_in * 997 * reserve_out) / (reserve_in * 1000 + amount_in * 997)
    pub fn get_amount_out(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> Result<U256, DexError> {
        if amount_in.is_zero() {
            return Err(DexError::InsufficientInputAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(DexError::InsufficientLiquidity);
        }

        let amount_in_with_fee = SafeMath::mul(
            amount_in,
            U256::from(FEE_DENOMINATOR - FEE_NUMERATOR),
        )?;
        let numerator = SafeMath::mul(amount_in_with_fee, reserve_out)?;
        let denominator = SafeMath::add(
            SafeMath::mul(reserve_in, U256::from(FEE_DENOMINATOR))?,
            amount_in_with_fee,
        )?;

        SafeMath::div(numerator, denominator)
    }

    /// Input tokens required for a given output amount.
    /// amount_in = (reserve_in * amount_out * 1000) / ((reserve_out - amount_out) * 997) + 1
    pub fn get_amount_in(
        amount_out: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> Result<U256, DexError> {
        if amount_out.is_zero() {
            return Err(DexError::InsufficientOutputAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(DexError::InsufficientLiquidity);
        }
        if amount_out >= reserve_out {
            return Err(DexError::InsufficientLiquidity);
        }

        let numerator = SafeMath::mul(
            SafeMath::mul(reserve_in, amount_out)?,
            U256::from(FEE_DENOMINATOR),
        )?;
        let denominator = SafeMath::mul(
            SafeMath::sub(reserve_out, amount_out)?,
            U256::from(FEE_DENOMINATOR - FEE_NUMERATOR),
        )?;

        SafeMath::add(SafeMath::div(numerator, denominator)?, U256::one())
    }
}
