use std::convert::TryFrom;

use super::{
    bn::U256,
    consts::{DECIMAL_PRECISION, ONE_YEAR},
};
use crate::TroveError;

/// `a * b / c` rounded down, with a 256-bit intermediate product.
pub fn mul_div(a: u128, b: u128, c: u128) -> Result<u128, TroveError> {
    if c == 0 {
        return Err(TroveError::MathOverflow);
    }
    let res = U256::from(a) * U256::from(b) / U256::from(c);
    u128::try_from(res).map_err(|_| TroveError::MathOverflow)
}

/// `a * b / c` rounded up.
pub fn mul_div_ceil(a: u128, b: u128, c: u128) -> Result<u128, TroveError> {
    if c == 0 {
        return Err(TroveError::MathOverflow);
    }
    let c = U256::from(c);
    let res = (U256::from(a) * U256::from(b) + c - U256::one()) / c;
    u128::try_from(res).map_err(|_| TroveError::MathOverflow)
}

/// `a * b / c` clamped to `u128::MAX`, where a zero divisor also yields `u128::MAX`.
pub fn mul_div_saturating(a: u128, b: u128, c: u128) -> u128 {
    if c == 0 {
        return u128::MAX;
    }
    let res = U256::from(a) * U256::from(b) / U256::from(c);
    u128::try_from(res).unwrap_or(u128::MAX)
}

/// Simple interest on `debt` at `annual_rate` over `period` seconds.
pub fn calc_interest(debt: u128, annual_rate: u128, period: u64) -> Result<u128, TroveError> {
    let numerator = U256::from(debt)
        .checked_mul(U256::from(annual_rate))
        .and_then(|x| x.checked_mul(U256::from(period)))
        .ok_or(TroveError::MathOverflow)?;
    let denominator = U256::from(ONE_YEAR) * U256::from(DECIMAL_PRECISION);
    u128::try_from(numerator / denominator).map_err(|_| TroveError::MathOverflow)
}

#[cfg(test)]
pub fn decimal_to_u128(number: f64) -> u128 {
    // go through 1e9 first so that test literals like 1.1 land exactly on 1.1e18
    let nanos = (number * 1_000_000_000.0).round() as u128;
    nanos * (DECIMAL_PRECISION / 1_000_000_000)
}

#[cfg(test)]
pub fn u128_to_decimal(number: u128) -> f64 {
    number as f64 / (DECIMAL_PRECISION as f64)
}
