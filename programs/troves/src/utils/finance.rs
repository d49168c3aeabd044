use super::{
    consts::{DECIMAL_PRECISION, NICR_PRECISION},
    math::{mul_div, mul_div_saturating},
};
use crate::TroveError;

/// Collateral value over debt. A debt-free position has an infinite ratio.
pub fn compute_cr(coll: u128, debt: u128, price: u128) -> u128 {
    if debt == 0 {
        return u128::MAX;
    }
    mul_div_saturating(coll, price, debt)
}

/// Price independent ratio used to rank troves in the sorted list.
pub fn compute_nominal_cr(coll: u128, debt: u128) -> u128 {
    if debt == 0 {
        return u128::MAX;
    }
    mul_div_saturating(coll, NICR_PRECISION, debt)
}

/// Splits `coll_to_liquidate` into the collateral seized for `debt_to_liquidate`
/// (capped at debt plus penalty, valued at `price`) and the leftover surplus.
pub fn get_coll_penalty_and_surplus(
    coll_to_liquidate: u128,
    debt_to_liquidate: u128,
    penalty_ratio: u128,
    price: u128,
) -> Result<(u128, u128), TroveError> {
    let max_seized_coll = mul_div(
        debt_to_liquidate,
        DECIMAL_PRECISION
            .checked_add(penalty_ratio)
            .ok_or(TroveError::MathOverflow)?,
        price,
    )?;

    if coll_to_liquidate > max_seized_coll {
        Ok((max_seized_coll, coll_to_liquidate - max_seized_coll))
    } else {
        Ok((coll_to_liquidate, 0))
    }
}

/// Value of `debt` worth of collateral, i.e. `debt * ratio / price`.
pub fn debt_to_coll(debt: u128, ratio: u128, price: u128) -> Result<u128, TroveError> {
    mul_div(debt, ratio, price)
}
