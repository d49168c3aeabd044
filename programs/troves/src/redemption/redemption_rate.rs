use decimal_wad::{
    common::{TryAdd, TryDiv, TryMul},
    rate::Rate,
};

use crate::{
    fail,
    state::TroveManagerState,
    utils::consts::{
        DECIMAL_PRECISION, MAX_DECAY_MINUTES, MAX_REDEMPTION_FEE, MINUTE_DECAY_FACTOR,
        REDEMPTION_BETA, REDEMPTION_FEE_FLOOR, SECONDS_PER_MINUTE,
    },
    utils::math::mul_div,
    TroveError,
};

// Rates never exceed 100%, so their scaled value fits a u64
fn to_rate(scaled_val: u128) -> Result<Rate, TroveError> {
    let scaled_val = u64::try_from(scaled_val).map_err(|_| TroveError::MathOverflow)?;
    Ok(Rate::from_scaled_val(scaled_val))
}

pub fn calc_redemption_rate(base_rate: u128) -> u128 {
    // between 0.5% and 100%
    u128::min(
        REDEMPTION_FEE_FLOOR.saturating_add(base_rate),
        MAX_REDEMPTION_FEE,
    )
}

pub fn calc_redemption_fee(redemption_rate: u128, amount: u128) -> Result<u128, TroveError> {
    mul_div(amount, redemption_rate, DECIMAL_PRECISION)
}

fn minutes_passed_since_last_fee_op(last_fee_operation_time: u64, now: u64) -> u64 {
    // cannot be negative
    now.saturating_sub(last_fee_operation_time) / SECONDS_PER_MINUTE
}

pub fn decay_base_rate(
    base_rate: u128,
    last_fee_operation_time: u64,
    now: u64,
) -> Result<u128, TroveError> {
    // Half-life of 12h. 12h = 720 min
    // (1/2) = d^720 => d = (1/2)^(1/720)
    // b(t) = b(t-1) * d^minutes_passed
    let minutes = u64::min(
        minutes_passed_since_last_fee_op(last_fee_operation_time, now),
        MAX_DECAY_MINUTES,
    );
    let decay_factor = Rate::from_scaled_val(MINUTE_DECAY_FACTOR).try_pow(minutes)?;
    let new_base_rate = to_rate(base_rate)?.try_mul(decay_factor)?;

    Ok(new_base_rate.to_scaled_val()?)
}

/// b(t) = b(t-1) + redeemed / supply / BETA, capped at 100%.
pub fn increase_base_rate(
    decayed_base_rate: u128,
    total_usdx_supply: u128,
    redeemed_usdx: u128,
) -> Result<u128, TroveError> {
    if total_usdx_supply == 0 {
        fail!(TroveError::ZeroAmount);
    }

    let base_rate = to_rate(decayed_base_rate)?;
    let change = {
        let fraction = if redeemed_usdx >= total_usdx_supply {
            Rate::one()
        } else {
            // amounts are u128, the fraction itself is below one
            to_rate(mul_div(redeemed_usdx, DECIMAL_PRECISION, total_usdx_supply)?)?
        };
        fraction.try_div(REDEMPTION_BETA)?
    };
    let new_base_rate = base_rate.try_add(change)?;

    Ok(u128::min(new_base_rate.to_scaled_val()?, DECIMAL_PRECISION))
}

/// Rate a redemption of `redeeming` out of `supply` would be charged at `now`.
pub fn get_redemption_rate_for_redeemed_amount(
    trove_manager: &TroveManagerState,
    supply: u128,
    redeeming: u128,
    now: u64,
) -> Result<u128, TroveError> {
    let decayed = decay_base_rate(
        trove_manager.base_rate,
        trove_manager.last_fee_operation_time,
        now,
    )?;
    let new_base_rate = increase_base_rate(decayed, supply, redeeming)?;
    Ok(calc_redemption_rate(new_base_rate))
}

/// Persists the base rate after a redemption of `redeemed` out of `supply`.
pub fn update_base_rate_from_redemption(
    trove_manager: &mut TroveManagerState,
    supply: u128,
    redeemed: u128,
    now: u64,
) -> Result<u128, TroveError> {
    let decayed = decay_base_rate(
        trove_manager.base_rate,
        trove_manager.last_fee_operation_time,
        now,
    )?;
    let new_base_rate = increase_base_rate(decayed, supply, redeemed)?;
    trove_manager.base_rate = new_base_rate;

    // Only whole minutes are consumed, the remainder keeps decaying next time
    let minutes =
        minutes_passed_since_last_fee_op(trove_manager.last_fee_operation_time, now);
    if minutes > 0 {
        trove_manager.last_fee_operation_time += minutes * SECONDS_PER_MINUTE;
    }

    Ok(new_base_rate)
}
