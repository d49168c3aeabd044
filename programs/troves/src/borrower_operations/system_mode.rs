use crate::{
    collaborators::TroveChange,
    fail,
    utils::{
        bn::U256,
        consts::{CCR, DECIMAL_PRECISION, MCR},
        finance::compute_cr,
    },
    TroveError,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SystemMode {
    Normal,
    Critical,
}

pub fn calc_system_mode(tcr: u128) -> SystemMode {
    if tcr < CCR {
        SystemMode::Critical
    } else {
        SystemMode::Normal
    }
}

/// System ratio once `change` is applied to the current system totals.
pub fn calc_new_tcr(
    system_coll: u128,
    system_debt: u128,
    change: &TroveChange,
    price: u128,
) -> Result<u128, TroveError> {
    let new_coll = system_coll
        .checked_add(change.coll_increase)
        .ok_or(TroveError::MathOverflow)?
        .saturating_sub(change.coll_decrease);
    let new_debt = system_debt
        .checked_add(change.debt_increase)
        .ok_or(TroveError::MathOverflow)?
        .saturating_sub(change.debt_decrease);

    Ok(compute_cr(new_coll, new_debt, price))
}

/// In critical mode new debt must bring the system back above CCR and any
/// withdrawn collateral must be matched in value by repaid debt. Otherwise
/// the adjustment must not bring the system below CCR.
pub fn require_valid_adjustment_in_current_mode(
    mode: SystemMode,
    change: &TroveChange,
    new_icr: u128,
    new_tcr: u128,
    price: u128,
) -> Result<(), TroveError> {
    if new_icr < MCR {
        fail!(TroveError::IcrBelowMcr);
    }

    match mode {
        SystemMode::Critical => {
            if change.debt_increase > 0 && new_tcr < CCR {
                fail!(TroveError::TcrBelowCcr);
            }
            let repaid_value = U256::from(change.debt_decrease) * U256::from(DECIMAL_PRECISION);
            let withdrawn_value = U256::from(change.coll_decrease) * U256::from(price);
            if repaid_value < withdrawn_value {
                fail!(TroveError::RepaymentNotMatchingCollWithdrawal);
            }
        }
        SystemMode::Normal => {
            if new_tcr < CCR {
                fail!(TroveError::TcrBelowCcr);
            }
        }
    }

    Ok(())
}
