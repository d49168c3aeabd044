use borsh::{BorshDeserialize, BorshSerialize};

use crate::{
    utils::{
        consts::{
            COLL_GAS_COMPENSATION_CAP, DECIMAL_PRECISION, LIQUIDATION_PENALTY_REDISTRIBUTION,
            LIQUIDATION_PENALTY_SP, LIQUIDATION_PROTOCOL_FEE, LIQUIDATOR_COMPENSATION_RATE,
        },
        finance::{debt_to_coll, get_coll_penalty_and_surplus},
        math::mul_div,
    },
    TroveError,
};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationPenalties {
    // Seized on top of the offset debt by the stability pool
    pub stability_pool: u128,
    // Seized on top of the redistributed debt by the surviving troves
    pub redistribution: u128,
    // Share of the offset collateral paid to the liquidator
    pub liquidator: u128,
    pub liquidator_compensation_cap: u128,
    // Charged on the entire debt, out of the surplus
    pub protocol: u128,
}

impl Default for LiquidationPenalties {
    fn default() -> Self {
        Self {
            stability_pool: LIQUIDATION_PENALTY_SP,
            redistribution: LIQUIDATION_PENALTY_REDISTRIBUTION,
            liquidator: LIQUIDATOR_COMPENSATION_RATE,
            liquidator_compensation_cap: COLL_GAS_COMPENSATION_CAP,
            protocol: LIQUIDATION_PROTOCOL_FEE,
        }
    }
}

/// Where the debt and collateral of one liquidated trove end up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationValues {
    pub debt_to_offset: u128,
    pub coll_to_send_to_sp: u128,
    pub debt_to_redistribute: u128,
    pub coll_to_redistribute: u128,
    pub coll_gas_compensation: u128,
    pub coll_to_protocol: u128,
    pub coll_surplus: u128,
}

/// Splits a trove's entire debt and collateral between the stability pool,
/// the liquidator, the surviving troves, the protocol and the owner.
///
/// The stability pool takes as much debt as it can absorb together with the
/// same fraction of the collateral. Whatever the pool does not seize is surplus,
/// and that surplus is available to the redistribution step before anything is
/// left for the protocol fee and the owner.
pub fn get_offset_and_redistribution_vals(
    entire_debt: u128,
    entire_coll: u128,
    usdx_in_sp_for_offsets: u128,
    price: u128,
    penalties: &LiquidationPenalties,
) -> Result<LiquidationValues, TroveError> {
    if entire_debt == 0 {
        return Ok(LiquidationValues {
            coll_surplus: entire_coll,
            ..Default::default()
        });
    }

    let mut values = LiquidationValues::default();
    let mut coll_surplus = 0;

    let coll_sp_portion = if usdx_in_sp_for_offsets > 0 {
        values.debt_to_offset = u128::min(entire_debt, usdx_in_sp_for_offsets);
        let coll_sp_portion = mul_div(entire_coll, values.debt_to_offset, entire_debt)?;

        values.coll_gas_compensation = u128::min(
            mul_div(coll_sp_portion, penalties.liquidator, DECIMAL_PRECISION)?,
            penalties.liquidator_compensation_cap,
        );

        let (seized, surplus) = get_coll_penalty_and_surplus(
            coll_sp_portion - values.coll_gas_compensation,
            values.debt_to_offset,
            penalties.stability_pool,
            price,
        )?;
        values.coll_to_send_to_sp = seized;
        coll_surplus = surplus;

        coll_sp_portion
    } else {
        0
    };

    values.debt_to_redistribute = entire_debt - values.debt_to_offset;
    if values.debt_to_redistribute > 0 {
        let coll_redist_portion = entire_coll - coll_sp_portion;
        let (seized, surplus) = get_coll_penalty_and_surplus(
            coll_redist_portion + coll_surplus,
            values.debt_to_redistribute,
            penalties.redistribution,
            price,
        )?;
        values.coll_to_redistribute = seized;
        coll_surplus = surplus;
    }

    values.coll_to_protocol = u128::min(
        debt_to_coll(entire_debt, penalties.protocol, price)?,
        coll_surplus,
    );
    values.coll_surplus = coll_surplus - values.coll_to_protocol;

    Ok(values)
}
