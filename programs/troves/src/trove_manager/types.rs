use anchor_lang::prelude::Pubkey;

use super::liquidation_calcs::LiquidationValues;
use crate::{state::TroveId, utils::coretypes::CheckedAssign, TroveError};

/// A trove as it stands at a given time, with pending interest and
/// redistribution gains folded in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LatestTroveData {
    pub entire_debt: u128,
    pub entire_coll: u128,
    pub redist_usdx_debt_gain: u128,
    pub redist_coll_gain: u128,
    pub accrued_interest: u128,
    pub recorded_debt: u128,
    pub annual_interest_rate: u128,
    pub weighted_recorded_debt: u128,
    pub last_debt_update_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidatedTrove {
    pub trove_id: TroveId,
    pub owner: Pubkey,
    pub values: LiquidationValues,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LiquidationTotals {
    pub debt_to_offset: u128,
    pub coll_to_send_to_sp: u128,
    pub debt_to_redistribute: u128,
    pub coll_to_redistribute: u128,
    pub coll_gas_compensation: u128,
    pub coll_to_protocol: u128,
    pub coll_surplus: u128,
}

impl LiquidationTotals {
    pub fn add(&mut self, values: &LiquidationValues) -> Result<(), TroveError> {
        self.debt_to_offset.checked_add_assign(values.debt_to_offset)?;
        self.coll_to_send_to_sp
            .checked_add_assign(values.coll_to_send_to_sp)?;
        self.debt_to_redistribute
            .checked_add_assign(values.debt_to_redistribute)?;
        self.coll_to_redistribute
            .checked_add_assign(values.coll_to_redistribute)?;
        self.coll_gas_compensation
            .checked_add_assign(values.coll_gas_compensation)?;
        self.coll_to_protocol.checked_add_assign(values.coll_to_protocol)?;
        self.coll_surplus.checked_add_assign(values.coll_surplus)?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct LiquidationEffects {
    pub price: u128,
    pub totals: LiquidationTotals,
    pub liquidated: Vec<LiquidatedTrove>,
}
