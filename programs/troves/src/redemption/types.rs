use crate::{state::TroveId, utils::coretypes::CheckedAssign, TroveError};

/// Outcome of redeeming against one trove.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SingleRedemption {
    pub trove_id: TroveId,
    pub usdx_lot: u128,
    // Collateral sent to the redeemer, the fee part stays in the trove
    pub coll_lot: u128,
    pub coll_fee: u128,
    pub new_debt: u128,
    pub new_coll: u128,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RedemptionTotals {
    pub redeemed_usdx: u128,
    pub coll_to_redeemer: u128,
    pub coll_fee: u128,
}

impl RedemptionTotals {
    pub fn add(&mut self, redemption: &SingleRedemption) -> Result<(), TroveError> {
        self.redeemed_usdx.checked_add_assign(redemption.usdx_lot)?;
        self.coll_to_redeemer.checked_add_assign(redemption.coll_lot)?;
        self.coll_fee.checked_add_assign(redemption.coll_fee)?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct RedemptionEffects {
    pub totals: RedemptionTotals,
    pub redemption_rate: u128,
    // Burned from the redeemer by the caller
    pub usdx_to_burn: u128,
    pub redeemed: Vec<SingleRedemption>,
}
