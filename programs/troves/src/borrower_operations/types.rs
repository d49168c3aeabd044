use anchor_lang::prelude::Pubkey;

use crate::state::TroveId;

#[derive(Debug, Clone)]
pub struct OpenTroveParams {
    // Salt for the trove id, together with the owner
    pub owner_index: u64,
    pub coll_amount: u128,
    pub usdx_amount: u128,
    pub upper_hint: TroveId,
    pub lower_hint: TroveId,
    pub add_manager: Option<Pubkey>,
    pub remove_manager: Option<Pubkey>,
    // Defaults to the owner
    pub receiver: Option<Pubkey>,
}

#[derive(Debug, Clone, Default)]
pub struct AdjustTroveParams {
    pub coll_change: u128,
    pub is_coll_increase: bool,
    pub usdx_change: u128,
    pub is_debt_increase: bool,
    pub upper_hint: TroveId,
    pub lower_hint: TroveId,
}

impl AdjustTroveParams {
    pub fn add_coll(amount: u128) -> Self {
        Self {
            coll_change: amount,
            is_coll_increase: true,
            ..Default::default()
        }
    }

    pub fn withdraw_coll(amount: u128) -> Self {
        Self {
            coll_change: amount,
            ..Default::default()
        }
    }

    pub fn borrow(amount: u128) -> Self {
        Self {
            usdx_change: amount,
            is_debt_increase: true,
            ..Default::default()
        }
    }

    pub fn repay(amount: u128) -> Self {
        Self {
            usdx_change: amount,
            ..Default::default()
        }
    }

    pub fn with_hints(mut self, upper_hint: TroveId, lower_hint: TroveId) -> Self {
        self.upper_hint = upper_hint;
        self.lower_hint = lower_hint;
        self
    }

    // Withdrawing collateral and borrowing need the remove permission
    pub(crate) fn removes_value(&self) -> bool {
        (!self.is_coll_increase && self.coll_change > 0)
            || (self.is_debt_increase && self.usdx_change > 0)
    }
}

#[derive(Debug)]
pub struct OpenTroveEffects {
    pub trove_id: TroveId,
    pub coll_to_transfer_from_owner: u128,
    pub usdx_to_mint_to_receiver: u128,
    pub usdx_to_mint_to_treasury: u128,
}

#[derive(Debug, Default)]
pub struct AdjustTroveEffects {
    pub coll_to_transfer_from_caller: u128,
    // Already sent out of the active pool to `receiver`
    pub coll_sent_to_receiver: u128,
    pub usdx_to_mint_to_receiver: u128,
    pub usdx_to_mint_to_treasury: u128,
    pub usdx_to_burn_from_caller: u128,
    pub receiver: Pubkey,
}

#[derive(Debug)]
pub struct CloseTroveEffects {
    pub usdx_to_burn_from_caller: u128,
    pub coll_sent_to_receiver: u128,
    pub receiver: Pubkey,
}
