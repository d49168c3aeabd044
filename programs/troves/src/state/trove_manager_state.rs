use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};

use super::{RewardSnapshot, Trove, TroveId, TroveManagerJournal};
use crate::trove_manager::liquidation_calcs::LiquidationPenalties;

#[derive(BorshSerialize, BorshDeserialize, Debug, Default, Clone)]
pub struct TroveManagerState {
    // Per trove records, closed troves keep a zeroed record with their final status
    pub troves: BTreeMap<TroveId, Trove>,
    pub reward_snapshots: BTreeMap<TroveId, RewardSnapshot>,

    // Unordered array of open trove ids, troves point back via `array_index`
    pub trove_ids: Vec<TroveId>,

    pub total_stakes: u128,

    // Taken right after each liquidation batch, see `compute_new_stake`
    pub total_stakes_snapshot: u128,
    pub total_collateral_snapshot: u128,

    // Redistribution rewards per unit staked
    pub l_coll: u128,
    pub l_usdx_debt: u128,

    // Floor division remainders fed into the next redistribution
    pub last_coll_error_redistribution: u128,
    pub last_usdx_debt_error_redistribution: u128,

    // Partially redeemed trove to start the next redemption from
    pub last_zombie_trove_id: Option<TroveId>,

    pub shutdown_time: Option<u64>,

    // Redemption fee base rate
    pub base_rate: u128,
    pub last_fee_operation_time: u64,

    pub liquidation_penalties: LiquidationPenalties,

    // Undo log of the running operation, see `atomically`
    #[borsh_skip]
    pub journal: Option<TroveManagerJournal>,
}
