use anchor_lang::prelude::{msg, Pubkey};
use num::FromPrimitive;

use super::types::LatestTroveData;
use crate::{
    collaborators::{CollateralConfig, Collaborators, TroveChange},
    fail,
    sorted_troves::SortedTroves,
    state::{Trove, TroveId, TroveIdsEdit, TroveManagerState, TroveStatus},
    utils::{
        consts::DECIMAL_PRECISION,
        finance::{compute_cr, compute_nominal_cr},
        math::{calc_interest, mul_div},
    },
    TroveError,
};

pub use self::redistribution::redistribute_debt_and_coll;

/// Yearly interest owed on `debt`, the weight used by the active pool to accrue
/// aggregate interest.
pub fn calc_weighted_debt(debt: u128, annual_interest_rate: u128) -> Result<u128, TroveError> {
    mul_div(debt, annual_interest_rate, DECIMAL_PRECISION)
}

impl TroveManagerState {
    pub fn new(liquidation_penalties: super::liquidation_calcs::LiquidationPenalties) -> Self {
        Self {
            liquidation_penalties,
            ..Default::default()
        }
    }

    pub fn get_trove_status(&self, id: &TroveId) -> TroveStatus {
        self.troves
            .get(id)
            .and_then(|trove| TroveStatus::from_u8(trove.status))
            .unwrap_or(TroveStatus::NonExistent)
    }

    pub fn get_trove_owner(&self, id: &TroveId) -> Option<Pubkey> {
        self.troves
            .get(id)
            .filter(|_| self.get_trove_status(id).is_active_or_zombie())
            .map(|trove| trove.owner)
    }

    /// Rate a trove currently accrues at, zero once it is closed.
    pub fn get_trove_annual_interest_rate(
        &self,
        id: &TroveId,
        collateral_config: &dyn CollateralConfig,
    ) -> u128 {
        if self.get_trove_status(id).is_active_or_zombie() {
            collateral_config.get_annual_interest_rate()
        } else {
            0
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown_time.is_some()
    }

    pub fn get_trove_ids_count(&self) -> usize {
        self.trove_ids.len()
    }

    pub fn get_trove_from_trove_ids_array(&self, index: usize) -> Option<TroveId> {
        self.trove_ids.get(index).copied()
    }

    // Interest stops accruing at shutdown
    fn interest_period(&self, last_debt_update_time: u64, now: u64) -> u64 {
        let end = match self.shutdown_time {
            Some(shutdown_time) => u64::min(now, shutdown_time),
            None => now,
        };
        end.saturating_sub(last_debt_update_time)
    }

    /// Entire debt and collateral of a trove at `now`. Does not mutate anything.
    pub fn get_latest_trove_data(
        &self,
        id: &TroveId,
        annual_interest_rate: u128,
        now: u64,
    ) -> Result<LatestTroveData, TroveError> {
        let trove = match self.troves.get(id) {
            Some(trove) if self.get_trove_status(id).is_active_or_zombie() => trove,
            _ => return Ok(LatestTroveData::default()),
        };

        let (redist_coll_gain, redist_usdx_debt_gain) =
            redistribution::get_pending_redistribution_gains(self, id)?;
        let period = self.interest_period(trove.last_debt_update_time, now);
        let accrued_interest = calc_interest(trove.debt, annual_interest_rate, period)?;

        let entire_debt = trove
            .debt
            .checked_add(redist_usdx_debt_gain)
            .and_then(|debt| debt.checked_add(accrued_interest))
            .ok_or(TroveError::MathOverflow)?;
        let entire_coll = trove
            .coll
            .checked_add(redist_coll_gain)
            .ok_or(TroveError::MathOverflow)?;

        Ok(LatestTroveData {
            entire_debt,
            entire_coll,
            redist_usdx_debt_gain,
            redist_coll_gain,
            accrued_interest,
            recorded_debt: trove.debt,
            annual_interest_rate,
            weighted_recorded_debt: calc_weighted_debt(trove.debt, annual_interest_rate)?,
            last_debt_update_time: trove.last_debt_update_time,
        })
    }

    pub fn get_current_icr(
        &self,
        id: &TroveId,
        price: u128,
        annual_interest_rate: u128,
        now: u64,
    ) -> Result<u128, TroveError> {
        let trove = self.get_latest_trove_data(id, annual_interest_rate, now)?;
        Ok(compute_cr(trove.entire_coll, trove.entire_debt, price))
    }

    /// Rank of a trove in the sorted list.
    pub fn get_nominal_icr(
        &self,
        id: &TroveId,
        annual_interest_rate: u128,
        now: u64,
    ) -> Result<u128, TroveError> {
        let trove = self.get_latest_trove_data(id, annual_interest_rate, now)?;
        Ok(compute_nominal_cr(trove.entire_coll, trove.entire_debt))
    }

    /// Creates the record of a freshly opened trove. The caller inserts it
    /// into the sorted list.
    pub fn on_open_trove(
        &mut self,
        owner: Pubkey,
        id: TroveId,
        coll: u128,
        debt: u128,
        annual_interest_rate: u128,
        now: u64,
    ) -> Result<TroveChange, TroveError> {
        if id.is_root() {
            fail!(TroveError::IdCannotBeZero);
        }
        // Ids of closed troves are not reused
        if self.troves.contains_key(&id) {
            fail!(TroveError::TroveAlreadyExists);
        }

        self.journal_trove(&id);
        self.troves.insert(
            id,
            Trove {
                debt,
                coll,
                stake: 0,
                status: TroveStatus::Active as u8,
                array_index: self.trove_ids.len() as u64,
                last_debt_update_time: now,
                owner,
            },
        );
        self.trove_ids.push(id);
        self.journal_trove_ids(TroveIdsEdit::Pushed);

        redistribution::update_trove_reward_snapshots(self, &id);
        let stake = redistribution::update_stake_and_total_stakes(self, &id)?;

        msg!(
            "TroveUpdated {} debt {} coll {} stake {} open",
            id,
            debt,
            coll,
            stake
        );

        Ok(TroveChange {
            coll_increase: coll,
            debt_increase: debt,
            new_weighted_recorded_debt: calc_weighted_debt(debt, annual_interest_rate)?,
            ..Default::default()
        })
    }

    /// Folds pending interest and redistribution gains of `trove` into its record
    /// and sets the new recorded collateral and debt. `change` receives the
    /// applied gains and the weighted debt before and after.
    pub fn on_adjust_trove(
        &mut self,
        id: &TroveId,
        trove: &LatestTroveData,
        new_coll: u128,
        new_debt: u128,
        change: &mut TroveChange,
        now: u64,
    ) -> Result<(), TroveError> {
        change.applied_redist_usdx_debt_gain = trove.redist_usdx_debt_gain;
        change.applied_redist_coll_gain = trove.redist_coll_gain;
        change.old_weighted_recorded_debt = trove.weighted_recorded_debt;
        change.new_weighted_recorded_debt =
            calc_weighted_debt(new_debt, trove.annual_interest_rate)?;

        self.journal_trove(id);
        let record = match self.troves.get_mut(id) {
            Some(record) => record,
            None => {
                fail!(TroveError::TroveNotOpen);
            }
        };
        record.coll = new_coll;
        record.debt = new_debt;
        record.last_debt_update_time = now;

        let stake = redistribution::update_stake_and_total_stakes(self, id)?;
        redistribution::update_trove_reward_snapshots(self, id);

        msg!(
            "TroveUpdated {} debt {} coll {} stake {}",
            id,
            new_debt,
            new_coll,
            stake
        );

        Ok(())
    }

    /// Applies pending interest and redistribution gains without any other change.
    pub fn on_apply_interest(
        &mut self,
        id: &TroveId,
        trove: &LatestTroveData,
        now: u64,
    ) -> Result<TroveChange, TroveError> {
        let mut change = TroveChange::default();
        self.on_adjust_trove(id, trove, trove.entire_coll, trove.entire_debt, &mut change, now)?;
        Ok(change)
    }

    /// Removes an active or zombie trove from the existence array and the sorted
    /// list, zeroing its record but keeping `closed_status`.
    pub fn close_trove(
        &mut self,
        sorted_troves: &mut SortedTroves,
        id: &TroveId,
        closed_status: TroveStatus,
    ) -> Result<(), TroveError> {
        let status = self.get_trove_status(id);
        if !status.is_active_or_zombie() {
            fail!(TroveError::TroveNotOpen);
        }

        redistribution::remove_stake(self, id)?;
        self.remove_trove_id(id)?;

        if status == TroveStatus::Active {
            sorted_troves.remove(id)?;
        }
        if self.last_zombie_trove_id == Some(*id) {
            self.last_zombie_trove_id = None;
        }

        self.journal_trove(id);
        self.troves.insert(
            *id,
            Trove {
                status: closed_status as u8,
                ..Default::default()
            },
        );
        self.journal_reward_snapshot(id);
        self.reward_snapshots.remove(id);

        Ok(())
    }

    // Swap and pop, the moved trove gets its new index
    fn remove_trove_id(&mut self, id: &TroveId) -> Result<(), TroveError> {
        let index = match self.troves.get(id) {
            Some(trove) => trove.array_index as usize,
            None => {
                fail!(TroveError::TroveNotOpen);
            }
        };
        if self.trove_ids.get(index) != Some(id) {
            fail!(TroveError::TroveNotOpen);
        }

        self.journal_trove_ids(TroveIdsEdit::SwapRemoved { index, id: *id });
        self.trove_ids.swap_remove(index);
        if let Some(moved_id) = self.trove_ids.get(index).copied() {
            self.journal_trove(&moved_id);
            if let Some(moved) = self.troves.get_mut(&moved_id) {
                moved.array_index = index as u64;
            }
        }

        Ok(())
    }

    /// Moves an active trove to where its current rank belongs, searching
    /// outwards from its current neighbours.
    pub fn reposition_trove(
        &self,
        sorted_troves: &mut SortedTroves,
        id: &TroveId,
        annual_interest_rate: u128,
        now: u64,
    ) -> Result<(), TroveError> {
        let ranks = self.ranks(annual_interest_rate, now);
        let rank = self.get_nominal_icr(id, annual_interest_rate, now)?;
        let (prev_id, next_id) = (sorted_troves.get_prev(id), sorted_troves.get_next(id));
        sorted_troves.re_insert(*id, rank, prev_id, next_id, &ranks)?;
        Ok(())
    }

    /// Takes a trove out of the sorted list after its debt fell below the minimum.
    pub fn set_trove_status_to_zombie(
        &mut self,
        sorted_troves: &mut SortedTroves,
        id: &TroveId,
    ) -> Result<(), TroveError> {
        if self.get_trove_status(id) != TroveStatus::Active {
            fail!(TroveError::TroveNotActive);
        }
        sorted_troves.remove(id)?;
        self.set_status(id, TroveStatus::Zombie)
    }

    /// Brings a zombie back. The caller reinserts it into the sorted list.
    pub fn set_trove_status_to_active(&mut self, id: &TroveId) -> Result<(), TroveError> {
        if self.get_trove_status(id) != TroveStatus::Zombie {
            fail!(TroveError::TroveNotZombie);
        }
        if self.last_zombie_trove_id == Some(*id) {
            self.last_zombie_trove_id = None;
        }
        self.set_status(id, TroveStatus::Active)
    }

    fn set_status(&mut self, id: &TroveId, status: TroveStatus) -> Result<(), TroveError> {
        self.journal_trove(id);
        match self.troves.get_mut(id) {
            Some(trove) => {
                trove.status = status as u8;
                Ok(())
            }
            None => {
                fail!(TroveError::TroveNotOpen);
            }
        }
    }

    pub fn shutdown(&mut self, now: u64) -> Result<(), TroveError> {
        if self.is_shut_down() {
            fail!(TroveError::IsShutDown);
        }
        self.shutdown_time = Some(now);
        msg!("Branch shut down at {}", now);
        Ok(())
    }
}

/// System collateral ratio at `price`, using the pools' aggregate balances.
pub fn get_tcr(collab: &Collaborators, price: u128, now: u64) -> u128 {
    compute_cr(
        collab.get_entire_system_coll(),
        collab.get_entire_system_debt(now),
        price,
    )
}

pub mod redistribution {
    use crate::{
        fail,
        state::{RewardSnapshot, TroveId, TroveManagerState},
        utils::{bn::U256, consts::DECIMAL_PRECISION, coretypes::CheckedAssign, math::mul_div},
        TroveError,
    };
    use anchor_lang::prelude::msg;
    use std::convert::TryFrom;

    /// Shares `debt` and `coll` between all open troves in proportion to
    /// their stakes. Floor division remainders are carried over to the next call.
    pub fn redistribute_debt_and_coll(
        trove_manager: &mut TroveManagerState,
        debt: u128,
        coll: u128,
    ) -> Result<(), TroveError> {
        if debt == 0 {
            return Ok(());
        }
        let total_stakes = trove_manager.total_stakes;
        if total_stakes == 0 {
            fail!(TroveError::CannotRedistributeWithoutStakes);
        }

        let (coll_reward_per_unit_staked, coll_error) = reward_per_unit_staked(
            coll,
            trove_manager.last_coll_error_redistribution,
            total_stakes,
        )?;
        let (debt_reward_per_unit_staked, debt_error) = reward_per_unit_staked(
            debt,
            trove_manager.last_usdx_debt_error_redistribution,
            total_stakes,
        )?;

        trove_manager
            .l_coll
            .checked_add_assign(coll_reward_per_unit_staked)?;
        trove_manager
            .l_usdx_debt
            .checked_add_assign(debt_reward_per_unit_staked)?;
        trove_manager.last_coll_error_redistribution = coll_error;
        trove_manager.last_usdx_debt_error_redistribution = debt_error;

        msg!(
            "Redistributing debt {} coll {} over stakes {}, L_coll {} L_usdx_debt {}",
            debt,
            coll,
            total_stakes,
            trove_manager.l_coll,
            trove_manager.l_usdx_debt
        );

        Ok(())
    }

    /// `(amount * DECIMAL_PRECISION + last_error) / total_stakes` and the remainder.
    pub fn reward_per_unit_staked(
        amount: u128,
        last_error: u128,
        total_stakes: u128,
    ) -> Result<(u128, u128), TroveError> {
        let numerator = U256::from(amount) * U256::from(DECIMAL_PRECISION) + U256::from(last_error);
        let total_stakes = U256::from(total_stakes);

        let per_unit = numerator / total_stakes;
        let error = numerator - per_unit * total_stakes;

        Ok((
            u128::try_from(per_unit).map_err(|_| TroveError::MathOverflow)?,
            u128::try_from(error).map_err(|_| TroveError::MathOverflow)?,
        ))
    }

    /// Redistribution gains `(coll, debt)` not yet applied to the trove record.
    pub fn get_pending_redistribution_gains(
        trove_manager: &TroveManagerState,
        id: &TroveId,
    ) -> Result<(u128, u128), TroveError> {
        if !trove_manager.get_trove_status(id).is_active_or_zombie() {
            return Ok((0, 0));
        }
        let stake = trove_manager.troves.get(id).map_or(0, |trove| trove.stake);
        let snapshot = trove_manager
            .reward_snapshots
            .get(id)
            .copied()
            .unwrap_or_default();

        let coll_gain = mul_div(
            stake,
            trove_manager.l_coll.saturating_sub(snapshot.coll),
            DECIMAL_PRECISION,
        )?;
        let debt_gain = mul_div(
            stake,
            trove_manager.l_usdx_debt.saturating_sub(snapshot.usdx_debt),
            DECIMAL_PRECISION,
        )?;

        Ok((coll_gain, debt_gain))
    }

    pub fn update_trove_reward_snapshots(trove_manager: &mut TroveManagerState, id: &TroveId) {
        let snapshot = RewardSnapshot {
            coll: trove_manager.l_coll,
            usdx_debt: trove_manager.l_usdx_debt,
        };
        trove_manager.journal_reward_snapshot(id);
        trove_manager.reward_snapshots.insert(*id, snapshot);
    }

    /// Stake of a trove holding `coll`, scaled by the system snapshots so that
    /// troves joining after a liquidation get a fair share of later ones.
    pub fn compute_new_stake(
        trove_manager: &TroveManagerState,
        coll: u128,
    ) -> Result<u128, TroveError> {
        if trove_manager.total_collateral_snapshot == 0 {
            return Ok(coll);
        }
        mul_div(
            coll,
            trove_manager.total_stakes_snapshot,
            trove_manager.total_collateral_snapshot,
        )
    }

    pub fn update_stake_and_total_stakes(
        trove_manager: &mut TroveManagerState,
        id: &TroveId,
    ) -> Result<u128, TroveError> {
        let (coll, old_stake) = match trove_manager.troves.get(id) {
            Some(trove) => (trove.coll, trove.stake),
            None => {
                fail!(TroveError::TroveNotOpen);
            }
        };
        let new_stake = compute_new_stake(trove_manager, coll)?;

        trove_manager.total_stakes.checked_sub_assign(old_stake)?;
        trove_manager.total_stakes.checked_add_assign(new_stake)?;
        trove_manager.journal_trove(id);
        if let Some(trove) = trove_manager.troves.get_mut(id) {
            trove.stake = new_stake;
        }

        Ok(new_stake)
    }

    pub fn remove_stake(trove_manager: &mut TroveManagerState, id: &TroveId) -> Result<(), TroveError> {
        let stake = trove_manager.troves.get(id).map_or(0, |trove| trove.stake);
        trove_manager.total_stakes.checked_sub_assign(stake)?;
        trove_manager.journal_trove(id);
        if let Some(trove) = trove_manager.troves.get_mut(id) {
            trove.stake = 0;
        }
        Ok(())
    }

    /// Taken after each liquidation batch. The gas compensation still sitting
    /// in the active pool is about to leave and does not back any stake.
    pub fn update_system_snapshots_exclude_coll_remainder(
        trove_manager: &mut TroveManagerState,
        active_pool_coll: u128,
        default_pool_coll: u128,
        coll_remainder: u128,
    ) {
        trove_manager.total_stakes_snapshot = trove_manager.total_stakes;
        trove_manager.total_collateral_snapshot = active_pool_coll
            .saturating_sub(coll_remainder)
            .saturating_add(default_pool_coll);

        msg!(
            "SystemSnapshotsUpdated total_stakes {} total_collateral {}",
            trove_manager.total_stakes_snapshot,
            trove_manager.total_collateral_snapshot
        );
    }
}
