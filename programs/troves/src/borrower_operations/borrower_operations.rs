use anchor_lang::prelude::{msg, Pubkey};

use super::{
    borrow_fee::BorrowSplit,
    system_mode,
    types::{
        AdjustTroveEffects, AdjustTroveParams, CloseTroveEffects, OpenTroveEffects,
        OpenTroveParams,
    },
};
use crate::{
    collaborators::{CollDestination, Collaborators, TroveChange},
    fail,
    sorted_troves::SortedTroves,
    state::{BorrowerOperationsState, RemoveManager, TroveId, TroveManagerState, TroveStatus},
    trove_manager::{atomically, trove_operations::get_tcr},
    utils::{
        consts::{CCR, MCR, MIN_DEBT, SCR},
        finance::{compute_cr, compute_nominal_cr},
    },
    TroveError,
};

/// Opens a trove for `owner` holding `coll_amount` and owing `usdx_amount`.
/// The borrow fee is taken out of the minted amount, not added to the debt.
#[allow(clippy::too_many_arguments)]
pub fn open_trove(
    borrower_operations: &mut BorrowerOperationsState,
    trove_manager: &mut TroveManagerState,
    sorted_troves: &mut SortedTroves,
    collab: &mut Collaborators,
    owner: Pubkey,
    params: &OpenTroveParams,
    now: u64,
) -> Result<OpenTroveEffects, TroveError> {
    collab.collateral_config.require_not_paused_or_frozen(true)?;
    if trove_manager.is_shut_down() {
        fail!(TroveError::IsShutDown);
    }
    if params.coll_amount == 0 {
        fail!(TroveError::ZeroAmount);
    }
    if params.usdx_amount < MIN_DEBT {
        fail!(TroveError::DebtBelowMin);
    }

    let trove_id = TroveId::derive(&owner, params.owner_index);

    let effects = atomically(trove_manager, sorted_troves, |trove_manager, sorted_troves| {
        let price = collab.fetch_price()?;
        let annual_interest_rate = collab.collateral_config.get_annual_interest_rate();
        let split =
            BorrowSplit::split_fees(params.usdx_amount, collab.collateral_config.get_borrow_ratio())?;

        let icr = compute_cr(params.coll_amount, params.usdx_amount, price);
        if icr < MCR {
            fail!(TroveError::IcrBelowMcr);
        }

        let change = trove_manager.on_open_trove(
            owner,
            trove_id,
            params.coll_amount,
            params.usdx_amount,
            annual_interest_rate,
            now,
        )?;

        let new_tcr = system_mode::calc_new_tcr(
            collab.get_entire_system_coll(),
            collab.get_entire_system_debt(now),
            &change,
            price,
        )?;
        if new_tcr < CCR {
            fail!(TroveError::TcrBelowCcr);
        }

        let rank = compute_nominal_cr(params.coll_amount, params.usdx_amount);
        sorted_troves.insert(
            trove_id,
            rank,
            params.upper_hint,
            params.lower_hint,
            &trove_manager.ranks(annual_interest_rate, now),
        )?;

        collab
            .active_pool
            .mint_agg_interest_and_account_for_trove_change(&change, now);
        collab.active_pool.receive_coll(params.coll_amount);
        collab.trove_nft.mint(owner, trove_id);

        Ok(OpenTroveEffects {
            trove_id,
            coll_to_transfer_from_owner: params.coll_amount,
            usdx_to_mint_to_receiver: split.amount_to_receiver(),
            usdx_to_mint_to_treasury: split.fees_to_pay,
        })
    })?;

    if let Some(add_manager) = params.add_manager {
        borrower_operations
            .add_managers
            .insert(trove_id, add_manager);
    }
    if let Some(remove_manager) = params.remove_manager {
        borrower_operations.remove_managers.insert(
            trove_id,
            RemoveManager {
                manager: remove_manager,
                receiver: params.receiver.unwrap_or(owner),
            },
        );
    }

    Ok(effects)
}

#[allow(clippy::too_many_arguments)]
pub fn adjust_trove(
    borrower_operations: &BorrowerOperationsState,
    trove_manager: &mut TroveManagerState,
    sorted_troves: &mut SortedTroves,
    collab: &mut Collaborators,
    caller: Pubkey,
    trove_id: &TroveId,
    params: &AdjustTroveParams,
    now: u64,
) -> Result<AdjustTroveEffects, TroveError> {
    match trove_manager.get_trove_status(trove_id) {
        TroveStatus::Active => {}
        TroveStatus::Zombie => {
            fail!(TroveError::TroveNotActive);
        }
        _ => {
            fail!(TroveError::TroveNotOpen);
        }
    }
    utils::adjust(
        borrower_operations,
        trove_manager,
        sorted_troves,
        collab,
        caller,
        trove_id,
        params,
        now,
    )
}

/// Adjusts a zombie trove, which must end up with at least the minimum debt.
/// The trove goes back into the sorted list as an active one.
#[allow(clippy::too_many_arguments)]
pub fn adjust_zombie_trove(
    borrower_operations: &BorrowerOperationsState,
    trove_manager: &mut TroveManagerState,
    sorted_troves: &mut SortedTroves,
    collab: &mut Collaborators,
    caller: Pubkey,
    trove_id: &TroveId,
    params: &AdjustTroveParams,
    now: u64,
) -> Result<AdjustTroveEffects, TroveError> {
    match trove_manager.get_trove_status(trove_id) {
        TroveStatus::Zombie => {}
        TroveStatus::Active => {
            fail!(TroveError::TroveNotZombie);
        }
        _ => {
            fail!(TroveError::TroveNotOpen);
        }
    }
    utils::adjust(
        borrower_operations,
        trove_manager,
        sorted_troves,
        collab,
        caller,
        trove_id,
        params,
        now,
    )
}

/// Folds pending interest and redistribution gains into the trove record.
/// Anyone may call it. A zombie whose debt grew back to the minimum is
/// reinserted into the sorted list.
pub fn apply_pending_debt(
    trove_manager: &mut TroveManagerState,
    sorted_troves: &mut SortedTroves,
    collab: &mut Collaborators,
    trove_id: &TroveId,
    upper_hint: TroveId,
    lower_hint: TroveId,
    now: u64,
) -> Result<(), TroveError> {
    collab.collateral_config.require_not_paused_or_frozen(false)?;
    if trove_manager.is_shut_down() {
        fail!(TroveError::IsShutDown);
    }
    let status = trove_manager.get_trove_status(trove_id);
    if !status.is_active_or_zombie() {
        fail!(TroveError::TroveNotOpen);
    }

    atomically(trove_manager, sorted_troves, |trove_manager, sorted_troves| {
        let annual_interest_rate = collab.collateral_config.get_annual_interest_rate();
        let trove = trove_manager.get_latest_trove_data(trove_id, annual_interest_rate, now)?;

        let change = trove_manager.on_apply_interest(trove_id, &trove, now)?;

        if status == TroveStatus::Zombie && trove.entire_debt >= MIN_DEBT {
            trove_manager.set_trove_status_to_active(trove_id)?;
            let rank = compute_nominal_cr(trove.entire_coll, trove.entire_debt);
            sorted_troves.insert(
                *trove_id,
                rank,
                upper_hint,
                lower_hint,
                &trove_manager.ranks(annual_interest_rate, now),
            )?;
        }

        collab.move_pending_trove_rewards_to_active_pool(
            trove.redist_usdx_debt_gain,
            trove.redist_coll_gain,
        );
        collab
            .active_pool
            .mint_agg_interest_and_account_for_trove_change(&change, now);

        Ok(())
    })
}

/// Closes a trove, the caller repays its entire debt and the receiver gets
/// the entire collateral.
pub fn close_trove(
    borrower_operations: &mut BorrowerOperationsState,
    trove_manager: &mut TroveManagerState,
    sorted_troves: &mut SortedTroves,
    collab: &mut Collaborators,
    caller: Pubkey,
    trove_id: &TroveId,
    now: u64,
) -> Result<CloseTroveEffects, TroveError> {
    collab.collateral_config.require_not_paused_or_frozen(false)?;
    let receiver = borrower_operations
        .require_owner_or_remove_manager_and_get_receiver(trove_manager, caller, trove_id)?;

    let effects = atomically(trove_manager, sorted_troves, |trove_manager, sorted_troves| {
        let price = collab.fetch_price()?;
        let annual_interest_rate =
            trove_manager.get_trove_annual_interest_rate(trove_id, collab.collateral_config);
        let trove = trove_manager.get_latest_trove_data(trove_id, annual_interest_rate, now)?;

        let change = TroveChange {
            applied_redist_usdx_debt_gain: trove.redist_usdx_debt_gain,
            applied_redist_coll_gain: trove.redist_coll_gain,
            coll_decrease: trove.entire_coll,
            debt_decrease: trove.entire_debt,
            old_weighted_recorded_debt: trove.weighted_recorded_debt,
            ..Default::default()
        };

        if !trove_manager.is_shut_down() {
            if trove_manager.get_trove_ids_count() <= 1 {
                fail!(TroveError::OnlyOneTroveLeft);
            }
            let new_tcr = system_mode::calc_new_tcr(
                collab.get_entire_system_coll(),
                collab.get_entire_system_debt(now),
                &change,
                price,
            )?;
            if new_tcr < CCR {
                fail!(TroveError::TcrBelowCcr);
            }
        }

        trove_manager.close_trove(sorted_troves, trove_id, TroveStatus::ClosedByOwner)?;

        collab.move_pending_trove_rewards_to_active_pool(
            trove.redist_usdx_debt_gain,
            trove.redist_coll_gain,
        );
        collab
            .active_pool
            .mint_agg_interest_and_account_for_trove_change(&change, now);
        collab
            .active_pool
            .send_coll(CollDestination::Account(receiver), trove.entire_coll);
        collab.trove_nft.burn(*trove_id);

        msg!(
            "TroveUpdated {} debt 0 coll 0 stake 0 closed, repaid {}",
            trove_id,
            trove.entire_debt
        );

        Ok(CloseTroveEffects {
            usdx_to_burn_from_caller: trove.entire_debt,
            coll_sent_to_receiver: trove.entire_coll,
            receiver,
        })
    })?;

    borrower_operations.add_managers.remove(trove_id);
    borrower_operations.remove_managers.remove(trove_id);

    Ok(effects)
}

/// Lets `manager` add collateral and repay on behalf of the owner.
/// `None` clears it.
pub fn set_add_manager(
    borrower_operations: &mut BorrowerOperationsState,
    trove_manager: &TroveManagerState,
    caller: Pubkey,
    trove_id: &TroveId,
    manager: Option<Pubkey>,
) -> Result<(), TroveError> {
    borrower_operations.require_owner(trove_manager, caller, trove_id)?;
    match manager {
        Some(manager) => {
            borrower_operations.add_managers.insert(*trove_id, manager);
        }
        None => {
            borrower_operations.add_managers.remove(trove_id);
        }
    }
    Ok(())
}

/// Lets `manager` withdraw collateral, borrow and close, with the proceeds
/// going to `receiver`. `None` clears it.
pub fn set_remove_manager_with_receiver(
    borrower_operations: &mut BorrowerOperationsState,
    trove_manager: &TroveManagerState,
    caller: Pubkey,
    trove_id: &TroveId,
    manager: Option<Pubkey>,
    receiver: Pubkey,
) -> Result<(), TroveError> {
    borrower_operations.require_owner(trove_manager, caller, trove_id)?;
    match manager {
        Some(manager) => {
            borrower_operations
                .remove_managers
                .insert(*trove_id, RemoveManager { manager, receiver });
        }
        None => {
            borrower_operations.remove_managers.remove(trove_id);
        }
    }
    Ok(())
}

/// Shuts the branch down once its system ratio fell below SCR.
pub fn shutdown(
    trove_manager: &mut TroveManagerState,
    collab: &mut Collaborators,
    now: u64,
) -> Result<(), TroveError> {
    if trove_manager.is_shut_down() {
        fail!(TroveError::IsShutDown);
    }

    let price = collab.fetch_price()?;
    let tcr = get_tcr(collab, price, now);
    if tcr >= SCR {
        fail!(TroveError::TcrNotBelowScr);
    }

    trove_manager.shutdown(now)?;
    collab.active_pool.set_shutdown_flag(now);

    msg!("Shutdown at TCR {}", tcr);
    Ok(())
}

/// Called on behalf of the price feed when it detects an oracle failure.
/// Does nothing when the branch is already shut down.
pub fn shutdown_from_oracle_failure(
    trove_manager: &mut TroveManagerState,
    collab: &mut Collaborators,
    now: u64,
) -> Result<(), TroveError> {
    if trove_manager.is_shut_down() {
        return Ok(());
    }

    trove_manager.shutdown(now)?;
    collab.active_pool.set_shutdown_flag(now);

    msg!("Shutdown from oracle failure");
    Ok(())
}

impl BorrowerOperationsState {
    pub fn require_owner(
        &self,
        trove_manager: &TroveManagerState,
        caller: Pubkey,
        trove_id: &TroveId,
    ) -> Result<Pubkey, TroveError> {
        let owner = utils::get_open_trove_owner(trove_manager, trove_id)?;
        if caller != owner {
            fail!(TroveError::NotOwner);
        }
        Ok(owner)
    }

    pub fn require_owner_or_add_manager(
        &self,
        trove_manager: &TroveManagerState,
        caller: Pubkey,
        trove_id: &TroveId,
    ) -> Result<(), TroveError> {
        let owner = utils::get_open_trove_owner(trove_manager, trove_id)?;
        if caller != owner && self.add_managers.get(trove_id) != Some(&caller) {
            fail!(TroveError::NotOwnerNorAddManager);
        }
        Ok(())
    }

    /// Value taken out of the trove goes to the owner when the owner calls,
    /// and to the configured receiver when the remove manager does.
    pub fn require_owner_or_remove_manager_and_get_receiver(
        &self,
        trove_manager: &TroveManagerState,
        caller: Pubkey,
        trove_id: &TroveId,
    ) -> Result<Pubkey, TroveError> {
        let owner = utils::get_open_trove_owner(trove_manager, trove_id)?;
        if caller == owner {
            return Ok(owner);
        }
        match self.remove_managers.get(trove_id) {
            Some(remove_manager) if remove_manager.manager == caller => Ok(remove_manager.receiver),
            _ => {
                fail!(TroveError::NotOwnerNorRemoveManager);
            }
        }
    }
}

pub mod utils {
    use anchor_lang::prelude::Pubkey;

    use crate::{
        borrower_operations::{
            borrow_fee::BorrowSplit,
            system_mode::{self, calc_system_mode},
            types::{AdjustTroveEffects, AdjustTroveParams},
        },
        collaborators::{CollDestination, Collaborators, TroveChange},
        fail,
        sorted_troves::SortedTroves,
        state::{BorrowerOperationsState, TroveId, TroveManagerState, TroveStatus},
        trove_manager::{atomically, trove_operations::get_tcr},
        utils::{
            consts::MIN_DEBT,
            finance::{compute_cr, compute_nominal_cr},
        },
        TroveError,
    };

    pub fn get_open_trove_owner(
        trove_manager: &TroveManagerState,
        trove_id: &TroveId,
    ) -> Result<Pubkey, TroveError> {
        match trove_manager.get_trove_owner(trove_id) {
            Some(owner) => Ok(owner),
            None => {
                fail!(TroveError::TroveNotOpen);
            }
        }
    }

    /// Shared by active and zombie adjustments, the caller checked the status.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn adjust(
        borrower_operations: &BorrowerOperationsState,
        trove_manager: &mut TroveManagerState,
        sorted_troves: &mut SortedTroves,
        collab: &mut Collaborators,
        caller: Pubkey,
        trove_id: &TroveId,
        params: &AdjustTroveParams,
        now: u64,
    ) -> Result<AdjustTroveEffects, TroveError> {
        let is_coll_increase = params.is_coll_increase && params.coll_change > 0;
        let is_debt_increase = params.is_debt_increase && params.usdx_change > 0;
        collab
            .collateral_config
            .require_not_paused_or_frozen(is_coll_increase || is_debt_increase)?;
        if trove_manager.is_shut_down() {
            fail!(TroveError::IsShutDown);
        }
        if params.coll_change == 0 && params.usdx_change == 0 {
            fail!(TroveError::ZeroAmount);
        }

        let receiver = if params.removes_value() {
            borrower_operations.require_owner_or_remove_manager_and_get_receiver(
                trove_manager,
                caller,
                trove_id,
            )?
        } else {
            borrower_operations.require_owner_or_add_manager(trove_manager, caller, trove_id)?;
            caller
        };

        let was_zombie = trove_manager.get_trove_status(trove_id) == TroveStatus::Zombie;

        atomically(trove_manager, sorted_troves, |trove_manager, sorted_troves| {
            let price = collab.fetch_price()?;
            let annual_interest_rate = collab.collateral_config.get_annual_interest_rate();
            let mode = calc_system_mode(get_tcr(collab, price, now));

            let trove = trove_manager.get_latest_trove_data(trove_id, annual_interest_rate, now)?;

            let mut change = TroveChange::default();
            let mut new_coll = trove.entire_coll;
            let mut new_debt = trove.entire_debt;

            if params.is_coll_increase {
                change.coll_increase = params.coll_change;
                new_coll = new_coll
                    .checked_add(params.coll_change)
                    .ok_or(TroveError::MathOverflow)?;
            } else {
                if params.coll_change > new_coll {
                    fail!(TroveError::WithdrawalExceedsCollateral);
                }
                change.coll_decrease = params.coll_change;
                new_coll -= params.coll_change;
            }

            if params.is_debt_increase {
                change.debt_increase = params.usdx_change;
                new_debt = new_debt
                    .checked_add(params.usdx_change)
                    .ok_or(TroveError::MathOverflow)?;
            } else {
                if params.usdx_change > new_debt {
                    fail!(TroveError::RepaymentExceedsDebt);
                }
                change.debt_decrease = params.usdx_change;
                new_debt -= params.usdx_change;
            }

            if new_debt < MIN_DEBT {
                fail!(TroveError::DebtBelowMin);
            }

            let split = if is_debt_increase {
                BorrowSplit::split_fees(
                    params.usdx_change,
                    collab.collateral_config.get_borrow_ratio(),
                )?
            } else {
                BorrowSplit::split_fees(0, 0)?
            };

            let new_icr = compute_cr(new_coll, new_debt, price);
            let new_tcr = system_mode::calc_new_tcr(
                collab.get_entire_system_coll(),
                collab.get_entire_system_debt(now),
                &change,
                price,
            )?;
            system_mode::require_valid_adjustment_in_current_mode(
                mode, &change, new_icr, new_tcr, price,
            )?;

            trove_manager.on_adjust_trove(trove_id, &trove, new_coll, new_debt, &mut change, now)?;

            let rank = compute_nominal_cr(new_coll, new_debt);
            if was_zombie {
                trove_manager.set_trove_status_to_active(trove_id)?;
                sorted_troves.insert(
                    *trove_id,
                    rank,
                    params.upper_hint,
                    params.lower_hint,
                    &trove_manager.ranks(annual_interest_rate, now),
                )?;
            } else {
                sorted_troves.re_insert(
                    *trove_id,
                    rank,
                    params.upper_hint,
                    params.lower_hint,
                    &trove_manager.ranks(annual_interest_rate, now),
                )?;
            }

            collab.move_pending_trove_rewards_to_active_pool(
                trove.redist_usdx_debt_gain,
                trove.redist_coll_gain,
            );
            collab
                .active_pool
                .mint_agg_interest_and_account_for_trove_change(&change, now);
            if change.coll_increase > 0 {
                collab.active_pool.receive_coll(change.coll_increase);
            }
            if change.coll_decrease > 0 {
                collab
                    .active_pool
                    .send_coll(CollDestination::Account(receiver), change.coll_decrease);
            }

            Ok(AdjustTroveEffects {
                coll_to_transfer_from_caller: change.coll_increase,
                coll_sent_to_receiver: change.coll_decrease,
                usdx_to_mint_to_receiver: split.amount_to_receiver(),
                usdx_to_mint_to_treasury: split.fees_to_pay,
                usdx_to_burn_from_caller: change.debt_decrease,
                receiver,
            })
        })
    }
}
