use anchor_lang::prelude::{msg, Pubkey};

use super::{
    atomically,
    liquidation_calcs::{self, LiquidationPenalties},
    trove_operations::redistribution,
    types::{LiquidatedTrove, LiquidationEffects, LiquidationTotals},
};
use crate::{
    collaborators::{CollDestination, Collaborators, TroveChange},
    fail,
    sorted_troves::SortedTroves,
    state::{TroveId, TroveManagerState, TroveStatus},
    utils::consts::{MCR, MIN_USDX_IN_SP},
    TroveError,
};

/// Liquidates every trove of `trove_ids` whose collateral ratio is below MCR,
/// in the given order. Troves that are not open or still healthy are skipped.
///
/// Debt is offset against the stability pool while it has deposits to spare,
/// and redistributed to the remaining troves once the whole batch is closed.
pub fn batch_liquidate_troves(
    trove_manager: &mut TroveManagerState,
    sorted_troves: &mut SortedTroves,
    collab: &mut Collaborators,
    liquidator: Pubkey,
    trove_ids: &[TroveId],
    now: u64,
) -> Result<LiquidationEffects, TroveError> {
    atomically(trove_manager, sorted_troves, |trove_manager, sorted_troves| {
        let price = collab.fetch_price()?;
        let annual_interest_rate = collab.collateral_config.get_annual_interest_rate();
        let penalties = trove_manager.liquidation_penalties;

        let mut usdx_in_sp_for_offsets = collab
            .stability_pool
            .get_total_usdx_deposits()
            .saturating_sub(MIN_USDX_IN_SP);

        let mut totals = LiquidationTotals::default();
        let mut trove_change = TroveChange::default();
        let mut liquidated = vec![];

        for trove_id in trove_ids {
            if !trove_manager
                .get_trove_status(trove_id)
                .is_active_or_zombie()
            {
                continue;
            }
            let icr = trove_manager.get_current_icr(trove_id, price, annual_interest_rate, now)?;
            if icr >= MCR {
                continue;
            }

            let liquidation = liquidate(
                trove_manager,
                sorted_troves,
                trove_id,
                usdx_in_sp_for_offsets,
                price,
                &penalties,
                annual_interest_rate,
                &mut trove_change,
                now,
            )?;

            usdx_in_sp_for_offsets =
                usdx_in_sp_for_offsets.saturating_sub(liquidation.values.debt_to_offset);
            totals.add(&liquidation.values)?;
            liquidated.push(liquidation);
        }

        if liquidated.is_empty() {
            fail!(TroveError::NothingToLiquidate);
        }

        redistribution::redistribute_debt_and_coll(
            trove_manager,
            totals.debt_to_redistribute,
            totals.coll_to_redistribute,
        )?;

        // Nothing below can fail, settle with the collaborators
        collab.move_pending_trove_rewards_to_active_pool(
            trove_change.applied_redist_usdx_debt_gain,
            trove_change.applied_redist_coll_gain,
        );
        collab
            .active_pool
            .mint_agg_interest_and_account_for_trove_change(&trove_change, now);

        if totals.debt_to_offset > 0 {
            collab
                .stability_pool
                .offset(totals.debt_to_offset, totals.coll_to_send_to_sp);
            collab
                .active_pool
                .send_coll(CollDestination::StabilityPool, totals.coll_to_send_to_sp);
        }

        if totals.debt_to_redistribute > 0 {
            collab
                .default_pool
                .increase_usdx_debt(totals.debt_to_redistribute);
            collab
                .active_pool
                .send_coll_to_default_pool(totals.coll_to_redistribute);
            collab
                .default_pool
                .receive_coll(totals.coll_to_redistribute);
        }

        if totals.coll_surplus > 0 {
            for trove in liquidated.iter().filter(|t| t.values.coll_surplus > 0) {
                collab
                    .coll_surplus_pool
                    .account_surplus(trove.owner, trove.values.coll_surplus);
            }
            collab
                .active_pool
                .send_coll(CollDestination::CollSurplusPool, totals.coll_surplus);
        }

        if totals.coll_to_protocol > 0 {
            let treasury = collab.collateral_config.get_treasury();
            collab
                .active_pool
                .send_coll(CollDestination::Account(treasury), totals.coll_to_protocol);
        }

        for trove in &liquidated {
            collab.trove_nft.burn(trove.trove_id);
        }

        redistribution::update_system_snapshots_exclude_coll_remainder(
            trove_manager,
            collab.active_pool.get_coll_balance(),
            collab.default_pool.get_coll_balance(),
            totals.coll_gas_compensation,
        );

        if totals.coll_gas_compensation > 0 {
            collab.active_pool.send_coll(
                CollDestination::Account(liquidator),
                totals.coll_gas_compensation,
            );
        }

        msg!(
            "Liquidation of {} troves at price {}: {:?}",
            liquidated.len(),
            price,
            totals
        );

        Ok(LiquidationEffects {
            price,
            totals,
            liquidated,
        })
    })
}

#[allow(clippy::too_many_arguments)]
fn liquidate(
    trove_manager: &mut TroveManagerState,
    sorted_troves: &mut SortedTroves,
    trove_id: &TroveId,
    usdx_in_sp_for_offsets: u128,
    price: u128,
    penalties: &LiquidationPenalties,
    annual_interest_rate: u128,
    trove_change: &mut TroveChange,
    now: u64,
) -> Result<LiquidatedTrove, TroveError> {
    let trove = trove_manager.get_latest_trove_data(trove_id, annual_interest_rate, now)?;
    let owner = trove_manager
        .get_trove_owner(trove_id)
        .ok_or(TroveError::TroveNotOpen)?;

    let values = liquidation_calcs::get_offset_and_redistribution_vals(
        trove.entire_debt,
        trove.entire_coll,
        usdx_in_sp_for_offsets,
        price,
        penalties,
    )?;

    trove_change.add(&TroveChange {
        applied_redist_usdx_debt_gain: trove.redist_usdx_debt_gain,
        applied_redist_coll_gain: trove.redist_coll_gain,
        coll_decrease: trove.entire_coll,
        debt_decrease: trove.entire_debt,
        old_weighted_recorded_debt: trove.weighted_recorded_debt,
        ..Default::default()
    })?;

    trove_manager.close_trove(sorted_troves, trove_id, TroveStatus::ClosedByLiquidation)?;

    msg!(
        "TroveUpdated {} debt 0 coll 0 stake 0 liquidated, entire debt {} entire coll {}",
        trove_id,
        trove.entire_debt,
        trove.entire_coll
    );

    Ok(LiquidatedTrove {
        trove_id: *trove_id,
        owner,
        values,
    })
}
