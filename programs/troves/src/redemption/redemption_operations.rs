use anchor_lang::prelude::{msg, Pubkey};

use super::{
    redemption_rate,
    types::{RedemptionEffects, RedemptionTotals, SingleRedemption},
};
use crate::{
    collaborators::{CollDestination, Collaborators, TroveChange},
    fail,
    sorted_troves::SortedTroves,
    state::{TroveId, TroveManagerState, TroveStatus},
    trove_manager::{atomically, trove_operations::get_tcr, types::LatestTroveData},
    utils::{
        consts::{DECIMAL_PRECISION, MCR, MIN_DEBT, ONE_HUNDRED_PCT, URGENT_REDEMPTION_BONUS},
        finance::compute_cr,
        math::mul_div,
    },
    TroveError,
};

/// Exchanges `usdx_amount` for collateral, walking the sorted list from the
/// tail upwards. A partially redeemed zombie left by the previous call is
/// redeemed first. `max_iterations == 0` means no limit.
///
/// The walk follows list order. Ranks of troves last touched at different
/// times drift apart as interest accrues, so the tail is the riskiest trove
/// only as of the last time each trove was repositioned.
#[allow(clippy::too_many_arguments)]
pub fn redeem_collateral(
    trove_manager: &mut TroveManagerState,
    sorted_troves: &mut SortedTroves,
    collab: &mut Collaborators,
    redeemer: Pubkey,
    usdx_amount: u128,
    max_fee_percentage: u128,
    max_iterations: u32,
    now: u64,
) -> Result<RedemptionEffects, TroveError> {
    if usdx_amount == 0 {
        fail!(TroveError::ZeroAmount);
    }
    if trove_manager.is_shut_down() {
        fail!(TroveError::IsShutDown);
    }

    atomically(trove_manager, sorted_troves, |trove_manager, sorted_troves| {
        let price = collab.fetch_price()?;
        let redemption_price = collab.fetch_redemption_price()?;
        let annual_interest_rate = collab.collateral_config.get_annual_interest_rate();

        if get_tcr(collab, price, now) < MCR {
            fail!(TroveError::TcrBelowMcrCannotRedeem);
        }

        let supply = collab.get_entire_system_debt(now);
        let redemption_rate = redemption_rate::get_redemption_rate_for_redeemed_amount(
            trove_manager,
            supply,
            usdx_amount,
            now,
        )?;
        if redemption_rate > max_fee_percentage {
            fail!(TroveError::FeeExceedsMaxFee);
        }

        let mut remaining_usdx = usdx_amount;
        let mut remaining_iterations = if max_iterations == 0 {
            u32::MAX
        } else {
            max_iterations
        };
        let mut totals = RedemptionTotals::default();
        let mut trove_change = TroveChange::default();
        let mut redeemed = vec![];

        let last_zombie_trove_id = trove_manager.last_zombie_trove_id;
        let mut trove_id = match last_zombie_trove_id {
            Some(id) if trove_manager.get_trove_status(&id) == TroveStatus::Zombie => id,
            _ => sorted_troves.get_last(),
        };

        while !trove_id.is_root() && remaining_usdx > 0 && remaining_iterations > 0 {
            remaining_iterations -= 1;

            // Resolved before the current trove may leave the list
            let next_trove_id = if Some(trove_id) == last_zombie_trove_id {
                sorted_troves.get_last()
            } else {
                sorted_troves.get_prev(&trove_id)
            };

            let trove = trove_manager.get_latest_trove_data(&trove_id, annual_interest_rate, now)?;

            // Redeeming would push an underwater trove further underwater
            if compute_cr(trove.entire_coll, trove.entire_debt, price) < ONE_HUNDRED_PCT {
                trove_id = next_trove_id;
                continue;
            }

            let redemption = redeem_collateral_from_trove(
                trove_manager,
                sorted_troves,
                &trove_id,
                &trove,
                remaining_usdx,
                redemption_price,
                redemption_rate,
                &mut trove_change,
                now,
            )?;

            remaining_usdx -= redemption.usdx_lot;
            totals.add(&redemption)?;
            redeemed.push(redemption);

            trove_id = next_trove_id;
        }

        // The fee only grows with what was actually redeemed
        if totals.redeemed_usdx > 0 {
            redemption_rate::update_base_rate_from_redemption(
                trove_manager,
                supply,
                totals.redeemed_usdx,
                now,
            )?;
        }

        settle_redemption(collab, redeemer, &totals, &trove_change, now);

        msg!(
            "Redemption of {} out of {} requested, rate {}: {:?}",
            totals.redeemed_usdx,
            usdx_amount,
            redemption_rate,
            totals
        );

        Ok(RedemptionEffects {
            usdx_to_burn: totals.redeemed_usdx,
            totals,
            redemption_rate,
            redeemed,
        })
    })
}

#[allow(clippy::too_many_arguments)]
fn redeem_collateral_from_trove(
    trove_manager: &mut TroveManagerState,
    sorted_troves: &mut SortedTroves,
    trove_id: &TroveId,
    trove: &LatestTroveData,
    max_usdx_amount: u128,
    redemption_price: u128,
    redemption_rate: u128,
    trove_change: &mut TroveChange,
    now: u64,
) -> Result<SingleRedemption, TroveError> {
    let usdx_lot = u128::min(max_usdx_amount, trove.entire_debt);

    let corresponding_coll = mul_div(usdx_lot, DECIMAL_PRECISION, redemption_price)?;
    let coll_fee = redemption_rate::calc_redemption_fee(redemption_rate, corresponding_coll)?;
    let coll_lot = u128::min(corresponding_coll - coll_fee, trove.entire_coll);

    let redemption = apply_single_redemption(
        trove_manager,
        trove_id,
        trove,
        usdx_lot,
        coll_lot,
        coll_fee,
        trove_change,
        now,
    )?;

    let is_zombie = trove_manager.get_trove_status(trove_id) == TroveStatus::Zombie;
    if redemption.new_debt < MIN_DEBT {
        if !is_zombie {
            trove_manager.set_trove_status_to_zombie(sorted_troves, trove_id)?;
        }
        // A partial redemption is continued first next time
        if redemption.new_debt > 0 {
            trove_manager.last_zombie_trove_id = Some(*trove_id);
        } else if trove_manager.last_zombie_trove_id == Some(*trove_id) {
            trove_manager.last_zombie_trove_id = None;
        }
    } else if !is_zombie {
        trove_manager.reposition_trove(sorted_troves, trove_id, trove.annual_interest_rate, now)?;
    }

    Ok(redemption)
}

#[allow(clippy::too_many_arguments)]
fn apply_single_redemption(
    trove_manager: &mut TroveManagerState,
    trove_id: &TroveId,
    trove: &LatestTroveData,
    usdx_lot: u128,
    coll_lot: u128,
    coll_fee: u128,
    trove_change: &mut TroveChange,
    now: u64,
) -> Result<SingleRedemption, TroveError> {
    let new_debt = trove.entire_debt - usdx_lot;
    let new_coll = trove.entire_coll - coll_lot;

    let mut change = TroveChange {
        debt_decrease: usdx_lot,
        coll_decrease: coll_lot,
        ..Default::default()
    };
    trove_manager.on_adjust_trove(trove_id, trove, new_coll, new_debt, &mut change, now)?;
    trove_change.add(&change)?;

    Ok(SingleRedemption {
        trove_id: *trove_id,
        usdx_lot,
        coll_lot,
        coll_fee,
        new_debt,
        new_coll,
    })
}

fn settle_redemption(
    collab: &mut Collaborators,
    redeemer: Pubkey,
    totals: &RedemptionTotals,
    trove_change: &TroveChange,
    now: u64,
) {
    collab.move_pending_trove_rewards_to_active_pool(
        trove_change.applied_redist_usdx_debt_gain,
        trove_change.applied_redist_coll_gain,
    );
    collab
        .active_pool
        .mint_agg_interest_and_account_for_trove_change(trove_change, now);
    if totals.coll_to_redeemer > 0 {
        collab
            .active_pool
            .send_coll(CollDestination::Account(redeemer), totals.coll_to_redeemer);
    }
}

/// Redeems against an explicit list of troves once the branch is shut down,
/// at a bonus instead of a fee and without any ratio floor.
#[allow(clippy::too_many_arguments)]
pub fn urgent_redemption(
    trove_manager: &mut TroveManagerState,
    sorted_troves: &mut SortedTroves,
    collab: &mut Collaborators,
    redeemer: Pubkey,
    usdx_amount: u128,
    trove_ids: &[TroveId],
    min_collateral: u128,
    now: u64,
) -> Result<RedemptionEffects, TroveError> {
    if usdx_amount == 0 {
        fail!(TroveError::ZeroAmount);
    }
    if !trove_manager.is_shut_down() {
        fail!(TroveError::NotShutDown);
    }

    atomically(trove_manager, sorted_troves, |trove_manager, sorted_troves| {
        let price = collab.fetch_redemption_price()?;
        let annual_interest_rate = collab.collateral_config.get_annual_interest_rate();
        let bonus_ratio = DECIMAL_PRECISION + URGENT_REDEMPTION_BONUS;

        let mut remaining_usdx = usdx_amount;
        let mut totals = RedemptionTotals::default();
        let mut trove_change = TroveChange::default();
        let mut redeemed = vec![];

        for trove_id in trove_ids {
            if remaining_usdx == 0 {
                break;
            }
            let status = trove_manager.get_trove_status(trove_id);
            if !status.is_active_or_zombie() {
                continue;
            }

            let trove = trove_manager.get_latest_trove_data(trove_id, annual_interest_rate, now)?;
            if trove.entire_debt == 0 {
                continue;
            }

            let mut usdx_lot = u128::min(remaining_usdx, trove.entire_debt);
            let mut coll_lot = mul_div(usdx_lot, bonus_ratio, price)?;
            // Below 100% plus the bonus the collateral runs out first
            if coll_lot > trove.entire_coll {
                coll_lot = trove.entire_coll;
                usdx_lot = mul_div(trove.entire_coll, price, bonus_ratio)?;
            }

            let redemption = apply_single_redemption(
                trove_manager,
                trove_id,
                &trove,
                usdx_lot,
                coll_lot,
                0,
                &mut trove_change,
                now,
            )?;
            if status == TroveStatus::Active {
                trove_manager.reposition_trove(sorted_troves, trove_id, annual_interest_rate, now)?;
            }

            remaining_usdx -= redemption.usdx_lot;
            totals.add(&redemption)?;
            redeemed.push(redemption);
        }

        if totals.coll_to_redeemer < min_collateral {
            fail!(TroveError::MinCollNotReached);
        }

        settle_redemption(collab, redeemer, &totals, &trove_change, now);

        msg!(
            "Urgent redemption of {} out of {} requested: {:?}",
            totals.redeemed_usdx,
            usdx_amount,
            totals
        );

        Ok(RedemptionEffects {
            usdx_to_burn: totals.redeemed_usdx,
            totals,
            redemption_rate: 0,
            redeemed,
        })
    })
}
