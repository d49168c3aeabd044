use anchor_lang::prelude::Pubkey;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    collaborators::CollDestination,
    state::{TroveId, TroveStatus},
    trove_manager::tests_utils::utils::TestEnv,
    utils::{
        consts::MCR,
        coretypes::{COLL, USDX},
    },
    TroveError,
};

// Tests
// - [x] full offset against the stability pool
// - [x] surplus goes to the owner, protocol fee to the treasury
// - [x] stability pool exhausted mid batch -> later troves redistributed
// - [x] healthy and unknown troves are skipped, empty batch errors
// - [x] shuffled batches conserve collateral
// - [x] a failure after troves were closed restores all of them

#[test]
fn test_liquidation_full_offset() {
    let mut env = TestEnv::new(2000.0).with_interest_rate(0.0);
    let a = env.open_trove(COLL::from(2.0), USDX::from(2000.0));
    let b = env.open_trove(COLL::from(10.0), USDX::from(4000.0));
    env.stability_pool.total_usdx_deposits = USDX::from(10_001.0);

    env.set_price(1000.0);
    let effects = env.liquidate(&[a]).unwrap();
    println!("{:?}", effects);

    assert_eq!(env.trove_manager.get_trove_status(&a), TroveStatus::ClosedByLiquidation);
    assert!(!env.sorted_troves.contains(&a));
    assert_eq!(env.sorted_troves.get_size(), 1);
    assert_eq!(env.trove_manager.trove_ids, vec![b]);
    assert_eq!(env.trove_manager.troves[&b].array_index, 0);
    assert_eq!(env.trove_manager.troves[&a].debt, 0);
    assert_eq!(env.trove_manager.troves[&a].coll, 0);

    assert_eq!(env.stability_pool.offset_debt, USDX::from(2000.0));
    assert_eq!(env.stability_pool.coll_gains, COLL::from(1.99));
    assert_eq!(env.stability_pool.total_usdx_deposits, USDX::from(8001.0));

    assert_eq!(env.active_pool.sent_to(CollDestination::StabilityPool), COLL::from(1.99));
    assert_eq!(
        env.active_pool.sent_to(CollDestination::Account(Pubkey::default())),
        COLL::from(0.01)
    );
    assert_eq!(env.active_pool.coll_balance, COLL::from(10.0));
    assert_eq!(env.active_pool.agg_recorded_debt, USDX::from(4000.0));
    assert_eq!(env.trove_nft.burned, vec![a]);

    // the gas compensation leaving the pool is not part of the snapshot
    assert_eq!(env.trove_manager.total_stakes_snapshot, COLL::from(10.0));
    assert_eq!(env.trove_manager.total_collateral_snapshot, COLL::from(10.0));
    assert_eq!(env.trove_manager.l_usdx_debt, 0);
}

#[test]
fn test_liquidation_surplus_and_protocol_fee() {
    let mut env = TestEnv::new(2000.0).with_interest_rate(0.0);
    let owner = Pubkey::new_unique();
    let a = env.open_trove_for(owner, COLL::from(3.1), USDX::from(2000.0));
    env.open_trove(COLL::from(10.0), USDX::from(4000.0));
    env.stability_pool.total_usdx_deposits = USDX::from(10_001.0);

    // 108.5%
    env.set_price(700.0);
    let effects = env.liquidate(&[a]).unwrap();
    let values = effects.liquidated[0].values;
    println!("{:?}", values);

    // 2000 * 105% / 700 = 3 seized, 2000 * 1% / 700 to the protocol
    assert_eq!(values.coll_gas_compensation, COLL::from(0.0155));
    assert_eq!(values.coll_to_send_to_sp, COLL::from(3.0));
    assert_eq!(values.coll_to_protocol, 28_571_428_571_428_571);
    assert_eq!(values.coll_surplus, 55_928_571_428_571_429);
    assert_eq!(effects.liquidated[0].owner, owner);

    assert_eq!(env.coll_surplus_pool.surplus[&owner], values.coll_surplus);
    let treasury = env.collateral_config.treasury;
    assert_eq!(
        env.active_pool.sent_to(CollDestination::Account(treasury)),
        values.coll_to_protocol
    );
    assert_eq!(
        env.active_pool.sent_to(CollDestination::CollSurplusPool),
        values.coll_surplus
    );
}

#[test]
fn test_liquidation_stability_pool_exhausted_mid_batch() {
    let mut env = TestEnv::new(2000.0).with_interest_rate(0.0);
    let a = env.open_trove(COLL::from(2.0), USDX::from(2000.0));
    let c = env.open_trove(COLL::from(2.0), USDX::from(2000.0));
    let b = env.open_trove(COLL::from(10.0), USDX::from(4000.0));
    env.stability_pool.total_usdx_deposits = USDX::from(2001.0);

    env.set_price(1000.0);
    let effects = env.liquidate(&[a, c]).unwrap();

    // a takes the whole pool, c is left to the remaining troves
    assert_eq!(effects.liquidated[0].values.debt_to_offset, USDX::from(2000.0));
    assert_eq!(effects.liquidated[1].values.debt_to_offset, 0);
    assert_eq!(effects.totals.debt_to_redistribute, USDX::from(2000.0));
    assert_eq!(effects.totals.coll_to_redistribute, COLL::from(2.0));
    assert_eq!(env.stability_pool.total_usdx_deposits, USDX::from(1.0));

    let latest = env.latest(&b);
    assert_eq!(latest.entire_debt, USDX::from(6000.0));
    assert_eq!(latest.entire_coll, COLL::from(12.0));
}

#[test]
fn test_liquidation_skips_healthy_and_unknown_troves() {
    let mut env = TestEnv::new(2000.0).with_interest_rate(0.0);
    let a = env.open_trove(COLL::from(2.0), USDX::from(2000.0));
    let b = env.open_trove(COLL::from(10.0), USDX::from(4000.0));
    let unknown = TroveId::derive(&Pubkey::new_unique(), 0);

    assert_eq!(
        env.liquidate(&[a, b, unknown]).unwrap_err(),
        TroveError::NothingToLiquidate
    );
    assert_eq!(env.liquidate(&[]).unwrap_err(), TroveError::NothingToLiquidate);

    env.set_price(1000.0);
    let effects = env.liquidate(&[unknown, b, a, a]).unwrap();
    assert_eq!(effects.liquidated.len(), 1);
    assert_eq!(effects.liquidated[0].trove_id, a);
    assert_eq!(env.trove_manager.get_trove_status(&b), TroveStatus::Active);

    // already closed
    assert_eq!(env.liquidate(&[a]).unwrap_err(), TroveError::NothingToLiquidate);
}

#[test]
fn test_liquidation_late_failure_restores_closed_troves() {
    let mut env = TestEnv::new(2000.0).with_interest_rate(0.0);
    let a = env.open_trove(COLL::from(2.0), USDX::from(2000.0));
    let b = env.open_trove(COLL::from(3.0), USDX::from(2000.0));
    env.set_price(600.0);

    let troves_before = env.trove_manager.troves.clone();
    let reward_snapshots_before = env.trove_manager.reward_snapshots.clone();
    let sorted_troves_before = env.sorted_troves.clone();

    // both are closed before the redistribution finds no stakes left
    assert_eq!(
        env.liquidate(&[a, b]).unwrap_err(),
        TroveError::CannotRedistributeWithoutStakes
    );

    assert_eq!(env.trove_manager.troves, troves_before);
    assert_eq!(env.trove_manager.reward_snapshots, reward_snapshots_before);
    assert_eq!(env.trove_manager.trove_ids, vec![a, b]);
    assert_eq!(env.trove_manager.total_stakes, COLL::from(5.0));
    assert_eq!(env.sorted_troves, sorted_troves_before);
    assert!(!env.trove_manager.is_journaling());
    assert!(env.trove_nft.burned.is_empty());

    // the restored ledger keeps working
    env.stability_pool.total_usdx_deposits = USDX::from(10_001.0);
    env.liquidate(&[b, a]).unwrap();
    assert!(env.sorted_troves.is_empty());
    assert!(env.trove_manager.trove_ids.is_empty());
}

#[test]
fn test_liquidation_oracle_failure_aborts() {
    let mut env = TestEnv::new(2000.0);
    let a = env.open_trove(COLL::from(2.0), USDX::from(2000.0));
    env.open_trove(COLL::from(10.0), USDX::from(4000.0));
    env.set_price(1000.0);
    env.price_feed.failure = true;

    assert_eq!(env.liquidate(&[a]).unwrap_err(), TroveError::OracleFailure);
    assert_eq!(env.trove_manager.get_trove_status(&a), TroveStatus::Active);
}

#[test]
fn test_liquidation_shuffled_batch_conserves_collateral() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut env = TestEnv::new(2000.0);
    env.stability_pool.total_usdx_deposits = USDX::from(7_001.0);

    let mut ids = vec![];
    for i in 0..12u32 {
        // every other trove ends up below MCR at 1000
        let coll = if i % 2 == 0 { 2.0 + i as f64 * 0.01 } else { 5.0 + i as f64 };
        ids.push(env.open_trove(COLL::from(coll), USDX::from(2000.0 + i as f64 * 10.0)));
    }
    env.advance_years(1);
    env.set_price(1000.0);
    ids.shuffle(&mut rng);

    let price = env.price_feed.price;
    let rate = env.rate();
    let unhealthy: Vec<TroveId> = ids
        .iter()
        .copied()
        .filter(|id| env.trove_manager.get_current_icr(id, price, rate, env.now).unwrap() < MCR)
        .collect();
    let entire_coll: u128 = unhealthy.iter().map(|id| env.latest(id).entire_coll).sum();
    let entire_debt: u128 = unhealthy.iter().map(|id| env.latest(id).entire_debt).sum();

    let effects = env.liquidate(&ids).unwrap();
    let totals = &effects.totals;

    let liquidated: Vec<TroveId> = effects.liquidated.iter().map(|t| t.trove_id).collect();
    assert_eq!(liquidated, unhealthy);
    assert_eq!(liquidated.len(), 6);
    assert_eq!(
        totals.coll_gas_compensation
            + totals.coll_to_send_to_sp
            + totals.coll_to_redistribute
            + totals.coll_to_protocol
            + totals.coll_surplus,
        entire_coll
    );
    assert_eq!(totals.debt_to_offset + totals.debt_to_redistribute, entire_debt);
    assert_eq!(totals.debt_to_offset, USDX::from(7000.0));

    for id in &liquidated {
        assert!(!env.sorted_troves.contains(id));
    }
    assert_eq!(env.sorted_troves.get_size(), 6);
    assert_eq!(env.trove_manager.get_trove_ids_count(), 6);
}
