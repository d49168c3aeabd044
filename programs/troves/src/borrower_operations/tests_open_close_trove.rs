use anchor_lang::prelude::Pubkey;

use crate::{
    borrower_operations::{
        borrower_operations,
        types::{CloseTroveEffects, OpenTroveEffects, OpenTroveParams},
    },
    collaborators::CollDestination,
    state::{RemoveManager, TroveId, TroveStatus},
    trove_manager::tests_utils::utils::TestEnv,
    utils::coretypes::{COLL, RATE, USDX},
    TroveError,
};

// Tests
// - [x] open troves land in the list by nominal ratio
// - [x] open guards: amounts, ratios, paused, frozen, oracle
// - [x] borrow fee goes to the treasury, the trove owes the full amount
// - [x] managers set at opening, cleared at closing
// - [x] ids are not reused
// - [x] close repays the entire debt and returns the entire collateral
// - [x] the last trove cannot be closed, nor one that would drop the TCR below CCR

fn params(owner_index: u64, coll: f64, debt: f64) -> OpenTroveParams {
    OpenTroveParams {
        owner_index,
        coll_amount: COLL::from(coll),
        usdx_amount: USDX::from(debt),
        upper_hint: TroveId::ROOT,
        lower_hint: TroveId::ROOT,
        add_manager: None,
        remove_manager: None,
        receiver: None,
    }
}

fn open_with(
    env: &mut TestEnv,
    owner: Pubkey,
    params: &OpenTroveParams,
) -> Result<OpenTroveEffects, TroveError> {
    let now = env.now;
    let (trove_manager, sorted_troves, borrower_operations, mut collab) = env.parts();
    borrower_operations::open_trove(
        borrower_operations,
        trove_manager,
        sorted_troves,
        &mut collab,
        owner,
        params,
        now,
    )
}

fn close(env: &mut TestEnv, caller: Pubkey, trove_id: &TroveId) -> Result<CloseTroveEffects, TroveError> {
    let now = env.now;
    let (trove_manager, sorted_troves, borrower_operations, mut collab) = env.parts();
    borrower_operations::close_trove(
        borrower_operations,
        trove_manager,
        sorted_troves,
        &mut collab,
        caller,
        trove_id,
        now,
    )
}

#[test]
fn test_open_trove_sorted_by_nominal_ratio() {
    let mut env = TestEnv::new(2000.0).with_interest_rate(0.0);
    let owner = Pubkey::new_unique();

    let a = env.open_trove_for(owner, COLL::from(2.0), USDX::from(2000.0));
    let b = env.open_trove(COLL::from(10.0), USDX::from(4000.0));
    let c = env.open_trove(COLL::from(3.0), USDX::from(2000.0));

    assert_eq!(env.sorted_troves.iter().collect::<Vec<_>>(), vec![b, c, a]);
    assert_eq!(env.trove_manager.get_trove_status(&a), TroveStatus::Active);
    assert_eq!(env.trove_manager.get_trove_owner(&a), Some(owner));
    assert_eq!(env.trove_manager.trove_ids, vec![a, b, c]);
    assert_eq!(env.trove_nft.owners[&a], owner);

    assert_eq!(env.active_pool.coll_balance, COLL::from(15.0));
    assert_eq!(env.active_pool.agg_recorded_debt, USDX::from(8000.0));
    assert_eq!(env.trove_manager.total_stakes, COLL::from(15.0));
}

#[test]
fn test_open_trove_guards() {
    let mut env = TestEnv::new(2000.0);
    let owner = Pubkey::new_unique();

    assert_eq!(
        open_with(&mut env, owner, &params(0, 0.0, 2000.0)).unwrap_err(),
        TroveError::ZeroAmount
    );
    assert_eq!(
        open_with(&mut env, owner, &params(0, 2.0, 1999.0)).unwrap_err(),
        TroveError::DebtBelowMin
    );
    assert_eq!(
        open_with(&mut env, owner, &params(0, 1.0, 2000.0)).unwrap_err(),
        TroveError::IcrBelowMcr
    );
    // 120% is above MCR, the first trove sets the system ratio though
    assert_eq!(
        open_with(&mut env, owner, &params(0, 1.2, 2000.0)).unwrap_err(),
        TroveError::TcrBelowCcr
    );

    env.price_feed.failure = true;
    assert_eq!(
        open_with(&mut env, owner, &params(0, 2.0, 2000.0)).unwrap_err(),
        TroveError::OracleFailure
    );
    env.price_feed.failure = false;

    env.collateral_config.frozen = true;
    assert_eq!(
        open_with(&mut env, owner, &params(0, 2.0, 2000.0)).unwrap_err(),
        TroveError::CollateralFrozen
    );
    env.collateral_config.frozen = false;

    env.collateral_config.paused = true;
    assert_eq!(
        open_with(&mut env, owner, &params(0, 2.0, 2000.0)).unwrap_err(),
        TroveError::CollateralPaused
    );
    env.collateral_config.paused = false;

    assert!(env.trove_manager.trove_ids.is_empty());
    assert!(env.trove_manager.troves.is_empty());
    assert!(env.sorted_troves.is_empty());
    assert_eq!(env.active_pool.coll_balance, 0);

    open_with(&mut env, owner, &params(0, 2.0, 2000.0)).unwrap();
}

#[test]
fn test_open_trove_borrow_fee() {
    let mut env = TestEnv::new(2000.0);
    env.collateral_config.borrow_ratio = RATE::from_percent(0.5);

    let effects = open_with(&mut env, Pubkey::new_unique(), &params(0, 2.0, 2000.0)).unwrap();
    println!("{:?}", effects);

    assert_eq!(effects.coll_to_transfer_from_owner, COLL::from(2.0));
    assert_eq!(effects.usdx_to_mint_to_treasury, USDX::from(10.0));
    assert_eq!(effects.usdx_to_mint_to_receiver, USDX::from(1990.0));
    assert_eq!(env.trove_manager.troves[&effects.trove_id].debt, USDX::from(2000.0));
}

#[test]
fn test_open_trove_with_managers() {
    let mut env = TestEnv::new(2000.0);
    let owner = Pubkey::new_unique();
    let add_manager = Pubkey::new_unique();
    let remove_manager = Pubkey::new_unique();

    let effects = open_with(
        &mut env,
        owner,
        &OpenTroveParams {
            add_manager: Some(add_manager),
            remove_manager: Some(remove_manager),
            ..params(7, 2.0, 2000.0)
        },
    )
    .unwrap();
    let trove_id = effects.trove_id;

    assert_eq!(trove_id, TroveId::derive(&owner, 7));
    assert_eq!(env.borrower_operations.add_managers[&trove_id], add_manager);
    assert_eq!(
        env.borrower_operations.remove_managers[&trove_id],
        RemoveManager {
            manager: remove_manager,
            receiver: owner,
        }
    );

    // only the owner delegates
    let (trove_manager, _, borrower_operations, _) = env.parts();
    assert_eq!(
        borrower_operations::set_add_manager(
            borrower_operations,
            trove_manager,
            add_manager,
            &trove_id,
            Some(add_manager),
        ),
        Err(TroveError::NotOwner)
    );
    borrower_operations::set_add_manager(borrower_operations, trove_manager, owner, &trove_id, None)
        .unwrap();
    assert!(env.borrower_operations.add_managers.get(&trove_id).is_none());
}

#[test]
fn test_open_trove_ids_are_not_reused() {
    let mut env = TestEnv::new(2000.0);
    let owner = Pubkey::new_unique();
    open_with(&mut env, owner, &params(0, 10.0, 4000.0)).unwrap();
    let effects = open_with(&mut env, owner, &params(1, 2.0, 2000.0)).unwrap();

    assert_eq!(
        open_with(&mut env, owner, &params(1, 2.0, 2000.0)).unwrap_err(),
        TroveError::TroveAlreadyExists
    );

    close(&mut env, owner, &effects.trove_id).unwrap();
    assert_eq!(
        open_with(&mut env, owner, &params(1, 2.0, 2000.0)).unwrap_err(),
        TroveError::TroveAlreadyExists
    );
    open_with(&mut env, owner, &params(2, 2.0, 2000.0)).unwrap();
}

#[test]
fn test_close_trove() {
    let mut env = TestEnv::new(2000.0);
    let owner = Pubkey::new_unique();
    let a = env.open_trove_for(owner, COLL::from(2.0), USDX::from(2000.0));
    let b = env.open_trove(COLL::from(10.0), USDX::from(4000.0));
    env.advance_years(1);

    let stranger = Pubkey::new_unique();
    assert_eq!(close(&mut env, stranger, &a).unwrap_err(), TroveError::NotOwnerNorRemoveManager);

    let effects = close(&mut env, owner, &a).unwrap();
    println!("{:?}", effects);

    // a year of interest at 5%
    assert_eq!(effects.usdx_to_burn_from_caller, USDX::from(2100.0));
    assert_eq!(effects.coll_sent_to_receiver, COLL::from(2.0));
    assert_eq!(effects.receiver, owner);
    assert_eq!(env.active_pool.sent_to(CollDestination::Account(owner)), COLL::from(2.0));

    assert_eq!(env.trove_manager.get_trove_status(&a), TroveStatus::ClosedByOwner);
    assert_eq!(env.trove_manager.get_trove_owner(&a), None);
    assert!(!env.sorted_troves.contains(&a));
    assert_eq!(env.trove_manager.trove_ids, vec![b]);
    assert_eq!(env.trove_manager.total_stakes, COLL::from(10.0));
    assert_eq!(env.trove_nft.burned, vec![a]);

    assert_eq!(close(&mut env, owner, &a).unwrap_err(), TroveError::TroveNotOpen);

    let b_owner = env.trove_manager.get_trove_owner(&b).unwrap();
    assert_eq!(close(&mut env, b_owner, &b).unwrap_err(), TroveError::OnlyOneTroveLeft);
}

#[test]
fn test_close_trove_by_remove_manager() {
    let mut env = TestEnv::new(2000.0);
    let owner = Pubkey::new_unique();
    let manager = Pubkey::new_unique();
    let receiver = Pubkey::new_unique();
    env.open_trove(COLL::from(10.0), USDX::from(4000.0));

    let trove_id = open_with(
        &mut env,
        owner,
        &OpenTroveParams {
            add_manager: Some(manager),
            remove_manager: Some(manager),
            receiver: Some(receiver),
            ..params(0, 2.0, 2000.0)
        },
    )
    .unwrap()
    .trove_id;

    let effects = close(&mut env, manager, &trove_id).unwrap();
    assert_eq!(effects.receiver, receiver);
    assert_eq!(env.active_pool.sent_to(CollDestination::Account(receiver)), COLL::from(2.0));

    assert!(env.borrower_operations.add_managers.get(&trove_id).is_none());
    assert!(env.borrower_operations.remove_managers.get(&trove_id).is_none());
}

#[test]
fn test_close_trove_keeps_tcr_above_ccr() {
    let mut env = TestEnv::new(2000.0).with_interest_rate(0.0);
    let owner = Pubkey::new_unique();
    let a = env.open_trove_for(owner, COLL::from(10.0), USDX::from(4000.0));
    // 130%
    env.open_trove(COLL::from(1.3), USDX::from(2000.0));

    assert_eq!(close(&mut env, owner, &a).unwrap_err(), TroveError::TcrBelowCcr);
    assert_eq!(env.trove_manager.get_trove_status(&a), TroveStatus::Active);
    assert!(env.sorted_troves.contains(&a));
}
