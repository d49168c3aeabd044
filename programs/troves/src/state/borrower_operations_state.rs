use std::collections::BTreeMap;

use anchor_lang::prelude::Pubkey;
use borsh::{BorshDeserialize, BorshSerialize};

use super::TroveId;

#[derive(BorshSerialize, BorshDeserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RemoveManager {
    pub manager: Pubkey,
    // Withdrawn collateral and borrowed debt go here
    pub receiver: Pubkey,
}

/// Delegations set by trove owners.
#[derive(BorshSerialize, BorshDeserialize, Debug, Default, Clone)]
pub struct BorrowerOperationsState {
    // May add collateral and repay debt
    pub add_managers: BTreeMap<TroveId, Pubkey>,
    // May withdraw collateral, borrow and close
    pub remove_managers: BTreeMap<TroveId, RemoveManager>,
}
