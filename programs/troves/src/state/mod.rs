use std::fmt;

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::hash::hashv;
use borsh::{BorshDeserialize, BorshSerialize};
use num_derive::FromPrimitive;

mod borrower_operations_state;
mod journal;
mod sorted_troves_state;
mod trove_manager_state;

pub use borrower_operations_state::{BorrowerOperationsState, RemoveManager};
pub use journal::{SortedTrovesJournal, TroveIdsEdit, TroveManagerJournal};
pub use sorted_troves_state::Node;
pub use trove_manager_state::TroveManagerState;

/// 256-bit trove identifier. The all-zero id is reserved for the sorted list root.
#[derive(
    BorshSerialize, BorshDeserialize, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct TroveId(pub [u8; 32]);

impl TroveId {
    pub const ROOT: TroveId = TroveId([0; 32]);

    pub fn derive(owner: &Pubkey, owner_index: u64) -> Self {
        TroveId(hashv(&[owner.as_ref(), &owner_index.to_le_bytes()]).to_bytes())
    }

    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }
}

impl fmt::Debug for TroveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for TroveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("root");
        }
        for b in &self.0[..6] {
            write!(f, "{:02x}", b)?;
        }
        f.write_str("..")
    }
}

// Stored as a u8 tag on the trove record
#[derive(FromPrimitive, PartialEq, Eq, Clone, Copy, Debug)]
pub enum TroveStatus {
    NonExistent = 0,
    Active = 1,
    ClosedByOwner = 2,
    ClosedByLiquidation = 3,
    Zombie = 4,
}

impl TroveStatus {
    pub fn is_active_or_zombie(self) -> bool {
        matches!(self, TroveStatus::Active | TroveStatus::Zombie)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Trove {
    // Recorded debt, excludes interest and redistribution gains not yet applied
    pub debt: u128,
    pub coll: u128,
    pub stake: u128,
    pub status: u8,
    // Position in the trove ids array
    pub array_index: u64,
    pub last_debt_update_time: u64,
    pub owner: Pubkey,
}

/// Values of `L_coll` and `L_usdx_debt` when the trove stake was last set.
#[derive(BorshSerialize, BorshDeserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewardSnapshot {
    pub coll: u128,
    pub usdx_debt: u128,
}
