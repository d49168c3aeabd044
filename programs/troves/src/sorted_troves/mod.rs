use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::{
    state::{Node, SortedTrovesJournal, TroveId},
    TroveError,
};

pub mod sorted_troves_operations;

pub use sorted_troves_operations::InsertPosition;

/// Looks up the current rank of a listed trove. Ranks are never stored on
/// the nodes, so the list always compares against up to date values.
pub trait RankSource {
    fn rank_of(&self, id: &TroveId) -> Result<u128, TroveError>;
}

/// Doubly linked list of troves ordered by descending rank.
///
/// The root node (`TroveId::ROOT`) is both the predecessor of the head and the
/// successor of the tail, so an empty list is the root linked to itself.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct SortedTroves {
    pub(crate) nodes: BTreeMap<TroveId, Node>,
    pub(crate) size: u64,
    #[borsh_skip]
    pub(crate) journal: Option<SortedTrovesJournal>,
}

impl Default for SortedTroves {
    fn default() -> Self {
        Self::new()
    }
}
