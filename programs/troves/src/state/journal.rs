use std::collections::BTreeMap;
use std::mem;

use super::{Node, RewardSnapshot, Trove, TroveId, TroveManagerState};
use crate::sorted_troves::SortedTroves;

/// Write to the unordered trove ids array, undone in reverse order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TroveIdsEdit {
    Pushed,
    SwapRemoved { index: usize, id: TroveId },
}

/// Prior values of the ledger entries written by the running operation.
/// `None` marks an entry that did not exist yet.
#[derive(Debug, Clone)]
pub struct TroveManagerJournal {
    // Ledger with its collections taken out
    scalars: Box<TroveManagerState>,
    troves: BTreeMap<TroveId, Option<Trove>>,
    reward_snapshots: BTreeMap<TroveId, Option<RewardSnapshot>>,
    trove_ids: Vec<TroveIdsEdit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedTrovesJournal {
    size: u64,
    nodes: BTreeMap<TroveId, Option<Node>>,
}

fn restore_entries<V>(map: &mut BTreeMap<TroveId, V>, prior: BTreeMap<TroveId, Option<V>>) {
    for (id, value) in prior {
        match value {
            Some(value) => {
                map.insert(id, value);
            }
            None => {
                map.remove(&id);
            }
        }
    }
}

impl TroveManagerState {
    pub fn is_journaling(&self) -> bool {
        self.journal.is_some()
    }

    pub fn begin_journal(&mut self) {
        let troves = mem::take(&mut self.troves);
        let reward_snapshots = mem::take(&mut self.reward_snapshots);
        let trove_ids = mem::take(&mut self.trove_ids);
        let scalars = Box::new(self.clone());
        self.troves = troves;
        self.reward_snapshots = reward_snapshots;
        self.trove_ids = trove_ids;

        self.journal = Some(TroveManagerJournal {
            scalars,
            troves: BTreeMap::new(),
            reward_snapshots: BTreeMap::new(),
            trove_ids: Vec::new(),
        });
    }

    pub fn commit_journal(&mut self) {
        self.journal = None;
    }

    /// Puts back every entry written since `begin_journal`.
    pub fn rollback_journal(&mut self) {
        let journal = match self.journal.take() {
            Some(journal) => journal,
            None => return,
        };

        for edit in journal.trove_ids.into_iter().rev() {
            match edit {
                TroveIdsEdit::Pushed => {
                    self.trove_ids.pop();
                }
                TroveIdsEdit::SwapRemoved { index, id } => {
                    if index < self.trove_ids.len() {
                        let moved = self.trove_ids[index];
                        self.trove_ids[index] = id;
                        self.trove_ids.push(moved);
                    } else {
                        self.trove_ids.push(id);
                    }
                }
            }
        }
        restore_entries(&mut self.troves, journal.troves);
        restore_entries(&mut self.reward_snapshots, journal.reward_snapshots);

        let mut restored = *journal.scalars;
        restored.troves = mem::take(&mut self.troves);
        restored.reward_snapshots = mem::take(&mut self.reward_snapshots);
        restored.trove_ids = mem::take(&mut self.trove_ids);
        *self = restored;
    }

    pub(crate) fn journal_trove(&mut self, id: &TroveId) {
        if let Some(journal) = self.journal.as_mut() {
            let troves = &self.troves;
            journal
                .troves
                .entry(*id)
                .or_insert_with(|| troves.get(id).cloned());
        }
    }

    pub(crate) fn journal_reward_snapshot(&mut self, id: &TroveId) {
        if let Some(journal) = self.journal.as_mut() {
            let reward_snapshots = &self.reward_snapshots;
            journal
                .reward_snapshots
                .entry(*id)
                .or_insert_with(|| reward_snapshots.get(id).copied());
        }
    }

    pub(crate) fn journal_trove_ids(&mut self, edit: TroveIdsEdit) {
        if let Some(journal) = self.journal.as_mut() {
            journal.trove_ids.push(edit);
        }
    }
}

impl SortedTroves {
    pub fn begin_journal(&mut self) {
        self.journal = Some(SortedTrovesJournal {
            size: self.size,
            nodes: BTreeMap::new(),
        });
    }

    pub fn commit_journal(&mut self) {
        self.journal = None;
    }

    pub fn rollback_journal(&mut self) {
        if let Some(journal) = self.journal.take() {
            restore_entries(&mut self.nodes, journal.nodes);
            self.size = journal.size;
        }
    }

    pub(crate) fn journal_node(&mut self, id: &TroveId) {
        if let Some(journal) = self.journal.as_mut() {
            let nodes = &self.nodes;
            journal
                .nodes
                .entry(*id)
                .or_insert_with(|| nodes.get(id).copied());
        }
    }
}
