use anchor_lang::prelude::msg;

use super::{RankSource, SortedTroves};
use crate::{
    fail,
    state::{Node, TroveId},
    TroveError,
};

/// Adjacent pair a trove can be linked between, and how many search steps
/// it took to find it (0 when the hints were already valid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertPosition {
    pub prev_id: TroveId,
    pub next_id: TroveId,
    pub steps: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    prev_id: TroveId,
    next_id: TroveId,
}

#[derive(Debug, Clone, Copy)]
enum Scan {
    Descend(Cursor),
    Ascend(Cursor),
    DescendAndAscend { descent: Cursor, ascent: Cursor },
}

enum Step {
    Found(Cursor),
    Moved(Cursor),
}

impl SortedTroves {
    pub fn new() -> Self {
        let mut nodes = std::collections::BTreeMap::new();
        nodes.insert(
            TroveId::ROOT,
            Node {
                next_id: TroveId::ROOT,
                prev_id: TroveId::ROOT,
                exists: false,
            },
        );
        SortedTroves {
            nodes,
            size: 0,
            journal: None,
        }
    }

    pub fn contains(&self, id: &TroveId) -> bool {
        self.nodes.get(id).map_or(false, |node| node.exists)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get_size(&self) -> u64 {
        self.size
    }

    /// Highest ranked trove, root when empty.
    pub fn get_first(&self) -> TroveId {
        self.node(&TroveId::ROOT).next_id
    }

    /// Lowest ranked trove, root when empty.
    pub fn get_last(&self) -> TroveId {
        self.node(&TroveId::ROOT).prev_id
    }

    pub fn get_next(&self, id: &TroveId) -> TroveId {
        self.node(id).next_id
    }

    pub fn get_prev(&self, id: &TroveId) -> TroveId {
        self.node(id).prev_id
    }

    /// Walks the list from head to tail.
    pub fn iter(&self) -> SortedTrovesIter<'_> {
        SortedTrovesIter {
            list: self,
            current: self.get_first(),
        }
    }

    pub fn insert<R: RankSource>(
        &mut self,
        id: TroveId,
        rank: u128,
        prev_hint: TroveId,
        next_hint: TroveId,
        ranks: &R,
    ) -> Result<InsertPosition, TroveError> {
        if id.is_root() {
            fail!(TroveError::IdCannotBeZero);
        }
        if self.contains(&id) {
            fail!(TroveError::ListAlreadyContainsNode);
        }

        let position = self.verified_position(rank, prev_hint, next_hint, ranks)?;

        self.journal_node(&id);
        self.nodes.insert(
            id,
            Node {
                next_id: TroveId::ROOT,
                prev_id: TroveId::ROOT,
                exists: true,
            },
        );
        self.insert_slice_into_verified_position(id, id, position.prev_id, position.next_id);
        self.size += 1;

        Ok(position)
    }

    pub fn remove(&mut self, id: &TroveId) -> Result<(), TroveError> {
        if !self.contains(id) {
            fail!(TroveError::ListDoesNotContainNode);
        }

        self.remove_slice(id, id);
        self.journal_node(id);
        self.nodes.remove(id);
        self.size -= 1;

        Ok(())
    }

    /// Moves a listed trove after its rank changed.
    pub fn re_insert<R: RankSource>(
        &mut self,
        id: TroveId,
        new_rank: u128,
        prev_hint: TroveId,
        next_hint: TroveId,
        ranks: &R,
    ) -> Result<InsertPosition, TroveError> {
        if !self.contains(&id) {
            fail!(TroveError::ListDoesNotContainNode);
        }

        self.re_insert_slice(id, id, new_rank, prev_hint, next_hint, ranks)
    }

    /// Moves the contiguous run `slice_head..=slice_tail` to the position of
    /// `rank`. Every trove in the run must report `rank` through `ranks`.
    pub fn re_insert_slice<R: RankSource>(
        &mut self,
        slice_head: TroveId,
        slice_tail: TroveId,
        rank: u128,
        prev_hint: TroveId,
        next_hint: TroveId,
        ranks: &R,
    ) -> Result<InsertPosition, TroveError> {
        if !self.contains(&slice_head) || !self.contains(&slice_tail) {
            fail!(TroveError::ListDoesNotContainNode);
        }

        let old_prev = self.node(&slice_head).prev_id;
        let old_next = self.node(&slice_tail).next_id;

        // Search the list without the run, so that it is never compared
        // against itself and hints pointing into it count as stale
        self.remove_slice(&slice_head, &slice_tail);
        self.set_slice_exists(slice_head, slice_tail, false);
        let position = self.verified_position(rank, prev_hint, next_hint, ranks);
        self.set_slice_exists(slice_head, slice_tail, true);

        match position {
            Ok(position) => {
                self.insert_slice_into_verified_position(
                    slice_head,
                    slice_tail,
                    position.prev_id,
                    position.next_id,
                );
                Ok(position)
            }
            Err(e) => {
                self.insert_slice_into_verified_position(slice_head, slice_tail, old_prev, old_next);
                Err(e)
            }
        }
    }

    /// Links the pre-linked run `slice_head..=slice_tail` between `prev_id` and
    /// `next_id`. Only the outer links are rewritten, the caller guarantees
    /// the two neighbours are adjacent and correctly ranked.
    pub fn insert_slice_into_verified_position(
        &mut self,
        slice_head: TroveId,
        slice_tail: TroveId,
        prev_id: TroveId,
        next_id: TroveId,
    ) {
        self.node_mut(prev_id).next_id = slice_head;
        self.node_mut(slice_head).prev_id = prev_id;
        self.node_mut(slice_tail).next_id = next_id;
        self.node_mut(next_id).prev_id = slice_tail;
    }

    /// Whether `(prev_id, next_id)` are adjacent and `rank` fits between them.
    /// The root ranks above everything on the prev side and below everything
    /// on the next side.
    pub fn valid_insert_position<R: RankSource>(
        &self,
        rank: u128,
        prev_id: TroveId,
        next_id: TroveId,
        ranks: &R,
    ) -> Result<bool, TroveError> {
        let listed = |id: &TroveId| id.is_root() || self.contains(id);
        if !listed(&prev_id) || !listed(&next_id) {
            return Ok(false);
        }
        if self.node(&prev_id).next_id != next_id {
            return Ok(false);
        }

        Ok((prev_id.is_root() || ranks.rank_of(&prev_id)? >= rank)
            && (next_id.is_root() || rank > ranks.rank_of(&next_id)?))
    }

    pub fn find_insert_position<R: RankSource>(
        &self,
        rank: u128,
        prev_hint: TroveId,
        next_hint: TroveId,
        ranks: &R,
    ) -> Result<(TroveId, TroveId), TroveError> {
        let position = self.search(rank, prev_hint, next_hint, ranks)?;
        Ok((position.prev_id, position.next_id))
    }

    /// Uses the hints as they are when valid, otherwise searches from them.
    pub fn verified_position<R: RankSource>(
        &self,
        rank: u128,
        prev_hint: TroveId,
        next_hint: TroveId,
        ranks: &R,
    ) -> Result<InsertPosition, TroveError> {
        if self.valid_insert_position(rank, prev_hint, next_hint, ranks)? {
            return Ok(InsertPosition {
                prev_id: prev_hint,
                next_id: next_hint,
                steps: 0,
            });
        }
        self.search(rank, prev_hint, next_hint, ranks)
    }

    /// Walks from whichever hint still ranks correctly relative to `rank`,
    /// from both when both do, and from the head when neither does.
    pub fn search<R: RankSource>(
        &self,
        rank: u128,
        prev_hint: TroveId,
        next_hint: TroveId,
        ranks: &R,
    ) -> Result<InsertPosition, TroveError> {
        let mut scan = self.initial_scan(rank, prev_hint, next_hint, ranks)?;
        let mut steps = 0;

        loop {
            steps += 1;
            scan = match scan {
                Scan::Descend(cursor) => match self.descend_one(rank, cursor, ranks)? {
                    Step::Found(cursor) => return Ok(cursor.into_position(steps)),
                    Step::Moved(cursor) => Scan::Descend(cursor),
                },
                Scan::Ascend(cursor) => match self.ascend_one(rank, cursor, ranks)? {
                    Step::Found(cursor) => return Ok(cursor.into_position(steps)),
                    Step::Moved(cursor) => Scan::Ascend(cursor),
                },
                Scan::DescendAndAscend { descent, ascent } => {
                    let descent = match self.descend_one(rank, descent, ranks)? {
                        Step::Found(cursor) => return Ok(cursor.into_position(steps)),
                        Step::Moved(cursor) => cursor,
                    };
                    let ascent = match self.ascend_one(rank, ascent, ranks)? {
                        Step::Found(cursor) => return Ok(cursor.into_position(steps)),
                        Step::Moved(cursor) => cursor,
                    };
                    Scan::DescendAndAscend { descent, ascent }
                }
            };
        }
    }

    fn initial_scan<R: RankSource>(
        &self,
        rank: u128,
        prev_hint: TroveId,
        next_hint: TroveId,
        ranks: &R,
    ) -> Result<Scan, TroveError> {
        if prev_hint.is_root() {
            return Ok(Scan::Descend(self.descent_from(TroveId::ROOT)));
        }
        // prev must still rank at or above the new rank
        let prev_stale = !self.contains(&prev_hint) || ranks.rank_of(&prev_hint)? < rank;

        if next_hint.is_root() {
            return Ok(Scan::Ascend(self.ascent_from(TroveId::ROOT)));
        }
        // next must still rank strictly below it
        let next_stale = !self.contains(&next_hint) || rank <= ranks.rank_of(&next_hint)?;

        let scan = match (prev_stale, next_stale) {
            (true, true) => {
                msg!("Both hints are stale, searching from the head");
                Scan::Descend(self.descent_from(TroveId::ROOT))
            }
            (true, false) => Scan::Ascend(self.ascent_from(next_hint)),
            (false, true) => Scan::Descend(self.descent_from(prev_hint)),
            (false, false) => Scan::DescendAndAscend {
                descent: self.descent_from(prev_hint),
                ascent: self.ascent_from(next_hint),
            },
        };
        Ok(scan)
    }

    fn descent_from(&self, start: TroveId) -> Cursor {
        Cursor {
            prev_id: start,
            next_id: self.node(&start).next_id,
        }
    }

    fn ascent_from(&self, start: TroveId) -> Cursor {
        Cursor {
            prev_id: self.node(&start).prev_id,
            next_id: start,
        }
    }

    fn descend_one<R: RankSource>(
        &self,
        rank: u128,
        cursor: Cursor,
        ranks: &R,
    ) -> Result<Step, TroveError> {
        if cursor.next_id.is_root() || rank > ranks.rank_of(&cursor.next_id)? {
            return Ok(Step::Found(cursor));
        }
        let prev_id = cursor.next_id;
        Ok(Step::Moved(Cursor {
            prev_id,
            next_id: self.node(&prev_id).next_id,
        }))
    }

    fn ascend_one<R: RankSource>(
        &self,
        rank: u128,
        cursor: Cursor,
        ranks: &R,
    ) -> Result<Step, TroveError> {
        if cursor.prev_id.is_root() || ranks.rank_of(&cursor.prev_id)? >= rank {
            return Ok(Step::Found(cursor));
        }
        let next_id = cursor.prev_id;
        Ok(Step::Moved(Cursor {
            prev_id: self.node(&next_id).prev_id,
            next_id,
        }))
    }

    fn remove_slice(&mut self, slice_head: &TroveId, slice_tail: &TroveId) {
        let prev_id = self.node(slice_head).prev_id;
        let next_id = self.node(slice_tail).next_id;
        self.node_mut(prev_id).next_id = next_id;
        self.node_mut(next_id).prev_id = prev_id;
    }

    fn set_slice_exists(&mut self, slice_head: TroveId, slice_tail: TroveId, exists: bool) {
        let mut current = slice_head;
        while !current.is_root() {
            self.node_mut(current).exists = exists;
            if current == slice_tail {
                break;
            }
            current = self.node(&current).next_id;
        }
    }

    fn node(&self, id: &TroveId) -> Node {
        self.nodes.get(id).copied().unwrap_or_default()
    }

    fn node_mut(&mut self, id: TroveId) -> &mut Node {
        self.journal_node(&id);
        self.nodes.entry(id).or_default()
    }
}

impl Cursor {
    fn into_position(self, steps: u64) -> InsertPosition {
        InsertPosition {
            prev_id: self.prev_id,
            next_id: self.next_id,
            steps,
        }
    }
}

pub struct SortedTrovesIter<'a> {
    list: &'a SortedTroves,
    current: TroveId,
}

impl Iterator for SortedTrovesIter<'_> {
    type Item = TroveId;

    fn next(&mut self) -> Option<TroveId> {
        if self.current.is_root() {
            return None;
        }
        let id = self.current;
        self.current = self.list.get_next(&id);
        Some(id)
    }
}
