pub mod liquidation_calcs;
pub mod liquidation_operations;
pub mod trove_operations;
pub mod types;

#[cfg(test)]
mod tests_liquidation;

use crate::{
    sorted_troves::{RankSource, SortedTroves},
    state::{TroveId, TroveManagerState},
    TroveError,
};

/// Runs `op` against the ledger and the sorted list, restoring both when it fails.
///
/// Only the entries `op` writes to are journaled, so the cost follows the
/// number of troves touched rather than the number of open troves. Nested
/// calls run inside the outermost journal.
pub fn atomically<T>(
    trove_manager: &mut TroveManagerState,
    sorted_troves: &mut SortedTroves,
    op: impl FnOnce(&mut TroveManagerState, &mut SortedTroves) -> Result<T, TroveError>,
) -> Result<T, TroveError> {
    if trove_manager.is_journaling() {
        return op(trove_manager, sorted_troves);
    }

    trove_manager.begin_journal();
    sorted_troves.begin_journal();

    let res = op(trove_manager, sorted_troves);
    if res.is_err() {
        trove_manager.rollback_journal();
        sorted_troves.rollback_journal();
    } else {
        trove_manager.commit_journal();
        sorted_troves.commit_journal();
    }

    res
}

/// Ranks listed troves by their nominal collateral ratio at `now`.
pub struct NominalRanks<'a> {
    pub trove_manager: &'a TroveManagerState,
    pub annual_interest_rate: u128,
    pub now: u64,
}

impl RankSource for NominalRanks<'_> {
    fn rank_of(&self, id: &TroveId) -> Result<u128, TroveError> {
        self.trove_manager
            .get_nominal_icr(id, self.annual_interest_rate, self.now)
    }
}

impl TroveManagerState {
    pub fn ranks(&self, annual_interest_rate: u128, now: u64) -> NominalRanks<'_> {
        NominalRanks {
            trove_manager: self,
            annual_interest_rate,
            now,
        }
    }
}
