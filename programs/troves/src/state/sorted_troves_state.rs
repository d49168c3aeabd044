use borsh::{BorshDeserialize, BorshSerialize};

use super::TroveId;

#[derive(BorshSerialize, BorshDeserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub next_id: TroveId,
    pub prev_id: TroveId,
    pub exists: bool,
}
