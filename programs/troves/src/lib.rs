use anchor_lang::prelude::*;
use decimal_wad::error::DecimalError;

pub mod borrower_operations;
pub mod collaborators;
pub mod redemption;
pub mod sorted_troves;
pub mod state;
pub mod trove_manager;
pub mod utils;

pub use borrower_operations::borrower_operations::{
    adjust_trove, adjust_zombie_trove, apply_pending_debt, close_trove, open_trove,
    set_add_manager, set_remove_manager_with_receiver, shutdown, shutdown_from_oracle_failure,
};
pub use collaborators::Collaborators;
pub use redemption::redemption_operations::{redeem_collateral, urgent_redemption};
pub use sorted_troves::{RankSource, SortedTroves};
pub use state::{
    BorrowerOperationsState, Node, RemoveManager, RewardSnapshot, Trove, TroveId,
    TroveManagerState, TroveStatus,
};
pub use trove_manager::liquidation_operations::batch_liquidate_troves;

#[error_code]
#[derive(PartialEq, Eq)]
pub enum TroveError {
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Trove already exists")]
    TroveAlreadyExists,

    #[msg("Trove is not open")]
    TroveNotOpen,

    #[msg("Trove is not active")]
    TroveNotActive,

    #[msg("Trove is not a zombie")]
    TroveNotZombie,

    #[msg("Branch has been shut down")]
    IsShutDown,

    #[msg("Branch has not been shut down")]
    NotShutDown,

    #[msg("Caller is neither the owner nor the add manager")]
    NotOwnerNorAddManager,

    #[msg("Caller is neither the owner nor the remove manager")]
    NotOwnerNorRemoveManager,

    #[msg("Caller is not the owner")]
    NotOwner,

    #[msg("Collateral is paused")]
    CollateralPaused,

    #[msg("Collateral is frozen, cannot increase exposure")]
    CollateralFrozen,

    #[msg("Price feed reported a failure")]
    OracleFailure,

    #[msg("Individual collateral ratio is below the minimum")]
    IcrBelowMcr,

    #[msg("Operation would leave the system ratio below the critical threshold")]
    TcrBelowCcr,

    #[msg("System ratio is not below the shutdown threshold")]
    TcrNotBelowScr,

    #[msg("Cannot redeem while the system ratio is below the minimum")]
    TcrBelowMcrCannotRedeem,

    #[msg("Resulting debt is below the minimum")]
    DebtBelowMin,

    #[msg("Collateral withdrawal must be matched by debt repayment in critical mode")]
    RepaymentNotMatchingCollWithdrawal,

    #[msg("Withdrawal exceeds the trove collateral")]
    WithdrawalExceedsCollateral,

    #[msg("Repayment exceeds the trove debt")]
    RepaymentExceedsDebt,

    #[msg("Cannot close the last trove")]
    OnlyOneTroveLeft,

    #[msg("Nothing to liquidate")]
    NothingToLiquidate,

    #[msg("Cannot redistribute without stakes")]
    CannotRedistributeWithoutStakes,

    #[msg("Redemption fee exceeds the accepted maximum")]
    FeeExceedsMaxFee,

    #[msg("Redeemed collateral is below the requested minimum")]
    MinCollNotReached,

    #[msg("List already contains the node")]
    ListAlreadyContainsNode,

    #[msg("List does not contain the node")]
    ListDoesNotContainNode,

    #[msg("Node id cannot be the root")]
    IdCannotBeZero,

    #[msg("Math overflow")]
    MathOverflow,
}

impl From<DecimalError> for TroveError {
    fn from(err: DecimalError) -> TroveError {
        match err {
            DecimalError::MathOverflow => TroveError::MathOverflow,
        }
    }
}
