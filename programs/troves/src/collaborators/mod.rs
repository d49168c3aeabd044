//! Interfaces of the components the trove engine drives but does not own:
//! collateral pools, the stability pool, the price feed, branch configuration
//! and the trove NFT. Debt token mints and burns are returned to the caller
//! as effects instead.

use anchor_lang::prelude::Pubkey;

use crate::{state::TroveId, TroveError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollDestination {
    Account(Pubkey),
    StabilityPool,
    CollSurplusPool,
}

/// Net effect of an operation on the active pool's aggregate debt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TroveChange {
    pub applied_redist_usdx_debt_gain: u128,
    pub applied_redist_coll_gain: u128,
    pub coll_increase: u128,
    pub coll_decrease: u128,
    pub debt_increase: u128,
    pub debt_decrease: u128,
    // Yearly interest of the touched troves, before and after the operation
    pub new_weighted_recorded_debt: u128,
    pub old_weighted_recorded_debt: u128,
}

impl TroveChange {
    pub fn add(&mut self, other: &TroveChange) -> Result<(), TroveError> {
        use crate::utils::coretypes::CheckedAssign;

        self.applied_redist_usdx_debt_gain
            .checked_add_assign(other.applied_redist_usdx_debt_gain)?;
        self.applied_redist_coll_gain
            .checked_add_assign(other.applied_redist_coll_gain)?;
        self.coll_increase.checked_add_assign(other.coll_increase)?;
        self.coll_decrease.checked_add_assign(other.coll_decrease)?;
        self.debt_increase.checked_add_assign(other.debt_increase)?;
        self.debt_decrease.checked_add_assign(other.debt_decrease)?;
        self.new_weighted_recorded_debt
            .checked_add_assign(other.new_weighted_recorded_debt)?;
        self.old_weighted_recorded_debt
            .checked_add_assign(other.old_weighted_recorded_debt)?;
        Ok(())
    }
}

/// Holds the collateral and aggregate debt of active troves.
pub trait ActivePool {
    fn get_coll_balance(&self) -> u128;
    /// Aggregate recorded debt plus interest accrued up to `now`.
    fn get_usdx_debt(&self, now: u64) -> u128;
    fn send_coll(&mut self, to: CollDestination, amount: u128);
    fn receive_coll(&mut self, amount: u128);
    fn send_coll_to_default_pool(&mut self, amount: u128);
    /// Mints aggregate interest accrued since the last call and applies `change`.
    fn mint_agg_interest_and_account_for_trove_change(&mut self, change: &TroveChange, now: u64);
    fn set_shutdown_flag(&mut self, now: u64);
}

/// Holds redistributed debt and collateral not yet applied to troves.
pub trait DefaultPool {
    fn get_coll_balance(&self) -> u128;
    fn get_usdx_debt(&self) -> u128;
    fn increase_usdx_debt(&mut self, amount: u128);
    fn decrease_usdx_debt(&mut self, amount: u128);
    fn receive_coll(&mut self, amount: u128);
    fn send_coll_to_active_pool(&mut self, amount: u128);
}

/// Loss absorption pool burning its deposits against liquidated debt.
pub trait StabilityPool {
    fn get_total_usdx_deposits(&self) -> u128;
    fn offset(&mut self, debt_to_offset: u128, coll_to_add: u128);
}

/// Keeps liquidation surplus claimable by former trove owners.
pub trait CollSurplusPool {
    fn account_surplus(&mut self, owner: Pubkey, amount: u128);
}

pub trait PriceFeed {
    /// Returns the price and whether a new oracle failure was detected,
    /// in which case the feed has already shut the branch down.
    fn fetch_price(&mut self) -> (u128, bool);
    fn fetch_redemption_price(&mut self) -> (u128, bool);
}

pub trait CollateralConfig {
    fn get_annual_interest_rate(&self) -> u128;
    fn get_borrow_ratio(&self) -> u128;
    fn get_treasury(&self) -> Pubkey;
    fn is_paused(&self) -> bool;
    fn is_frozen(&self) -> bool;

    fn require_not_paused_or_frozen(&self, is_increase: bool) -> Result<(), TroveError> {
        if self.is_paused() {
            return Err(TroveError::CollateralPaused);
        }
        if is_increase && self.is_frozen() {
            return Err(TroveError::CollateralFrozen);
        }
        Ok(())
    }
}

pub trait TroveNft {
    fn mint(&mut self, owner: Pubkey, trove_id: TroveId);
    fn burn(&mut self, trove_id: TroveId);
}

pub struct Collaborators<'a> {
    pub active_pool: &'a mut dyn ActivePool,
    pub default_pool: &'a mut dyn DefaultPool,
    pub stability_pool: &'a mut dyn StabilityPool,
    pub coll_surplus_pool: &'a mut dyn CollSurplusPool,
    pub price_feed: &'a mut dyn PriceFeed,
    pub collateral_config: &'a dyn CollateralConfig,
    pub trove_nft: &'a mut dyn TroveNft,
}

impl Collaborators<'_> {
    pub fn get_entire_system_coll(&self) -> u128 {
        self.active_pool
            .get_coll_balance()
            .saturating_add(self.default_pool.get_coll_balance())
    }

    pub fn get_entire_system_debt(&self, now: u64) -> u128 {
        self.active_pool
            .get_usdx_debt(now)
            .saturating_add(self.default_pool.get_usdx_debt())
    }

    /// Brings redistribution gains applied to a trove back from the default pool.
    pub fn move_pending_trove_rewards_to_active_pool(&mut self, debt: u128, coll: u128) {
        if debt > 0 {
            self.default_pool.decrease_usdx_debt(debt);
        }
        if coll > 0 {
            self.default_pool.send_coll_to_active_pool(coll);
            self.active_pool.receive_coll(coll);
        }
    }

    pub fn fetch_price(&mut self) -> Result<u128, TroveError> {
        let (price, failure) = self.price_feed.fetch_price();
        if failure {
            crate::fail!(TroveError::OracleFailure);
        }
        Ok(price)
    }

    pub fn fetch_redemption_price(&mut self) -> Result<u128, TroveError> {
        let (price, failure) = self.price_feed.fetch_redemption_price();
        if failure {
            crate::fail!(TroveError::OracleFailure);
        }
        Ok(price)
    }
}
