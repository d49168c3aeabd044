pub const DECIMAL_PRECISION: u128 = 1_000_000_000_000_000_000;
pub const ONE: u128 = DECIMAL_PRECISION;
pub const ONE_HUNDRED_PCT: u128 = DECIMAL_PRECISION;

// Ranks in the sorted troves list use a larger precision so that
// small collateral amounts still order correctly
pub const NICR_PRECISION: u128 = 100_000_000_000_000_000_000;

pub const MCR: u128 = 1_100_000_000_000_000_000; // 110%
pub const CCR: u128 = 1_500_000_000_000_000_000; // 150%
pub const SCR: u128 = 1_100_000_000_000_000_000; // 110%, below this anyone can shut down

pub const MIN_DEBT: u128 = 2_000 * DECIMAL_PRECISION;

// The stability pool is never emptied by offsets
pub const MIN_USDX_IN_SP: u128 = DECIMAL_PRECISION;

pub const LIQUIDATION_PENALTY_SP: u128 = 50_000_000_000_000_000; // 5%
pub const LIQUIDATION_PENALTY_REDISTRIBUTION: u128 = 100_000_000_000_000_000; // 10%
pub const LIQUIDATOR_COMPENSATION_RATE: u128 = 5_000_000_000_000_000; // 0.5%
pub const COLL_GAS_COMPENSATION_CAP: u128 = 2 * DECIMAL_PRECISION; // 2 coll
pub const LIQUIDATION_PROTOCOL_FEE: u128 = 10_000_000_000_000_000; // 1%

pub const URGENT_REDEMPTION_BONUS: u128 = 10_000_000_000_000_000; // 1%

// no point to add further complexity with leap years and seconds for this particular case
pub const ONE_YEAR: u64 = 365 * 24 * 60 * 60;
pub const SECONDS_PER_MINUTE: u64 = 60;

/*
 * Half-life of 12h. 12h = 720 min
 * (1/2) = d^720 => d = (1/2)^(1/720)
 */
pub const MINUTE_DECAY_FACTOR: u64 = 999_037_758_833_783_000;
pub const REDEMPTION_FEE_FLOOR: u128 = 5_000_000_000_000_000; // 0.5%
pub const MAX_REDEMPTION_FEE: u128 = DECIMAL_PRECISION; // 100%
pub const REDEMPTION_BETA: u64 = 2;

// 1000 years, beyond this the decayed base rate is zero anyway
pub const MAX_DECAY_MINUTES: u64 = 525_600_000;
