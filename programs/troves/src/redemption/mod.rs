pub mod redemption_operations;
pub mod redemption_rate;
pub mod types;
