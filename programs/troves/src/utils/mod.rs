pub mod bn;
pub mod consts;
pub mod coretypes;
pub mod finance;
pub mod macros;
pub mod math;
#[cfg(test)]
mod tests_finance;
