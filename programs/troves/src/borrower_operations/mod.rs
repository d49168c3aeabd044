pub mod borrow_fee;
pub mod borrower_operations;
pub mod system_mode;
pub mod types;

#[cfg(test)]
mod tests_open_close_trove;
