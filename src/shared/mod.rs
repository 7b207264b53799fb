pub mod constants;
#[cfg(test)]
pub mod memory_store;
pub mod test_helpers;
pub mod types;
