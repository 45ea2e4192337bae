pub mod client;
pub mod common;
pub mod test_utils;
