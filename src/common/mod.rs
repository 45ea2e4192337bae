pub mod api;
pub mod config;
pub mod error;
pub mod signer;
pub mod types;
pub mod verify;
pub mod wallet;
