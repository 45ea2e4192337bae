//! Wallet-holder side: talking to the verifier and remembering what was signed.

pub mod api;
pub mod history;
