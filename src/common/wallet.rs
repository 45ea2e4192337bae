use alloy_primitives::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet is not connected")]
    NotConnected,
    #[error("failed to load private key: {0}")]
    KeyLoad(String),
    #[error("signing failed: {0}")]
    Signing(#[from] k256::ecdsa::Error),
}

/// The capabilities the holder needs from a wallet.
///
/// Whatever actually holds the key (a local file, a hardware device, a
/// hosted wallet) is adapted to this interface once.
pub trait WalletProvider {
    /// Connects and returns the account address.
    fn connect(&mut self) -> Result<Address, WalletError>;

    fn disconnect(&mut self);

    /// The connected account, if any.
    fn address(&self) -> Option<Address>;

    /// Signs `message` with the `personal_sign` convention and returns the
    /// `0x`-prefixed hex signature.
    fn sign_message(&self, message: &str) -> Result<String, WalletError>;
}
