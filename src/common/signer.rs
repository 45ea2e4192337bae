use alloy_primitives::Address;
use k256::ecdsa::SigningKey;
use std::env;
use std::fs;

use crate::common::verify::{address_from_key, personal_message_hash, SIGNATURE_LENGTH};
use crate::common::wallet::{WalletError, WalletProvider};

pub const PRIVATE_KEY_FILE: &str = "private_key.hex";

/// Parses a hex private key, with or without a `0x` prefix.
pub fn parse_private_key(hex_key: &str) -> Result<SigningKey, WalletError> {
    let hex_key = hex_key.trim();
    let digits = hex_key.strip_prefix("0x").unwrap_or(hex_key);
    let bytes = hex::decode(digits).map_err(|e| WalletError::KeyLoad(e.to_string()))?;
    SigningKey::from_slice(&bytes).map_err(|e| WalletError::KeyLoad(e.to_string()))
}

pub fn load_private_key() -> Result<SigningKey, WalletError> {
    let hex_key = match env::var("PRIVATE_KEY") {
        Ok(key) => key,
        Err(_) => fs::read_to_string(PRIVATE_KEY_FILE)
            .map_err(|e| WalletError::KeyLoad(format!("{}: {}", PRIVATE_KEY_FILE, e)))?,
    };
    parse_private_key(&hex_key)
}

/// Signs `message` the way browser wallets do for `personal_sign`.
///
/// The result is `0x` followed by `r || s || v` with `v` in `{27, 28}`.
pub fn sign_message(key: &SigningKey, message: &str) -> Result<String, WalletError> {
    let digest = personal_message_hash(message);
    let (signature, recovery_id) = key.sign_prehash_recoverable(digest.as_slice())?;

    let mut bytes = [0u8; SIGNATURE_LENGTH];
    bytes[..64].copy_from_slice(&signature.to_bytes());
    bytes[64] = 27 + recovery_id.to_byte();
    Ok(format!("0x{}", hex::encode(bytes)))
}

/// A wallet backed by a secp256k1 key held in memory.
pub struct LocalWallet {
    key: SigningKey,
    connected: bool,
}

impl LocalWallet {
    pub fn new(key: SigningKey) -> Self {
        Self {
            key,
            connected: false,
        }
    }

    pub fn from_env() -> Result<Self, WalletError> {
        load_private_key().map(Self::new)
    }

    fn key_address(&self) -> Address {
        address_from_key(self.key.verifying_key())
    }
}

impl WalletProvider for LocalWallet {
    fn connect(&mut self) -> Result<Address, WalletError> {
        self.connected = true;
        let address = self.key_address();
        tracing::debug!(%address, "wallet connected");
        Ok(address)
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn address(&self) -> Option<Address> {
        self.connected.then(|| self.key_address())
    }

    fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        if !self.connected {
            return Err(WalletError::NotConnected);
        }
        sign_message(&self.key, message)
    }
}
