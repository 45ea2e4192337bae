//! Recovery of the address that signed a personal message.
//!
//! Messages are hashed with the `personal_sign` convention (EIP-191, version
//! `0x45`) and signatures are the 65-byte `r || s || v` encoding produced by
//! wallets. Recovery never fails outwardly: a signature that cannot be
//! recovered is reported as an invalid [`VerificationResult`].

use alloy_primitives::{keccak256, Address, B256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use crate::common::error::SignatureError;
use crate::common::types::VerificationResult;

const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

pub const SIGNATURE_LENGTH: usize = 65;

/// Hashes `message` the way wallets do before signing it.
///
/// The length is the UTF-8 byte length of the message.
pub fn personal_message_hash(message: &str) -> B256 {
    let mut data = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 20 + message.len());
    data.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    data.extend_from_slice(message.len().to_string().as_bytes());
    data.extend_from_slice(message.as_bytes());
    keccak256(&data)
}

/// Derives the account address for a secp256k1 public key.
pub fn address_from_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 tag of the uncompressed encoding.
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// A parsed `r || s || v` signature.
#[derive(Clone, Debug)]
pub struct RecoverableSignature {
    signature: Signature,
    v: u8,
    recovery_id: RecoveryId,
}

impl RecoverableSignature {
    /// Parses a `0x`-prefixed, 65-byte hex signature.
    pub fn from_hex(input: &str) -> Result<Self, SignatureError> {
        let digits = input
            .strip_prefix("0x")
            .ok_or(SignatureError::MissingPrefix)?;
        let bytes = hex::decode(digits)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }

        let v = bytes[64];
        let parity = y_parity(v)?;
        let recovery_id =
            RecoveryId::from_byte(parity).ok_or(SignatureError::InvalidRecoveryId(v))?;
        let signature =
            Signature::from_slice(&bytes[..64]).map_err(|_| SignatureError::InvalidComponents)?;
        if signature.normalize_s().is_some() {
            return Err(SignatureError::HighS);
        }

        Ok(Self {
            signature,
            v,
            recovery_id,
        })
    }

    pub fn v(&self) -> u8 {
        self.v
    }

    pub fn y_parity(&self) -> u8 {
        self.recovery_id.to_byte()
    }

    /// Recovers the address whose key produced this signature over `digest`.
    pub fn recover(&self, digest: &B256) -> Result<Address, SignatureError> {
        let key =
            VerifyingKey::recover_from_prehash(digest.as_slice(), &self.signature, self.recovery_id)
                .map_err(|_| {
                    tracing::debug!(
                        v = self.v(),
                        y_parity = self.y_parity(),
                        "no key recovered for signature"
                    );
                    SignatureError::RecoveryFailed
                })?;
        Ok(address_from_key(&key))
    }
}

/// Accepts raw parities, the legacy 27/28 offset and EIP-155 encoded values.
fn y_parity(v: u8) -> Result<u8, SignatureError> {
    match v {
        0 | 27 => Ok(0),
        1 | 28 => Ok(1),
        v if v >= 35 => Ok((v - 35) % 2),
        v => Err(SignatureError::InvalidRecoveryId(v)),
    }
}

/// Recovers the signer of `message` from a hex `signature`.
pub fn recover_signer(message: &str, signature: &str) -> Result<Address, SignatureError> {
    let signature = RecoverableSignature::from_hex(signature)?;
    signature.recover(&personal_message_hash(message))
}

/// Recovers the signer and reports it as a [`VerificationResult`].
///
/// The result says whether recovery succeeded, not whether the signer is
/// anyone in particular.
pub fn verify(message: &str, signature: &str) -> VerificationResult {
    match recover_signer(message, signature) {
        Ok(signer) => VerificationResult::valid(signer.to_checksum(None), message),
        Err(err) => {
            tracing::debug!(error = %err, "signature recovery failed");
            VerificationResult::invalid(message)
        }
    }
}

/// Something that can turn a `(message, signature)` pair into a result.
pub trait MessageVerifier: Send + Sync {
    fn verify(&self, message: &str, signature: &str) -> VerificationResult;
}

/// The production verifier: `personal_sign` hashing plus secp256k1 recovery.
#[derive(Clone, Copy, Debug, Default)]
pub struct PersonalSignVerifier;

impl MessageVerifier for PersonalSignVerifier {
    fn verify(&self, message: &str, signature: &str) -> VerificationResult {
        verify(message, signature)
    }
}
