use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use crate::common::signer::{parse_private_key, sign_message};
use crate::common::types::VerificationRequest;

/// Well-known throwaway key; never holds funds.
pub const TEST_PRIVATE_KEY: &str =
    "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

/// Checksummed address of [`TEST_PRIVATE_KEY`].
pub const TEST_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

pub fn test_signing_key() -> SigningKey {
    parse_private_key(TEST_PRIVATE_KEY).expect("test key is valid")
}

pub fn random_signing_key() -> SigningKey {
    SigningKey::random(&mut OsRng)
}

/// Signs `message` with the test key.
pub fn sign_with_test_key(message: &str) -> String {
    sign_message(&test_signing_key(), message).expect("signing with the test key")
}

/// Creates a verification request signed by the test key.
pub fn create_signed_request(message: &str) -> VerificationRequest {
    VerificationRequest::new(message, sign_with_test_key(message))
}

/// Order of the secp256k1 group, big-endian.
const CURVE_ORDER: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

fn decode_signature(signature: &str) -> Vec<u8> {
    let digits = signature.strip_prefix("0x").expect("signature has a 0x prefix");
    hex::decode(digits).expect("signature is hex")
}

/// Rewrites a low-s signature as its high-s twin: `s' = n - s` with the
/// parity flipped. Both describe the same key mathematically.
pub fn malleate_signature(signature: &str) -> String {
    let mut bytes = decode_signature(signature);
    let order = hex::decode(CURVE_ORDER).expect("curve order is hex");

    let mut borrow = 0u8;
    for i in (0..32).rev() {
        let (diff, under) = order[i].overflowing_sub(bytes[32 + i]);
        let (diff, under_borrow) = diff.overflowing_sub(borrow);
        bytes[32 + i] = diff;
        borrow = u8::from(under || under_borrow);
    }
    bytes[64] = if bytes[64] == 27 { 28 } else { 27 };

    format!("0x{}", hex::encode(bytes))
}

/// Replaces the trailing recovery byte of a signature.
pub fn with_recovery_byte(signature: &str, v: u8) -> String {
    let mut bytes = decode_signature(signature);
    bytes[64] = v;
    format!("0x{}", hex::encode(bytes))
}
