use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use std::fs;
use wallet_verifier_service::common::signer::PRIVATE_KEY_FILE;
use wallet_verifier_service::common::verify::address_from_key;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = OsRng;
    let private_key = SigningKey::random(&mut rng);
    let address = address_from_key(private_key.verifying_key());

    fs::write(PRIVATE_KEY_FILE, hex::encode(private_key.to_bytes()))?;
    println!("Private key saved to {}", PRIVATE_KEY_FILE);
    println!("Address: {}", address.to_checksum(None));

    Ok(())
}
