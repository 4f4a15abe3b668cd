//! ECDSA (secp256k1) validator key and address derivation.

use crate::KeyStoreError;
use hydragon_types::{Address, CryptoError};
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{PublicKey as Secp256k1PublicKey, Secp256k1, SecretKey as Secp256k1SecretKey};
use sha3::{Digest, Keccak256};
use std::fmt;
use zeroize::Zeroizing;

/// Attempts at drawing a valid scalar before giving up.
const MAX_GENERATE_ATTEMPTS: usize = 8;

/// Secp256k1 key identifying a validator account.
pub struct EcdsaKey {
    secret: Secp256k1SecretKey,
    address: Address,
}

impl EcdsaKey {
    /// Generate a key from the OS random source.
    pub fn generate() -> Result<Self, KeyStoreError> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let mut bytes = Zeroizing::new([0u8; 32]);
            OsRng
                .try_fill_bytes(bytes.as_mut())
                .map_err(|e| CryptoError::EntropyUnavailable(e.to_string()))?;

            // Zero or >= curve order; vanishingly rare.
            if let Ok(secret) = Secp256k1SecretKey::from_slice(bytes.as_ref()) {
                return Ok(Self::from_secret(secret));
            }
        }

        Err(CryptoError::EntropyUnavailable(
            "could not draw a valid secp256k1 scalar".to_string(),
        )
        .into())
    }

    /// Parse a raw 32-byte scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, secp256k1::Error> {
        Secp256k1SecretKey::from_slice(bytes).map(Self::from_secret)
    }

    fn from_secret(secret: Secp256k1SecretKey) -> Self {
        let secp = Secp256k1::signing_only();
        let public_key = Secp256k1PublicKey::from_secret_key(&secp, &secret);
        Self {
            secret,
            address: address_from_public_key(&public_key),
        }
    }

    /// Account address of this key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Raw scalar for storage.
    pub fn export_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret.secret_bytes())
    }
}

impl fmt::Debug for EcdsaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaKey")
            .field("address", &self.address)
            .finish()
    }
}

/// Ethereum-style address: the last 20 bytes of keccak256 over the
/// uncompressed public key without its `0x04` prefix.
pub fn address_from_public_key(public_key: &Secp256k1PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let digest = Keccak256::digest(&uncompressed[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);
    Address(address)
}
