//! Networking identity key.

use crate::KeyStoreError;
use ed25519_dalek::{SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use hydragon_types::CryptoError;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::Zeroizing;

/// Ed25519 key identifying this node to its peers.
pub struct NetworkKey(SigningKey);

impl NetworkKey {
    /// Generate a key from the OS random source.
    pub fn generate() -> Result<Self, KeyStoreError> {
        let mut seed = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        OsRng
            .try_fill_bytes(seed.as_mut())
            .map_err(|e| CryptoError::EntropyUnavailable(e.to_string()))?;
        Ok(Self(SigningKey::from_bytes(&seed)))
    }

    /// Parse a raw 32-byte seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let seed: &[u8; SECRET_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidEncoding(format!(
                "network key: expected {SECRET_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(SigningKey::from_bytes(seed)))
    }

    /// Public half of the key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.0.verifying_key()
    }

    /// Peer identifier: hex of the public key.
    pub fn node_id(&self) -> String {
        hex::encode(self.verifying_key().as_bytes())
    }

    /// Raw seed for storage.
    pub fn export_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LENGTH]> {
        Zeroizing::new(self.0.to_bytes())
    }
}

impl fmt::Debug for NetworkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkKey")
            .field("node_id", &self.node_id())
            .finish()
    }
}
