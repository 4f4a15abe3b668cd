//! Secret storage capability.

use crate::KeyStoreError;
use parking_lot::RwLock;
use std::collections::HashMap;
use zeroize::Zeroizing;

/// Name of the ECDSA validator key.
pub const VALIDATOR_KEY: &str = "validator-key";

/// Name of the BLS validator key.
pub const VALIDATOR_BLS_KEY: &str = "validator-bls-key";

/// Name of the networking (ed25519) key.
pub const NETWORK_KEY: &str = "network-key";

/// Name of the validator's KOSK signature.
pub const VALIDATOR_BLS_SIGNATURE: &str = "validator-bls-signature";

/// Backend-agnostic secret storage.
///
/// Values are opaque bytes. The initialization flows in this crate store
/// them hex-encoded.
pub trait KeyStore: Send + Sync {
    /// Whether a secret exists under `name`.
    fn has_secret(&self, name: &str) -> bool;

    /// Read the secret stored under `name`.
    fn get_secret(&self, name: &str) -> Result<Vec<u8>, KeyStoreError>;

    /// Store `value` under `name`, replacing any previous value.
    fn set_secret(&self, name: &str, value: &[u8]) -> Result<(), KeyStoreError>;
}

/// In-process key store.
///
/// Values are wiped from memory when replaced or when the store is dropped.
#[derive(Default)]
pub struct MemoryKeyStore {
    secrets: RwLock<HashMap<String, Zeroizing<Vec<u8>>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets.
    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.read().is_empty()
    }
}

impl KeyStore for MemoryKeyStore {
    fn has_secret(&self, name: &str) -> bool {
        self.secrets.read().contains_key(name)
    }

    fn get_secret(&self, name: &str) -> Result<Vec<u8>, KeyStoreError> {
        self.secrets
            .read()
            .get(name)
            .map(|value| value.to_vec())
            .ok_or_else(|| KeyStoreError::SecretNotFound(name.to_string()))
    }

    fn set_secret(&self, name: &str, value: &[u8]) -> Result<(), KeyStoreError> {
        self.secrets
            .write()
            .insert(name.to_string(), Zeroizing::new(value.to_vec()));
        Ok(())
    }
}

impl std::fmt::Debug for MemoryKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.secrets.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("MemoryKeyStore")
            .field("names", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_set_has() {
        let store = MemoryKeyStore::new();
        assert!(store.is_empty());
        assert!(!store.has_secret(NETWORK_KEY));
        assert_eq!(
            store.get_secret(NETWORK_KEY),
            Err(KeyStoreError::SecretNotFound(NETWORK_KEY.to_string()))
        );

        store.set_secret(NETWORK_KEY, b"abc").unwrap();
        assert!(store.has_secret(NETWORK_KEY));
        assert_eq!(store.get_secret(NETWORK_KEY).unwrap(), b"abc");
        assert_eq!(store.len(), 1);

        store.set_secret(NETWORK_KEY, b"xyz").unwrap();
        assert_eq!(store.get_secret(NETWORK_KEY).unwrap(), b"xyz");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_debug_lists_names_only() {
        let store = MemoryKeyStore::new();
        store.set_secret(VALIDATOR_BLS_KEY, b"super-secret").unwrap();

        let debug = format!("{:?}", store);
        assert!(debug.contains(VALIDATOR_BLS_KEY));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_usable_as_shared_trait_object() {
        let store: Arc<dyn KeyStore> = Arc::new(MemoryKeyStore::new());

        std::thread::scope(|s| {
            for i in 0..4u8 {
                let store = Arc::clone(&store);
                s.spawn(move || {
                    let name = format!("secret-{i}");
                    store.set_secret(&name, &[i]).unwrap();
                    assert_eq!(store.get_secret(&name).unwrap(), vec![i]);
                });
            }
        });

        assert!(store.has_secret("secret-3"));
    }
}
