//! Key storage error types.

use hydragon_types::CryptoError;
use thiserror::Error;

/// Errors from key storage and the key initialization flows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyStoreError {
    /// No secret stored under this name.
    #[error("secret {0:?} not found")]
    SecretNotFound(String),

    /// Refused to overwrite an existing secret.
    #[error("secret {0:?} has already been initialized")]
    AlreadyInitialized(String),

    /// Stored material could not be decoded or failed validation.
    #[error("secret {name:?} is invalid: {reason}")]
    InvalidSecret {
        /// Secret name.
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// BLS operation failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Storage backend failed.
    #[error("key store backend error: {0}")]
    Backend(String),
}

impl KeyStoreError {
    pub(crate) fn invalid(name: &str, reason: impl ToString) -> Self {
        Self::InvalidSecret {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
