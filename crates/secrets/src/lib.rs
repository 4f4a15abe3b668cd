//! Validator key storage for Hydragon.
//!
//! Secrets live behind the [`KeyStore`] capability so the node never assumes
//! a particular backend. On top of it sit the flows that create a validator's
//! keys on first start and load them on every start after:
//!
//! | Secret | Name | Created by |
//! |--------|------|------------|
//! | ECDSA account key | `validator-key` | [`init_ecdsa_validator_key`] |
//! | BLS key | `validator-bls-key` | [`init_bls_validator_key`] |
//! | KOSK proof | `validator-bls-signature` | [`init_validator_bls_signature`] |
//! | Networking key | `network-key` | [`init_networking_key`] |

mod ecdsa;
mod error;
mod helper;
mod network;
mod store;

pub use ecdsa::{address_from_public_key, EcdsaKey};
pub use error::KeyStoreError;
pub use helper::{
    init_bls_validator_key, init_ecdsa_validator_key, init_networking_key,
    init_validator_bls_signature, load_bls_public_key, load_bls_secret_key, load_bls_signature,
    load_encoded_secret, load_network_key, load_validator_address, load_validator_identity,
    ValidatorIdentity,
};
pub use network::NetworkKey;
pub use store::{
    KeyStore, MemoryKeyStore, NETWORK_KEY, VALIDATOR_BLS_KEY, VALIDATOR_BLS_SIGNATURE,
    VALIDATOR_KEY,
};
