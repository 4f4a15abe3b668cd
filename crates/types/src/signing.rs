//! Domain-separated signing messages.
//!
//! Domain tags are used as the hash-to-curve DST, so a signature produced
//! under one tag never verifies under another even for identical bytes.
//!
//! | Tag | Purpose |
//! |-----|---------|
//! | `DOMAIN_HYDRA_CHAIN` | KOSK proofs binding a validator address to its BLS key |
//! | `DOMAIN_CHECKPOINT_MANAGER` | Checkpoint and block commit signatures |
//! | `DOMAIN_COMMON_SIGNING` | Anything else signed with a validator BLS key |
//!
//! These values are part of the wire agreement between nodes.

use crate::{Address, BlockHeight, ChainId, Hash};
use serde::{Deserialize, Serialize};

/// Domain tag for KOSK signatures.
pub const DOMAIN_HYDRACHAIN: &[u8] = b"DOMAIN_HYDRA_CHAIN";

/// Domain tag for checkpoint/commit signatures.
pub const DOMAIN_CHECKPOINT_MANAGER: &[u8] = b"DOMAIN_CHECKPOINT_MANAGER";

/// Domain tag for general-purpose validator signatures.
pub const DOMAIN_COMMON_SIGNING: &[u8] = b"DOMAIN_COMMON_SIGNING";

/// Size of the encoded KOSK message.
pub const KOSK_MESSAGE_BYTES: usize = 64;

/// Build the KOSK message for `(address, chain_id)`.
///
/// Format: `address` left-padded with zeros to 32 bytes || `chain_id` as a
/// 32-byte big-endian integer. Any verifier must reproduce these exact bytes.
pub fn kosk_message(address: &Address, chain_id: ChainId) -> [u8; KOSK_MESSAGE_BYTES] {
    let mut message = [0u8; KOSK_MESSAGE_BYTES];
    message[12..32].copy_from_slice(address.as_bytes());
    message[32..].copy_from_slice(&chain_id.to_be_bytes32());
    message
}

/// Build the message validators sign to certify a checkpoint.
///
/// Format: `chain_id` (32, BE) || `epoch` (8, BE) || `block_height` (8, BE)
/// || `block_hash` (32) || `validators_hash` (32)
pub fn checkpoint_message(
    chain_id: ChainId,
    epoch: u64,
    block_height: BlockHeight,
    block_hash: &Hash,
    validators_hash: &Hash,
) -> Vec<u8> {
    let mut message = Vec::with_capacity(112);
    message.extend_from_slice(&chain_id.to_be_bytes32());
    message.extend_from_slice(&epoch.to_be_bytes());
    message.extend_from_slice(&block_height.0.to_be_bytes());
    message.extend_from_slice(block_hash.as_bytes());
    message.extend_from_slice(validators_hash.as_bytes());
    message
}

/// Domain tags in use by this node.
///
/// Passed explicitly to signing and verification so tests can run with
/// alternate tags side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningDomains {
    /// Tag for KOSK proofs.
    pub kosk: String,

    /// Tag for checkpoint/commit signatures.
    pub checkpoint: String,

    /// Tag for general-purpose signatures.
    pub common: String,
}

impl Default for SigningDomains {
    fn default() -> Self {
        Self {
            kosk: String::from_utf8_lossy(DOMAIN_HYDRACHAIN).into_owned(),
            checkpoint: String::from_utf8_lossy(DOMAIN_CHECKPOINT_MANAGER).into_owned(),
            common: String::from_utf8_lossy(DOMAIN_COMMON_SIGNING).into_owned(),
        }
    }
}

impl SigningDomains {
    /// KOSK tag bytes.
    pub fn kosk(&self) -> &[u8] {
        self.kosk.as_bytes()
    }

    /// Checkpoint tag bytes.
    pub fn checkpoint(&self) -> &[u8] {
        self.checkpoint.as_bytes()
    }

    /// General-purpose tag bytes.
    pub fn common(&self) -> &[u8] {
        self.common.as_bytes()
    }
}
