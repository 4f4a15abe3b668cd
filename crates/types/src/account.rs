//! Per-validator identity record.

use crate::crypto::PUBLIC_KEY_BYTES;
use crate::{Address, PublicKey, VotingPower};
use serde::Serialize;

/// Size of an account's canonical encoding.
pub const ACCOUNT_ENCODED_BYTES: usize = Address::BYTES + PUBLIC_KEY_BYTES + 32;

/// Validator metadata: address, BLS key and declared voting power.
///
/// Immutable once built. A validator whose power changes is represented by a
/// new `Account` in a new validator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    address: Address,
    bls_public_key: PublicKey,
    voting_power: VotingPower,
}

impl Account {
    /// Build an account.
    ///
    /// The public key has already passed subgroup validation by construction.
    /// Voting power must fit the 256-bit canonical encoding; zero is allowed
    /// for validators pending activation.
    pub fn new(
        address: Address,
        bls_public_key: PublicKey,
        voting_power: VotingPower,
    ) -> Result<Self, AccountError> {
        if voting_power.bits() > 256 {
            return Err(AccountError::VotingPowerOverflow {
                address,
                bits: voting_power.bits(),
            });
        }

        Ok(Self {
            address,
            bls_public_key,
            voting_power,
        })
    }

    /// Validator address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// BLS public key.
    pub fn bls_public_key(&self) -> &PublicKey {
        &self.bls_public_key
    }

    /// Declared voting power.
    pub fn voting_power(&self) -> &VotingPower {
        &self.voting_power
    }

    /// Whether this account counts towards quorum.
    pub fn is_active(&self) -> bool {
        !self.voting_power.is_zero()
    }

    /// Copy of this account with a different voting power.
    pub fn with_voting_power(&self, voting_power: VotingPower) -> Result<Self, AccountError> {
        Self::new(self.address, self.bls_public_key.clone(), voting_power)
    }

    /// Canonical encoding: `address` (20) || `bls_public_key` (48, compressed)
    /// || `voting_power` (32, big-endian).
    pub fn canonical_bytes(&self) -> [u8; ACCOUNT_ENCODED_BYTES] {
        let mut out = [0u8; ACCOUNT_ENCODED_BYTES];
        out[..20].copy_from_slice(self.address.as_bytes());
        out[20..68].copy_from_slice(self.bls_public_key.as_bytes());
        // Width was checked in `new`.
        if let Some(power) = self.voting_power.to_be_bytes32() {
            out[68..].copy_from_slice(&power);
        }
        out
    }
}

/// Errors that can occur when building an account.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    /// Voting power does not fit in 256 bits.
    #[error("voting power of {address} is {bits} bits wide, maximum is 256")]
    VotingPowerOverflow {
        /// Offending validator.
        address: Address,
        /// Width of the supplied value.
        bits: u64,
    },
}
