//! Immutable validator set and quorum decisions.
//!
//! A `ValidatorSet` is built once per epoch and never mutated afterwards, so
//! any number of threads may query it concurrently without locking. Moving to
//! a new epoch means building a new set and publishing it in place of the old
//! one.

use crate::quorum::QuorumPolicyError;
use crate::{Account, Address, BlockHeight, Hash, PublicKey, QuorumPolicy, VotingPower};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use tracing::debug;

/// Version byte prefixed to the canonical encoding hashed by
/// [`ValidatorSet::validators_hash`]. Bump on any layout change.
pub const VALIDATORS_HASH_VERSION: u8 = 1;

/// The active validators of an epoch.
#[derive(Debug, Clone)]
pub struct ValidatorSet {
    /// Accounts in canonical (insertion) order.
    accounts: Vec<Account>,

    /// Address -> voting power, same order as `accounts`.
    voting_power_index: IndexMap<Address, VotingPower>,

    /// Sum of every value in `voting_power_index`.
    total_voting_power: VotingPower,

    /// Threshold rule applied by `has_quorum`.
    policy: QuorumPolicy,
}

impl ValidatorSet {
    /// Build a validator set in one pass over `accounts`.
    pub fn new(accounts: Vec<Account>, policy: QuorumPolicy) -> Result<Self, ValidatorSetError> {
        policy.validate()?;

        let mut voting_power_index = IndexMap::with_capacity(accounts.len());
        let mut total_voting_power = VotingPower::zero();

        for account in &accounts {
            let address = *account.address();
            if voting_power_index
                .insert(address, account.voting_power().clone())
                .is_some()
            {
                return Err(ValidatorSetError::DuplicateValidator(address));
            }
            total_voting_power += account.voting_power();
        }

        Ok(Self {
            accounts,
            voting_power_index,
            total_voting_power,
            policy,
        })
    }

    /// Build with the default Hydragon quorum policy.
    pub fn with_default_policy(accounts: Vec<Account>) -> Result<Self, ValidatorSetError> {
        Self::new(accounts, QuorumPolicy::default())
    }

    /// Check if `address` is a member of this set.
    pub fn includes(&self, address: &Address) -> bool {
        self.voting_power_index.contains_key(address)
    }

    /// Number of validators.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the set has no validators.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Accounts in canonical order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Voting power per address, iterated in canonical order.
    pub fn voting_powers(&self) -> &IndexMap<Address, VotingPower> {
        &self.voting_power_index
    }

    /// Voting power of a single validator.
    pub fn voting_power(&self, address: &Address) -> Option<&VotingPower> {
        self.voting_power_index.get(address)
    }

    /// Sum of all voting power, including pending (zero-power) validators.
    pub fn total_voting_power(&self) -> &VotingPower {
        &self.total_voting_power
    }

    /// Quorum policy in force.
    pub fn policy(&self) -> &QuorumPolicy {
        &self.policy
    }

    /// Look up an account by address.
    pub fn get(&self, address: &Address) -> Option<&Account> {
        self.index_of(address).map(|i| &self.accounts[i])
    }

    /// Position of `address` in canonical order.
    pub fn index_of(&self, address: &Address) -> Option<usize> {
        self.voting_power_index.get_index_of(address)
    }

    /// Account at a canonical position.
    pub fn account_at(&self, index: usize) -> Option<&Account> {
        self.accounts.get(index)
    }

    /// Public keys of the signers that are members of this set.
    pub fn public_keys_of(&self, signers: &BTreeSet<Address>) -> Vec<PublicKey> {
        signers
            .iter()
            .filter_map(|address| self.get(address))
            .map(|account| account.bls_public_key().clone())
            .collect()
    }

    /// Sum the power of signers in the set and count the present ones.
    /// Unknown addresses and pending (zero-power) members are skipped.
    fn tally(&self, signers: &BTreeSet<Address>) -> (VotingPower, usize) {
        let mut aggregated = VotingPower::zero();
        let mut present = 0usize;

        for power in signers
            .iter()
            .filter_map(|address| self.voting_power_index.get(address))
            .filter(|power| !power.is_zero())
        {
            aggregated += power;
            present += 1;
        }

        (aggregated, present)
    }

    /// Voting power `signers` would need to reach quorum at `height`.
    pub fn quorum_size(&self, height: BlockHeight, signers: &BTreeSet<Address>) -> VotingPower {
        let (_, present) = self.tally(signers);
        self.policy
            .quorum_size(height, &self.total_voting_power, present)
    }

    /// Check whether `signers` reach quorum at `height`.
    ///
    /// With fewer than four present signers the full total voting power is
    /// required.
    pub fn has_quorum(&self, height: BlockHeight, signers: &BTreeSet<Address>) -> bool {
        let (aggregated, present) = self.tally(signers);
        let quorum_size = self
            .policy
            .quorum_size(height, &self.total_voting_power, present);
        let has_quorum = QuorumPolicy::has_quorum(&aggregated, &quorum_size);

        debug!(
            height = height.0,
            signers = signers.len(),
            present,
            aggregated_power = %aggregated,
            quorum_size = %quorum_size,
            has_quorum,
            "Evaluated quorum"
        );

        has_quorum
    }

    /// Digest of the canonical encoding, consumed by the checkpoint layer.
    ///
    /// Blake3 over `VALIDATORS_HASH_VERSION` followed by each account's
    /// [`Account::canonical_bytes`] in canonical order.
    pub fn validators_hash(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[VALIDATORS_HASH_VERSION]);
        for account in &self.accounts {
            hasher.update(&account.canonical_bytes());
        }
        Hash::from_raw(*hasher.finalize().as_bytes())
    }
}

impl PartialEq for ValidatorSet {
    fn eq(&self, other: &Self) -> bool {
        self.accounts == other.accounts && self.policy == other.policy
    }
}

impl Eq for ValidatorSet {}

/// Errors that can occur when building a validator set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidatorSetError {
    /// Two accounts share an address.
    #[error("duplicate validator {0}")]
    DuplicateValidator(Address),

    /// Quorum policy is malformed.
    #[error("invalid quorum policy: {0}")]
    InvalidPolicy(#[from] QuorumPolicyError),
}
