//! State provider abstraction.
//!
//! The execution layer owns the authoritative validator accounts (staking
//! contract state). Consensus only reads snapshots of them and reports epoch
//! ends back, through [`StateProvider`].

use hydragon_types::{Account, BlockHeight, Hash};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use thiserror::Error;

/// Record of a finished epoch, submitted to the execution layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochCommit {
    /// Epoch that starts with the published validator set.
    pub epoch: u64,

    /// Height the validator snapshot was read at.
    pub end_height: BlockHeight,

    /// `validators_hash` of the published set.
    pub validators_hash: Hash,
}

/// Source of validator accounts, and sink for epoch commits.
pub trait StateProvider: Send + Sync {
    /// Validator accounts as of `height`, in canonical order.
    fn validator_accounts(&self, height: BlockHeight) -> Result<Vec<Account>, StateProviderError>;

    /// Record that an epoch transition happened.
    fn commit_epoch(&self, commit: EpochCommit) -> Result<(), StateProviderError>;
}

/// Errors from a state provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateProviderError {
    /// No snapshot covers the requested height.
    #[error("no validator snapshot at or below height {0}")]
    UnknownHeight(BlockHeight),

    /// Epoch was already committed.
    #[error("epoch {0} already committed")]
    DuplicateCommit(u64),

    /// Backend failure.
    #[error("state provider backend error: {0}")]
    Backend(String),
}

/// In-memory provider backed by explicit snapshots.
///
/// A query at height `h` returns the latest snapshot recorded at or below
/// `h`. Useful for devnets and tests.
#[derive(Debug, Default)]
pub struct StaticStateProvider {
    snapshots: RwLock<BTreeMap<BlockHeight, Vec<Account>>>,
    commits: RwLock<Vec<EpochCommit>>,
}

impl StaticStateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider with one snapshot at genesis.
    pub fn with_genesis(accounts: Vec<Account>) -> Self {
        let provider = Self::new();
        provider.set_accounts(BlockHeight::GENESIS, accounts);
        provider
    }

    /// Record the accounts effective from `height`.
    pub fn set_accounts(&self, height: BlockHeight, accounts: Vec<Account>) {
        self.snapshots.write().insert(height, accounts);
    }

    /// Epoch commits received so far, in order.
    pub fn commits(&self) -> Vec<EpochCommit> {
        self.commits.read().clone()
    }
}

impl StateProvider for StaticStateProvider {
    fn validator_accounts(&self, height: BlockHeight) -> Result<Vec<Account>, StateProviderError> {
        self.snapshots
            .read()
            .range(..=height)
            .next_back()
            .map(|(_, accounts)| accounts.clone())
            .ok_or(StateProviderError::UnknownHeight(height))
    }

    fn commit_epoch(&self, commit: EpochCommit) -> Result<(), StateProviderError> {
        let mut commits = self.commits.write();
        if commits.iter().any(|c| c.epoch == commit.epoch) {
            return Err(StateProviderError::DuplicateCommit(commit.epoch));
        }
        commits.push(commit);
        Ok(())
    }
}
