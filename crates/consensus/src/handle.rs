//! Atomic publication of the active validator set.
//!
//! Readers call [`ValidatorSetHandle::current`] and get an `Arc` snapshot
//! that stays valid for as long as they hold it, even across an epoch
//! change. Publishing a new epoch swaps the pointer; no reader ever observes a
//! partially built set.
//!
//! Writers are serialized by a transition lock. A multi-step transition such
//! as an epoch advance holds it from the stale check through publication, so
//! no other publish can slip in between. Readers never take it.

use arc_swap::ArcSwap;
use hydragon_types::ValidatorSet;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// A validator set together with the epoch it governs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochValidators {
    pub epoch: u64,
    pub validator_set: ValidatorSet,
}

/// Shared, atomically replaceable view of the active validator set.
pub struct ValidatorSetHandle {
    current: ArcSwap<EpochValidators>,
    transition: Mutex<()>,
}

impl ValidatorSetHandle {
    /// Start at `epoch` with `validator_set`.
    pub fn new(epoch: u64, validator_set: ValidatorSet) -> Self {
        Self {
            current: ArcSwap::from_pointee(EpochValidators {
                epoch,
                validator_set,
            }),
            transition: Mutex::new(()),
        }
    }

    /// Snapshot of the active epoch.
    pub fn current(&self) -> Arc<EpochValidators> {
        self.current.load_full()
    }

    /// Active epoch number.
    pub fn epoch(&self) -> u64 {
        self.current.load().epoch
    }

    /// Replace the active set with `validator_set` for `epoch`.
    ///
    /// `epoch` must be strictly greater than the active epoch. Concurrent
    /// publishers are serialized: exactly one of two racing publishes for the
    /// same epoch succeeds.
    pub fn publish(
        &self,
        epoch: u64,
        validator_set: ValidatorSet,
    ) -> Result<Arc<EpochValidators>, HandleError> {
        self.begin_transition().publish(epoch, validator_set)
    }

    /// Take the transition lock. Blocks while another writer holds it.
    pub(crate) fn begin_transition(&self) -> EpochTransition<'_> {
        EpochTransition {
            handle: self,
            _guard: self.transition.lock(),
        }
    }

    fn store(
        &self,
        epoch: u64,
        validator_set: ValidatorSet,
    ) -> Result<Arc<EpochValidators>, HandleError> {
        let active = self.current.load().epoch;
        if epoch <= active {
            return Err(HandleError::StaleEpoch {
                current: active,
                attempted: epoch,
            });
        }

        let next = Arc::new(EpochValidators {
            epoch,
            validator_set,
        });
        self.current.store(Arc::clone(&next));

        info!(
            epoch,
            validators = next.validator_set.len(),
            total_voting_power = %next.validator_set.total_voting_power(),
            "Published validator set"
        );
        Ok(next)
    }
}

/// Exclusive right to replace the active set.
///
/// The active epoch cannot change while this is alive except through
/// [`EpochTransition::publish`].
pub(crate) struct EpochTransition<'a> {
    handle: &'a ValidatorSetHandle,
    _guard: MutexGuard<'a, ()>,
}

impl EpochTransition<'_> {
    /// Snapshot of the active epoch, stable until `publish`.
    pub(crate) fn current(&self) -> Arc<EpochValidators> {
        self.handle.current()
    }

    /// Publish and release the lock.
    pub(crate) fn publish(
        self,
        epoch: u64,
        validator_set: ValidatorSet,
    ) -> Result<Arc<EpochValidators>, HandleError> {
        self.handle.store(epoch, validator_set)
    }
}

impl std::fmt::Debug for ValidatorSetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.current.load();
        f.debug_struct("ValidatorSetHandle")
            .field("epoch", &current.epoch)
            .field("validators", &current.validator_set.len())
            .finish()
    }
}

/// Errors from publishing a validator set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    /// Epoch does not advance past the active one.
    #[error("epoch {attempted} is not newer than active epoch {current}")]
    StaleEpoch { current: u64, attempted: u64 },
}
