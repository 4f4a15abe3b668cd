//! Epoch transitions and reconciliation against the state provider.

use crate::handle::{EpochValidators, HandleError, ValidatorSetHandle};
use crate::provider::{EpochCommit, StateProvider, StateProviderError};
use hydragon_types::{BlockHeight, ValidatorSet, ValidatorSetDelta, ValidatorSetError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from an epoch transition or reconciliation.
#[derive(Debug, Error)]
pub enum EpochError {
    #[error(transparent)]
    Provider(#[from] StateProviderError),

    #[error("provider returned an invalid validator set: {0}")]
    ValidatorSet(#[from] ValidatorSetError),

    #[error(transparent)]
    Handle(#[from] HandleError),
}

/// Read the provider's accounts at `height` into a set under the quorum
/// policy of `current`.
fn snapshot_at(
    current: &EpochValidators,
    provider: &dyn StateProvider,
    height: BlockHeight,
) -> Result<ValidatorSet, EpochError> {
    let accounts = provider.validator_accounts(height)?;
    Ok(ValidatorSet::new(
        accounts,
        current.validator_set.policy().clone(),
    )?)
}

/// Compare the published set with the provider's view at `height`.
///
/// Divergence is logged, not corrected; neither side is modified.
pub fn reconcile(
    handle: &ValidatorSetHandle,
    provider: &dyn StateProvider,
    height: BlockHeight,
) -> Result<ValidatorSetDelta, EpochError> {
    let current = handle.current();
    let snapshot = snapshot_at(&current, provider, height)?;
    let delta = ValidatorSetDelta::between(&current.validator_set, &snapshot);

    if delta.is_empty() {
        debug!(
            epoch = current.epoch,
            height = height.0,
            "Validator set matches state"
        );
    } else {
        warn!(
            epoch = current.epoch,
            height = height.0,
            added = delta.added.len(),
            updated = delta.updated.len(),
            removed = delta.removed.len(),
            "Published validator set diverges from state"
        );
    }

    Ok(delta)
}

/// Move to `epoch` using the provider's accounts at `end_height`.
///
/// The commit is submitted to the provider before the new set is published,
/// so a rejected commit leaves the active set untouched. Other publishers
/// block from the stale check until the new set is live, so a committed epoch
/// is always the one published.
pub fn advance_epoch(
    handle: &ValidatorSetHandle,
    provider: &dyn StateProvider,
    epoch: u64,
    end_height: BlockHeight,
) -> Result<Arc<EpochValidators>, EpochError> {
    let transition = handle.begin_transition();
    let current = transition.current();
    let next = snapshot_at(&current, provider, end_height)?;
    if epoch <= current.epoch {
        return Err(HandleError::StaleEpoch {
            current: current.epoch,
            attempted: epoch,
        }
        .into());
    }

    let commit = EpochCommit {
        epoch,
        end_height,
        validators_hash: next.validators_hash(),
    };
    provider.commit_epoch(commit)?;

    let published = transition.publish(epoch, next)?;
    info!(
        epoch,
        end_height = end_height.0,
        validators = published.validator_set.len(),
        "Advanced epoch"
    );
    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticStateProvider;
    use hydragon_test_helpers::TestCommittee;
    use hydragon_types::{Account, VotingPower};
    use parking_lot::Mutex;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tracing_test::traced_test;

    fn setup(n: usize) -> (TestCommittee, ValidatorSetHandle, StaticStateProvider) {
        let committee = TestCommittee::new(n, VotingPower::from(100));
        let handle = ValidatorSetHandle::new(0, committee.validator_set());
        let provider = StaticStateProvider::with_genesis(committee.accounts());
        (committee, handle, provider)
    }

    #[traced_test]
    #[test]
    fn test_reconcile_in_sync() {
        let (_, handle, provider) = setup(4);

        let delta = reconcile(&handle, &provider, BlockHeight(5)).unwrap();
        assert!(delta.is_empty());
        assert!(!logs_contain("diverges"));
    }

    #[traced_test]
    #[test]
    fn test_reconcile_reports_divergence() {
        let (committee, handle, provider) = setup(4);

        let mut accounts = committee.accounts();
        accounts[1] = accounts[1].with_voting_power(VotingPower::from(250)).unwrap();
        accounts.remove(3);
        let newcomer = TestCommittee::new(6, VotingPower::from(100)).accounts()[5].clone();
        accounts.push(newcomer.clone());
        provider.set_accounts(BlockHeight(10), accounts.clone());

        let delta = reconcile(&handle, &provider, BlockHeight(10)).unwrap();
        assert_eq!(delta.added, vec![newcomer]);
        assert_eq!(delta.updated, vec![accounts[1].clone()]);
        assert_eq!(delta.removed, vec![committee.address(3)]);
        assert!(logs_contain("diverges from state"));

        // Nothing was published or committed.
        assert_eq!(handle.epoch(), 0);
        assert_eq!(handle.current().validator_set, committee.validator_set());
        assert!(provider.commits().is_empty());
    }

    #[test]
    fn test_reconcile_rejects_duplicate_accounts_from_state() {
        let (committee, handle, provider) = setup(4);
        let mut accounts = committee.accounts();
        accounts.push(accounts[0].clone());
        provider.set_accounts(BlockHeight(3), accounts);

        assert!(matches!(
            reconcile(&handle, &provider, BlockHeight(3)),
            Err(EpochError::ValidatorSet(
                ValidatorSetError::DuplicateValidator(_)
            ))
        ));
    }

    #[traced_test]
    #[test]
    fn test_advance_epoch_publishes_and_commits() {
        let (_, handle, provider) = setup(4);
        let grown = TestCommittee::new(5, VotingPower::from(100));
        provider.set_accounts(BlockHeight(100), grown.accounts());

        let published = advance_epoch(&handle, &provider, 1, BlockHeight(100)).unwrap();
        assert_eq!(published.epoch, 1);
        assert_eq!(published.validator_set, grown.validator_set());
        assert_eq!(handle.epoch(), 1);

        let commits = provider.commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].epoch, 1);
        assert_eq!(commits[0].end_height, BlockHeight(100));
        assert_eq!(
            commits[0].validators_hash,
            grown.validator_set().validators_hash()
        );
        assert!(logs_contain("Advanced epoch"));

        assert!(reconcile(&handle, &provider, BlockHeight(100))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_advance_stale_epoch_leaves_state_untouched() {
        let (_, handle, provider) = setup(4);
        advance_epoch(&handle, &provider, 1, BlockHeight(10)).unwrap();

        assert!(matches!(
            advance_epoch(&handle, &provider, 1, BlockHeight(20)),
            Err(EpochError::Handle(HandleError::StaleEpoch { current: 1, attempted: 1 }))
        ));
        assert_eq!(provider.commits().len(), 1);
    }

    #[test]
    fn test_rejected_commit_does_not_publish() {
        struct RejectingProvider(Vec<Account>);

        impl StateProvider for RejectingProvider {
            fn validator_accounts(
                &self,
                _height: BlockHeight,
            ) -> Result<Vec<Account>, StateProviderError> {
                Ok(self.0.clone())
            }

            fn commit_epoch(&self, _commit: EpochCommit) -> Result<(), StateProviderError> {
                Err(StateProviderError::Backend("unavailable".to_string()))
            }
        }

        let (committee, handle, _) = setup(4);
        let provider = RejectingProvider(committee.accounts());

        assert!(matches!(
            advance_epoch(&handle, &provider, 1, BlockHeight(10)),
            Err(EpochError::Provider(StateProviderError::Backend(_)))
        ));
        assert_eq!(handle.epoch(), 0);
    }

    #[test]
    fn test_publish_during_commit_waits_for_advance() {
        struct RacingProvider {
            accounts: Vec<Account>,
            handle: Arc<ValidatorSetHandle>,
            racer: Mutex<Option<JoinHandle<Result<Arc<EpochValidators>, HandleError>>>>,
            commits: Mutex<Vec<EpochCommit>>,
        }

        impl StateProvider for RacingProvider {
            fn validator_accounts(
                &self,
                _height: BlockHeight,
            ) -> Result<Vec<Account>, StateProviderError> {
                Ok(self.accounts.clone())
            }

            fn commit_epoch(&self, commit: EpochCommit) -> Result<(), StateProviderError> {
                // Another writer tries to publish while the commit is in flight.
                let handle = Arc::clone(&self.handle);
                let set = ValidatorSet::with_default_policy(self.accounts.clone())
                    .map_err(|e| StateProviderError::Backend(e.to_string()))?;
                *self.racer.lock() = Some(thread::spawn(move || handle.publish(5, set)));
                thread::sleep(Duration::from_millis(50));
                self.commits.lock().push(commit);
                Ok(())
            }
        }

        let committee = TestCommittee::new(4, VotingPower::from(100));
        let handle = Arc::new(ValidatorSetHandle::new(0, committee.validator_set()));
        let provider = RacingProvider {
            accounts: committee.accounts(),
            handle: Arc::clone(&handle),
            racer: Mutex::new(None),
            commits: Mutex::new(Vec::new()),
        };

        let published = advance_epoch(&handle, &provider, 1, BlockHeight(10)).unwrap();
        assert_eq!(published.epoch, 1);
        assert_eq!(provider.commits.lock()[0].epoch, 1);

        let racer = provider.racer.lock().take().unwrap();
        assert_eq!(racer.join().unwrap().unwrap().epoch, 5);
        assert_eq!(handle.epoch(), 5);
    }

    #[test]
    fn test_unknown_height() {
        let committee = TestCommittee::new(4, VotingPower::from(100));
        let handle = ValidatorSetHandle::new(0, committee.validator_set());
        let provider = StaticStateProvider::new();
        provider.set_accounts(BlockHeight(50), committee.accounts());

        assert!(matches!(
            reconcile(&handle, &provider, BlockHeight(1)),
            Err(EpochError::Provider(StateProviderError::UnknownHeight(_)))
        ));
    }

    #[test]
    fn test_new_epoch_uses_active_policy() {
        let (_, handle, provider) = setup(4);
        let published = advance_epoch(&handle, &provider, 1, BlockHeight(1)).unwrap();
        assert_eq!(
            published.validator_set.policy(),
            handle.current().validator_set.policy()
        );
    }
}
