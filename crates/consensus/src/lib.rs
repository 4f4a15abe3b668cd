//! Validator set lifecycle for Hydragon consensus.
//!
//! This crate owns the active validator set at runtime:
//!
//! - [`ConsensusConfig`]: chain id, signing domains, quorum rule and genesis
//!   validators, loaded from TOML
//! - [`ValidatorSetHandle`]: the published set, swapped atomically at each
//!   epoch boundary while readers keep lock-free snapshots
//! - [`StateProvider`]: the execution layer's view of validator accounts,
//!   used by [`advance_epoch`] and [`reconcile`]
//!
//! The round/voting state machine lives elsewhere; it asks this crate which
//! signers form a quorum at a given height.

mod config;
mod epoch;
mod handle;
mod provider;

pub use config::{ConfigError, ConsensusConfig, GenesisValidator};
pub use epoch::{advance_epoch, reconcile, EpochError};
pub use handle::{EpochValidators, HandleError, ValidatorSetHandle};
pub use provider::{EpochCommit, StateProvider, StateProviderError, StaticStateProvider};
