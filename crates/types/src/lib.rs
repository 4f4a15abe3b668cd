//! Core types for Hydragon consensus.
//!
//! This crate holds the validator identity and quorum layer shared by every
//! other crate:
//!
//! - **BLS engine** (`crypto`): BLS12-381 keys, signatures, aggregation, KOSK
//!   proofs binding an address to a key
//! - **Identifiers**: `Address`, `BlockHeight`, `ChainId`, `VotingPower`
//! - **Validator set**: immutable per-epoch `ValidatorSet` of `Account`s with
//!   the `QuorumPolicy` deciding when signers reach quorum
//! - **Certificates**: `AggregatedSignature` with its `SignerBitfield`
//!
//! Nothing here performs I/O. Types are plain data and safe to share across
//! threads.

mod account;
mod certificate;
pub mod crypto;
mod delta;
mod hash;
mod identifiers;
pub mod quorum;
mod signer_bitfield;
pub mod signing;
mod validator_set;

pub use account::{Account, AccountError, ACCOUNT_ENCODED_BYTES};
pub use certificate::{AggregatedSignature, CertificateError};
pub use crypto::{
    generate_key, generate_many, hash_message_to_point, make_kosk_signature,
    verify_kosk_signature, CryptoError, MessagePoint, PublicKey, SecretKey, Signature,
};
pub use delta::ValidatorSetDelta;
pub use hash::Hash;
pub use identifiers::{
    Address, AddressError, BlockHeight, ChainId, VotingPower, VotingPowerParseError,
    TOKEN_DECIMALS,
};
pub use quorum::{QuorumPolicy, QuorumPolicyError};
pub use signer_bitfield::SignerBitfield;
pub use signing::{
    checkpoint_message, kosk_message, SigningDomains, DOMAIN_CHECKPOINT_MANAGER,
    DOMAIN_COMMON_SIGNING, DOMAIN_HYDRACHAIN,
};
pub use validator_set::{ValidatorSet, ValidatorSetError, VALIDATORS_HASH_VERSION};
