//! Aggregated signature certificates.
//!
//! A certificate carries one BLS signature aggregated from every signer plus a
//! bitmap of which validators (by position in the set) contributed. Verifying
//! it against a `ValidatorSet` checks both the signature and the quorum.

use crate::{
    Address, BlockHeight, CryptoError, PublicKey, Signature, SignerBitfield, ValidatorSet,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Aggregated signature over one message with its signer bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedSignature {
    /// Aggregate of every signer's signature.
    pub signature: Signature,

    /// Which validators signed, indexed by position in the validator set.
    pub bitmap: SignerBitfield,
}

impl AggregatedSignature {
    /// Aggregate individual signatures into a certificate.
    ///
    /// Signatures are not verified here; `verify` does that against the
    /// aggregate. Every signer must be a member of `validator_set` and may
    /// vote only once.
    pub fn build(
        validator_set: &ValidatorSet,
        votes: &[(Address, Signature)],
    ) -> Result<Self, CertificateError> {
        if votes.is_empty() {
            return Err(CertificateError::NoSigners);
        }

        let mut bitmap = SignerBitfield::new(validator_set.len());
        for (address, _) in votes {
            let index = validator_set
                .index_of(address)
                .ok_or(CertificateError::UnknownSigner(*address))?;
            if bitmap.is_set(index) {
                return Err(CertificateError::DuplicateSigner(*address));
            }
            bitmap.set(index);
        }

        let signatures: Vec<Signature> = votes.iter().map(|(_, sig)| sig.clone()).collect();
        let signature = Signature::aggregate(&signatures)?;

        Ok(Self { signature, bitmap })
    }

    /// Addresses of the signers marked in the bitmap.
    ///
    /// Bits beyond the end of the set are skipped.
    pub fn signers(&self, validator_set: &ValidatorSet) -> BTreeSet<Address> {
        self.bitmap
            .set_indices()
            .filter_map(|index| validator_set.account_at(index))
            .map(|account| *account.address())
            .collect()
    }

    /// Verify the certificate for `message` under `domain_tag`.
    pub fn verify(
        &self,
        validator_set: &ValidatorSet,
        height: BlockHeight,
        message: &[u8],
        domain_tag: &[u8],
    ) -> Result<(), CertificateError> {
        if let Some(index) = self.bitmap.highest_set() {
            if index >= validator_set.len() {
                return Err(CertificateError::BitmapOutOfRange {
                    index,
                    validators: validator_set.len(),
                });
            }
        }

        let signers = self.signers(validator_set);
        if signers.is_empty() {
            return Err(CertificateError::NoSigners);
        }

        if !validator_set.has_quorum(height, &signers) {
            warn!(
                height = height.0,
                signers = signers.len(),
                "Certificate does not reach quorum"
            );
            return Err(CertificateError::QuorumNotReached);
        }

        let public_keys: Vec<PublicKey> = validator_set.public_keys_of(&signers);
        if !self
            .signature
            .verify_aggregate(&public_keys, message, domain_tag)
        {
            warn!(
                height = height.0,
                signers = signers.len(),
                "Certificate signature verification failed"
            );
            return Err(CertificateError::InvalidSignature);
        }

        debug!(
            height = height.0,
            signers = signers.len(),
            "Verified aggregated signature"
        );
        Ok(())
    }
}

/// Errors from building or verifying a certificate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CertificateError {
    /// Bitmap marks a position past the end of the validator set.
    #[error("signer bitmap index {index} out of range for {validators} validators")]
    BitmapOutOfRange {
        /// Highest marked position.
        index: usize,
        /// Size of the validator set.
        validators: usize,
    },

    /// No signer marked.
    #[error("certificate has no signers")]
    NoSigners,

    /// Signer is not a member of the validator set.
    #[error("signer {0} is not in the validator set")]
    UnknownSigner(Address),

    /// Same signer appears twice among the votes.
    #[error("signer {0} voted more than once")]
    DuplicateSigner(Address),

    /// Aggregate does not verify against the signers' keys.
    #[error("aggregated signature is invalid")]
    InvalidSignature,

    /// Signers do not hold enough voting power.
    #[error("signers do not reach quorum")]
    QuorumNotReached,

    /// Aggregation failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
