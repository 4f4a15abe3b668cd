//! Quorum threshold policy.
//!
//! Hydragon finalizes with a 61.4%-plus-one super-majority of total voting
//! power, with two guards:
//!
//! - fewer than 4 present signers require the entire total voting power;
//! - a total voting power below 10 requires the entire total as well.

use crate::{BlockHeight, VotingPower};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Parameters of the quorum rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuorumPolicy {
    /// Below this many present signers, unanimity of total power is required.
    pub min_signers_for_supermajority: usize,

    /// Super-majority numerator.
    pub numerator: u64,

    /// Super-majority denominator.
    pub denominator: u64,

    /// Below this total voting power, the quorum is the total itself.
    pub min_total_voting_power: u64,
}

impl Default for QuorumPolicy {
    fn default() -> Self {
        Self {
            min_signers_for_supermajority: 4,
            numerator: 614,
            denominator: 1000,
            min_total_voting_power: 10,
        }
    }
}

impl QuorumPolicy {
    /// Check that the ratio is a proper fraction with a non-zero denominator.
    pub fn validate(&self) -> Result<(), QuorumPolicyError> {
        if self.denominator == 0 {
            return Err(QuorumPolicyError::ZeroDenominator);
        }
        if self.numerator > self.denominator {
            return Err(QuorumPolicyError::RatioAboveOne {
                numerator: self.numerator,
                denominator: self.denominator,
            });
        }
        Ok(())
    }

    /// Voting power required for quorum among at least
    /// `min_signers_for_supermajority` signers.
    ///
    /// `floor(total * numerator / denominator) + 1`, or `total` when the total
    /// is below `min_total_voting_power`.
    ///
    /// The policy does not currently vary with `_height`; the parameter is an
    /// extension point for height-activated threshold changes.
    pub fn required_quorum(&self, _height: BlockHeight, total: &VotingPower) -> VotingPower {
        if total.as_biguint() < &BigUint::from(self.min_total_voting_power) {
            return total.clone();
        }

        let scaled = total.as_biguint() * self.numerator / self.denominator;
        VotingPower::new(scaled + 1u32)
    }

    /// Threshold that applies given how many signers were actually present.
    pub fn quorum_size(
        &self,
        height: BlockHeight,
        total: &VotingPower,
        present_signers: usize,
    ) -> VotingPower {
        if present_signers < self.min_signers_for_supermajority {
            total.clone()
        } else {
            self.required_quorum(height, total)
        }
    }

    /// Whether `aggregated` power meets `required`.
    pub fn has_quorum(aggregated: &VotingPower, required: &VotingPower) -> bool {
        aggregated >= required
    }
}

/// Errors in a configured quorum policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuorumPolicyError {
    /// Denominator is zero.
    #[error("quorum denominator must be non-zero")]
    ZeroDenominator,

    /// Ratio exceeds one.
    #[error("quorum ratio {numerator}/{denominator} exceeds 1")]
    RatioAboveOne {
        /// Configured numerator.
        numerator: u64,
        /// Configured denominator.
        denominator: u64,
    },
}
