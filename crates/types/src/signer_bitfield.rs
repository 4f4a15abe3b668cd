//! Bitmap of which validators contributed to an aggregated signature.

use serde::{Deserialize, Serialize};

/// A compact bitfield indexed by position in the validator set.
///
/// Bit `i` lives in byte `i / 8` at bit `i % 8` (least significant first).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignerBitfield {
    bits: Vec<u8>,
}

impl SignerBitfield {
    /// Create an empty bitfield sized for `num_validators`.
    pub fn new(num_validators: usize) -> Self {
        Self {
            bits: vec![0u8; num_validators.div_ceil(8)],
        }
    }

    /// Wrap raw bitmap bytes received from a peer.
    pub fn from_bytes(bits: Vec<u8>) -> Self {
        Self { bits }
    }

    /// Raw bitmap bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Mark `index` as signed, growing the bitmap if needed.
    pub fn set(&mut self, index: usize) {
        let byte_idx = index / 8;
        if byte_idx >= self.bits.len() {
            self.bits.resize(byte_idx + 1, 0);
        }
        self.bits[byte_idx] |= 1 << (index % 8);
    }

    /// Check if a bit is set.
    pub fn is_set(&self, index: usize) -> bool {
        self.bits
            .get(index / 8)
            .is_some_and(|byte| (byte >> (index % 8)) & 1 == 1)
    }

    /// Count the number of set bits.
    pub fn count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Highest set index, if any.
    pub fn highest_set(&self) -> Option<usize> {
        self.bits
            .iter()
            .enumerate()
            .rev()
            .find(|(_, b)| **b != 0)
            .map(|(i, b)| i * 8 + (7 - b.leading_zeros() as usize))
    }

    /// Get iterator over indices of set bits.
    pub fn set_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.bits.len() * 8).filter(|&i| self.is_set(i))
    }

    /// Check if the bitfield is empty (no bits set).
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }
}
