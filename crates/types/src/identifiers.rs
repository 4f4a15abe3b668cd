//! Domain-specific identifier types.

use num_bigint::BigUint;
use num_traits::Zero;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Validator address (20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Size of an address in bytes.
    pub const BYTES: usize = 20;

    /// The all-zero address.
    pub const ZERO: Self = Address([0u8; 20]);

    /// Create an address from a byte slice of exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; 20] = bytes.try_into().map_err(|_| AddressError::InvalidLength {
            expected: Self::BYTES,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Parse an address from hex, with or without a `0x` prefix.
    pub fn from_hex(hex: &str) -> Result<Self, AddressError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        if hex.len() != Self::BYTES * 2 {
            return Err(AddressError::InvalidLength {
                expected: Self::BYTES,
                actual: hex.len() / 2,
            });
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex, &mut bytes).map_err(|_| AddressError::InvalidHex)?;
        Ok(Self(bytes))
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Get the bytes as a slice.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = hex::encode(self.0);
        write!(f, "Address(0x{}..{})", &hex[..6], &hex[34..])
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(de::Error::custom)
    }
}

/// Errors that can occur when parsing an address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// Wrong number of bytes.
    #[error("Invalid address length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Invalid hex characters.
    #[error("Invalid address hex")]
    InvalidHex,
}

/// Block height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    /// Genesis block height.
    pub const GENESIS: Self = BlockHeight(0);

    /// Get the next block height.
    pub fn next(self) -> Self {
        BlockHeight(self.0 + 1)
    }

    /// Get the previous block height (returns None if at genesis).
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(BlockHeight)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.0)
    }
}

/// Chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Encode as a big-endian 256-bit integer.
    pub fn to_be_bytes32(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[24..].copy_from_slice(&self.0.to_be_bytes());
        out
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chain({})", self.0)
    }
}

/// Number of decimal places in one token of stake.
pub const TOKEN_DECIMALS: u32 = 18;

/// Voting power (stake weight).
///
/// Token-denominated with 18 decimals, so values routinely exceed `u64`.
/// Backed by an arbitrary-precision unsigned integer; never truncated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VotingPower(BigUint);

impl VotingPower {
    /// Zero voting power.
    pub fn zero() -> Self {
        VotingPower(BigUint::zero())
    }

    /// Create from any value convertible into a big unsigned integer.
    pub fn new(power: impl Into<BigUint>) -> Self {
        VotingPower(power.into())
    }

    /// Create from a whole number of tokens (`tokens * 10^18`).
    pub fn from_tokens(tokens: u64) -> Self {
        VotingPower(BigUint::from(tokens) * BigUint::from(10u32).pow(TOKEN_DECIMALS))
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Number of significant bits.
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// Borrow the underlying integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Consume into the underlying integer.
    pub fn into_inner(self) -> BigUint {
        self.0
    }

    /// Encode as a big-endian 256-bit integer.
    ///
    /// Returns `None` if the value does not fit in 256 bits.
    pub fn to_be_bytes32(&self) -> Option<[u8; 32]> {
        if self.0.bits() > 256 {
            return None;
        }
        let bytes = self.0.to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        Some(out)
    }
}

impl From<u64> for VotingPower {
    fn from(value: u64) -> Self {
        VotingPower(BigUint::from(value))
    }
}

impl From<BigUint> for VotingPower {
    fn from(value: BigUint) -> Self {
        VotingPower(value)
    }
}

impl Add for VotingPower {
    type Output = VotingPower;

    fn add(self, rhs: VotingPower) -> VotingPower {
        VotingPower(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a VotingPower> for VotingPower {
    type Output = VotingPower;

    fn add(self, rhs: &'a VotingPower) -> VotingPower {
        VotingPower(self.0 + &rhs.0)
    }
}

impl<'a> AddAssign<&'a VotingPower> for VotingPower {
    fn add_assign(&mut self, rhs: &'a VotingPower) {
        self.0 += &rhs.0;
    }
}

impl<'a> Sum<&'a VotingPower> for VotingPower {
    fn sum<I: Iterator<Item = &'a VotingPower>>(iter: I) -> Self {
        iter.fold(VotingPower::zero(), |acc, p| acc + p)
    }
}

impl fmt::Display for VotingPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VotingPower {
    type Err = VotingPowerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().replace('_', "");
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VotingPowerParseError(s.to_string()));
        }
        BigUint::parse_bytes(trimmed.as_bytes(), 10)
            .map(VotingPower)
            .ok_or_else(|| VotingPowerParseError(s.to_string()))
    }
}

/// A voting power string was not a non-negative decimal integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid voting power: {0:?}")]
pub struct VotingPowerParseError(pub String);

// Decimal string so values above 2^64 survive JSON/TOML.
impl Serialize for VotingPower {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for VotingPower {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VotingPowerVisitor;

        impl Visitor<'_> for VotingPowerVisitor {
            type Value = VotingPower;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<VotingPower, E> {
                Ok(VotingPower::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<VotingPower, E> {
                u64::try_from(v)
                    .map(VotingPower::from)
                    .map_err(|_| E::custom("voting power cannot be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<VotingPower, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(VotingPowerVisitor)
    }
}
