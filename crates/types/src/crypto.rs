//! BLS12-381 keys, signatures and aggregation.
//!
//! Uses the `min_pk` variant: public keys are G1 points (48 bytes
//! compressed) and signatures are G2 points (96 bytes compressed). Every
//! message is hashed to G2 under a caller-supplied domain separation tag, so
//! the same key can sign checkpoints and KOSK proofs without the two ever
//! being interchangeable.
//!
//! # Rogue keys
//!
//! Aggregate verification over a single message is only sound when every
//! participating public key has a proof that its holder knows the secret
//! scalar. Validators provide that proof as a KOSK signature, see
//! [`make_kosk_signature`] and [`verify_kosk_signature`].

use crate::signing::kosk_message;
use crate::{Address, ChainId};
use blst::min_pk;
use blst::BLST_ERROR;
use rand::RngCore;
use rayon::prelude::*;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash as StdHash, Hasher};
use zeroize::Zeroizing;

/// Secret scalar size in bytes.
pub const SECRET_KEY_BYTES: usize = 32;

/// Compressed G1 public key size in bytes.
pub const PUBLIC_KEY_BYTES: usize = 48;

/// Compressed G2 signature size in bytes.
pub const SIGNATURE_BYTES: usize = 96;

/// Errors raised by key and signature handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// Malformed or wrongly sized bytes.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Point is off the curve, outside the prime-order subgroup, or the identity.
    #[error("invalid curve point: {0}")]
    InvalidPoint(String),

    /// The OS random source failed.
    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    /// Empty list provided for aggregation.
    #[error("cannot aggregate empty list")]
    EmptyAggregate,
}

fn point_error(err: BLST_ERROR) -> CryptoError {
    match err {
        BLST_ERROR::BLST_POINT_NOT_ON_CURVE => {
            CryptoError::InvalidPoint("point is not on the curve".to_string())
        }
        BLST_ERROR::BLST_POINT_NOT_IN_GROUP => {
            CryptoError::InvalidPoint("point is not in the prime-order subgroup".to_string())
        }
        BLST_ERROR::BLST_PK_IS_INFINITY => {
            CryptoError::InvalidPoint("point is the identity".to_string())
        }
        other => CryptoError::InvalidEncoding(format!("{:?}", other)),
    }
}

fn check_len(bytes: &[u8], expected: usize, what: &str) -> Result<(), CryptoError> {
    if bytes.len() != expected {
        return Err(CryptoError::InvalidEncoding(format!(
            "{what}: expected {expected} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(())
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, CryptoError> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    hex::decode(hex).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))
}

// ═══════════════════════════════════════════════════════════════════════════
// Secret key
// ═══════════════════════════════════════════════════════════════════════════

/// BLS secret scalar.
///
/// Deliberately not `Clone`: the only way to read the scalar out is
/// [`SecretKey::export_bytes`], which the key storage flows use.
pub struct SecretKey(min_pk::SecretKey);

impl SecretKey {
    /// Generate a fresh key from 32 bytes of OS entropy.
    ///
    /// Derivation follows the IETF `KeyGen` procedure, which never yields the
    /// zero scalar.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut ikm = Zeroizing::new([0u8; 32]);
        rand::rngs::OsRng
            .try_fill_bytes(&mut ikm[..])
            .map_err(|e| CryptoError::EntropyUnavailable(e.to_string()))?;
        Self::derive(&ikm[..])
    }

    /// Derive a key from a fixed seed (for testing/simulation).
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CryptoError> {
        Self::derive(seed)
    }

    fn derive(ikm: &[u8]) -> Result<Self, CryptoError> {
        min_pk::SecretKey::key_gen(ikm, &[])
            .map(SecretKey)
            .map_err(|e| CryptoError::InvalidEncoding(format!("key derivation failed: {:?}", e)))
    }

    /// Decode a big-endian scalar. Zero and unreduced values are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        check_len(bytes, SECRET_KEY_BYTES, "secret key")?;
        min_pk::SecretKey::from_bytes(bytes)
            .map(SecretKey)
            .map_err(|_| {
                CryptoError::InvalidEncoding("secret scalar is zero or not reduced".to_string())
            })
    }

    /// Decode a hex-encoded scalar.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(decode_hex(hex)?);
        Self::from_bytes(&bytes)
    }

    /// Export the raw scalar for persistence. Wiped from memory on drop.
    pub fn export_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_BYTES]> {
        Zeroizing::new(self.0.to_bytes())
    }

    /// Derive the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_point(self.0.sk_to_pk())
    }

    /// Sign `message` hashed to G2 under `domain_tag`.
    pub fn sign(&self, message: &[u8], domain_tag: &[u8]) -> Signature {
        Signature::from_point(self.0.sign(message, domain_tag, &[]))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("public_key", &self.public_key())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Public key
// ═══════════════════════════════════════════════════════════════════════════

/// A subgroup-checked BLS public key (G1).
#[derive(Clone)]
pub struct PublicKey {
    point: min_pk::PublicKey,
    bytes: [u8; PUBLIC_KEY_BYTES],
}

impl PublicKey {
    fn from_point(point: min_pk::PublicKey) -> Self {
        let bytes = point.to_bytes();
        Self { point, bytes }
    }

    /// Decode a compressed public key, validating subgroup membership.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        check_len(bytes, PUBLIC_KEY_BYTES, "public key")?;
        min_pk::PublicKey::key_validate(bytes)
            .map(Self::from_point)
            .map_err(point_error)
    }

    /// Decode a hex-encoded compressed public key.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&decode_hex(hex)?)
    }

    /// Compressed encoding.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_BYTES] {
        self.bytes
    }

    /// Compressed encoding as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex of the compressed encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Verify `signature` over `message` under `domain_tag`.
    pub fn verify(&self, message: &[u8], domain_tag: &[u8], signature: &Signature) -> bool {
        signature
            .point
            .verify(true, message, domain_tag, &[], &self.point, true)
            == BLST_ERROR::BLST_SUCCESS
    }

    /// Sum public keys into one.
    pub fn aggregate(public_keys: &[PublicKey]) -> Result<PublicKey, CryptoError> {
        if public_keys.is_empty() {
            return Err(CryptoError::EmptyAggregate);
        }

        let refs: Vec<&min_pk::PublicKey> = public_keys.iter().map(|pk| &pk.point).collect();
        let agg = min_pk::AggregatePublicKey::aggregate(&refs, false).map_err(point_error)?;

        Ok(Self::from_point(agg.to_public_key()))
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for PublicKey {}

impl StdHash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "PublicKey({}..{})", &hex[..8], &hex[hex.len() - 8..])
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.bytes)
        }
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            PublicKey::from_hex(&s).map_err(de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            PublicKey::from_bytes(&bytes).map_err(de::Error::custom)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Signature
// ═══════════════════════════════════════════════════════════════════════════

/// A BLS signature (G2), individual or aggregated.
#[derive(Clone)]
pub struct Signature {
    point: min_pk::Signature,
    bytes: [u8; SIGNATURE_BYTES],
}

impl Signature {
    fn from_point(point: min_pk::Signature) -> Self {
        let bytes = point.to_bytes();
        Self { point, bytes }
    }

    /// Decode a compressed signature, validating subgroup membership.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        check_len(bytes, SIGNATURE_BYTES, "signature")?;
        min_pk::Signature::sig_validate(bytes, true)
            .map(Self::from_point)
            .map_err(point_error)
    }

    /// Decode a hex-encoded compressed signature.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&decode_hex(hex)?)
    }

    /// Compressed encoding.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_BYTES] {
        self.bytes
    }

    /// Compressed encoding as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex of the compressed encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Aggregate signatures by point addition.
    ///
    /// Order does not matter: the result is identical for any permutation.
    pub fn aggregate(signatures: &[Signature]) -> Result<Signature, CryptoError> {
        if signatures.is_empty() {
            return Err(CryptoError::EmptyAggregate);
        }

        let refs: Vec<&min_pk::Signature> = signatures.iter().map(|s| &s.point).collect();
        let agg = min_pk::AggregateSignature::aggregate(&refs, false).map_err(point_error)?;

        Ok(Self::from_point(agg.to_signature()))
    }

    /// Verify an aggregate of signatures that all cover the same `message`.
    ///
    /// Callers must only pass keys backed by a verified KOSK signature.
    pub fn verify_aggregate(
        &self,
        public_keys: &[PublicKey],
        message: &[u8],
        domain_tag: &[u8],
    ) -> bool {
        if public_keys.is_empty() {
            return false;
        }

        let refs: Vec<&min_pk::PublicKey> = public_keys.iter().map(|pk| &pk.point).collect();
        self.point
            .fast_aggregate_verify(true, message, domain_tag, &refs)
            == BLST_ERROR::BLST_SUCCESS
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Signature {}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", &self.to_hex()[..16])
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.bytes)
        }
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Signature::from_hex(&s).map_err(de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            Signature::from_bytes(&bytes).map_err(de::Error::custom)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Hash to curve
// ═══════════════════════════════════════════════════════════════════════════

/// A message hashed to G2, compressed.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MessagePoint([u8; SIGNATURE_BYTES]);

impl MessagePoint {
    /// Compressed encoding.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_BYTES] {
        &self.0
    }
}

impl fmt::Debug for MessagePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessagePoint({}..)", &hex::encode(self.0)[..16])
    }
}

/// Hash `message` to G2 with `domain_tag` as the DST.
///
/// This is the same map signing uses internally, so any verifier can
/// reproduce it from public data.
pub fn hash_message_to_point(message: &[u8], domain_tag: &[u8]) -> MessagePoint {
    let mut point = blst::blst_p2::default();
    let mut compressed = [0u8; SIGNATURE_BYTES];
    // SAFETY: every pointer refers to a live buffer of the advertised length,
    // and `compressed` is exactly one compressed G2 point wide.
    unsafe {
        blst::blst_hash_to_g2(
            &mut point,
            message.as_ptr(),
            message.len(),
            domain_tag.as_ptr(),
            domain_tag.len(),
            std::ptr::null(),
            0,
        );
        blst::blst_p2_compress(compressed.as_mut_ptr(), &point);
    }
    MessagePoint(compressed)
}

// ═══════════════════════════════════════════════════════════════════════════
// Key generation and KOSK
// ═══════════════════════════════════════════════════════════════════════════

/// Generate a random key pair.
pub fn generate_key() -> Result<(SecretKey, PublicKey), CryptoError> {
    let secret = SecretKey::generate()?;
    let public = secret.public_key();
    Ok((secret, public))
}

/// Generate `n` independent key pairs in parallel.
pub fn generate_many(n: usize) -> Result<Vec<(SecretKey, PublicKey)>, CryptoError> {
    (0..n).into_par_iter().map(|_| generate_key()).collect()
}

/// Produce the knowledge-of-secret-key proof binding `address` on `chain_id`
/// to the signer's public key.
pub fn make_kosk_signature(
    secret_key: &SecretKey,
    address: &Address,
    chain_id: ChainId,
    domain_tag: &[u8],
) -> Signature {
    secret_key.sign(&kosk_message(address, chain_id), domain_tag)
}

/// Check a KOSK signature produced by [`make_kosk_signature`].
pub fn verify_kosk_signature(
    public_key: &PublicKey,
    address: &Address,
    chain_id: ChainId,
    domain_tag: &[u8],
    signature: &Signature,
) -> bool {
    public_key.verify(&kosk_message(address, chain_id), domain_tag, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{DOMAIN_CHECKPOINT_MANAGER, DOMAIN_HYDRACHAIN};

    const MSG: &[u8] = b"block hash";

    #[test]
    fn test_bls_sign_verify() {
        let (sk, pk) = generate_key().unwrap();
        let signature = sk.sign(MSG, DOMAIN_CHECKPOINT_MANAGER);

        assert!(pk.verify(MSG, DOMAIN_CHECKPOINT_MANAGER, &signature));
        assert!(!pk.verify(b"wrong message", DOMAIN_CHECKPOINT_MANAGER, &signature));
    }

    #[test]
    fn test_domain_separation() {
        let (sk, pk) = generate_key().unwrap();
        let signature = sk.sign(MSG, DOMAIN_CHECKPOINT_MANAGER);

        assert!(!pk.verify(MSG, DOMAIN_HYDRACHAIN, &signature));
    }

    #[test]
    fn test_verify_fails_with_other_key() {
        let keys = generate_many(2).unwrap();
        let signature = keys[0].0.sign(MSG, DOMAIN_CHECKPOINT_MANAGER);

        assert!(!keys[1].1.verify(MSG, DOMAIN_CHECKPOINT_MANAGER, &signature));
    }

    #[test]
    fn test_generate_many_distinct() {
        let keys = generate_many(8).unwrap();
        assert_eq!(keys.len(), 8);

        let mut pks: Vec<_> = keys.iter().map(|(_, pk)| pk.clone()).collect();
        pks.sort();
        pks.dedup();
        assert_eq!(pks.len(), 8);
    }

    #[test]
    fn test_keypair_from_seed() {
        let seed = [42u8; 32];
        let sk1 = SecretKey::from_seed(&seed).unwrap();
        let sk2 = SecretKey::from_seed(&seed).unwrap();

        assert_eq!(sk1.public_key(), sk2.public_key());
        assert_eq!(
            sk1.sign(MSG, DOMAIN_HYDRACHAIN),
            sk2.sign(MSG, DOMAIN_HYDRACHAIN)
        );
    }

    #[test]
    fn test_secret_key_export_import() {
        let (sk, pk) = generate_key().unwrap();
        let exported = sk.export_bytes();
        let restored = SecretKey::from_bytes(&exported[..]).unwrap();
        assert_eq!(restored.public_key(), pk);

        let restored_hex = SecretKey::from_hex(&hex::encode(&exported[..])).unwrap();
        assert_eq!(restored_hex.public_key(), pk);
    }

    #[test]
    fn test_secret_key_rejects_zero_and_bad_length() {
        assert!(matches!(
            SecretKey::from_bytes(&[0u8; 32]),
            Err(CryptoError::InvalidEncoding(_))
        ));
        assert!(matches!(
            SecretKey::from_bytes(&[1u8; 31]),
            Err(CryptoError::InvalidEncoding(_))
        ));
        // Larger than the group order.
        assert!(matches!(
            SecretKey::from_bytes(&[0xffu8; 32]),
            Err(CryptoError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_public_key_roundtrip() {
        let (_, pk) = generate_key().unwrap();
        assert_eq!(PublicKey::from_bytes(&pk.to_bytes()).unwrap(), pk);
        assert_eq!(PublicKey::from_hex(&format!("0x{}", pk.to_hex())).unwrap(), pk);
    }

    #[test]
    fn test_public_key_rejects_undersized_buffer() {
        let (_, pk) = generate_key().unwrap();
        assert!(matches!(
            PublicKey::from_bytes(&pk.to_bytes()[..47]),
            Err(CryptoError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_public_key_rejects_identity() {
        // Compressed point at infinity: compression and infinity flags set.
        let mut identity = [0u8; PUBLIC_KEY_BYTES];
        identity[0] = 0xc0;
        assert!(matches!(
            PublicKey::from_bytes(&identity),
            Err(CryptoError::InvalidPoint(_))
        ));
    }

    #[test]
    fn test_public_key_rejects_garbage() {
        let garbage = [0x11u8; PUBLIC_KEY_BYTES];
        assert!(PublicKey::from_bytes(&garbage).is_err());
    }

    #[test]
    fn test_signature_roundtrip() {
        let (sk, _) = generate_key().unwrap();
        let signature = sk.sign(MSG, DOMAIN_HYDRACHAIN);

        assert_eq!(Signature::from_bytes(&signature.to_bytes()).unwrap(), signature);
        assert_eq!(Signature::from_hex(&signature.to_hex()).unwrap(), signature);
        assert!(matches!(
            Signature::from_bytes(&signature.to_bytes()[..95]),
            Err(CryptoError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_bls_aggregate_signatures() {
        let keys = generate_many(3).unwrap();
        let sigs: Vec<_> = keys
            .iter()
            .map(|(sk, _)| sk.sign(MSG, DOMAIN_CHECKPOINT_MANAGER))
            .collect();
        let pks: Vec<_> = keys.iter().map(|(_, pk)| pk.clone()).collect();

        let agg_sig = Signature::aggregate(&sigs).unwrap();
        assert!(agg_sig.verify_aggregate(&pks, MSG, DOMAIN_CHECKPOINT_MANAGER));

        let agg_pk = PublicKey::aggregate(&pks).unwrap();
        assert!(agg_pk.verify(MSG, DOMAIN_CHECKPOINT_MANAGER, &agg_sig));

        // Missing a signer's key.
        assert!(!agg_sig.verify_aggregate(&pks[..2], MSG, DOMAIN_CHECKPOINT_MANAGER));
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let keys = generate_many(3).unwrap();
        let sigs: Vec<_> = keys
            .iter()
            .map(|(sk, _)| sk.sign(MSG, DOMAIN_CHECKPOINT_MANAGER))
            .collect();
        let pks: Vec<_> = keys.iter().map(|(_, pk)| pk.clone()).collect();

        let permutations = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        let reference = Signature::aggregate(&sigs).unwrap();

        for perm in permutations {
            let shuffled: Vec<_> = perm.iter().map(|&i| sigs[i].clone()).collect();
            let agg = Signature::aggregate(&shuffled).unwrap();
            assert_eq!(agg, reference);
            assert!(agg.verify_aggregate(&pks, MSG, DOMAIN_CHECKPOINT_MANAGER));
        }
    }

    #[test]
    fn test_aggregate_empty_fails() {
        assert_eq!(Signature::aggregate(&[]), Err(CryptoError::EmptyAggregate));
        assert_eq!(PublicKey::aggregate(&[]), Err(CryptoError::EmptyAggregate));
    }

    #[test]
    fn test_verify_aggregate_empty_keys() {
        let (sk, _) = generate_key().unwrap();
        let sig = sk.sign(MSG, DOMAIN_HYDRACHAIN);
        assert!(!sig.verify_aggregate(&[], MSG, DOMAIN_HYDRACHAIN));
    }

    #[test]
    fn test_hash_to_point_deterministic() {
        let a = hash_message_to_point(MSG, DOMAIN_HYDRACHAIN);
        let b = hash_message_to_point(MSG, DOMAIN_HYDRACHAIN);
        assert_eq!(a, b);

        assert_ne!(a, hash_message_to_point(MSG, DOMAIN_CHECKPOINT_MANAGER));
        assert_ne!(a, hash_message_to_point(b"other", DOMAIN_HYDRACHAIN));
    }

    #[test]
    fn test_hash_to_point_is_valid_g2_point() {
        let point = hash_message_to_point(MSG, DOMAIN_HYDRACHAIN);
        // A hashed point is a valid (non-identity) subgroup element.
        assert!(Signature::from_bytes(point.as_bytes()).is_ok());
    }

    #[test]
    fn test_kosk_roundtrip() {
        let (sk, pk) = generate_key().unwrap();
        let address = Address([7u8; 20]);
        let chain_id = ChainId(8844);

        let sig = make_kosk_signature(&sk, &address, chain_id, DOMAIN_HYDRACHAIN);
        assert!(verify_kosk_signature(&pk, &address, chain_id, DOMAIN_HYDRACHAIN, &sig));
    }

    #[test]
    fn test_kosk_fails_on_any_changed_byte() {
        let (sk, pk) = generate_key().unwrap();
        let address = Address([7u8; 20]);
        let chain_id = ChainId(8844);
        let sig = make_kosk_signature(&sk, &address, chain_id, DOMAIN_HYDRACHAIN);

        for i in 0..Address::BYTES {
            let mut altered = address;
            altered.0[i] ^= 0x01;
            assert!(!verify_kosk_signature(&pk, &altered, chain_id, DOMAIN_HYDRACHAIN, &sig));
        }

        for bit in 0..64 {
            let altered = ChainId(chain_id.0 ^ (1u64 << bit));
            assert!(!verify_kosk_signature(&pk, &address, altered, DOMAIN_HYDRACHAIN, &sig));
        }

        assert!(!verify_kosk_signature(
            &pk,
            &address,
            chain_id,
            DOMAIN_CHECKPOINT_MANAGER,
            &sig
        ));
    }

    #[test]
    fn test_serde_hex() {
        let (sk, pk) = generate_key().unwrap();
        let sig = sk.sign(MSG, DOMAIN_HYDRACHAIN);

        let pk_json = serde_json::to_string(&pk).unwrap();
        assert_eq!(pk_json, format!("\"{}\"", pk.to_hex()));
        assert_eq!(serde_json::from_str::<PublicKey>(&pk_json).unwrap(), pk);

        let sig_json = serde_json::to_string(&sig).unwrap();
        assert_eq!(serde_json::from_str::<Signature>(&sig_json).unwrap(), sig);
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let (sk, _) = generate_key().unwrap();
        let secret_hex = hex::encode(&sk.export_bytes()[..]);
        let debug = format!("{:?}", sk);
        assert!(!debug.contains(&secret_hex));
        assert!(debug.contains("PublicKey"));
    }
}
