//! Validator key initialization and loading flows.
//!
//! Every secret written by this module is stored hex-encoded. `init_*` flows
//! refuse to overwrite an existing secret. `load_*` flows return `None` when
//! the secret was never initialized and an error when it exists but cannot be
//! decoded; corrupt key material is never replaced with a default.

use crate::ecdsa::EcdsaKey;
use crate::network::NetworkKey;
use crate::store::{
    KeyStore, NETWORK_KEY, VALIDATOR_BLS_KEY, VALIDATOR_BLS_SIGNATURE, VALIDATOR_KEY,
};
use crate::KeyStoreError;
use hydragon_types::{
    make_kosk_signature, verify_kosk_signature, Account, AccountError, Address, ChainId,
    PublicKey, SecretKey, Signature, VotingPower,
};
use tracing::{debug, info};
use zeroize::Zeroizing;

fn ensure_absent(store: &dyn KeyStore, name: &str) -> Result<(), KeyStoreError> {
    if store.has_secret(name) {
        return Err(KeyStoreError::AlreadyInitialized(name.to_string()));
    }
    Ok(())
}

fn store_encoded(store: &dyn KeyStore, name: &str, raw: &[u8]) -> Result<(), KeyStoreError> {
    let encoded = Zeroizing::new(hex::encode(raw));
    store.set_secret(name, encoded.as_bytes())?;
    info!(secret = name, "Initialized secret");
    Ok(())
}

/// Decode hex text (optionally `0x`-prefixed, surrounding whitespace ignored).
fn decode_encoded(name: &str, encoded: &[u8]) -> Result<Zeroizing<Vec<u8>>, KeyStoreError> {
    let text = std::str::from_utf8(encoded).map_err(|e| KeyStoreError::invalid(name, e))?;
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(text)
        .map(Zeroizing::new)
        .map_err(|e| KeyStoreError::invalid(name, e))
}

/// Read and decode a secret, or `None` if it was never initialized.
fn read_decoded(
    store: &dyn KeyStore,
    name: &str,
) -> Result<Option<Zeroizing<Vec<u8>>>, KeyStoreError> {
    if !store.has_secret(name) {
        return Ok(None);
    }
    let encoded = Zeroizing::new(store.get_secret(name)?);
    decode_encoded(name, &encoded).map(Some)
}

/// Generate and store a new BLS validator key. Returns its public key.
pub fn init_bls_validator_key(store: &dyn KeyStore) -> Result<PublicKey, KeyStoreError> {
    ensure_absent(store, VALIDATOR_BLS_KEY)?;

    let secret_key = SecretKey::generate()?;
    store_encoded(store, VALIDATOR_BLS_KEY, secret_key.export_bytes().as_ref())?;

    Ok(secret_key.public_key())
}

/// Generate and store a new ECDSA validator key. Returns the validator address.
pub fn init_ecdsa_validator_key(store: &dyn KeyStore) -> Result<Address, KeyStoreError> {
    ensure_absent(store, VALIDATOR_KEY)?;

    let key = EcdsaKey::generate()?;
    store_encoded(store, VALIDATOR_KEY, key.export_bytes().as_ref())?;

    Ok(key.address())
}

/// Store a networking key, generating one unless `predefined` is given.
///
/// `predefined` is the encoded (hex) form, as it would be read back from the
/// store. An empty slice counts as absent.
pub fn init_networking_key(
    store: &dyn KeyStore,
    predefined: Option<&[u8]>,
) -> Result<NetworkKey, KeyStoreError> {
    ensure_absent(store, NETWORK_KEY)?;

    let key = match predefined.filter(|bytes| !bytes.is_empty()) {
        Some(encoded) => {
            let raw = decode_encoded(NETWORK_KEY, encoded)?;
            NetworkKey::from_bytes(&raw).map_err(|e| KeyStoreError::invalid(NETWORK_KEY, e))?
        }
        None => NetworkKey::generate()?,
    };
    store_encoded(store, NETWORK_KEY, key.export_bytes().as_ref())?;

    debug!(node_id = %key.node_id(), "Networking key ready");
    Ok(key)
}

/// Sign and store the KOSK proof binding `address` on `chain_id` to the
/// stored BLS key.
///
/// The BLS key must have been initialized first.
pub fn init_validator_bls_signature(
    store: &dyn KeyStore,
    address: &Address,
    chain_id: ChainId,
    domain_tag: &[u8],
) -> Result<Signature, KeyStoreError> {
    ensure_absent(store, VALIDATOR_BLS_SIGNATURE)?;

    let secret_key = load_bls_secret_key(store)?;
    let signature = make_kosk_signature(&secret_key, address, chain_id, domain_tag);
    store_encoded(store, VALIDATOR_BLS_SIGNATURE, signature.as_bytes())?;

    Ok(signature)
}

/// Load the BLS validator secret key.
pub fn load_bls_secret_key(store: &dyn KeyStore) -> Result<SecretKey, KeyStoreError> {
    let raw = read_decoded(store, VALIDATOR_BLS_KEY)?
        .ok_or_else(|| KeyStoreError::SecretNotFound(VALIDATOR_BLS_KEY.to_string()))?;
    SecretKey::from_bytes(&raw).map_err(|e| KeyStoreError::invalid(VALIDATOR_BLS_KEY, e))
}

/// Public key of the stored BLS validator key.
pub fn load_bls_public_key(store: &dyn KeyStore) -> Result<Option<PublicKey>, KeyStoreError> {
    if !store.has_secret(VALIDATOR_BLS_KEY) {
        return Ok(None);
    }
    load_bls_secret_key(store).map(|sk| Some(sk.public_key()))
}

/// Address of the stored ECDSA validator key.
pub fn load_validator_address(store: &dyn KeyStore) -> Result<Option<Address>, KeyStoreError> {
    let Some(raw) = read_decoded(store, VALIDATOR_KEY)? else {
        return Ok(None);
    };
    EcdsaKey::from_bytes(&raw)
        .map(|key| Some(key.address()))
        .map_err(|e| KeyStoreError::invalid(VALIDATOR_KEY, e))
}

/// Stored KOSK signature.
pub fn load_bls_signature(store: &dyn KeyStore) -> Result<Option<Signature>, KeyStoreError> {
    let Some(raw) = read_decoded(store, VALIDATOR_BLS_SIGNATURE)? else {
        return Ok(None);
    };
    Signature::from_bytes(&raw)
        .map(Some)
        .map_err(|e| KeyStoreError::invalid(VALIDATOR_BLS_SIGNATURE, e))
}

/// Stored networking key.
pub fn load_network_key(store: &dyn KeyStore) -> Result<Option<NetworkKey>, KeyStoreError> {
    let Some(raw) = read_decoded(store, NETWORK_KEY)? else {
        return Ok(None);
    };
    NetworkKey::from_bytes(&raw)
        .map(Some)
        .map_err(|e| KeyStoreError::invalid(NETWORK_KEY, e))
}

/// Raw stored value of any secret, exactly as the backend returns it.
pub fn load_encoded_secret(store: &dyn KeyStore, name: &str) -> Result<Vec<u8>, KeyStoreError> {
    if !store.has_secret(name) {
        return Err(KeyStoreError::SecretNotFound(name.to_string()));
    }
    store.get_secret(name)
}

/// Everything a validator publishes about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorIdentity {
    /// ECDSA account address.
    pub address: Address,

    /// BLS public key.
    pub bls_public_key: PublicKey,

    /// KOSK proof over `(address, chain_id)`.
    pub kosk_signature: Signature,
}

impl ValidatorIdentity {
    /// Account entry for this validator with the given voting power.
    pub fn to_account(&self, voting_power: VotingPower) -> Result<Account, AccountError> {
        Account::new(self.address, self.bls_public_key.clone(), voting_power)
    }
}

/// Load the validator's address, BLS key and KOSK proof, and check that the
/// proof verifies for `chain_id`.
///
/// Intended for node startup: any missing or inconsistent secret is an error.
pub fn load_validator_identity(
    store: &dyn KeyStore,
    chain_id: ChainId,
    domain_tag: &[u8],
) -> Result<ValidatorIdentity, KeyStoreError> {
    let address = load_validator_address(store)?
        .ok_or_else(|| KeyStoreError::SecretNotFound(VALIDATOR_KEY.to_string()))?;
    let bls_public_key = load_bls_public_key(store)?
        .ok_or_else(|| KeyStoreError::SecretNotFound(VALIDATOR_BLS_KEY.to_string()))?;
    let kosk_signature = load_bls_signature(store)?
        .ok_or_else(|| KeyStoreError::SecretNotFound(VALIDATOR_BLS_SIGNATURE.to_string()))?;

    if !verify_kosk_signature(&bls_public_key, &address, chain_id, domain_tag, &kosk_signature) {
        return Err(KeyStoreError::invalid(
            VALIDATOR_BLS_SIGNATURE,
            format!("KOSK proof does not verify for {address} on chain {chain_id}"),
        ));
    }

    info!(address = %address, chain_id = chain_id.0, "Loaded validator identity");
    Ok(ValidatorIdentity {
        address,
        bls_public_key,
        kosk_signature,
    })
}
