//! Consensus configuration loaded from TOML.
//!
//! ```toml
//! chain_id = 8844
//!
//! [quorum]
//! numerator = 614
//! denominator = 1000
//!
//! [[genesis_validators]]
//! address = "0x1111111111111111111111111111111111111111"
//! bls_public_key = "0x97f1d3a7..."
//! voting_power = "15000000000000000000000"
//! kosk_signature = "0xa5c3..."
//! ```
//!
//! `domains` and `quorum` fall back to the Hydragon defaults when omitted.

use hydragon_types::{
    verify_kosk_signature, Account, AccountError, Address, ChainId, PublicKey, QuorumPolicy,
    QuorumPolicyError, Signature, SigningDomains, ValidatorSet, ValidatorSetError, VotingPower,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// A validator present at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisValidator {
    /// Validator account address.
    pub address: Address,

    /// Compressed BLS public key.
    pub bls_public_key: PublicKey,

    /// Initial voting power, in base units.
    pub voting_power: VotingPower,

    /// KOSK proof for `(address, chain_id)`. Required to build the genesis set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kosk_signature: Option<Signature>,
}

/// Configuration for the validator-set layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Chain the node participates in. Bound into every KOSK proof.
    pub chain_id: ChainId,

    /// Signing domain tags.
    #[serde(default)]
    pub domains: SigningDomains,

    /// Quorum threshold rule.
    #[serde(default)]
    pub quorum: QuorumPolicy,

    /// Validator set of epoch 0.
    #[serde(default)]
    pub genesis_validators: Vec<GenesisValidator>,
}

impl ConsensusConfig {
    /// Config for `chain_id` with defaults and no genesis validators.
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            domains: SigningDomains::default(),
            quorum: QuorumPolicy::default(),
            genesis_validators: Vec::new(),
        }
    }

    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading consensus configuration");

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config = Self::from_toml_str(&content)?;

        info!(
            chain_id = config.chain_id.0,
            genesis_validators = config.genesis_validators.len(),
            "Consensus configuration loaded"
        );
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        debug!("Consensus configuration parsed, validating");
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check values are usable before anything is built from them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_id.0 == 0 {
            return Err(ConfigError::InvalidChainId);
        }

        self.quorum.validate()?;

        for (name, tag) in [
            ("kosk", &self.domains.kosk),
            ("checkpoint", &self.domains.checkpoint),
            ("common", &self.domains.common),
        ] {
            if tag.is_empty() {
                return Err(ConfigError::EmptyDomain(name));
            }
        }
        if self.domains.kosk == self.domains.checkpoint
            || self.domains.kosk == self.domains.common
            || self.domains.checkpoint == self.domains.common
        {
            return Err(ConfigError::DuplicateDomain);
        }

        Ok(())
    }

    /// Build the epoch-0 validator set.
    ///
    /// Every validator must carry a KOSK proof that verifies for this chain
    /// under the configured KOSK domain.
    pub fn genesis_validator_set(&self) -> Result<ValidatorSet, ConfigError> {
        let mut accounts = Vec::with_capacity(self.genesis_validators.len());

        for validator in &self.genesis_validators {
            let signature = validator
                .kosk_signature
                .as_ref()
                .ok_or(ConfigError::MissingKoskSignature(validator.address))?;
            if !verify_kosk_signature(
                &validator.bls_public_key,
                &validator.address,
                self.chain_id,
                self.domains.kosk(),
                signature,
            ) {
                return Err(ConfigError::InvalidKoskSignature(validator.address));
            }

            accounts.push(Account::new(
                validator.address,
                validator.bls_public_key.clone(),
                validator.voting_power.clone(),
            )?);
        }

        let validator_set = ValidatorSet::new(accounts, self.quorum.clone())?;
        debug!(
            validators = validator_set.len(),
            total_voting_power = %validator_set.total_voting_power(),
            "Built genesis validator set"
        );
        Ok(validator_set)
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to render TOML.
    #[error("failed to serialize TOML config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Chain id must be non-zero.
    #[error("chain_id must be non-zero")]
    InvalidChainId,

    /// Quorum rule is malformed.
    #[error("invalid quorum policy: {0}")]
    InvalidQuorum(#[from] QuorumPolicyError),

    /// A domain tag is empty.
    #[error("signing domain {0:?} must not be empty")]
    EmptyDomain(&'static str),

    /// Two domain tags are equal.
    #[error("signing domains must be distinct")]
    DuplicateDomain,

    /// A genesis validator has no KOSK proof.
    #[error("genesis validator {0} has no KOSK signature")]
    MissingKoskSignature(Address),

    /// A genesis KOSK proof does not verify.
    #[error("KOSK signature of genesis validator {0} does not verify")]
    InvalidKoskSignature(Address),

    /// A genesis validator entry is malformed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// The genesis validators do not form a valid set.
    #[error(transparent)]
    ValidatorSet(#[from] ValidatorSetError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydragon_test_helpers::{TestCommittee, TEST_CHAIN_ID};
    use hydragon_types::DOMAIN_HYDRACHAIN;
    use std::io::Write;
    use tracing_test::traced_test;

    fn genesis_toml(committee: &TestCommittee, with_kosk: bool) -> String {
        let mut out = format!("chain_id = {}\n", TEST_CHAIN_ID.0);
        for validator in &committee.validators {
            out.push_str("\n[[genesis_validators]]\n");
            out.push_str(&format!("address = \"{}\"\n", validator.address.to_hex()));
            out.push_str(&format!(
                "bls_public_key = \"{}\"\n",
                validator.public_key().to_hex()
            ));
            out.push_str(&format!("voting_power = \"{}\"\n", validator.voting_power));
            if with_kosk {
                out.push_str(&format!(
                    "kosk_signature = \"{}\"\n",
                    validator.kosk_signature(TEST_CHAIN_ID).to_hex()
                ));
            }
        }
        out
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = ConsensusConfig::from_toml_str("chain_id = 7").unwrap();

        assert_eq!(config.chain_id, ChainId(7));
        assert_eq!(config.quorum, QuorumPolicy::default());
        assert_eq!(config.domains, SigningDomains::default());
        assert!(config.genesis_validators.is_empty());
        assert!(config.genesis_validator_set().unwrap().is_empty());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config = ConsensusConfig::from_toml_str(
            r#"
            chain_id = 7

            [quorum]
            numerator = 2
            denominator = 3

            [domains]
            checkpoint = "CUSTOM_CHECKPOINT"
            "#,
        )
        .unwrap();

        assert_eq!(config.quorum.numerator, 2);
        assert_eq!(config.quorum.min_signers_for_supermajority, 4);
        assert_eq!(config.domains.checkpoint(), b"CUSTOM_CHECKPOINT");
        assert_eq!(config.domains.kosk(), DOMAIN_HYDRACHAIN);
    }

    #[test]
    fn test_genesis_set_with_kosk() {
        let committee = TestCommittee::new(5, VotingPower::from_tokens(15_000));
        let config = ConsensusConfig::from_toml_str(&genesis_toml(&committee, true)).unwrap();

        let set = config.genesis_validator_set().unwrap();
        assert_eq!(set, committee.validator_set());
        assert_eq!(set.total_voting_power(), &VotingPower::from_tokens(75_000));
    }

    #[test]
    fn test_genesis_validator_without_kosk_rejected() {
        let committee = TestCommittee::new(4, VotingPower::from(10));
        let mut config =
            ConsensusConfig::from_toml_str(&genesis_toml(&committee, true)).unwrap();
        config.genesis_validators[2].kosk_signature = None;

        assert!(matches!(
            config.genesis_validator_set(),
            Err(ConfigError::MissingKoskSignature(address)) if address == committee.address(2)
        ));

        // Parsing still accepts the entry; only building the set refuses it.
        let bare = ConsensusConfig::from_toml_str(&genesis_toml(&committee, false)).unwrap();
        assert!(bare.genesis_validators.iter().all(|v| v.kosk_signature.is_none()));
        assert!(matches!(
            bare.genesis_validator_set(),
            Err(ConfigError::MissingKoskSignature(_))
        ));
    }

    #[test]
    fn test_kosk_for_other_chain_rejected() {
        let committee = TestCommittee::new(4, VotingPower::from(10));
        let mut config =
            ConsensusConfig::from_toml_str(&genesis_toml(&committee, true)).unwrap();
        config.chain_id = ChainId(TEST_CHAIN_ID.0 + 1);

        assert!(matches!(
            config.genesis_validator_set(),
            Err(ConfigError::InvalidKoskSignature(address)) if address == committee.address(0)
        ));
    }

    #[test]
    fn test_kosk_swapped_between_validators_rejected() {
        let committee = TestCommittee::new(4, VotingPower::from(10));
        let mut config =
            ConsensusConfig::from_toml_str(&genesis_toml(&committee, true)).unwrap();
        let stolen = config.genesis_validators[1].kosk_signature.clone();
        config.genesis_validators[0].kosk_signature = stolen;

        assert!(matches!(
            config.genesis_validator_set(),
            Err(ConfigError::InvalidKoskSignature(_))
        ));
    }

    #[test]
    fn test_duplicate_genesis_validator_rejected() {
        let committee = TestCommittee::new(3, VotingPower::from(10));
        let mut config =
            ConsensusConfig::from_toml_str(&genesis_toml(&committee, true)).unwrap();
        let first = config.genesis_validators[0].clone();
        config.genesis_validators.push(first);

        assert!(matches!(
            config.genesis_validator_set(),
            Err(ConfigError::ValidatorSet(ValidatorSetError::DuplicateValidator(_)))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ConsensusConfig::from_toml_str("chain_id = 0"),
            Err(ConfigError::InvalidChainId)
        ));
        assert!(matches!(
            ConsensusConfig::from_toml_str("chain_id = 1\n[quorum]\ndenominator = 0"),
            Err(ConfigError::InvalidQuorum(_))
        ));
        assert!(matches!(
            ConsensusConfig::from_toml_str("chain_id = 1\n[domains]\nkosk = \"\""),
            Err(ConfigError::EmptyDomain("kosk"))
        ));
        assert!(matches!(
            ConsensusConfig::from_toml_str(
                "chain_id = 1\n[domains]\ncommon = \"DOMAIN_HYDRA_CHAIN\""
            ),
            Err(ConfigError::DuplicateDomain)
        ));
        assert!(matches!(
            ConsensusConfig::from_toml_str("chain_id = \"x\""),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_malformed_public_key_rejected() {
        let toml = r#"
            chain_id = 1

            [[genesis_validators]]
            address = "0x1111111111111111111111111111111111111111"
            bls_public_key = "0x1234"
            voting_power = 5
        "#;
        assert!(matches!(
            ConsensusConfig::from_toml_str(toml),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip() {
        let committee = TestCommittee::new(4, VotingPower::from_tokens(1));
        let config = ConsensusConfig::from_toml_str(&genesis_toml(&committee, true)).unwrap();

        let rendered = config.to_toml_string().unwrap();
        assert_eq!(ConsensusConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[traced_test]
    #[test]
    fn test_load_from_file() {
        let committee = TestCommittee::new(4, VotingPower::from(100));
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(genesis_toml(&committee, true).as_bytes())
            .unwrap();

        let config = ConsensusConfig::load(file.path()).unwrap();
        assert_eq!(config.genesis_validators.len(), 4);
        assert!(logs_contain("Consensus configuration loaded"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(
            ConsensusConfig::load(&path),
            Err(ConfigError::FileRead { .. })
        ));
    }
}
