//! Deterministic fixtures for tests.
//!
//! Validator `i` always gets the same BLS key and address, so committees of
//! different sizes share their first members. Everything is properly signed:
//! KOSK proofs and certificates built here verify for real.

use hydragon_types::{
    make_kosk_signature, Account, Address, AggregatedSignature, ChainId, Hash, PublicKey,
    SecretKey, Signature, ValidatorSet, VotingPower, DOMAIN_HYDRACHAIN,
};

/// Chain id used by fixtures.
pub const TEST_CHAIN_ID: ChainId = ChainId(8844);

/// One validator with its secret key.
pub struct TestValidator {
    pub index: usize,
    pub secret_key: SecretKey,
    pub address: Address,
    pub voting_power: VotingPower,
}

impl TestValidator {
    /// Validator number `index` with `voting_power`.
    pub fn new(index: usize, voting_power: VotingPower) -> Self {
        let index_bytes = (index as u64).to_be_bytes();
        let seed = Hash::from_parts(&[
            b"hydragon-test-validator-key".as_slice(),
            index_bytes.as_slice(),
        ]);
        let address_digest = Hash::from_parts(&[
            b"hydragon-test-validator-address".as_slice(),
            index_bytes.as_slice(),
        ]);

        let secret_key = SecretKey::from_seed(seed.as_bytes()).expect("seeded key generation");
        let mut address = [0u8; 20];
        address.copy_from_slice(&address_digest.as_bytes()[12..]);

        Self {
            index,
            secret_key,
            address: Address(address),
            voting_power,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret_key.public_key()
    }

    pub fn account(&self) -> Account {
        Account::new(self.address, self.public_key(), self.voting_power.clone())
            .expect("fixture voting power fits in 256 bits")
    }

    /// KOSK proof under the default domain tag.
    pub fn kosk_signature(&self, chain_id: ChainId) -> Signature {
        make_kosk_signature(&self.secret_key, &self.address, chain_id, DOMAIN_HYDRACHAIN)
    }

    pub fn sign(&self, message: &[u8], domain_tag: &[u8]) -> Signature {
        self.secret_key.sign(message, domain_tag)
    }
}

/// A set of test validators, in index order.
pub struct TestCommittee {
    pub validators: Vec<TestValidator>,
}

impl TestCommittee {
    /// `n` validators with equal power.
    pub fn new(n: usize, voting_power: VotingPower) -> Self {
        Self::with_powers(&vec![voting_power; n])
    }

    /// One validator per entry of `powers`.
    pub fn with_powers(powers: &[VotingPower]) -> Self {
        Self {
            validators: powers
                .iter()
                .enumerate()
                .map(|(i, power)| TestValidator::new(i, power.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn address(&self, index: usize) -> Address {
        self.validators[index].address
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.validators.iter().map(TestValidator::account).collect()
    }

    /// Validator set under the default quorum policy.
    pub fn validator_set(&self) -> ValidatorSet {
        ValidatorSet::with_default_policy(self.accounts()).expect("fixture addresses are unique")
    }

    /// Signatures over `message` from the validators at `signers`.
    pub fn votes(
        &self,
        signers: &[usize],
        message: &[u8],
        domain_tag: &[u8],
    ) -> Vec<(Address, Signature)> {
        signers
            .iter()
            .map(|&i| {
                let validator = &self.validators[i];
                (validator.address, validator.sign(message, domain_tag))
            })
            .collect()
    }

    /// Certificate over `message` signed by the validators at `signers`.
    pub fn certificate(
        &self,
        signers: &[usize],
        message: &[u8],
        domain_tag: &[u8],
    ) -> AggregatedSignature {
        let votes = self.votes(signers, message, domain_tag);
        AggregatedSignature::build(&self.validator_set(), &votes)
            .expect("fixture signers are members")
    }
}
