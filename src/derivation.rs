//! Deterministic note derivation.
//!
//! Every note of an account is addressed by a typed coordinate
//! `(pool, deposit_index, change_index, role)`; the account key plus that
//! coordinate yields the note's nullifier and secret through a keyed
//! Poseidon PRF. Domain tags keep the deposit, change, and refund roles
//! disjoint. The whole construction is a wire contract with the deployed
//! pool: the tag appears both inside the packed context preimage and again
//! as the second PRF input, and both inclusions must stay exactly as they
//! are for existing commitments to remain spendable.

use alloy::primitives::{keccak256, Address, B256, U256};
use ark_bn254::Fr;

use crate::crypto::encoding::encode_note_context;
use crate::crypto::field::{fr_from_keccak, fr_from_u256, fr_to_b256};
use crate::crypto::poseidon::{poseidon1, poseidon2, poseidon3};
use crate::domain::keys::AccountKey;

/// Derivation roles, one per `shinobi.cash:<Role>V1` tag string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainTag {
    DepositNullifier,
    DepositSecret,
    ChangeNullifier,
    ChangeSecret,
    RefundNullifier,
    RefundSecret,
}

impl DomainTag {
    const fn label(self) -> &'static str {
        match self {
            DomainTag::DepositNullifier => "DepositNullifierV1",
            DomainTag::DepositSecret => "DepositSecretV1",
            DomainTag::ChangeNullifier => "ChangeNullifierV1",
            DomainTag::ChangeSecret => "ChangeSecretV1",
            DomainTag::RefundNullifier => "RefundNullifierV1",
            DomainTag::RefundSecret => "RefundSecretV1",
        }
    }

    /// `keccak256("shinobi.cash:" ++ label)`, packed into the context preimage.
    pub fn bytes(self) -> B256 {
        keccak256(format!("shinobi.cash:{}", self.label()))
    }

    /// The tag's field reduction, the second input of the keyed PRF.
    pub fn field(self) -> Fr {
        fr_from_keccak(self.bytes().as_slice())
    }
}

/// The keyed PRF behind every derivation:
/// `poseidon2(key, poseidon2(ctx, dom))` where `ctx` hashes the packed
/// note coordinate together with the role tag.
fn derive(key: &AccountKey, pool: Address, deposit_index: u64, change_index: u64, tag: DomainTag) -> Fr {
    let ctx = fr_from_keccak(&encode_note_context(
        pool,
        deposit_index,
        change_index,
        tag.bytes(),
    ));
    poseidon2(key.as_field(), poseidon2(ctx, tag.field()))
}

pub fn deposit_nullifier(key: &AccountKey, pool: Address, deposit_index: u64) -> Fr {
    derive(key, pool, deposit_index, 0, DomainTag::DepositNullifier)
}

pub fn deposit_secret(key: &AccountKey, pool: Address, deposit_index: u64) -> Fr {
    derive(key, pool, deposit_index, 0, DomainTag::DepositSecret)
}

pub fn change_nullifier(
    key: &AccountKey,
    pool: Address,
    deposit_index: u64,
    change_index: u64,
) -> Fr {
    assert!(change_index >= 1, "change notes start at index 1");
    derive(key, pool, deposit_index, change_index, DomainTag::ChangeNullifier)
}

pub fn change_secret(
    key: &AccountKey,
    pool: Address,
    deposit_index: u64,
    change_index: u64,
) -> Fr {
    assert!(change_index >= 1, "change notes start at index 1");
    derive(key, pool, deposit_index, change_index, DomainTag::ChangeSecret)
}

/// Refund notes share the coordinate of the change note they shadow.
pub fn refund_nullifier(
    key: &AccountKey,
    pool: Address,
    deposit_index: u64,
    change_index: u64,
) -> Fr {
    assert!(change_index >= 1, "refund notes start at index 1");
    derive(key, pool, deposit_index, change_index, DomainTag::RefundNullifier)
}

pub fn refund_secret(
    key: &AccountKey,
    pool: Address,
    deposit_index: u64,
    change_index: u64,
) -> Fr {
    assert!(change_index >= 1, "refund notes start at index 1");
    derive(key, pool, deposit_index, change_index, DomainTag::RefundSecret)
}

/// The nullifier/secret pair behind one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSecrets {
    pub nullifier: Fr,
    pub secret: Fr,
}

impl NoteSecrets {
    pub fn precommitment(&self) -> Fr {
        precommitment(self.nullifier, self.secret)
    }
}

/// Derive the secrets for the note at `(pool, deposit_index, change_index)`:
/// the deposit branch at change index 0, the change branch above it.
pub fn note_secrets(
    key: &AccountKey,
    pool: Address,
    deposit_index: u64,
    change_index: u64,
) -> NoteSecrets {
    if change_index == 0 {
        NoteSecrets {
            nullifier: deposit_nullifier(key, pool, deposit_index),
            secret: deposit_secret(key, pool, deposit_index),
        }
    } else {
        NoteSecrets {
            nullifier: change_nullifier(key, pool, deposit_index, change_index),
            secret: change_secret(key, pool, deposit_index, change_index),
        }
    }
}

/// `poseidon2(nullifier, secret)` - what a depositor reveals on-chain.
pub fn precommitment(nullifier: Fr, secret: Fr) -> Fr {
    poseidon2(nullifier, secret)
}

/// `poseidon3(amount, label, precommitment)` - the full note identity the
/// contract inserts into the state tree at activation.
pub fn commitment(amount: U256, label: U256, precommitment: Fr) -> Fr {
    poseidon3(fr_from_u256(amount), fr_from_u256(label), precommitment)
}

/// `poseidon1(nullifier)` - published on spend, prevents double-spends.
pub fn nullifier_hash(nullifier: Fr) -> Fr {
    poseidon1(nullifier)
}

/// Everything a user needs to submit a deposit transaction.
#[derive(Debug, Clone)]
pub struct DepositCommitmentResult {
    /// `0x`-prefixed hex of `poseidon2(nullifier, secret)`.
    pub precommitment: String,
    pub deposit_index: u64,
    pub pool_address: Address,
    pub nullifier: Fr,
    pub secret: Fr,
}

/// Derive the precommitment a user submits when depositing at
/// `deposit_index`, together with the secrets behind it.
pub fn deposit_commitment(
    key: &AccountKey,
    pool: Address,
    deposit_index: u64,
) -> DepositCommitmentResult {
    let nullifier = deposit_nullifier(key, pool, deposit_index);
    let secret = deposit_secret(key, pool, deposit_index);
    let pre = precommitment(nullifier, secret);

    DepositCommitmentResult {
        precommitment: fr_to_b256(pre).to_string(),
        deposit_index,
        pool_address: pool,
        nullifier,
        secret,
    }
}
