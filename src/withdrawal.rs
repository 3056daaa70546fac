//! Withdrawal context and Groth16 proof-input assembly.
//!
//! Given a spendable note and a withdrawal intent, this module derives every
//! field element the circuit consumes: the context hash binding the
//! withdrawal to its pool scope, the existing note's nullifier/secret pair,
//! the new change pair, the refund pair for cross-chain withdrawals, and
//! inclusion proofs in both the state tree and the approved-set tree.

use alloy::primitives::{Address, Bytes, U256};
use ark_bn254::Fr;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::crypto::encoding::encode_withdrawal_context;
use crate::crypto::field::{fr_from_keccak, fr_from_u256, fr_to_decimal};
use crate::derivation;
use crate::domain::keys::AccountKey;
use crate::domain::note::Note;
use crate::ports::prover::{ProverError, WithdrawalProof, WithdrawalProver};
use crate::tree::{InclusionProof, LeanImt};

/// The circuit's hard-wired Merkle depth. Sibling arrays are always padded
/// to this length; the actual tree depth travels separately so the circuit
/// knows how many levels to verify.
pub const MAX_TREE_DEPTH: usize = 32;

/// The on-chain withdrawal payload: who receives the funds and the opaque
/// relay data forwarded to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalData {
    pub recipient: Address,
    pub data: Bytes,
}

/// Hash of the ABI-encoded tuple `((recipient, data), scope)`, reduced into
/// the field. The scope binds the proof to one pool, preventing cross-pool
/// replay.
pub fn context_hash(withdrawal: &WithdrawalData, scope: U256) -> Fr {
    fr_from_keccak(&encode_withdrawal_context(
        withdrawal.recipient,
        &withdrawal.data,
        scope,
    ))
}

/// The refund branch of a cross-chain withdrawal. The refund note covers the
/// note's full spendable value so the user recovers everything if the
/// destination-chain fill fails; the circuit enforces the amount equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundDerivation {
    pub nullifier: Fr,
    pub secret: Fr,
    pub commitment: Fr,
}

/// Every field element of a withdrawal except the Merkle material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalContext {
    pub context: Fr,
    pub existing_commitment: Fr,
    pub existing_nullifier: Fr,
    pub existing_secret: Fr,
    pub new_nullifier: Fr,
    pub new_secret: Fr,
    pub refund: Option<RefundDerivation>,
}

#[derive(Debug, Error)]
pub enum WithdrawalError {
    /// The selected note is pending, drained, or already spent.
    #[error("note is not spendable")]
    NoteNotSpendable,

    /// Recoverable by refreshing the indexer data.
    #[error("commitment not present in the state tree")]
    CommitmentNotInStateTree,

    /// Recoverable by refreshing the indexer data.
    #[error("label not present in the approved-set tree")]
    LabelNotInApprovedTree,

    /// Fatal: the proving parameters and the verification key disagree.
    #[error("proof failed self-verification")]
    ProofVerificationFailed,

    #[error(transparent)]
    Prover(#[from] ProverError),
}

/// Derive the full withdrawal context for a note. The deposit derivation
/// branch is used at change index 0, the change branch above it; the new
/// note and the optional refund note both live at the next change index.
pub fn derive_withdrawal_context(
    key: &AccountKey,
    note: &Note,
    withdrawal: &WithdrawalData,
    scope: U256,
    cross_chain: bool,
) -> Result<WithdrawalContext, WithdrawalError> {
    if !note.is_spendable() {
        return Err(WithdrawalError::NoteNotSpendable);
    }
    let label = note.label.ok_or(WithdrawalError::NoteNotSpendable)?;
    let pool = note.pool_address;

    let existing = derivation::note_secrets(key, pool, note.deposit_index, note.change_index);
    let existing_commitment = derivation::commitment(note.amount, label, existing.precommitment());

    let next_index = note.next_change_index();
    let new_nullifier = derivation::change_nullifier(key, pool, note.deposit_index, next_index);
    let new_secret = derivation::change_secret(key, pool, note.deposit_index, next_index);

    let refund = cross_chain.then(|| {
        let nullifier = derivation::refund_nullifier(key, pool, note.deposit_index, next_index);
        let secret = derivation::refund_secret(key, pool, note.deposit_index, next_index);
        let commitment =
            derivation::commitment(note.amount, label, derivation::precommitment(nullifier, secret));
        RefundDerivation {
            nullifier,
            secret,
            commitment,
        }
    });

    Ok(WithdrawalContext {
        context: context_hash(withdrawal, scope),
        existing_commitment,
        existing_nullifier: existing.nullifier,
        existing_secret: existing.secret,
        new_nullifier,
        new_secret,
        refund,
    })
}

/// The named signals the Groth16 prover consumes verbatim: decimal strings
/// for field elements, small integers for indices and depths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalProverInput {
    #[serde(rename = "withdrawnValue")]
    pub withdrawn_value: String,
    #[serde(rename = "stateRoot")]
    pub state_root: String,
    #[serde(rename = "ASPRoot")]
    pub asp_root: String,
    #[serde(rename = "stateTreeDepth")]
    pub state_tree_depth: usize,
    #[serde(rename = "ASPTreeDepth")]
    pub asp_tree_depth: usize,
    pub context: String,
    pub label: String,
    #[serde(rename = "existingValue")]
    pub existing_value: String,
    #[serde(rename = "existingNullifier")]
    pub existing_nullifier: String,
    #[serde(rename = "existingSecret")]
    pub existing_secret: String,
    #[serde(rename = "newNullifier")]
    pub new_nullifier: String,
    #[serde(rename = "newSecret")]
    pub new_secret: String,
    #[serde(rename = "refundNullifier", skip_serializing_if = "Option::is_none")]
    pub refund_nullifier: Option<String>,
    #[serde(rename = "refundSecret", skip_serializing_if = "Option::is_none")]
    pub refund_secret: Option<String>,
    #[serde(rename = "stateSiblings")]
    pub state_siblings: Vec<String>,
    #[serde(rename = "ASPSiblings")]
    pub asp_siblings: Vec<String>,
    #[serde(rename = "stateIndex")]
    pub state_index: usize,
    #[serde(rename = "ASPIndex")]
    pub asp_index: usize,
}

/// Output of withdrawal preparation: the derived context plus the
/// fully-populated prover input.
#[derive(Debug, Clone)]
pub struct WithdrawalOutput {
    pub context: WithdrawalContext,
    pub prover_input: WithdrawalProverInput,
}

/// Prepare a same-chain withdrawal of `withdrawn_value` from `note`.
///
/// `state_leaves` and `asp_labels` are the pool's full commitment and
/// approved-label lists in insertion order, as supplied by the indexer.
pub fn prepare_withdrawal(
    key: &AccountKey,
    note: &Note,
    withdrawal: &WithdrawalData,
    scope: U256,
    withdrawn_value: U256,
    state_leaves: &[Fr],
    asp_labels: &[Fr],
) -> Result<WithdrawalOutput, WithdrawalError> {
    prepare(
        key,
        note,
        withdrawal,
        scope,
        withdrawn_value,
        state_leaves,
        asp_labels,
        false,
    )
}

/// Prepare a cross-chain withdrawal; additionally derives the refund note
/// redeemed if the destination-chain fill fails.
pub fn prepare_cross_chain_withdrawal(
    key: &AccountKey,
    note: &Note,
    withdrawal: &WithdrawalData,
    scope: U256,
    withdrawn_value: U256,
    state_leaves: &[Fr],
    asp_labels: &[Fr],
) -> Result<WithdrawalOutput, WithdrawalError> {
    prepare(
        key,
        note,
        withdrawal,
        scope,
        withdrawn_value,
        state_leaves,
        asp_labels,
        true,
    )
}

#[allow(clippy::too_many_arguments)]
fn prepare(
    key: &AccountKey,
    note: &Note,
    withdrawal: &WithdrawalData,
    scope: U256,
    withdrawn_value: U256,
    state_leaves: &[Fr],
    asp_labels: &[Fr],
    cross_chain: bool,
) -> Result<WithdrawalOutput, WithdrawalError> {
    let context = derive_withdrawal_context(key, note, withdrawal, scope, cross_chain)?;
    let label = note.label.ok_or(WithdrawalError::NoteNotSpendable)?;

    let state_tree = LeanImt::from_leaves(state_leaves);
    let asp_tree = LeanImt::from_leaves(asp_labels);

    let state_position = state_tree
        .index_of(&context.existing_commitment)
        .ok_or(WithdrawalError::CommitmentNotInStateTree)?;
    let asp_position = asp_tree
        .index_of(&fr_from_u256(label))
        .ok_or(WithdrawalError::LabelNotInApprovedTree)?;

    let state_proof = state_tree
        .proof(state_position)
        .expect("position comes from index_of");
    let asp_proof = asp_tree
        .proof(asp_position)
        .expect("position comes from index_of");

    let prover_input = WithdrawalProverInput {
        withdrawn_value: withdrawn_value.to_string(),
        state_root: fr_to_decimal(state_proof.root),
        asp_root: fr_to_decimal(asp_proof.root),
        state_tree_depth: state_tree.depth(),
        asp_tree_depth: asp_tree.depth(),
        context: fr_to_decimal(context.context),
        label: label.to_string(),
        existing_value: note.amount.to_string(),
        existing_nullifier: fr_to_decimal(context.existing_nullifier),
        existing_secret: fr_to_decimal(context.existing_secret),
        new_nullifier: fr_to_decimal(context.new_nullifier),
        new_secret: fr_to_decimal(context.new_secret),
        refund_nullifier: context.refund.as_ref().map(|r| fr_to_decimal(r.nullifier)),
        refund_secret: context.refund.as_ref().map(|r| fr_to_decimal(r.secret)),
        state_siblings: padded_siblings(&state_proof),
        asp_siblings: padded_siblings(&asp_proof),
        state_index: state_proof.index,
        asp_index: asp_proof.index,
    };

    info!(
        deposit_index = note.deposit_index,
        change_index = note.change_index,
        state_index = prover_input.state_index,
        asp_index = prover_input.asp_index,
        cross_chain,
        "withdrawal proof input assembled"
    );

    Ok(WithdrawalOutput {
        context,
        prover_input,
    })
}

/// Render a proof's siblings as decimal strings, zero-padded to the
/// circuit's fixed depth.
fn padded_siblings(proof: &InclusionProof) -> Vec<String> {
    let mut siblings: Vec<String> = proof.siblings.iter().map(|s| fr_to_decimal(*s)).collect();
    siblings.resize(MAX_TREE_DEPTH, "0".to_string());
    siblings
}

/// Generate a proof and self-verify it. The self-check catches parameter
/// drift between the circuit artifacts and the SDK; its failure is fatal and
/// never retried.
pub async fn prove_withdrawal<P: WithdrawalProver>(
    prover: &P,
    input: &WithdrawalProverInput,
) -> Result<WithdrawalProof, WithdrawalError> {
    let proof = prover.prove(input).await?;
    if !prover.verify(&proof).await? {
        return Err(WithdrawalError::ProofVerificationFailed);
    }
    Ok(proof)
}
