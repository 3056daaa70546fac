use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Which derivation branch produced a note.
///
/// Refund notes are derived only at withdrawal time and never appear in a
/// discovered chain, so they have no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// The original deposit of a chain, always at change index 0.
    Deposit,
    /// A residual note created by a partial withdrawal.
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    Unspent,
    Spent,
}

/// One record in a note chain.
///
/// A note is addressed by `(pool_address, deposit_index, change_index)`; the
/// nullifier and secret behind it are re-derivable from the account key, so
/// the note itself stores only public chain state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub pool_address: Address,
    pub deposit_index: u64,
    pub change_index: u64,
    pub kind: NoteKind,
    /// Spendable value in base units. Zero while a deposit is pending.
    pub amount: U256,
    /// The label the contract assigned at activation. `None` while pending.
    pub label: Option<U256>,
    pub status: NoteStatus,
    pub origin_tx_hash: String,
    pub destination_tx_hash: Option<String>,
    pub origin_chain_id: u64,
    pub destination_chain_id: Option<u64>,
    pub block_number: u64,
    pub timestamp: u64,
    /// Refund commitment published by a cross-chain withdrawal, as the
    /// indexer's decimal string.
    pub refund_commitment: Option<String>,
}

impl Note {
    /// A deposit becomes activated once the contract assigns its label.
    pub fn is_activated(&self) -> bool {
        self.label.is_some()
    }

    /// A note can be selected for withdrawal only when it is the unspent,
    /// activated tail of its chain with positive value.
    pub fn is_spendable(&self) -> bool {
        self.status == NoteStatus::Unspent && self.is_activated() && self.amount > U256::ZERO
    }

    pub fn next_change_index(&self) -> u64 {
        self.change_index + 1
    }
}

/// An ordered run of notes sharing `(pool_address, deposit_index)`, with
/// change indices `0, 1, 2, …` contiguous. Only the last note may be unspent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteChain {
    pub notes: Vec<Note>,
}

impl NoteChain {
    pub fn new(deposit: Note) -> Self {
        Self {
            notes: vec![deposit],
        }
    }

    /// The deposit note that started the chain.
    pub fn head(&self) -> Option<&Note> {
        self.notes.first()
    }

    /// The newest note of the chain, the only spend candidate.
    pub fn tail(&self) -> Option<&Note> {
        self.notes.last()
    }

    pub fn tail_mut(&mut self) -> Option<&mut Note> {
        self.notes.last_mut()
    }

    pub fn deposit_index(&self) -> Option<u64> {
        self.head().map(|n| n.deposit_index)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
