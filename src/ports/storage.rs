use std::future::Future;

use alloy::primitives::Address;
use ark_bn254::Fr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::note::NoteChain;

/// Durable discovery state for one `(public_key, pool)` pair.
///
/// Written after every fully-processed activity page, so a crash loses at
/// most the in-memory work on the page being processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteCheckpoint {
    pub chains: Vec<NoteChain>,
    /// Highest deposit index known to belong to this account.
    pub last_used_deposit_index: Option<u64>,
    /// Pagination cursor of the last fully-processed page.
    pub cursor: Option<String>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Port for checkpoint persistence.
///
/// All operations are idempotent under the same inputs; the caller is the
/// single writer per `(public_key, pool)` pair, so no ordering is required
/// beyond its own sequence. Deposit-index state grows forward only.
///
/// Implementations:
/// - `InMemoryNoteStorage` (for tests and short-lived sessions)
/// - an encrypted at-rest store in the host application
pub trait NoteStorageProvider: Send + Sync {
    /// The stored checkpoint, or `None` when the pair has never been
    /// scanned. Absence is equivalent to an empty checkpoint.
    fn cached_notes(
        &self,
        public_key: Fr,
        pool: Address,
    ) -> impl Future<Output = Result<Option<NoteCheckpoint>, StorageError>> + Send;

    /// Write-through replacement of the stored chains and cursor.
    fn store_discovered_notes(
        &self,
        public_key: Fr,
        pool: Address,
        chains: &[NoteChain],
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// The next deposit index to probe: one past the last used index, or 0.
    fn next_deposit_index(
        &self,
        public_key: Fr,
        pool: Address,
    ) -> impl Future<Output = Result<u64, StorageError>> + Send;

    /// Record a newly-used deposit index. Values below the stored maximum
    /// are ignored.
    fn update_last_used_deposit_index(
        &self,
        public_key: Fr,
        pool: Address,
        deposit_index: u64,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}
