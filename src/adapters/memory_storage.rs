use std::collections::HashMap;

use alloy::primitives::Address;
use ark_bn254::Fr;
use tokio::sync::Mutex;

use crate::domain::note::NoteChain;
use crate::ports::storage::{NoteCheckpoint, NoteStorageProvider, StorageError};

/// In-memory implementation of `NoteStorageProvider` for tests and
/// short-lived sessions.
///
/// Holds one checkpoint per `(public_key, pool)` pair. Host applications
/// wanting durability implement the same port over an encrypted store; the
/// engine's checkpoint protocol is identical either way.
#[derive(Default)]
pub struct InMemoryNoteStorage {
    checkpoints: Mutex<HashMap<(Fr, Address), NoteCheckpoint>>,
}

impl InMemoryNoteStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoteStorageProvider for InMemoryNoteStorage {
    async fn cached_notes(
        &self,
        public_key: Fr,
        pool: Address,
    ) -> Result<Option<NoteCheckpoint>, StorageError> {
        let checkpoints = self.checkpoints.lock().await;
        Ok(checkpoints.get(&(public_key, pool)).cloned())
    }

    async fn store_discovered_notes(
        &self,
        public_key: Fr,
        pool: Address,
        chains: &[NoteChain],
        cursor: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut checkpoints = self.checkpoints.lock().await;
        let entry = checkpoints.entry((public_key, pool)).or_default();
        entry.chains = chains.to_vec();
        entry.cursor = cursor.map(str::to_string);
        Ok(())
    }

    async fn next_deposit_index(
        &self,
        public_key: Fr,
        pool: Address,
    ) -> Result<u64, StorageError> {
        let checkpoints = self.checkpoints.lock().await;
        Ok(checkpoints
            .get(&(public_key, pool))
            .and_then(|c| c.last_used_deposit_index)
            .map_or(0, |i| i + 1))
    }

    async fn update_last_used_deposit_index(
        &self,
        public_key: Fr,
        pool: Address,
        deposit_index: u64,
    ) -> Result<(), StorageError> {
        let mut checkpoints = self.checkpoints.lock().await;
        let entry = checkpoints.entry((public_key, pool)).or_default();
        // Forward-only growth.
        entry.last_used_deposit_index = Some(
            entry
                .last_used_deposit_index
                .map_or(deposit_index, |i| i.max(deposit_index)),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_checkpoint_is_none() {
        let storage = InMemoryNoteStorage::new();
        let cached = storage
            .cached_notes(Fr::from(1u64), Address::ZERO)
            .await
            .unwrap();
        assert!(cached.is_none());
        assert_eq!(
            storage
                .next_deposit_index(Fr::from(1u64), Address::ZERO)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_store_and_reload() {
        let storage = InMemoryNoteStorage::new();
        let pk = Fr::from(1u64);

        storage
            .store_discovered_notes(pk, Address::ZERO, &[], Some("cursor-3"))
            .await
            .unwrap();
        storage
            .update_last_used_deposit_index(pk, Address::ZERO, 2)
            .await
            .unwrap();

        let checkpoint = storage.cached_notes(pk, Address::ZERO).await.unwrap().unwrap();
        assert_eq!(checkpoint.cursor.as_deref(), Some("cursor-3"));
        assert_eq!(checkpoint.last_used_deposit_index, Some(2));
        assert_eq!(storage.next_deposit_index(pk, Address::ZERO).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_deposit_index_is_forward_only() {
        let storage = InMemoryNoteStorage::new();
        let pk = Fr::from(1u64);

        storage
            .update_last_used_deposit_index(pk, Address::ZERO, 5)
            .await
            .unwrap();
        storage
            .update_last_used_deposit_index(pk, Address::ZERO, 3)
            .await
            .unwrap();

        assert_eq!(storage.next_deposit_index(pk, Address::ZERO).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_pairs_are_isolated() {
        let storage = InMemoryNoteStorage::new();

        storage
            .update_last_used_deposit_index(Fr::from(1u64), Address::ZERO, 4)
            .await
            .unwrap();

        assert_eq!(
            storage
                .next_deposit_index(Fr::from(2u64), Address::ZERO)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            storage
                .next_deposit_index(Fr::from(1u64), Address::repeat_byte(1))
                .await
                .unwrap(),
            0
        );
    }
}
