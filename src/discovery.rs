//! Resumable note discovery.
//!
//! The engine reconstructs every note chain of a `(key, pool)` pair from the
//! indexer's forward-only activity stream. Each page is processed in a
//! strict order: extend the chains that are still spendable, then probe for
//! new deposits by precommitment, then checkpoint. Because the checkpoint is
//! written after every fully-processed page, a crash or cancellation loses
//! at most the in-memory work on the current page, and a later run resumes
//! from the stored cursor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use thiserror::Error;
use tracing::{debug, info};

use crate::crypto::field::fr_to_decimal;
use crate::derivation;
use crate::domain::activity::Activity;
use crate::domain::keys::AccountKey;
use crate::domain::note::{Note, NoteChain, NoteKind, NoteStatus};
use crate::ports::fetcher::{ActivityFetcher, FetcherError, Order};
use crate::ports::storage::{NoteStorageProvider, StorageError};

/// Cooperative cancellation handle, polled at every suspension point and at
/// the top of the inner deposit-scan loop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Snapshot handed to the progress observer after every processed page and
/// once more on completion.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryProgress {
    pub pages_processed: u32,
    pub current_page_activity_count: usize,
    pub deposits_checked: u64,
    pub deposits_matched: u64,
    pub last_cursor: Option<String>,
    pub complete: bool,
}

/// Observer for discovery progress. Callbacks must return quickly; the
/// engine is suspended while one runs.
pub type ProgressObserver<'a> = &'a (dyn Fn(&DiscoveryProgress) + Send + Sync);

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Cancelled via the caller's token. The last checkpoint remains valid
    /// and a later run resumes from it.
    #[error("discovery cancelled")]
    Cancelled,

    #[error("activity fetch failed on page {page}: {source}")]
    Fetcher {
        page: u32,
        #[source]
        source: FetcherError,
    },

    #[error("checkpoint write failed on page {page}: {source}")]
    Storage {
        page: u32,
        #[source]
        source: StorageError,
    },
}

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Activities requested per page.
    pub page_size: usize,
    /// Optional hard cap on pages per run.
    pub max_pages: Option<u32>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    pub chains: Vec<NoteChain>,
    pub last_used_index: Option<u64>,
    pub new_notes_found: usize,
    pub last_processed_cursor: Option<String>,
}

/// The discovery engine. Owns nothing shared; each run carries its own
/// chains, cursor, and counters, so concurrent runs on *different*
/// `(key, pool)` pairs are independent.
pub struct NoteDiscovery<F, S> {
    fetcher: F,
    storage: S,
    config: DiscoveryConfig,
}

impl<F: ActivityFetcher, S: NoteStorageProvider> NoteDiscovery<F, S> {
    pub fn new(fetcher: F, storage: S) -> Self {
        Self::with_config(fetcher, storage, DiscoveryConfig::default())
    }

    pub fn with_config(fetcher: F, storage: S, config: DiscoveryConfig) -> Self {
        Self {
            fetcher,
            storage,
            config,
        }
    }

    /// Recover the account's note chains for `pool`, resuming from the
    /// stored checkpoint and extending it page by page.
    pub async fn discover(
        &self,
        key: &AccountKey,
        pool: Address,
        cancel: &CancellationToken,
        observer: Option<ProgressObserver<'_>>,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        let public_key = key.public_key();

        let checkpoint = self
            .storage
            .cached_notes(public_key, pool)
            .await
            .map_err(|source| DiscoveryError::Storage { page: 0, source })?
            .unwrap_or_default();
        let stored_next = self
            .storage
            .next_deposit_index(public_key, pool)
            .await
            .map_err(|source| DiscoveryError::Storage { page: 0, source })?;

        let mut chains = checkpoint.chains;
        let mut cursor = checkpoint.cursor;
        let mut last_used = checkpoint.last_used_deposit_index;
        let mut next_index = stored_next.max(last_used.map_or(0, |i| i + 1));

        let initial_notes: usize = chains.iter().map(NoteChain::len).sum();
        let mut progress = DiscoveryProgress {
            last_cursor: cursor.clone(),
            ..Default::default()
        };
        let mut page_number = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(DiscoveryError::Cancelled);
            }

            let page = self
                .fetcher
                .fetch_activities(pool, self.config.page_size, cursor.as_deref(), Order::Ascending)
                .await
                .map_err(|source| DiscoveryError::Fetcher {
                    page: page_number,
                    source,
                })?;
            debug!(
                page = page_number,
                activities = page.items.len(),
                "processing activity page"
            );
            progress.current_page_activity_count = page.items.len();

            // 1. Extend chains whose tail is still spendable.
            for chain in chains.iter_mut() {
                extend_chain(key, pool, chain, &page.items).map_err(|source| {
                    DiscoveryError::Fetcher {
                        page: page_number,
                        source,
                    }
                })?;
            }

            // 2. Probe for new deposits of this account.
            scan_new_deposits(
                key,
                pool,
                &mut chains,
                &mut next_index,
                &mut last_used,
                &page.items,
                cancel,
                &mut progress,
            )
            .map_err(|err| match err {
                ScanError::Cancelled => DiscoveryError::Cancelled,
                ScanError::Decode(source) => DiscoveryError::Fetcher {
                    page: page_number,
                    source,
                },
            })?;

            // 3. Checkpoint before requesting the next page.
            cursor = page.page_info.end_cursor.clone();
            self.storage
                .store_discovered_notes(public_key, pool, &chains, cursor.as_deref())
                .await
                .map_err(|source| DiscoveryError::Storage {
                    page: page_number,
                    source,
                })?;
            if let Some(index) = last_used {
                self.storage
                    .update_last_used_deposit_index(public_key, pool, index)
                    .await
                    .map_err(|source| DiscoveryError::Storage {
                        page: page_number,
                        source,
                    })?;
            }

            page_number += 1;
            progress.pages_processed = page_number;
            progress.last_cursor = cursor.clone();
            if let Some(observe) = observer {
                observe(&progress);
            }

            if !page.page_info.has_next_page {
                break;
            }
            if self.config.max_pages.is_some_and(|max| page_number >= max) {
                break;
            }
        }

        progress.complete = true;
        if let Some(observe) = observer {
            observe(&progress);
        }

        let total_notes: usize = chains.iter().map(NoteChain::len).sum();
        let new_notes_found = total_notes - initial_notes;
        info!(
            chains = chains.len(),
            new_notes_found,
            pages = page_number,
            "discovery complete"
        );

        Ok(DiscoveryResult {
            chains,
            last_used_index: last_used,
            new_notes_found,
            last_processed_cursor: cursor,
        })
    }
}

enum ScanError {
    Cancelled,
    Decode(FetcherError),
}

/// Walk a chain forward through one page: while the tail is spendable and
/// some withdrawal in `items` spends its nullifier hash, mark the tail spent
/// and append the change note it produced.
fn extend_chain(
    key: &AccountKey,
    pool: Address,
    chain: &mut NoteChain,
    items: &[Activity],
) -> Result<usize, FetcherError> {
    let mut appended = 0usize;

    loop {
        let Some(tail) = chain.tail() else { break };
        // Pending deposits and drained tails are never extension candidates.
        if !tail.is_spendable() {
            break;
        }
        let deposit_index = tail.deposit_index;
        let change_index = tail.change_index;
        let tail_amount = tail.amount;

        let secrets = derivation::note_secrets(key, pool, deposit_index, change_index);
        let spent_hash = fr_to_decimal(derivation::nullifier_hash(secrets.nullifier));

        let Some(withdrawal) = items
            .iter()
            .filter_map(Activity::as_withdrawal)
            .find(|w| w.spent_nullifier == spent_hash)
        else {
            break;
        };

        let withdrawn = parse_wire_amount(&withdrawal.amount)?;
        // Withdrawn totals never exceed the deposit, so this is exact; the
        // saturation only guards malformed indexer data.
        let remaining = tail_amount.saturating_sub(withdrawn);
        let label = chain.head().and_then(|head| head.label);

        debug!(
            deposit_index,
            change_index = change_index + 1,
            %remaining,
            "chain extended by withdrawal"
        );

        if let Some(tail) = chain.tail_mut() {
            tail.status = NoteStatus::Spent;
        }
        chain.notes.push(Note {
            pool_address: pool,
            deposit_index,
            change_index: change_index + 1,
            kind: NoteKind::Change,
            amount: remaining,
            label,
            status: if remaining > U256::ZERO {
                NoteStatus::Unspent
            } else {
                NoteStatus::Spent
            },
            origin_tx_hash: withdrawal.origin_transaction_hash.clone(),
            destination_tx_hash: withdrawal.destination_transaction_hash.clone(),
            origin_chain_id: withdrawal.origin_chain_id,
            destination_chain_id: withdrawal.destination_chain_id,
            block_number: withdrawal.block_number,
            timestamp: withdrawal.timestamp,
            refund_commitment: withdrawal.refund_commitment.clone(),
        });
        appended += 1;
    }

    Ok(appended)
}

/// Probe ascending deposit indices against the page until one fails to
/// match. A freshly-matched deposit is immediately extended against the
/// page suffix after its own position, so a same-page spend is captured.
#[allow(clippy::too_many_arguments)]
fn scan_new_deposits(
    key: &AccountKey,
    pool: Address,
    chains: &mut Vec<NoteChain>,
    next_index: &mut u64,
    last_used: &mut Option<u64>,
    items: &[Activity],
    cancel: &CancellationToken,
    progress: &mut DiscoveryProgress,
) -> Result<(), ScanError> {
    loop {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let candidate = *next_index;
        progress.deposits_checked += 1;

        let secrets = derivation::note_secrets(key, pool, candidate, 0);
        let expected = fr_to_decimal(secrets.precommitment());

        // First matching position wins when the indexer emits several
        // deposits in one page.
        let Some(position) = items.iter().position(|activity| {
            activity
                .as_deposit()
                .is_some_and(|d| d.precommitment_hash == expected)
        }) else {
            break;
        };
        let deposit = items[position]
            .as_deposit()
            .expect("position points at a deposit");

        let amount = match deposit.amount.as_deref() {
            Some(raw) => parse_wire_amount(raw).map_err(ScanError::Decode)?,
            None => U256::ZERO,
        };
        let label = match deposit.label.as_deref() {
            Some(raw) => Some(parse_wire_amount(raw).map_err(ScanError::Decode)?),
            None => None,
        };

        let note = Note {
            pool_address: pool,
            deposit_index: candidate,
            change_index: 0,
            kind: NoteKind::Deposit,
            amount,
            label,
            status: NoteStatus::Unspent,
            origin_tx_hash: deposit.origin_transaction_hash.clone(),
            destination_tx_hash: deposit.destination_transaction_hash.clone(),
            origin_chain_id: deposit.origin_chain_id,
            destination_chain_id: deposit.destination_chain_id,
            block_number: deposit.block_number,
            timestamp: deposit.timestamp,
            refund_commitment: None,
        };
        info!(
            deposit_index = candidate,
            activated = note.is_activated(),
            "matched deposit precommitment"
        );

        let mut chain = NoteChain::new(note);
        extend_chain(key, pool, &mut chain, &items[position + 1..]).map_err(ScanError::Decode)?;
        chains.push(chain);

        progress.deposits_matched += 1;
        *last_used = Some(candidate);
        *next_index = candidate + 1;
    }

    Ok(())
}

/// Parse a wire decimal string into a 256-bit amount.
fn parse_wire_amount(raw: &str) -> Result<U256, FetcherError> {
    raw.trim()
        .parse::<U256>()
        .map_err(|e| FetcherError::Decode(format!("bad numeric string {raw:?}: {e}")))
}
