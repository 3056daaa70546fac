//! Client-side SDK for the shinobi.cash privacy pool.
//!
//! A user holds a single account key; from it the SDK derives an unbounded
//! family of notes (commitments) that can be deposited into the on-chain
//! shielded pool and later spent via zero-knowledge withdrawal proofs.
//! Partial withdrawals produce change notes, so one deposit evolves into a
//! linear chain of notes; cross-chain withdrawals additionally derive a
//! refund note redeemable if the destination-chain fill fails.
//!
//! The crate is organized hexagonally:
//!
//! - [`crypto`] - BN254 field helpers, Poseidon, Keccak, wire encodings
//! - [`derivation`] - deterministic nullifier/secret/commitment derivation
//! - [`tree`] - lean incremental Merkle tree over Poseidon-2
//! - [`domain`] - account keys, notes, note chains, indexer activities
//! - [`ports`] - traits for the activity fetcher, note storage, and prover
//! - [`discovery`] - resumable note-chain recovery from the activity stream
//! - [`withdrawal`] - context hashing and Groth16 proof-input assembly
//! - [`adapters`] - in-memory and external-process port implementations
//!
//! Clients maintain local Merkle trees and assemble proof inputs locally;
//! the on-chain contracts only store commitment/nullifier data and verify
//! proofs.

pub mod adapters;
pub mod crypto;
pub mod derivation;
pub mod discovery;
pub mod domain;
pub mod ports;
pub mod tree;
pub mod withdrawal;
