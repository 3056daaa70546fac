pub mod memory_storage;
pub mod mock_prover;
pub mod snarkjs_prover;
pub mod static_fetcher;
