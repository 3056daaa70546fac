use std::future::Future;

use thiserror::Error;

use crate::withdrawal::WithdrawalProverInput;

/// A Groth16 proof plus the public signals it commits to, in the prover's
/// native JSON shape.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalProof {
    pub proof: serde_json::Value,
    /// Decimal strings, in the circuit's public-signal order.
    pub public_signals: Vec<String>,
}

/// Errors that can occur during proof generation or verification.
#[derive(Debug, Error)]
pub enum ProverError {
    #[error("circuit files unavailable: {0}")]
    CircuitFilesUnavailable(String),

    #[error("witness generation failed: {0}")]
    Witness(String),

    #[error("proof generation failed: {0}")]
    ProofGeneration(String),

    #[error("proof verification failed: {0}")]
    Verification(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Port for the Groth16 prover.
///
/// The circuit proves ownership of the existing note, inclusion of its
/// commitment in the state tree and of its label in the approved-set tree,
/// correct derivation of the new (and refund) note, and binding to the
/// withdrawal context. The prover is a black box to the SDK; circuit files
/// are loaded lazily and cached by the implementation.
///
/// Implementations:
/// - `SnarkjsProver` (external `snarkjs` process)
/// - `MockProver` (digest-based, for tests)
pub trait WithdrawalProver: Send + Sync {
    fn prove(
        &self,
        input: &WithdrawalProverInput,
    ) -> impl Future<Output = Result<WithdrawalProof, ProverError>> + Send;

    /// Check a proof against the verification key. Returns `Ok(false)` for a
    /// well-formed but invalid proof.
    fn verify(
        &self,
        proof: &WithdrawalProof,
    ) -> impl Future<Output = Result<bool, ProverError>> + Send;
}
