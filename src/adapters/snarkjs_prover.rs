use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

use crate::ports::prover::{ProverError, WithdrawalProof, WithdrawalProver};
use crate::withdrawal::WithdrawalProverInput;

/// Generates withdrawal proofs by shelling out to the snarkjs CLI.
///
/// This prover:
/// 1. Writes the assembled signals to `input.json` in the work directory
/// 2. Runs `snarkjs groth16 fullprove` against the circuit WASM and zkey
/// 3. Reads `proof.json` and `public.json` back
///
/// `verify` re-runs `snarkjs groth16 verify` against the verification key,
/// which is how the SDK self-checks every proof it hands out.
pub struct SnarkjsProver {
    wasm_path: PathBuf,
    zkey_path: PathBuf,
    vkey_path: PathBuf,
    work_dir: PathBuf,
}

impl SnarkjsProver {
    pub fn new(
        wasm_path: PathBuf,
        zkey_path: PathBuf,
        vkey_path: PathBuf,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            wasm_path,
            zkey_path,
            vkey_path,
            work_dir,
        }
    }

    fn require_file(path: &Path) -> Result<(), ProverError> {
        if !path.exists() {
            return Err(ProverError::CircuitFilesUnavailable(
                path.display().to_string(),
            ));
        }
        Ok(())
    }
}

impl WithdrawalProver for SnarkjsProver {
    async fn prove(
        &self,
        input: &WithdrawalProverInput,
    ) -> Result<WithdrawalProof, ProverError> {
        Self::require_file(&self.wasm_path)?;
        Self::require_file(&self.zkey_path)?;
        std::fs::create_dir_all(&self.work_dir)?;

        let input_path = self.work_dir.join("input.json");
        let proof_path = self.work_dir.join("proof.json");
        let public_path = self.work_dir.join("public.json");

        let serialized = serde_json::to_vec_pretty(input)
            .map_err(|e| ProverError::Serialization(e.to_string()))?;
        std::fs::write(&input_path, serialized)?;

        debug!(wasm = %self.wasm_path.display(), "running snarkjs groth16 fullprove");
        let output = Command::new("snarkjs")
            .args([
                "groth16",
                "fullprove",
                &input_path.display().to_string(),
                &self.wasm_path.display().to_string(),
                &self.zkey_path.display().to_string(),
                &proof_path.display().to_string(),
                &public_path.display().to_string(),
            ])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProverError::ProofGeneration(format!(
                "snarkjs fullprove failed: {stderr}"
            )));
        }

        let proof = serde_json::from_slice(&std::fs::read(&proof_path)?)
            .map_err(|e| ProverError::Serialization(e.to_string()))?;
        let public_signals = serde_json::from_slice(&std::fs::read(&public_path)?)
            .map_err(|e| ProverError::Serialization(e.to_string()))?;

        Ok(WithdrawalProof {
            proof,
            public_signals,
        })
    }

    async fn verify(&self, proof: &WithdrawalProof) -> Result<bool, ProverError> {
        Self::require_file(&self.vkey_path)?;
        std::fs::create_dir_all(&self.work_dir)?;

        let proof_path = self.work_dir.join("verify-proof.json");
        let public_path = self.work_dir.join("verify-public.json");
        std::fs::write(
            &proof_path,
            serde_json::to_vec(&proof.proof).map_err(|e| ProverError::Serialization(e.to_string()))?,
        )?;
        std::fs::write(
            &public_path,
            serde_json::to_vec(&proof.public_signals)
                .map_err(|e| ProverError::Serialization(e.to_string()))?,
        )?;

        let output = Command::new("snarkjs")
            .args([
                "groth16",
                "verify",
                &self.vkey_path.display().to_string(),
                &public_path.display().to_string(),
                &proof_path.display().to_string(),
            ])
            .output()
            .await?;

        if output.status.success() {
            return Ok(true);
        }

        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        // snarkjs exits non-zero both for an invalid proof and for real
        // failures; only the former is a clean `false`.
        if combined.contains("Invalid proof") {
            return Ok(false);
        }
        Err(ProverError::Verification(combined))
    }
}
