use alloy::primitives::keccak256;
use serde_json::json;

use crate::ports::prover::{ProverError, WithdrawalProof, WithdrawalProver};
use crate::withdrawal::WithdrawalProverInput;

/// Digest-based stand-in for the Groth16 prover.
///
/// The "proof" commits to the public signals through a Keccak digest, so
/// verification succeeds exactly when the signals are untouched: mutating
/// any single one fails the check, which is the property the real
/// self-verification step relies on. Never use outside tests.
#[derive(Debug, Clone, Default)]
pub struct MockProver;

impl MockProver {
    pub fn new() -> Self {
        Self
    }

    /// The subset of inputs the real circuit exposes as public signals, in a
    /// fixed order.
    fn public_signals(input: &WithdrawalProverInput) -> Vec<String> {
        let mut signals = vec![
            input.withdrawn_value.clone(),
            input.state_root.clone(),
            input.asp_root.clone(),
            input.state_tree_depth.to_string(),
            input.asp_tree_depth.to_string(),
            input.context.clone(),
        ];
        if let Some(refund) = &input.refund_nullifier {
            signals.push(refund.clone());
        }
        signals
    }

    fn digest(signals: &[String]) -> String {
        hex::encode(keccak256(signals.join("\u{1f}").as_bytes()))
    }
}

impl WithdrawalProver for MockProver {
    async fn prove(
        &self,
        input: &WithdrawalProverInput,
    ) -> Result<WithdrawalProof, ProverError> {
        let public_signals = Self::public_signals(input);
        let proof = json!({
            "protocol": "groth16",
            "curve": "bn128",
            "digest": Self::digest(&public_signals),
        });
        Ok(WithdrawalProof {
            proof,
            public_signals,
        })
    }

    async fn verify(&self, proof: &WithdrawalProof) -> Result<bool, ProverError> {
        let digest = proof
            .proof
            .get("digest")
            .and_then(|d| d.as_str())
            .ok_or_else(|| ProverError::Verification("malformed proof object".to_string()))?;
        Ok(digest == Self::digest(&proof.public_signals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> WithdrawalProverInput {
        WithdrawalProverInput {
            withdrawn_value: "400000".to_string(),
            state_root: "111".to_string(),
            asp_root: "222".to_string(),
            state_tree_depth: 4,
            asp_tree_depth: 2,
            context: "333".to_string(),
            label: "7".to_string(),
            existing_value: "1000000".to_string(),
            existing_nullifier: "1".to_string(),
            existing_secret: "2".to_string(),
            new_nullifier: "3".to_string(),
            new_secret: "4".to_string(),
            refund_nullifier: None,
            refund_secret: None,
            state_siblings: vec!["0".to_string(); 32],
            asp_siblings: vec!["0".to_string(); 32],
            state_index: 7,
            asp_index: 2,
        }
    }

    #[tokio::test]
    async fn test_prove_then_verify() {
        let prover = MockProver::new();
        let proof = prover.prove(&test_input()).await.unwrap();
        assert!(prover.verify(&proof).await.unwrap());
    }

    #[tokio::test]
    async fn test_mutated_signal_fails_verification() {
        let prover = MockProver::new();
        let proof = prover.prove(&test_input()).await.unwrap();

        for i in 0..proof.public_signals.len() {
            let mut tampered = proof.clone();
            tampered.public_signals[i].push('1');
            assert!(
                !prover.verify(&tampered).await.unwrap(),
                "signal {i} mutation went unnoticed"
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_proof_object_is_an_error() {
        let prover = MockProver::new();
        let bogus = WithdrawalProof {
            proof: json!({ "protocol": "groth16" }),
            public_signals: vec![],
        };
        assert!(matches!(
            prover.verify(&bogus).await,
            Err(ProverError::Verification(_))
        ));
    }
}
