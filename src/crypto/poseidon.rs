use ark_bn254::Fr;
use light_poseidon::{Poseidon, PoseidonHasher};

/// Poseidon hash with 1 input.
/// Used for nullifier hashes and the account public key.
pub fn poseidon1(a: Fr) -> Fr {
    let mut hasher =
        Poseidon::<Fr>::new_circom(1).expect("Failed to create Poseidon hasher");
    hasher.hash(&[a]).expect("Failed to compute Poseidon hash")
}

/// Poseidon hash with 2 inputs.
/// Used for the keyed PRF, precommitments, and Merkle nodes.
pub fn poseidon2(a: Fr, b: Fr) -> Fr {
    let mut hasher =
        Poseidon::<Fr>::new_circom(2).expect("Failed to create Poseidon hasher");
    hasher
        .hash(&[a, b])
        .expect("Failed to compute Poseidon hash")
}

/// Poseidon hash with 3 inputs.
/// Used for full note commitments: poseidon3(amount, label, precommitment).
pub fn poseidon3(a: Fr, b: Fr, c: Fr) -> Fr {
    let mut hasher =
        Poseidon::<Fr>::new_circom(3).expect("Failed to create Poseidon hasher");
    hasher
        .hash(&[a, b, c])
        .expect("Failed to compute Poseidon hash")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poseidon1_deterministic() {
        let input = Fr::from(42u64);
        assert_eq!(poseidon1(input), poseidon1(input));
    }

    #[test]
    fn test_poseidon2_order_matters() {
        let a = Fr::from(1u64);
        let b = Fr::from(2u64);
        assert_ne!(poseidon2(a, b), poseidon2(b, a));
    }

    #[test]
    fn test_poseidon3_deterministic() {
        let a = Fr::from(1u64);
        let b = Fr::from(2u64);
        let c = Fr::from(3u64);
        assert_eq!(poseidon3(a, b, c), poseidon3(a, b, c));
    }

    #[test]
    fn test_arities_are_domain_separated() {
        let a = Fr::from(7u64);
        let b = Fr::from(7u64);
        assert_ne!(poseidon1(a), poseidon2(a, b));
    }
}
