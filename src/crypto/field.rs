use alloy::primitives::{keccak256, B256, U256};
use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;

/// Reduce the Keccak-256 digest of `bytes` into the BN254 scalar field.
///
/// This is not a uniform sampler, but the reduction bias is cryptographically
/// negligible for BN254.
pub fn fr_from_keccak(bytes: &[u8]) -> Fr {
    Fr::from_be_bytes_mod_order(keccak256(bytes).as_ref())
}

/// Convert a field element to its 32-byte big-endian representation.
pub fn fr_to_b256(value: Fr) -> B256 {
    B256::from_slice(&value.into_bigint().to_bytes_be())
}

/// Convert a 256-bit unsigned integer to a field element, reducing mod p.
pub fn fr_from_u256(value: U256) -> Fr {
    Fr::from_be_bytes_mod_order(&value.to_be_bytes::<32>())
}

/// Convert a field element to a 256-bit unsigned integer (always < p).
pub fn fr_to_u256(value: Fr) -> U256 {
    U256::from_be_slice(&value.into_bigint().to_bytes_be())
}

/// Render a field element as a decimal string, the serialization the indexer
/// and the prover both use for field elements.
pub fn fr_to_decimal(value: Fr) -> String {
    BigUint::from_bytes_be(&value.into_bigint().to_bytes_be()).to_string()
}

/// Parse a decimal string into a field element, reducing mod p.
pub fn fr_from_decimal(input: &str) -> Option<Fr> {
    let value = BigUint::parse_bytes(input.trim().as_bytes(), 10)?;
    Some(Fr::from(value))
}
