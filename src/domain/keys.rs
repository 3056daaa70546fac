use ark_bn254::Fr;
use ark_ff::PrimeField;
use bip39::Mnemonic;
use num_bigint::BigUint;
use rand::Rng;
use thiserror::Error;
use zeroize::Zeroize;

use crate::crypto::poseidon::poseidon1;

/// Errors raised while constructing an account key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid account key: {0}")]
    InvalidKey(String),

    #[error("invalid mnemonic phrase")]
    InvalidMnemonic,
}

/// The single secret from which every note of an account is derived.
///
/// The key never appears on-chain; compromise leaks all notes under it.
/// The inner field element is zeroized when the key is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountKey(Fr);

impl AccountKey {
    /// Parse a user-supplied key: a `0x`-prefixed hex string or a decimal
    /// string. Input is whitespace-trimmed and reduced mod p, so every
    /// spelling of the same integer yields the same key.
    pub fn parse(input: &str) -> Result<Self, KeyError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(KeyError::InvalidKey("empty key".to_string()));
        }

        let value = if let Some(hex_digits) =
            trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
        {
            BigUint::parse_bytes(hex_digits.as_bytes(), 16)
                .ok_or_else(|| KeyError::InvalidKey(format!("bad hex digits: {trimmed}")))?
        } else {
            BigUint::parse_bytes(trimmed.as_bytes(), 10)
                .ok_or_else(|| KeyError::InvalidKey(format!("bad decimal digits: {trimmed}")))?
        };

        Ok(Self::from_integer(value))
    }

    /// Construct from an arbitrary-precision integer, reducing mod p.
    pub fn from_integer(value: BigUint) -> Self {
        Self(Fr::from(value))
    }

    /// Construct from a raw 32-byte private key.
    pub fn from_private_key(bytes: &[u8; 32]) -> Self {
        Self(Fr::from_be_bytes_mod_order(bytes))
    }

    /// Construct from a BIP-39 mnemonic phrase (empty passphrase).
    pub fn from_mnemonic(phrase: &str) -> Result<Self, KeyError> {
        let mnemonic =
            Mnemonic::parse_normalized(phrase.trim()).map_err(|_| KeyError::InvalidMnemonic)?;
        let mut seed = mnemonic.to_seed("");
        let key = Fr::from_be_bytes_mod_order(&seed);
        seed.zeroize();
        Ok(Self(key))
    }

    /// Generate a random account key.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill(&mut bytes);
        let key = Self::from_private_key(&bytes);
        bytes.zeroize();
        key
    }

    /// The account's public key, `poseidon1(key)`.
    ///
    /// Safe to reveal; used as the storage namespace for discovered notes.
    pub fn public_key(&self) -> Fr {
        poseidon1(self.0)
    }

    /// The raw field element. Handle with care.
    pub fn as_field(&self) -> Fr {
        self.0
    }
}

impl Drop for AccountKey {
    fn drop(&mut self) {
        // Wipe the limbs in place through zeroize; a plain field assignment
        // is a dead store the optimizer may elide.
        let limbs = &mut (self.0).0;
        limbs.0.zeroize();
    }
}
