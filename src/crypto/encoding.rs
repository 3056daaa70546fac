use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolValue;

/// Packed encoding of a note coordinate, the preimage of the typed context
/// field: `address (20) ‖ uint64 BE (8) ‖ uint64 BE (8) ‖ bytes32 (32)`.
///
/// This layout is a wire contract shared with the on-chain derivation; the
/// domain tag is included here *and* again as the second PRF input, and both
/// inclusions must be preserved for existing commitments to stay spendable.
pub fn encode_note_context(
    pool: Address,
    deposit_index: u64,
    change_index: u64,
    tag: B256,
) -> [u8; 68] {
    let mut out = [0u8; 68];
    out[..20].copy_from_slice(pool.as_slice());
    out[20..28].copy_from_slice(&deposit_index.to_be_bytes());
    out[28..36].copy_from_slice(&change_index.to_be_bytes());
    out[36..].copy_from_slice(tag.as_slice());
    out
}

/// EIP-55 checksummed rendering of an address.
///
/// Derivations pack the canonical 20 bytes, so casing never reaches a hash;
/// this is the spelling handed back to users and transaction builders.
pub fn checksum_address(address: &Address) -> String {
    address.to_checksum(None)
}

/// Standard (non-packed) ABI encoding of the withdrawal context tuple
/// `((address, bytes), uint256)`, matching the contract's
/// `abi.encode(withdrawal, scope)`.
pub fn encode_withdrawal_context(recipient: Address, data: &Bytes, scope: U256) -> Vec<u8> {
    ((recipient, data.clone()), scope).abi_encode_params()
}
