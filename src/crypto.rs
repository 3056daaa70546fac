pub mod encoding;
pub mod field;
pub mod poseidon;
