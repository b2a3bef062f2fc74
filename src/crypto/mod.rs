//! Cryptographic operations for vanity key generation.
//!
//! This module provides:
//! - The `KeyPairSource` capability the search workers draw keys from
//! - Base-58 address rendering and alphabet checks

mod address;
mod keypair;

pub use address::{
    is_base58_char, is_base58_char_any_case, render_address, ALPHABET_SIZE, BASE58_ALPHABET,
    MAX_ADDRESS_LEN,
};
pub use keypair::{keypair_address, keypair_secret_bytes, Ed25519Source, KeyPairSource};
