//! Base-58 address rendering.

use solana_sdk::pubkey::Pubkey;

/// The Bitcoin base-58 alphabet used for ledger addresses.
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Longest possible base-58 rendering of a 32-byte public key.
pub const MAX_ADDRESS_LEN: usize = 44;

/// Number of symbols in the alphabet, the per-character odds of a random match.
pub const ALPHABET_SIZE: u64 = 58;

/// Renders a public key as its canonical base-58 text.
#[inline]
pub fn render_address(pubkey: &Pubkey) -> String {
    pubkey.to_string()
}

/// Returns true if `c` can appear in a base-58 address.
#[inline]
pub fn is_base58_char(c: char) -> bool {
    BASE58_ALPHABET.contains(c)
}

/// Like [`is_base58_char`], but also accepts a character whose other case is valid.
pub fn is_base58_char_any_case(c: char) -> bool {
    is_base58_char(c) || is_base58_char(c.to_ascii_lowercase()) || is_base58_char(c.to_ascii_uppercase())
}
