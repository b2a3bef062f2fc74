//! Keypair generation.

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};

use super::address::render_address;

/// Anything that can mint fresh ed25519 keypairs for the search workers.
///
/// Implementations must be cheap to call from many threads at once.
pub trait KeyPairSource: Send + Sync {
    /// Generates a new random keypair.
    fn generate(&self) -> Keypair;

    /// Renders a public key as the text the pattern is matched against.
    fn render(&self, pubkey: &Pubkey) -> String {
        render_address(pubkey)
    }
}

/// In-process ed25519 generator backed by the OS random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Source;

impl KeyPairSource for Ed25519Source {
    #[inline]
    fn generate(&self) -> Keypair {
        Keypair::new()
    }
}

/// Returns the 64-byte secret||public layout used by ledger keypair files.
pub fn keypair_secret_bytes(keypair: &Keypair) -> Vec<u8> {
    keypair.to_bytes().to_vec()
}

/// Renders the public half of a keypair.
pub fn keypair_address(keypair: &Keypair) -> String {
    render_address(&keypair.pubkey())
}
