//! Authorization nonces.

use alloy_primitives::B256;
use rand::RngExt;
use rand::rng;

/// Draws a fresh 32-byte EIP-3009 nonce from the thread-local CSPRNG.
#[must_use]
pub fn generate_nonce() -> B256 {
    let nonce: [u8; 32] = rng().random();
    B256::from(nonce)
}
