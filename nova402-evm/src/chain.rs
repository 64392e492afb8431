//! EIP-155 chain id resolution.
//!
//! Requirements name their network either by registry id (`"base-sepolia"`)
//! or directly in CAIP-2 form (`"eip155:84532"`). The EIP-712 domain needs the
//! numeric chain id in both cases.

use nova402::networks::{NetworkError, NetworkRegistry};

/// An EIP-155 chain ID (e.g., 8453 for Base, 137 for Polygon).
pub type ChainId = u64;

/// Formats a chain ID as a CAIP-2 identifier.
///
/// Example: `caip2(8453)` returns `"eip155:8453"`.
#[must_use]
pub fn caip2(chain_id: ChainId) -> String {
    format!("eip155:{chain_id}")
}

/// Parses a CAIP-2 identifier into an EIP-155 chain ID.
///
/// Returns `None` if the input is not a valid `eip155:` prefixed string.
#[must_use]
pub fn parse_caip2(caip: &str) -> Option<ChainId> {
    caip.strip_prefix("eip155:").and_then(|s| s.parse().ok())
}

/// Resolves the numeric chain id of `network`.
///
/// CAIP-2 `eip155:<n>` strings are parsed directly; anything else is looked up
/// in the registry and must be an EVM entry.
///
/// # Errors
///
/// Returns [`NetworkError`] for unknown or non-EVM networks.
pub fn resolve_chain_id(registry: &NetworkRegistry, network: &str) -> Result<ChainId, NetworkError> {
    match parse_caip2(network) {
        Some(chain_id) => Ok(chain_id),
        None => registry.evm_chain_id(network),
    }
}
