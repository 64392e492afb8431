//! Registry of supported payment networks.
//!
//! Networks are addressed by their x402 v1 identifier (e.g. `"base-sepolia"`).
//! Each entry carries the chain id, the native currency metadata and, where
//! deployed, the USDC contract address.
//!
//! Applications build a [`NetworkRegistry`] once at startup, usually from
//! [`NetworkRegistry::known`], and share it read-only afterwards.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::chain::{ChainId, EIP155_NAMESPACE, SOLANA_NAMESPACE};

/// Chain family of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    /// EVM-compatible chain addressed by a numeric EIP-155 chain id.
    Evm,
    /// Solana cluster addressed by its cluster name.
    Solana,
    /// A chain family with no CAIP-2 namespace mapping.
    Other,
}

impl NetworkKind {
    /// CAIP-2 namespace for this family, if one is defined.
    #[must_use]
    pub const fn caip2_namespace(self) -> Option<&'static str> {
        match self {
            Self::Evm => Some(EIP155_NAMESPACE),
            Self::Solana => Some(SOLANA_NAMESPACE),
            Self::Other => None,
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Evm => "evm",
            Self::Solana => "solana",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Chain id of a network: numeric on EVM chains, an opaque name elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum NetworkChainId {
    /// EIP-155 chain id.
    Numeric(u64),
    /// Non-numeric chain reference (e.g. `"devnet"`).
    Named(&'static str),
}

impl NetworkChainId {
    /// Returns the numeric chain id, if this is one.
    #[must_use]
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Numeric(id) => Some(*id),
            Self::Named(_) => None,
        }
    }
}

impl fmt::Display for NetworkChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Static metadata for a single payment network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Registry key, e.g. `"base-sepolia"`.
    pub id: &'static str,
    /// Human-readable name, e.g. `"Base Sepolia"`.
    pub name: &'static str,
    /// Chain family.
    pub kind: NetworkKind,
    /// Chain id within the family.
    pub chain_id: NetworkChainId,
    /// Native currency ticker.
    pub currency_symbol: &'static str,
    /// Decimals of the native currency.
    pub currency_decimals: u8,
    /// Public RPC endpoint.
    pub rpc_url: &'static str,
    /// Block explorer base URL.
    pub explorer_url: &'static str,
    /// USDC contract (EVM) or mint (Solana) address, when deployed.
    pub usdc_address: Option<&'static str>,
}

impl NetworkConfig {
    /// Renders the CAIP-2 chain scope of this network.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnsupportedNetworkType`] when the chain family has
    /// no CAIP-2 namespace.
    pub fn chain_scope(&self) -> Result<ChainId, NetworkError> {
        let namespace =
            self.kind
                .caip2_namespace()
                .ok_or_else(|| NetworkError::UnsupportedNetworkType {
                    network: self.id.to_owned(),
                    kind: self.kind,
                })?;
        Ok(ChainId::new(namespace, self.chain_id.to_string()))
    }
}

/// Errors raised by registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// The network identifier is not registered.
    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),
    /// The network exists but its chain family cannot be used here.
    #[error("Unsupported network type {kind} for network {network}")]
    UnsupportedNetworkType {
        /// Network identifier.
        network: String,
        /// Chain family of the network.
        kind: NetworkKind,
    },
    /// No USDC deployment is recorded for the network.
    #[error("USDC not configured for network: {0}")]
    UsdcNotConfigured(String),
}

/// Base mainnet.
pub const BASE_MAINNET: NetworkConfig = NetworkConfig {
    id: "base-mainnet",
    name: "Base Mainnet",
    kind: NetworkKind::Evm,
    chain_id: NetworkChainId::Numeric(8453),
    currency_symbol: "ETH",
    currency_decimals: 18,
    rpc_url: "https://mainnet.base.org",
    explorer_url: "https://basescan.org",
    usdc_address: Some("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
};

/// Base Sepolia testnet.
pub const BASE_SEPOLIA: NetworkConfig = NetworkConfig {
    id: "base-sepolia",
    name: "Base Sepolia",
    kind: NetworkKind::Evm,
    chain_id: NetworkChainId::Numeric(84532),
    currency_symbol: "ETH",
    currency_decimals: 18,
    rpc_url: "https://sepolia.base.org",
    explorer_url: "https://sepolia.basescan.org",
    usdc_address: Some("0x036CbD53842c5426634e7929541eC2318f3dCF7e"),
};

/// Polygon PoS mainnet.
pub const POLYGON: NetworkConfig = NetworkConfig {
    id: "polygon",
    name: "Polygon",
    kind: NetworkKind::Evm,
    chain_id: NetworkChainId::Numeric(137),
    currency_symbol: "MATIC",
    currency_decimals: 18,
    rpc_url: "https://polygon-rpc.com",
    explorer_url: "https://polygonscan.com",
    usdc_address: Some("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
};

/// BNB Smart Chain.
pub const BSC: NetworkConfig = NetworkConfig {
    id: "bsc",
    name: "BNB Smart Chain",
    kind: NetworkKind::Evm,
    chain_id: NetworkChainId::Numeric(56),
    currency_symbol: "BNB",
    currency_decimals: 18,
    rpc_url: "https://bsc-dataseed.binance.org",
    explorer_url: "https://bscscan.com",
    usdc_address: Some("0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d"),
};

/// Sei EVM.
pub const SEI: NetworkConfig = NetworkConfig {
    id: "sei",
    name: "Sei Network",
    kind: NetworkKind::Evm,
    chain_id: NetworkChainId::Numeric(1329),
    currency_symbol: "SEI",
    currency_decimals: 18,
    rpc_url: "https://evm-rpc.sei-apis.com",
    explorer_url: "https://seitrace.com",
    usdc_address: None,
};

/// Peaq EVM.
pub const PEAQ: NetworkConfig = NetworkConfig {
    id: "peaq",
    name: "Peaq Network",
    kind: NetworkKind::Evm,
    chain_id: NetworkChainId::Numeric(3338),
    currency_symbol: "PEAQ",
    currency_decimals: 18,
    rpc_url: "https://peaq.api.onfinality.io/public",
    explorer_url: "https://peaq.subscan.io",
    usdc_address: None,
};

/// Solana mainnet-beta.
pub const SOLANA_MAINNET: NetworkConfig = NetworkConfig {
    id: "solana-mainnet",
    name: "Solana Mainnet",
    kind: NetworkKind::Solana,
    chain_id: NetworkChainId::Named("mainnet"),
    currency_symbol: "SOL",
    currency_decimals: 9,
    rpc_url: "https://api.mainnet-beta.solana.com",
    explorer_url: "https://explorer.solana.com",
    usdc_address: Some("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
};

/// Solana devnet.
pub const SOLANA_DEVNET: NetworkConfig = NetworkConfig {
    id: "solana-devnet",
    name: "Solana Devnet",
    kind: NetworkKind::Solana,
    chain_id: NetworkChainId::Named("devnet"),
    currency_symbol: "SOL",
    currency_decimals: 9,
    rpc_url: "https://api.devnet.solana.com",
    explorer_url: "https://explorer.solana.com?cluster=devnet",
    usdc_address: Some("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU"),
};

/// Every network known out of the box.
pub const KNOWN_NETWORKS: &[NetworkConfig] = &[
    BASE_MAINNET,
    BASE_SEPOLIA,
    POLYGON,
    BSC,
    SEI,
    PEAQ,
    SOLANA_MAINNET,
    SOLANA_DEVNET,
];

/// Lookup table from network identifier to [`NetworkConfig`].
///
/// Immutable once built; clone it or put it behind an `Arc` to share.
///
/// # Example
///
/// ```
/// use nova402::networks::NetworkRegistry;
///
/// let registry = NetworkRegistry::known();
/// let scope = registry.to_chain_scope("base-sepolia").unwrap();
/// assert_eq!(scope.to_string(), "eip155:84532");
/// ```
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    by_id: HashMap<&'static str, NetworkConfig>,
}

impl NetworkRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
        }
    }

    /// Creates a registry holding [`KNOWN_NETWORKS`].
    #[must_use]
    pub fn known() -> Self {
        Self::from_networks(KNOWN_NETWORKS)
    }

    /// Creates a registry pre-populated from a network slice.
    #[must_use]
    pub fn from_networks(networks: &[NetworkConfig]) -> Self {
        let mut registry = Self::with_capacity(networks.len());
        registry.register(networks);
        registry
    }

    /// Creates an empty registry with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            by_id: HashMap::with_capacity(cap),
        }
    }

    /// Registers additional networks. Later entries replace earlier ones with the same id.
    pub fn register(&mut self, networks: &[NetworkConfig]) {
        for network in networks {
            self.by_id.insert(network.id, *network);
        }
    }

    /// Builder-style method: registers additional networks and returns `self`.
    #[must_use]
    pub fn with_networks(mut self, networks: &[NetworkConfig]) -> Self {
        self.register(networks);
        self
    }

    /// Looks up a network by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnsupportedNetwork`] for unknown identifiers.
    pub fn lookup(&self, network: &str) -> Result<&NetworkConfig, NetworkError> {
        self.by_id
            .get(network)
            .ok_or_else(|| NetworkError::UnsupportedNetwork(network.to_owned()))
    }

    /// Renders the CAIP-2 chain scope of a network (`eip155:8453`, `solana:devnet`).
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnsupportedNetwork`] for unknown identifiers and
    /// [`NetworkError::UnsupportedNetworkType`] for families without a namespace.
    pub fn to_chain_scope(&self, network: &str) -> Result<ChainId, NetworkError> {
        self.lookup(network)?.chain_scope()
    }

    /// Returns the numeric EIP-155 chain id of an EVM network.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnsupportedNetwork`] for unknown identifiers and
    /// [`NetworkError::UnsupportedNetworkType`] for non-EVM networks.
    pub fn evm_chain_id(&self, network: &str) -> Result<u64, NetworkError> {
        let config = self.lookup(network)?;
        match (config.kind, config.chain_id) {
            (NetworkKind::Evm, NetworkChainId::Numeric(id)) => Ok(id),
            _ => Err(NetworkError::UnsupportedNetworkType {
                network: network.to_owned(),
                kind: config.kind,
            }),
        }
    }

    /// Returns the USDC contract or mint address for a network.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnsupportedNetwork`] for unknown identifiers and
    /// [`NetworkError::UsdcNotConfigured`] when no deployment is recorded.
    pub fn usdc_address(&self, network: &str) -> Result<&'static str, NetworkError> {
        self.lookup(network)?
            .usdc_address
            .ok_or_else(|| NetworkError::UsdcNotConfigured(network.to_owned()))
    }

    /// Returns `true` if the network is registered as an EVM chain.
    #[must_use]
    pub fn is_evm(&self, network: &str) -> bool {
        self.lookup(network)
            .is_ok_and(|config| config.kind == NetworkKind::Evm)
    }

    /// Returns `true` if the network is registered as a Solana cluster.
    #[must_use]
    pub fn is_solana(&self, network: &str) -> bool {
        self.lookup(network)
            .is_ok_and(|config| config.kind == NetworkKind::Solana)
    }

    /// Iterates over all registered networks in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkConfig> {
        self.by_id.values()
    }

    /// Returns the number of registered networks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if no networks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_table_is_complete() {
        let registry = NetworkRegistry::known();
        assert_eq!(registry.len(), 8);
        for id in [
            "base-mainnet",
            "base-sepolia",
            "polygon",
            "bsc",
            "sei",
            "peaq",
            "solana-mainnet",
            "solana-devnet",
        ] {
            assert!(registry.lookup(id).is_ok(), "{id} missing");
        }
    }

    #[test]
    fn test_lookup_unknown_network() {
        let registry = NetworkRegistry::known();
        let err = registry.lookup("ethereum-goerli").unwrap_err();
        assert_eq!(
            err,
            NetworkError::UnsupportedNetwork("ethereum-goerli".into())
        );
    }

    #[test]
    fn test_chain_scope_rendering() {
        let registry = NetworkRegistry::known();
        assert_eq!(
            registry.to_chain_scope("base-sepolia").unwrap().to_string(),
            "eip155:84532"
        );
        assert_eq!(
            registry.to_chain_scope("polygon").unwrap().to_string(),
            "eip155:137"
        );
        assert_eq!(
            registry.to_chain_scope("solana-devnet").unwrap().to_string(),
            "solana:devnet"
        );
    }

    #[test]
    fn test_chain_scope_unsupported_kind() {
        const CUSTOM: NetworkConfig = NetworkConfig {
            id: "custom-l1",
            name: "Custom L1",
            kind: NetworkKind::Other,
            chain_id: NetworkChainId::Named("alpha"),
            currency_symbol: "CUS",
            currency_decimals: 12,
            rpc_url: "https://rpc.custom.example",
            explorer_url: "https://explorer.custom.example",
            usdc_address: None,
        };
        let registry = NetworkRegistry::known().with_networks(&[CUSTOM]);
        assert!(matches!(
            registry.to_chain_scope("custom-l1"),
            Err(NetworkError::UnsupportedNetworkType { .. })
        ));
    }

    #[test]
    fn test_evm_chain_id() {
        let registry = NetworkRegistry::known();
        assert_eq!(registry.evm_chain_id("bsc").unwrap(), 56);
        assert!(matches!(
            registry.evm_chain_id("solana-mainnet"),
            Err(NetworkError::UnsupportedNetworkType { .. })
        ));
    }

    #[test]
    fn test_usdc_addresses() {
        let registry = NetworkRegistry::known();
        assert_eq!(
            registry.usdc_address("base-sepolia").unwrap(),
            "0x036CbD53842c5426634e7929541eC2318f3dCF7e"
        );
        assert_eq!(
            registry.usdc_address("solana-devnet").unwrap(),
            "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU"
        );
        assert_eq!(
            registry.usdc_address("sei").unwrap_err(),
            NetworkError::UsdcNotConfigured("sei".into())
        );
    }

    #[test]
    fn test_mainnet_ids_carry_suffix() {
        let registry = NetworkRegistry::known();
        assert_eq!(
            registry.usdc_address("base-mainnet").unwrap(),
            "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"
        );
        assert_eq!(
            registry.lookup("base").unwrap_err(),
            NetworkError::UnsupportedNetwork("base".into())
        );
        assert!(registry.lookup("solana").is_err());
    }

    #[test]
    fn test_kind_predicates() {
        let registry = NetworkRegistry::known();
        assert!(registry.is_evm("base-mainnet"));
        assert!(!registry.is_evm("solana-mainnet"));
        assert!(registry.is_solana("solana-mainnet"));
        assert!(!registry.is_solana("unknown"));
        assert!(!registry.is_evm("unknown"));
    }

    #[test]
    fn test_default_registry_is_empty() {
        assert!(NetworkRegistry::default().is_empty());
    }
}
