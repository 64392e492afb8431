//! Facilitator client configuration.
//!
//! Read from the process environment, optionally seeded from a `.env` file.
//! The struct is also serde-deserializable so applications can embed it in
//! their own config files.
//!
//! # Environment Variables
//!
//! - `NOVA402_FACILITATOR_URL` - Facilitator base URL (default: testnet facilitator)
//! - `NOVA402_FACILITATOR_TIMEOUT_SECS` - Settlement timeout in seconds (default: `30`)
//! - `NOVA402_NETWORK` - Network the application charges on (optional)

use nova402::NetworkRegistry;
use nova402::proto::{PaymentRequirements, PaymentRequirementsBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::constants::{DEFAULT_SETTLE_TIMEOUT, TESTNET_FACILITATOR_URL};
use crate::error::ConfigError;

/// Facilitator base URL variable.
pub const ENV_FACILITATOR_URL: &str = "NOVA402_FACILITATOR_URL";
/// Settlement timeout variable, in whole seconds.
pub const ENV_FACILITATOR_TIMEOUT_SECS: &str = "NOVA402_FACILITATOR_TIMEOUT_SECS";
/// Network variable.
pub const ENV_NETWORK: &str = "NOVA402_NETWORK";

/// Where to settle and how long to wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilitatorConfig {
    /// Facilitator base URL.
    #[serde(default = "default_url")]
    pub url: Url,

    /// Settlement timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Network the application charges on, e.g. `base-sepolia`.
    #[serde(default)]
    pub network: Option<String>,
}

fn default_url() -> Url {
    Url::parse(TESTNET_FACILITATOR_URL).expect("valid constant URL")
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_SETTLE_TIMEOUT.as_secs()
}

impl Default for FacilitatorConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
            network: None,
        }
    }
}

impl FacilitatorConfig {
    /// Loads a `.env` file if one exists, then reads the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Unset or
    /// blank variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();
        if let Some(url) = var(ENV_FACILITATOR_URL) {
            config.url = Url::parse(&url).map_err(|source| ConfigError::InvalidUrl {
                value: url.clone(),
                source,
            })?;
        }
        if let Some(secs) = var(ENV_FACILITATOR_TIMEOUT_SECS) {
            config.timeout_secs = secs.parse().map_err(|source| ConfigError::InvalidTimeout {
                value: secs.clone(),
                source,
            })?;
        }
        config.network = var(ENV_NETWORK);
        Ok(config)
    }

    /// The settlement timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// USDC requirements on the configured network.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingNetwork`] when no network is set, and
    /// [`ConfigError::Network`] when the registry has no USDC entry for it.
    pub fn usdc_requirements(
        &self,
        registry: &NetworkRegistry,
        price: impl Into<String>,
        pay_to: impl Into<String>,
        resource: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<PaymentRequirementsBuilder, ConfigError> {
        let network = self.network.as_deref().ok_or(ConfigError::MissingNetwork)?;
        Ok(PaymentRequirements::usdc(
            registry,
            price,
            network,
            pay_to,
            resource,
            description,
        )?)
    }
}
