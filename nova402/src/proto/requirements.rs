//! Payment requirements and the 402 response body.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::version::{V1, X402Version1};
use crate::networks::{NetworkError, NetworkRegistry};

/// Scheme identifier of EIP-3009 "exact" transfers.
pub const EXACT_SCHEME: &str = "exact";

/// MIME type advertised when none is given.
pub const DEFAULT_MIME_TYPE: &str = "application/json";

/// Validity period advertised when none is given, in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

/// Open, scheme-specific extra data. The exact scheme reads `name` and
/// `version` (the token's EIP-712 domain); other keys pass through.
pub type RequirementsExtra = Map<String, Value>;

/// Payment terms set by the seller for one resource.
///
/// Amounts and addresses stay strings on the wire; they are parsed only by the
/// verifier, so one value can be reused across requests and networks.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// Protocol version (always 1).
    #[serde(default)]
    pub x402_version: X402Version1,
    /// The payment scheme (e.g., "exact").
    pub scheme: String,
    /// The network identifier (e.g., "base-sepolia").
    pub network: String,
    /// Amount required, as a base-10 integer in the token's smallest unit.
    pub max_amount_required: String,
    /// The resource URL being paid for.
    pub resource: String,
    /// Human-readable description of the resource.
    pub description: String,
    /// MIME type of the resource.
    pub mime_type: String,
    /// The recipient address for payment.
    pub pay_to: String,
    /// Maximum time in seconds for payment validity.
    pub max_timeout_seconds: u64,
    /// The token asset address.
    pub asset: String,
    /// Scheme-specific extra data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<RequirementsExtra>,
}

impl PaymentRequirements {
    /// Starts a builder with the mandatory terms. Optional terms default to
    /// scheme `"exact"`, MIME type `"application/json"` and a 300 s timeout.
    ///
    /// Nothing is validated here; an unknown network surfaces at verification.
    pub fn builder(
        price: impl Into<String>,
        asset: impl Into<String>,
        network: impl Into<String>,
        pay_to: impl Into<String>,
        resource: impl Into<String>,
        description: impl Into<String>,
    ) -> PaymentRequirementsBuilder {
        PaymentRequirementsBuilder {
            inner: Self {
                x402_version: V1,
                scheme: EXACT_SCHEME.to_owned(),
                network: network.into(),
                max_amount_required: price.into(),
                resource: resource.into(),
                description: description.into(),
                mime_type: DEFAULT_MIME_TYPE.to_owned(),
                pay_to: pay_to.into(),
                max_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
                asset: asset.into(),
                extra: None,
            },
        }
    }

    /// Like [`PaymentRequirements::builder`], with `asset` taken from the
    /// registry's USDC table for `network`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] if the network is unknown or has no USDC entry.
    pub fn usdc(
        registry: &NetworkRegistry,
        price: impl Into<String>,
        network: &str,
        pay_to: impl Into<String>,
        resource: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<PaymentRequirementsBuilder, NetworkError> {
        let asset = registry.usdc_address(network)?;
        Ok(Self::builder(
            price,
            asset,
            network,
            pay_to,
            resource,
            description,
        ))
    }

    /// Reads a string entry from `extra`.
    #[must_use]
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.as_ref()?.get(key)?.as_str()
    }
}

/// Chainable builder returned by [`PaymentRequirements::builder`].
#[derive(Debug, Clone)]
pub struct PaymentRequirementsBuilder {
    inner: PaymentRequirements,
}

impl PaymentRequirementsBuilder {
    /// Overrides the payment scheme.
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.inner.scheme = scheme.into();
        self
    }

    /// Overrides the MIME type of the resource.
    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.inner.mime_type = mime_type.into();
        self
    }

    /// Overrides the advertised validity period.
    #[must_use]
    pub const fn max_timeout_seconds(mut self, seconds: u64) -> Self {
        self.inner.max_timeout_seconds = seconds;
        self
    }

    /// Replaces the extra map.
    #[must_use]
    pub fn extra(mut self, extra: RequirementsExtra) -> Self {
        self.inner.extra = Some(extra);
        self
    }

    /// Sets a single extra entry, creating the map if needed.
    #[must_use]
    pub fn extra_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inner
            .extra
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the token's EIP-712 domain name and version in `extra`.
    #[must_use]
    pub fn eip712_domain(self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.extra_entry("name", name.into())
            .extra_entry("version", version.into())
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> PaymentRequirements {
        self.inner
    }
}

/// HTTP 402 Payment Required response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment402Response {
    /// Protocol version (always 1).
    pub x402_version: X402Version1,
    /// Acceptable payment options.
    #[serde(default)]
    pub accepts: Vec<PaymentRequirements>,
    /// Why an attached payment was rejected, if one was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Payment402Response {
    /// Builds a body listing the given options.
    pub fn new(accepts: impl Into<Vec<PaymentRequirements>>) -> Self {
        Self {
            x402_version: V1,
            accepts: accepts.into(),
            error: None,
        }
    }

    /// Attaches an error message.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

impl From<PaymentRequirements> for Payment402Response {
    fn from(requirements: PaymentRequirements) -> Self {
        Self::new(vec![requirements])
    }
}
