//! Error types of the HTTP layer.

use http::StatusCode;

/// Errors that can occur while interacting with a remote facilitator.
///
/// [`FacilitatorClient::settle`](crate::FacilitatorClient::settle) folds these
/// into a failed [`SettlementResult`](nova402::proto::SettlementResult) using
/// their display text.
#[derive(Debug, thiserror::Error)]
pub enum FacilitatorClientError {
    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// Connection failure, TLS failure or timeout.
    #[error("Facilitator request failed: {context}: {source}")]
    Transport {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The facilitator answered with a status other than 200.
    #[error("Facilitator returned {}", .status.as_u16())]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body, kept for logs only.
        body: String,
    },
    /// A 200 response whose body is not a settlement result.
    #[error("Malformed facilitator response: {context}: {source}")]
    ResponseMalformed {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

impl FacilitatorClientError {
    /// Whether the request gave up waiting for the facilitator.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }
}

/// Errors while loading [`FacilitatorConfig`](crate::config::FacilitatorConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The facilitator URL does not parse.
    #[error("invalid facilitator URL {value:?}: {source}")]
    InvalidUrl {
        /// The offending value.
        value: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// The timeout is not a whole number of seconds.
    #[error("invalid facilitator timeout {value:?}: {source}")]
    InvalidTimeout {
        /// The offending value.
        value: String,
        /// The underlying parse error.
        #[source]
        source: std::num::ParseIntError,
    },
    /// Requirements were requested but no network is configured.
    #[error("no network configured; set NOVA402_NETWORK")]
    MissingNetwork,
    /// The configured network cannot carry USDC requirements.
    #[error(transparent)]
    Network(#[from] nova402::NetworkError),
}
