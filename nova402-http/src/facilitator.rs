//! Settlement through a _remote_ x402 facilitator over HTTP.
//!
//! [`FacilitatorClient`] posts verified payments to `POST {base}/settle` and
//! folds every outcome, including transport failures, into a
//! [`SettlementResult`]. It never retries.
//!
//! ## Features
//!
//! - Uses `reqwest` for async HTTP requests
//! - Bounded by a configurable timeout (30 s by default)
//! - Optional custom headers, e.g. an API key
//! - Integrates with `tracing` if the `telemetry` feature is enabled

use http::{HeaderMap, StatusCode};
use nova402::proto::{PaymentHeader, PaymentRequirements, SettleRequest, SettlementResult};
use reqwest::Client;
use std::fmt::Display;
use std::time::Duration;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

use crate::config::FacilitatorConfig;
use crate::constants::DEFAULT_SETTLE_TIMEOUT;
use crate::error::FacilitatorClientError;

/// Something that can settle a verified payment.
///
/// Implementations must report every failure inside the returned
/// [`SettlementResult`] rather than panicking or hanging past their timeout.
pub trait Facilitator {
    /// Settles `header` against the requirements it was verified with.
    fn settle(
        &self,
        header: &PaymentHeader,
        requirements: &PaymentRequirements,
    ) -> impl Future<Output = SettlementResult> + Send;
}

/// A client for communicating with a remote x402 facilitator.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct FacilitatorClient {
    /// Base URL of the facilitator (e.g. `https://facilitator.example/`)
    base_url: Url,
    /// Full URL to `POST /settle` requests
    settle_url: Url,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Custom headers sent with each request
    headers: HeaderMap,
    /// Request timeout
    timeout: Duration,
}

impl Facilitator for FacilitatorClient {
    async fn settle(
        &self,
        header: &PaymentHeader,
        requirements: &PaymentRequirements,
    ) -> SettlementResult {
        Self::settle(self, header, requirements).await
    }
}

impl FacilitatorClient {
    /// Returns the base URL used by this client.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the computed `./settle` URL relative to [`FacilitatorClient::base_url`].
    pub const fn settle_url(&self) -> &Url {
        &self.settle_url
    }

    /// Returns any custom headers configured on the client.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Constructs a new [`FacilitatorClient`] from a base URL.
    ///
    /// A missing trailing slash is added so that `settle` resolves under the
    /// base path rather than replacing its last segment.
    ///
    /// # Errors
    ///
    /// Returns [`FacilitatorClientError`] if URL construction fails.
    pub fn try_new(mut base_url: Url) -> Result<Self, FacilitatorClientError> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let settle_url =
            base_url
                .join("./settle")
                .map_err(|e| FacilitatorClientError::UrlParse {
                    context: "Failed to construct ./settle URL",
                    source: e,
                })?;
        Ok(Self {
            client: Client::new(),
            base_url,
            settle_url,
            headers: HeaderMap::new(),
            timeout: DEFAULT_SETTLE_TIMEOUT,
        })
    }

    /// Constructs a client for the configured facilitator and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FacilitatorClientError`] if URL construction fails.
    pub fn from_config(config: &FacilitatorConfig) -> Result<Self, FacilitatorClientError> {
        Ok(Self::try_new(config.url.clone())?.with_timeout(config.timeout()))
    }

    /// Attaches custom headers to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Settles a verified payment.
    ///
    /// The header is re-encoded and sent along with the requirements. Any
    /// failure, from a refused connection to an unparseable answer, comes back
    /// as `success = false` with the cause in `error`.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "x402.facilitator_client.settle",
            skip_all,
            fields(
                network = %requirements.network,
                url = %self.settle_url,
                timeout = ?self.timeout,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn settle(
        &self,
        header: &PaymentHeader,
        requirements: &PaymentRequirements,
    ) -> SettlementResult {
        let request = SettleRequest::new(nova402::encode(header), requirements.clone());
        match self.settle_request(&request).await {
            Ok(result) => {
                #[cfg(feature = "telemetry")]
                {
                    if !result.success {
                        tracing::warn!(error = ?result.error, "facilitator declined settlement");
                    }
                }
                result
            }
            Err(err) => SettlementResult::failure(err.to_string()),
        }
    }

    /// Sends a `POST /settle` request to the facilitator.
    ///
    /// # Errors
    ///
    /// Returns [`FacilitatorClientError`] if the request fails, the status is
    /// not 200, or the body is not a settlement result.
    pub async fn settle_request(
        &self,
        request: &SettleRequest,
    ) -> Result<SettlementResult, FacilitatorClientError> {
        self.post_json(&self.settle_url, "POST /settle", request)
            .await
    }

    /// Generic POST helper that handles JSON serialization, error mapping,
    /// timeout application, and telemetry integration.
    ///
    /// `context` is a human-readable identifier used in tracing and error messages (e.g. `"POST /settle"`).
    async fn post_json<T, R>(
        &self,
        url: &Url,
        context: &'static str,
        payload: &T,
    ) -> Result<R, FacilitatorClientError>
    where
        T: serde::Serialize + Sync + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let mut req = self
            .client
            .post(url.clone())
            .json(payload)
            .timeout(self.timeout);
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| FacilitatorClientError::Transport { context, source: e })?;

        let result = if http_response.status() == StatusCode::OK {
            http_response
                .json::<R>()
                .await
                .map_err(|e| FacilitatorClientError::ResponseMalformed { context, source: e })
        } else {
            let status = http_response.status();
            let body = http_response.text().await.unwrap_or_default();
            Err(FacilitatorClientError::HttpStatus {
                context,
                status,
                body,
            })
        };

        record_result_on_span(&result);

        result
    }
}

/// Converts a string URL into a `FacilitatorClient`, parsing the URL and calling `try_new`.
impl TryFrom<&str> for FacilitatorClient {
    type Error = FacilitatorClientError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut normalized = value.trim().trim_end_matches('/').to_owned();
        normalized.push('/');
        let url = Url::parse(&normalized).map_err(|e| FacilitatorClientError::UrlParse {
            context: "Failed to parse base url",
            source: e,
        })?;
        Self::try_new(url)
    }
}

/// Converts a String URL into a `FacilitatorClient`.
impl TryFrom<String> for FacilitatorClient {
    type Error = FacilitatorClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Settles through the facilitator at `facilitator_url` with the default
/// 30 s timeout.
///
/// An unparseable URL is reported like any other failure, in the result.
pub async fn settle(
    header: &PaymentHeader,
    requirements: &PaymentRequirements,
    facilitator_url: &str,
) -> SettlementResult {
    match FacilitatorClient::try_from(facilitator_url) {
        Ok(client) => client.settle(header, requirements).await,
        Err(err) => SettlementResult::failure(err.to_string()),
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to facilitator failed");
        }
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde_json::json;
    use std::time::Instant;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payment_header() -> PaymentHeader {
        serde_json::from_value(json!({
            "x402Version": 1,
            "scheme": "exact",
            "network": "base-sepolia",
            "payload": {
                "signature": "0x00",
                "authorization": {
                    "from": "0x857b06519E91e3A54538791bDbb0E22373e36b66",
                    "to": "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",
                    "value": "100000",
                    "validAfter": 1_700_000_000_u64,
                    "validBefore": 1_700_000_300_u64,
                    "nonce": "0x01"
                }
            }
        }))
        .unwrap()
    }

    fn requirements() -> PaymentRequirements {
        PaymentRequirements::builder(
            "100000",
            "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
            "base-sepolia",
            "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",
            "https://api.example.com/premium",
            "Premium data",
        )
        .build()
    }

    async fn client_for(server: &MockServer) -> FacilitatorClient {
        FacilitatorClient::try_from(server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_settle_success() {
        let server = MockServer::start().await;
        let header = payment_header();
        Mock::given(method("POST"))
            .and(path("/settle"))
            .and(body_partial_json(json!({
                "x402Version": 1,
                "paymentHeader": nova402::encode(&header),
                "paymentRequirements": { "network": "base-sepolia", "maxAmountRequired": "100000" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "txHash": "0xabc",
                "networkId": "base-sepolia",
                "blockNumber": 123
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).await.settle(&header, &requirements()).await;
        assert!(result.success);
        assert_eq!(result.tx_hash.as_deref(), Some("0xabc"));
        assert_eq!(result.network_id.as_deref(), Some("base-sepolia"));
        assert_eq!(result.block_number, Some(123));
        assert_eq!(result.error, None);
    }

    #[tokio::test]
    async fn test_settle_non_200_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/settle"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .await
            .settle(&payment_header(), &requirements())
            .await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Facilitator returned 500"));
        assert_eq!(result.tx_hash, None);
    }

    #[tokio::test]
    async fn test_settle_missing_success_defaults_to_false() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/settle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": "insufficient funds"
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .await
            .settle(&payment_header(), &requirements())
            .await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("insufficient funds"));
    }

    #[tokio::test]
    async fn test_settle_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/settle"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let request = SettleRequest::new(nova402::encode(&payment_header()), requirements());
        assert!(matches!(
            client.settle_request(&request).await,
            Err(FacilitatorClientError::ResponseMalformed { .. })
        ));

        let result = client.settle(&payment_header(), &requirements()).await;
        assert!(!result.success);
        assert!(
            result
                .error
                .unwrap()
                .starts_with("Malformed facilitator response")
        );
    }

    #[tokio::test]
    async fn test_settle_timeout_returns_promptly() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/settle"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server)
            .await
            .with_timeout(Duration::from_millis(200));
        let request = SettleRequest::new(nova402::encode(&payment_header()), requirements());

        let started = Instant::now();
        let err = client.settle_request(&request).await.unwrap_err();
        assert!(err.is_timeout(), "{err}");
        assert!(started.elapsed() < Duration::from_secs(3));

        let result = client.settle(&payment_header(), &requirements()).await;
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_custom_headers_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/settle"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("secret"));
        let client = client_for(&server).await.with_headers(headers);
        assert!(client.settle(&payment_header(), &requirements()).await.success);
    }

    #[tokio::test]
    async fn test_free_settle_reports_bad_url() {
        let result = settle(&payment_header(), &requirements(), "not a url").await;
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("URL parse error"));
    }

    #[tokio::test]
    async fn test_free_settle_through_trait() {
        async fn via<F: Facilitator>(f: &F) -> SettlementResult {
            f.settle(&payment_header(), &requirements()).await
        }

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/settle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        assert!(via(&client_for(&server).await).await.success);
        assert!(
            settle(&payment_header(), &requirements(), &server.uri())
                .await
                .success
        );
    }

    #[test]
    fn test_settle_url_is_relative_to_base() {
        for base in ["http://facilitator.test/api", "http://facilitator.test/api/", "http://facilitator.test/api//"] {
            let client = FacilitatorClient::try_from(base).unwrap();
            assert_eq!(client.settle_url().as_str(), "http://facilitator.test/api/settle");
        }
        let client = FacilitatorClient::try_new(Url::parse("http://facilitator.test/api").unwrap()).unwrap();
        assert_eq!(client.settle_url().as_str(), "http://facilitator.test/api/settle");
        assert_eq!(client.timeout(), DEFAULT_SETTLE_TIMEOUT);
    }
}
