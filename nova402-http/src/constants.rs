//! HTTP-level constants of the x402 v1 exchange.

use std::time::Duration;

/// Request header carrying the base64 payment header (client → server).
pub const X_PAYMENT_HEADER: &str = "X-PAYMENT";

/// Response header carrying the base64 settlement result (server → client).
pub const X_PAYMENT_RESPONSE_HEADER: &str = "X-PAYMENT-RESPONSE";

/// CORS header name for exposing custom headers.
pub const ACCESS_CONTROL_EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";

/// HTTP 402 Payment Required status code.
pub const HTTP_STATUS_PAYMENT_REQUIRED: u16 = 402;

/// HTTP 502 Bad Gateway, returned when the facilitator fails to settle.
pub const HTTP_STATUS_BAD_GATEWAY: u16 = 502;

/// Production facilitator.
pub const MAINNET_FACILITATOR_URL: &str = "https://facilitator.payai.network";

/// Testnet facilitator, the default.
pub const TESTNET_FACILITATOR_URL: &str = "https://testnet-facilitator.payai.network";

/// Facilitator running on the developer's machine.
pub const LOCAL_FACILITATOR_URL: &str = "http://localhost:3001";

/// Upper bound on one settlement round-trip unless configured otherwise.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(30);
