//! Outcomes of verification and settlement, and the facilitator request.

use serde::{Deserialize, Serialize};

use super::error::InvalidReason;
use super::requirements::PaymentRequirements;
use super::version::{V1, X402Version1};

/// Who paid whom how much, reported for an accepted payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationDetails {
    /// Payer address as sent by the client.
    pub from: String,
    /// Payee address as sent by the client.
    pub to: String,
    /// Authorized amount in the token's smallest unit.
    pub amount: String,
}

/// Outcome of offline verification.
///
/// `invalid_reason` is present exactly when the payment is invalid, and
/// `details` exactly when it is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    is_valid: bool,
    invalid_reason: Option<InvalidReason>,
    details: Option<VerificationDetails>,
}

impl VerificationResult {
    /// An accepted payment.
    #[must_use]
    pub const fn valid(details: VerificationDetails) -> Self {
        Self {
            is_valid: true,
            invalid_reason: None,
            details: Some(details),
        }
    }

    /// A rejected payment.
    #[must_use]
    pub const fn invalid(reason: InvalidReason) -> Self {
        Self {
            is_valid: false,
            invalid_reason: Some(reason),
            details: None,
        }
    }

    /// Whether the payment was accepted.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Why the payment was rejected.
    #[must_use]
    pub const fn invalid_reason(&self) -> Option<&InvalidReason> {
        self.invalid_reason.as_ref()
    }

    /// Details of an accepted payment.
    #[must_use]
    pub const fn details(&self) -> Option<&VerificationDetails> {
        self.details.as_ref()
    }
}

impl From<Result<VerificationDetails, InvalidReason>> for VerificationResult {
    fn from(result: Result<VerificationDetails, InvalidReason>) -> Self {
        match result {
            Ok(details) => Self::valid(details),
            Err(reason) => Self::invalid(reason),
        }
    }
}

/// Facilitator's answer to a settlement request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResult {
    /// Whether the transfer was executed. Missing on the wire means `false`.
    #[serde(default)]
    pub success: bool,
    /// Transaction hash of the executed transfer.
    #[serde(default)]
    pub tx_hash: Option<String>,
    /// Network the transfer landed on.
    #[serde(default)]
    pub network_id: Option<String>,
    /// Block containing the transfer.
    #[serde(default)]
    pub block_number: Option<u64>,
    /// Failure description.
    #[serde(default)]
    pub error: Option<String>,
}

impl SettlementResult {
    /// A failed settlement carrying only an error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Body of `POST {facilitator}/settle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleRequest {
    /// Protocol version (always 1).
    pub x402_version: X402Version1,
    /// The `X-PAYMENT` value, base64 encoded.
    pub payment_header: String,
    /// The requirements the payment was verified against.
    pub payment_requirements: PaymentRequirements,
}

impl SettleRequest {
    /// Creates a request for an already encoded header.
    #[must_use]
    pub const fn new(payment_header: String, payment_requirements: PaymentRequirements) -> Self {
        Self {
            x402_version: V1,
            payment_header,
            payment_requirements,
        }
    }
}
