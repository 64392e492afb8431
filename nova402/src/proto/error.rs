//! Reasons a payment is rejected.
//!
//! [`InvalidReason`] is what the verifier reports; its `Display` form is the
//! human message placed in 402 bodies. [`ErrorReason`] is the stable
//! machine-readable code behind it.

use serde::{Deserialize, Serialize, Serializer};

/// Why a payment header failed verification.
///
/// Verification short-circuits, so exactly one reason is reported: the first
/// failing check in the order shape, network, amount, recipient, time,
/// signature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InvalidReason {
    /// The payload carries no usable `authorization` object.
    #[error("Missing authorization")]
    MissingAuthorization,
    /// The header targets a different network than the requirements.
    #[error("Network mismatch: expected {expected}, got {actual}")]
    NetworkMismatch {
        /// Network named by the requirements.
        expected: String,
        /// Network named by the header.
        actual: String,
    },
    /// The authorized value is below `maxAmountRequired`.
    #[error("Insufficient amount")]
    InsufficientAmount,
    /// The authorization pays someone other than `payTo`.
    #[error("Invalid recipient")]
    InvalidRecipient,
    /// The current time falls outside `[validAfter, validBefore]`.
    #[error("Payment expired or not yet valid")]
    ExpiredPayment,
    /// The signature does not recover to `from`, or cannot be parsed.
    #[error("Invalid signature")]
    InvalidSignature,
    /// An internal fault while evaluating the header.
    #[error("Verification error: {0}")]
    VerificationError(String),
}

impl InvalidReason {
    /// Returns the machine-readable code for this reason.
    #[must_use]
    pub const fn kind(&self) -> ErrorReason {
        match self {
            Self::MissingAuthorization => ErrorReason::MissingAuthorization,
            Self::NetworkMismatch { .. } => ErrorReason::NetworkMismatch,
            Self::InsufficientAmount => ErrorReason::InsufficientAmount,
            Self::InvalidRecipient => ErrorReason::InvalidRecipient,
            Self::ExpiredPayment => ErrorReason::ExpiredPayment,
            Self::InvalidSignature => ErrorReason::InvalidSignature,
            Self::VerificationError(_) => ErrorReason::VerificationError,
        }
    }

    /// Wraps any displayable fault as [`InvalidReason::VerificationError`].
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        Self::VerificationError(cause.to_string())
    }
}

impl Serialize for InvalidReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Machine-readable error reason codes for payment failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorReason {
    /// No authorization in the payload.
    MissingAuthorization,
    /// Header and requirements disagree on the network.
    NetworkMismatch,
    /// Authorized value too low.
    InsufficientAmount,
    /// Wrong recipient.
    InvalidRecipient,
    /// Outside the validity window.
    ExpiredPayment,
    /// Signature rejected.
    InvalidSignature,
    /// Internal verification fault.
    VerificationError,
    /// The `X-PAYMENT` header could not be decoded.
    InvalidPaymentHeader,
    /// The facilitator did not settle the payment.
    SettlementFailed,
}

impl ErrorReason {
    /// Returns the `snake_case` string representation matching the wire format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingAuthorization => "missing_authorization",
            Self::NetworkMismatch => "network_mismatch",
            Self::InsufficientAmount => "insufficient_amount",
            Self::InvalidRecipient => "invalid_recipient",
            Self::ExpiredPayment => "expired_payment",
            Self::InvalidSignature => "invalid_signature",
            Self::VerificationError => "verification_error",
            Self::InvalidPaymentHeader => "invalid_payment_header",
            Self::SettlementFailed => "settlement_failed",
        }
    }
}

impl core::fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
