//! Internal faults of exact-scheme verification.

use nova402::networks::NetworkError;
use nova402::proto::InvalidReason;

use super::signature::{SignatureExtractError, SignatureFormatError};

/// A fault that stops verification before a verdict is reached.
///
/// All variants except [`ExactVerifyError::SignatureFormat`] are reported as
/// `Verification error: <cause>`; an unparseable signature is reported as
/// `Invalid signature`.
#[derive(Debug, thiserror::Error)]
pub enum ExactVerifyError {
    /// A field that must hold an address does not.
    #[error("invalid address in {field}: {value:?}")]
    InvalidAddress {
        /// Wire field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// A field that must hold a base-10 uint256 does not.
    #[error("invalid uint256 in {field}: {value:?}")]
    InvalidAmount {
        /// Wire field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// The nonce is not 32 bytes of hex.
    #[error("invalid nonce: {0:?}")]
    InvalidNonce(String),
    /// The network cannot be used for EIP-712 signing.
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// The signature bytes cannot be read from the payload.
    #[error(transparent)]
    SignatureExtract(SignatureExtractError),
    /// The signature bytes are not a recoverable signature.
    #[error(transparent)]
    SignatureFormat(#[from] SignatureFormatError),
}

impl From<SignatureExtractError> for ExactVerifyError {
    fn from(err: SignatureExtractError) -> Self {
        match err {
            SignatureExtractError::Format(format) => Self::SignatureFormat(format),
            other => Self::SignatureExtract(other),
        }
    }
}

impl From<ExactVerifyError> for InvalidReason {
    fn from(err: ExactVerifyError) -> Self {
        match err {
            ExactVerifyError::SignatureFormat(_) => Self::InvalidSignature,
            other => Self::internal(other),
        }
    }
}
