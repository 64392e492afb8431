//! Wire format types for x402 version 1 exact payments.
//!
//! All types serialize to JSON using camelCase field names, with the protocol
//! version carried in `x402Version`.
//!
//! # Key Types
//!
//! - [`PaymentRequirements`] - Payment terms set by the seller
//! - [`Payment402Response`] - HTTP 402 response body
//! - [`PaymentHeader`] / [`ExactPayload`] - The decoded `X-PAYMENT` header
//! - [`VerificationResult`] - Outcome of offline verification
//! - [`SettleRequest`] / [`SettlementResult`] - Facilitator settlement messages
//! - [`InvalidReason`] / [`ErrorReason`] - Rejection messages and codes

mod error;
mod payload;
mod requirements;
mod result;
mod version;

pub use error::{ErrorReason, InvalidReason};
pub use payload::{Eip3009Authorization, ExactPayload, PaymentHeader};
pub use requirements::{
    DEFAULT_MIME_TYPE, DEFAULT_TIMEOUT_SECONDS, EXACT_SCHEME, Payment402Response,
    PaymentRequirements, PaymentRequirementsBuilder, RequirementsExtra,
};
pub use result::{SettleRequest, SettlementResult, VerificationDetails, VerificationResult};
pub use version::{V1, Version, X402Version1};
