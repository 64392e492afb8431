#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP side of nova402: facilitator settlement and the payment gate.
//!
//! # Modules
//!
//! - [`config`] - Facilitator URL and timeout from the environment
//! - [`constants`] - Header names, status codes, default facilitator URLs
//! - [`error`] - Facilitator client and configuration errors
//! - [`facilitator`] - HTTP facilitator client and the [`Facilitator`] seam
//! - [`headers`] - `X-PAYMENT` and `X-PAYMENT-RESPONSE` codecs
//! - [`paygate`] - Framework-agnostic payment gate
//!
//! # Feature Flags
//!
//! - `telemetry` - `tracing` spans around settlement and gating (on by default)

pub mod config;
pub mod constants;
pub mod error;
pub mod facilitator;
pub mod headers;
pub mod paygate;

pub use config::FacilitatorConfig;
pub use error::{ConfigError, FacilitatorClientError};
pub use facilitator::{Facilitator, FacilitatorClient, settle};
pub use paygate::{Paygate, PaymentReceipt, PaymentRejection, SettlementPolicy};
