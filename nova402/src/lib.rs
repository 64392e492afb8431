#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for x402 "exact" payments.
//!
//! A server answers an unpaid request with HTTP 402 and a list of
//! [`PaymentRequirements`](proto::PaymentRequirements). The client retries with
//! an `X-PAYMENT` header holding a signed EIP-3009 authorization. This crate
//! holds the chain-agnostic pieces of that exchange; signature checking lives
//! in `nova402-evm` and the HTTP/facilitator side in `nova402-http`.
//!
//! # Modules
//!
//! - [`amount`] - Smallest-unit ⇄ human decimal conversion
//! - [`chain`] - CAIP-2 chain identifiers
//! - [`encoding`] - Base64 transport codec for payment headers
//! - [`networks`] - Registry of supported networks and their USDC deployments
//! - [`nonce`] - Authorization nonce generation
//! - [`proto`] - Wire format types
//! - [`timestamp`] - Unix timestamps and validity windows
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation (on by default)

pub mod amount;
pub mod chain;
pub mod encoding;
pub mod networks;
pub mod nonce;
pub mod proto;
pub mod timestamp;

pub use encoding::{DecodeError, decode, encode};
pub use networks::{NetworkConfig, NetworkError, NetworkKind, NetworkRegistry};
pub use nonce::generate_nonce;
pub use timestamp::{UnixTimestamp, ValidityWindow, validity_window};
