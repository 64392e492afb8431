#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EIP-155 (EVM) support for nova402.
//!
//! Verification of x402 v1 "exact" payments signed as ERC-3009
//! `transferWithAuthorization` under the token's EIP-712 domain. Everything
//! here is offline: no RPC calls, no key management, no nonce store.
//!
//! ```ignore
//! use nova402::{decode, proto::PaymentRequirements, NetworkRegistry};
//! use nova402_evm::ExactVerifier;
//!
//! let verifier = ExactVerifier::new(NetworkRegistry::known());
//! let header = decode(x_payment)?;
//! let result = verifier.verify(&header, &requirements);
//! if !result.is_valid() {
//!     return reject(result.invalid_reason());
//! }
//! ```
//!
//! # Modules
//!
//! - [`chain`] - chain id resolution from network names and CAIP-2 ids
//! - [`exact`] - EIP-712 types, signature recovery, verification and payer-side assembly
//!
//! # Feature Flags
//!
//! - `telemetry` - `tracing` spans and events around verification

pub mod chain;
pub mod exact;

pub use exact::{ExactVerifier, UnsignedAuthorization, verify, verify_at};
