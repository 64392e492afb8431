//! EVM "exact" payment scheme.
//!
//! The scheme moves tokens with ERC-3009 `transferWithAuthorization`: the
//! payer signs an EIP-712 authorization off-chain and the facilitator submits
//! it. This module verifies such authorizations ([`verify`]) and assembles them
//! on the payer's side ([`client`]).

pub mod client;
pub mod error;
pub mod signature;
pub mod types;
pub mod verify;

pub use client::{AuthorizationError, UnsignedAuthorization};
pub use error::ExactVerifyError;
pub use types::{DEFAULT_USDC_NAME, DEFAULT_USDC_VERSION, TransferWithAuthorization};
pub use verify::{ExactVerifier, verify, verify_at};
