//! The `X-PAYMENT` header model.
//!
//! A [`PaymentHeader`] keeps its `payload` as raw JSON because the payload
//! shape depends on the scheme. [`ExactPayload`] is the typed view for the
//! `"exact"` scheme. Authorization fields are kept as strings here: turning
//! them into addresses and integers is the verifier's job, and a malformed
//! value must surface as a verification failure rather than a decode error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::version::{V1, X402Version1};
use crate::timestamp::UnixTimestamp;

/// Decoded `X-PAYMENT` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHeader {
    /// Protocol version (always 1).
    pub x402_version: X402Version1,
    /// The payment scheme (e.g., "exact").
    pub scheme: String,
    /// The network identifier (e.g., "base-sepolia").
    pub network: String,
    /// Scheme-specific signed payload.
    pub payload: Value,
}

impl PaymentHeader {
    /// Wraps an exact-scheme payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be represented as JSON.
    pub fn exact(
        network: impl Into<String>,
        payload: &ExactPayload,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            x402_version: V1,
            scheme: super::EXACT_SCHEME.to_owned(),
            network: network.into(),
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Reads `payload.authorization`, or `None` when it is absent, `null`, or
    /// not an object of the expected shape.
    #[must_use]
    pub fn exact_authorization(&self) -> Option<Eip3009Authorization> {
        Eip3009Authorization::deserialize(self.payload.get("authorization")?).ok()
    }

    /// Reads the payload as an exact-scheme payload.
    ///
    /// Only the authorization decides whether a payload is present. A
    /// `signature` that is not a string is kept as its JSON text so signature
    /// checks reject it later.
    #[must_use]
    pub fn exact_payload(&self) -> Option<ExactPayload> {
        let authorization = self.exact_authorization()?;
        let signature = match self.payload.get("signature") {
            None | Some(Value::Null) => None,
            Some(Value::String(signature)) => Some(signature.clone()),
            Some(other) => Some(other.to_string()),
        };
        Some(ExactPayload {
            signature,
            authorization,
        })
    }
}

/// Payload of the `"exact"` scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactPayload {
    /// 65-byte `r || s || v` signature as `0x`-prefixed hex. When absent the
    /// signature is taken from `authorization.r`/`s`/`v`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// The signed EIP-3009 authorization.
    pub authorization: Eip3009Authorization,
}

/// EIP-3009 `TransferWithAuthorization` parameters as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip3009Authorization {
    /// Payer address.
    pub from: String,
    /// Payee address.
    pub to: String,
    /// Amount as a base-10 integer in the token's smallest unit.
    pub value: String,
    /// Earliest second the authorization is usable.
    pub valid_after: UnixTimestamp,
    /// Last second the authorization is usable.
    pub valid_before: UnixTimestamp,
    /// 32-byte nonce as `0x`-prefixed hex.
    pub nonce: String,
    /// Signature `r` component, 32-byte hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<String>,
    /// Signature `s` component, 32-byte hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
    /// Signature recovery id: 0, 1, 27 or 28.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<u64>,
}
