//! Base64 transport encoding for payment headers.
//!
//! The `X-PAYMENT` header carries a [`PaymentHeader`] as standard base64 over
//! its UTF-8 JSON form. [`encode`] and [`decode`] implement both directions;
//! [`Base64Bytes`] is the raw byte wrapper they share with other call sites.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use std::fmt::Display;

use crate::proto::PaymentHeader;

/// A wrapper for base64-encoded byte data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64Bytes(pub Vec<u8>);

impl Base64Bytes {
    /// Decodes the base64 string bytes to raw binary data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        b64.decode(&self.0)
    }

    /// Encodes raw binary data into base64 string bytes.
    pub fn encode<T: AsRef<[u8]>>(input: T) -> Self {
        let encoded = b64.encode(input.as_ref());
        Self(encoded.into_bytes())
    }

    /// Serializes `value` to JSON and base64-encodes it.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be represented as JSON.
    pub fn encode_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_vec(value)?;
        Ok(Self::encode(json))
    }

    /// Returns the encoded text. Base64 output is always ASCII.
    #[must_use]
    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl AsRef<[u8]> for Base64Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Base64Bytes {
    fn from(slice: &[u8]) -> Self {
        Self(slice.to_vec())
    }
}

impl From<&str> for Base64Bytes {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl Display for Base64Bytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Failure to turn a transport string back into a [`PaymentHeader`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The input is not standard base64.
    #[error("malformed base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The decoded bytes are not UTF-8.
    #[error("decoded bytes are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// The decoded text is not JSON.
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),
    /// The JSON does not have the shape of a payment header.
    #[error("unexpected payment header structure: {0}")]
    Structure(#[source] serde_json::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            Self::Structure(err)
        } else {
            Self::Json(err)
        }
    }
}

/// Encodes a payment header for the `X-PAYMENT` transport.
#[must_use]
pub fn encode(header: &PaymentHeader) -> String {
    // Every field of PaymentHeader is plain JSON data, so serialization is total.
    Base64Bytes::encode_json(header)
        .map(Base64Bytes::into_string)
        .unwrap_or_default()
}

/// Decodes an `X-PAYMENT` value. Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`DecodeError`] describing which layer (base64, UTF-8, JSON or
/// structure) rejected the input.
#[cfg_attr(
    feature = "telemetry",
    tracing::instrument(name = "x402.header.decode", level = "debug", skip_all, err)
)]
pub fn decode(raw: &str) -> Result<PaymentHeader, DecodeError> {
    let bytes = Base64Bytes::from(raw.trim()).decode()?;
    let text = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&text)?)
}
