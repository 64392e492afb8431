//! Encoding and decoding of the x402 v1 HTTP headers.
//!
//! `X-PAYMENT` carries a base64 [`PaymentHeader`]; `X-PAYMENT-RESPONSE`
//! carries a base64 [`SettlementResult`]. Both are standard base64 of UTF-8
//! JSON.

use http::HeaderMap;
use nova402::encoding::{Base64Bytes, DecodeError};
use nova402::proto::{PaymentHeader, SettlementResult};

use crate::constants::X_PAYMENT_HEADER;

/// Returns the raw `X-PAYMENT` value of a request, if present and ASCII.
#[must_use]
pub fn x_payment_value(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(X_PAYMENT_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Decodes the `X-PAYMENT` header of a request.
///
/// Returns `None` if the header is absent.
///
/// # Errors
///
/// Returns [`DecodeError`] if the header is present but malformed.
pub fn decode_x_payment(headers: &HeaderMap) -> Option<Result<PaymentHeader, DecodeError>> {
    x_payment_value(headers).map(nova402::decode)
}

/// Encodes a [`SettlementResult`] for the `X-PAYMENT-RESPONSE` header.
#[must_use]
pub fn encode_payment_response(result: &SettlementResult) -> String {
    // SettlementResult holds only strings, a bool and a number.
    Base64Bytes::encode_json(result)
        .map(Base64Bytes::into_string)
        .unwrap_or_default()
}

/// Decodes an `X-PAYMENT-RESPONSE` value.
///
/// # Errors
///
/// Returns [`DecodeError`] on base64, UTF-8 or JSON failure.
pub fn decode_payment_response(value: &str) -> Result<SettlementResult, DecodeError> {
    let bytes = Base64Bytes::from(value.trim()).decode()?;
    let text = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_payment_response_header() {
        let result = SettlementResult {
            success: true,
            tx_hash: Some("0xabc".into()),
            network_id: Some("base-sepolia".into()),
            block_number: Some(7),
            error: None,
        };
        let encoded = encode_payment_response(&result);
        assert!(encoded.is_ascii());
        assert_eq!(decode_payment_response(&encoded).unwrap(), result);
    }

    #[test]
    fn test_x_payment_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        assert!(decode_x_payment(&headers).is_none());

        headers.insert("x-payment", HeaderValue::from_static("%%%"));
        assert_eq!(x_payment_value(&headers), Some("%%%"));
        assert!(matches!(
            decode_x_payment(&headers),
            Some(Err(DecodeError::Base64(_)))
        ));
    }
}
