//! Signature extraction and ECDSA signer recovery.
//!
//! A payload carries its signature either as one 65-byte `r || s || v` hex
//! string or split into `r`, `s` and `v` on the authorization.

use alloy_primitives::{Address, B256, Signature, hex};
use nova402::proto::ExactPayload;

/// Length of an `r || s || v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// The signature bytes cannot be interpreted as a recoverable ECDSA signature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureFormatError {
    /// Not 65 bytes long.
    #[error("signature must be {SIGNATURE_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
    /// Recovery id other than 0, 1, 27 or 28.
    #[error("invalid recovery id v={0}")]
    InvalidRecoveryId(u64),
    /// `r`/`s` out of range, or no public key recovers from the digest.
    #[error("signature recovery failed: {0}")]
    Recovery(String),
}

/// The payload does not carry signature bytes that can even be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureExtractError {
    /// Neither `signature` nor the `r`/`s`/`v` triple is present.
    #[error("missing signature components")]
    Missing,
    /// A component is not valid hex.
    #[error("signature field {field} is not valid hex: {source}")]
    Hex {
        /// Offending field.
        field: &'static str,
        /// Underlying hex error.
        #[source]
        source: hex::FromHexError,
    },
    /// The parsed bytes are not a usable signature.
    #[error(transparent)]
    Format(#[from] SignatureFormatError),
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, SignatureExtractError> {
    hex::decode(value.trim()).map_err(|source| SignatureExtractError::Hex { field, source })
}

/// Assembles the 65 raw signature bytes of `payload`.
///
/// The top-level `signature` wins when both forms are present.
///
/// # Errors
///
/// Returns [`SignatureExtractError::Missing`] or [`SignatureExtractError::Hex`]
/// when the bytes cannot be read, and [`SignatureExtractError::Format`] for a
/// bad `v`.
pub fn signature_bytes(payload: &ExactPayload) -> Result<Vec<u8>, SignatureExtractError> {
    if let Some(signature) = &payload.signature {
        return decode_hex("signature", signature);
    }
    let auth = &payload.authorization;
    let (Some(r), Some(s), Some(v)) = (&auth.r, &auth.s, auth.v) else {
        return Err(SignatureExtractError::Missing);
    };
    let v = u8::try_from(v).map_err(|_| SignatureFormatError::InvalidRecoveryId(v))?;
    let mut bytes = decode_hex("r", r)?;
    bytes.extend(decode_hex("s", s)?);
    bytes.push(v);
    Ok(bytes)
}

/// Parses 65 `r || s || v` bytes. `v` may be 0/1 or 27/28.
///
/// # Errors
///
/// Returns [`SignatureFormatError`] for a wrong length or recovery id.
pub fn parse_signature(bytes: &[u8]) -> Result<Signature, SignatureFormatError> {
    if bytes.len() != SIGNATURE_LENGTH {
        return Err(SignatureFormatError::InvalidLength(bytes.len()));
    }
    let v = bytes[SIGNATURE_LENGTH - 1];
    if !matches!(v, 0 | 1 | 27 | 28) {
        return Err(SignatureFormatError::InvalidRecoveryId(u64::from(v)));
    }
    Signature::from_raw(bytes).map_err(|e| SignatureFormatError::Recovery(e.to_string()))
}

/// Recovers the address that produced `signature` over `digest`.
///
/// # Errors
///
/// Returns [`SignatureFormatError`] if the bytes are malformed or recovery fails.
pub fn recover_signer(digest: &B256, signature: &[u8]) -> Result<Address, SignatureFormatError> {
    parse_signature(signature)?
        .recover_address_from_prehash(digest)
        .map_err(|e| SignatureFormatError::Recovery(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::keccak256;
    use alloy_signer::SignerSync;
    use alloy_signer_local::PrivateKeySigner;
    use nova402::proto::Eip3009Authorization;
    use nova402::timestamp::UnixTimestamp;

    fn payload(signature: Option<String>, r: Option<&str>, s: Option<&str>, v: Option<u64>) -> ExactPayload {
        ExactPayload {
            signature,
            authorization: Eip3009Authorization {
                from: "0x01".into(),
                to: "0x02".into(),
                value: "1".into(),
                valid_after: UnixTimestamp::from_secs(0),
                valid_before: UnixTimestamp::from_secs(1),
                nonce: "0x03".into(),
                r: r.map(Into::into),
                s: s.map(Into::into),
                v,
            },
        }
    }

    #[test]
    fn test_recover_signer() {
        let signer = PrivateKeySigner::random();
        let digest = keccak256("nova402");
        let signature = signer.sign_hash_sync(&digest).unwrap();
        let recovered = recover_signer(&digest, &signature.as_bytes()).unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[test]
    fn test_recover_accepts_zero_one_parity() {
        let signer = PrivateKeySigner::random();
        let digest = keccak256("parity");
        let mut bytes = signer.sign_hash_sync(&digest).unwrap().as_bytes();
        bytes[64] -= 27;
        assert_eq!(recover_signer(&digest, &bytes).unwrap(), signer.address());
    }

    #[test]
    fn test_rejects_wrong_length_and_v() {
        let digest = keccak256("x");
        assert_eq!(
            recover_signer(&digest, &[0u8; 64]),
            Err(SignatureFormatError::InvalidLength(64))
        );
        let mut bytes = [1u8; 65];
        bytes[64] = 29;
        assert_eq!(
            recover_signer(&digest, &bytes),
            Err(SignatureFormatError::InvalidRecoveryId(29))
        );
    }

    #[test]
    fn test_split_components_are_joined() {
        let r = format!("0x{}", "11".repeat(32));
        let s = format!("0x{}", "22".repeat(32));
        let bytes = signature_bytes(&payload(None, Some(&r), Some(&s), Some(28))).unwrap();
        assert_eq!(bytes.len(), 65);
        assert_eq!(bytes[0], 0x11);
        assert_eq!(bytes[32], 0x22);
        assert_eq!(bytes[64], 28);
    }

    #[test]
    fn test_missing_and_malformed_components() {
        assert!(matches!(
            signature_bytes(&payload(None, Some("0x11"), None, Some(27))),
            Err(SignatureExtractError::Missing)
        ));
        assert!(matches!(
            signature_bytes(&payload(Some("0xzz".into()), None, None, None)),
            Err(SignatureExtractError::Hex { field: "signature", .. })
        ));
        assert!(matches!(
            signature_bytes(&payload(None, Some("0x11"), Some("0x22"), Some(300))),
            Err(SignatureExtractError::Format(SignatureFormatError::InvalidRecoveryId(300)))
        ));
    }
}
