//! Offline verification of exact-scheme payments.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. the payload carries an authorization
//! 2. header and requirements name the same network
//! 3. `value >= maxAmountRequired`
//! 4. `to` equals `payTo`, ignoring case
//! 5. `validAfter <= now <= validBefore`
//! 6. the EIP-712 signature recovers to `from`
//!
//! Nothing here touches the network or the ledger. Replay protection is the
//! facilitator's job: the token contract rejects a reused nonce at settlement.

use alloy_primitives::{Address, B256, U256};
use nova402::networks::NetworkRegistry;
use nova402::proto::{
    ExactPayload, InvalidReason, PaymentHeader, PaymentRequirements, VerificationDetails,
    VerificationResult,
};
use nova402::timestamp::{UnixTimestamp, ValidityWindow};
use std::sync::{Arc, LazyLock};
#[cfg(feature = "telemetry")]
use tracing::instrument;

use super::error::ExactVerifyError;
use super::signature::{recover_signer, signature_bytes};
use super::types::{TransferWithAuthorization, signing_hash, token_domain};
use crate::chain::resolve_chain_id;

static KNOWN_NETWORKS: LazyLock<NetworkRegistry> = LazyLock::new(NetworkRegistry::known);

/// Verifier for exact-scheme payment headers.
///
/// Holds the network registry used to resolve chain ids. Stateless otherwise,
/// so one instance can serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct ExactVerifier {
    registry: Arc<NetworkRegistry>,
}

impl ExactVerifier {
    /// Creates a verifier over `registry`.
    #[must_use]
    pub fn new(registry: NetworkRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Creates a verifier over a registry shared with other components.
    #[must_use]
    pub const fn from_shared(registry: Arc<NetworkRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this verifier resolves networks against.
    #[must_use]
    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    /// Verifies `header` against `requirements` at the current time.
    #[must_use]
    pub fn verify(
        &self,
        header: &PaymentHeader,
        requirements: &PaymentRequirements,
    ) -> VerificationResult {
        self.verify_at(header, requirements, UnixTimestamp::now())
    }

    /// Verifies `header` against `requirements` as of `now`.
    #[must_use]
    pub fn verify_at(
        &self,
        header: &PaymentHeader,
        requirements: &PaymentRequirements,
        now: UnixTimestamp,
    ) -> VerificationResult {
        verify_with(&self.registry, header, requirements, now)
    }
}

impl Default for ExactVerifier {
    fn default() -> Self {
        Self::new(NetworkRegistry::known())
    }
}

/// Verifies against the built-in network table at the current time.
#[must_use]
pub fn verify(header: &PaymentHeader, requirements: &PaymentRequirements) -> VerificationResult {
    verify_at(header, requirements, UnixTimestamp::now())
}

/// Verifies against the built-in network table as of `now`.
#[must_use]
pub fn verify_at(
    header: &PaymentHeader,
    requirements: &PaymentRequirements,
    now: UnixTimestamp,
) -> VerificationResult {
    verify_with(&KNOWN_NETWORKS, header, requirements, now)
}

#[cfg_attr(feature = "telemetry", instrument(
    name = "x402.exact.verify",
    skip_all,
    fields(network = %header.network, now = %now)
))]
fn verify_with(
    registry: &NetworkRegistry,
    header: &PaymentHeader,
    requirements: &PaymentRequirements,
    now: UnixTimestamp,
) -> VerificationResult {
    let outcome = check_payment(registry, header, requirements, now);
    #[cfg(feature = "telemetry")]
    {
        match &outcome {
            Ok(details) => {
                tracing::debug!(payer = %details.from, amount = %details.amount, "payment verified");
            }
            Err(reason) => {
                tracing::debug!(code = %reason.kind(), reason = %reason, "payment rejected");
            }
        }
    }
    outcome.into()
}

fn check_payment(
    registry: &NetworkRegistry,
    header: &PaymentHeader,
    requirements: &PaymentRequirements,
    now: UnixTimestamp,
) -> Result<VerificationDetails, InvalidReason> {
    let payload = header
        .exact_payload()
        .ok_or(InvalidReason::MissingAuthorization)?;
    let auth = &payload.authorization;

    assert_network(header, requirements)?;

    let value = parse_uint("value", &auth.value)?;
    let required = parse_uint("maxAmountRequired", &requirements.max_amount_required)?;
    assert_enough_value(value, required)?;

    assert_recipient(&auth.to, &requirements.pay_to)?;

    let window = ValidityWindow::new(auth.valid_after, auth.valid_before);
    assert_time(&window, now)?;

    let (signer, payer) = recover_payer(registry, &payload, requirements, value, window)?;
    if signer != payer {
        return Err(InvalidReason::InvalidSignature);
    }

    Ok(VerificationDetails {
        from: auth.from.clone(),
        to: auth.to.clone(),
        amount: auth.value.clone(),
    })
}

/// Checks that the header targets the network named by the requirements.
///
/// # Errors
///
/// Returns [`InvalidReason::NetworkMismatch`] naming both networks.
pub fn assert_network(
    header: &PaymentHeader,
    requirements: &PaymentRequirements,
) -> Result<(), InvalidReason> {
    if header.network == requirements.network {
        Ok(())
    } else {
        Err(InvalidReason::NetworkMismatch {
            expected: requirements.network.clone(),
            actual: header.network.clone(),
        })
    }
}

/// Verifies that the declared `value` covers the required amount.
///
/// # Errors
///
/// Returns [`InvalidReason::InsufficientAmount`] if `sent < max_amount_required`.
pub fn assert_enough_value(sent: U256, max_amount_required: U256) -> Result<(), InvalidReason> {
    if sent < max_amount_required {
        Err(InvalidReason::InsufficientAmount)
    } else {
        Ok(())
    }
}

/// Compares recipient addresses as strings, ignoring ASCII case.
///
/// # Errors
///
/// Returns [`InvalidReason::InvalidRecipient`] on mismatch.
pub fn assert_recipient(to: &str, pay_to: &str) -> Result<(), InvalidReason> {
    if to.eq_ignore_ascii_case(pay_to) {
        Ok(())
    } else {
        Err(InvalidReason::InvalidRecipient)
    }
}

/// Checks `now` against the authorization window, inclusive on both ends.
///
/// # Errors
///
/// Returns [`InvalidReason::ExpiredPayment`] outside the window.
pub fn assert_time(window: &ValidityWindow, now: UnixTimestamp) -> Result<(), InvalidReason> {
    if window.contains(now) {
        Ok(())
    } else {
        Err(InvalidReason::ExpiredPayment)
    }
}

/// Rebuilds the signed digest and returns `(recovered signer, declared payer)`.
fn recover_payer(
    registry: &NetworkRegistry,
    payload: &ExactPayload,
    requirements: &PaymentRequirements,
    value: U256,
    window: ValidityWindow,
) -> Result<(Address, Address), ExactVerifyError> {
    let auth = &payload.authorization;
    let chain_id = resolve_chain_id(registry, &requirements.network)?;
    let asset = parse_address("asset", &requirements.asset)?;
    let from = parse_address("from", &auth.from)?;
    let to = parse_address("to", &auth.to)?;
    let nonce = parse_nonce(&auth.nonce)?;

    let message = TransferWithAuthorization::new(from, to, value, window, nonce);
    let digest = signing_hash(&message, &token_domain(requirements, chain_id, asset));

    let signature = signature_bytes(payload)?;
    let signer = recover_signer(&digest, &signature)?;
    Ok((signer, from))
}

pub(super) fn parse_address(field: &'static str, value: &str) -> Result<Address, ExactVerifyError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| ExactVerifyError::InvalidAddress {
            field,
            value: value.to_owned(),
        })
}

pub(super) fn parse_uint(field: &'static str, value: &str) -> Result<U256, ExactVerifyError> {
    let invalid = || ExactVerifyError::InvalidAmount {
        field,
        value: value.to_owned(),
    };
    let digits = value.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    U256::from_str_radix(digits, 10).map_err(|_| invalid())
}

fn parse_nonce(value: &str) -> Result<B256, ExactVerifyError> {
    value
        .trim()
        .parse::<B256>()
        .map_err(|_| ExactVerifyError::InvalidNonce(value.to_owned()))
}
