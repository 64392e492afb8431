//! Client-side assembly of exact-scheme payments.
//!
//! [`UnsignedAuthorization::prepare`] turns requirements into the EIP-3009
//! authorization a payer must sign, together with its EIP-712 digest. The
//! digest is computed by the same code the verifier uses, so a signature over
//! it verifies as long as the requirements are unchanged.
//!
//! Key material never passes through this module: the caller signs the digest
//! with whatever signer they hold and hands back the 65-byte signature, or
//! passes any [`SignerSync`] to [`UnsignedAuthorization::sign_with`].

use alloy_primitives::{Address, B256, Signature, hex};
use alloy_signer::SignerSync;
use nova402::networks::NetworkRegistry;
use nova402::nonce::generate_nonce;
use nova402::proto::{Eip3009Authorization, ExactPayload, PaymentHeader, PaymentRequirements};
use nova402::timestamp::{ValidityWindow, validity_window};

use super::error::ExactVerifyError;
use super::types::{TransferWithAuthorization, signing_hash, token_domain};
use super::verify::{parse_address, parse_uint};
use crate::chain::resolve_chain_id;

/// Errors while preparing or signing an authorization.
#[derive(Debug, thiserror::Error)]
pub enum AuthorizationError {
    /// The requirements cannot be turned into an authorization.
    #[error(transparent)]
    Requirements(#[from] ExactVerifyError),
    /// The signer refused or failed.
    #[error("signing failed: {0}")]
    Signing(#[from] alloy_signer::Error),
    /// The payload could not be encoded.
    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// An authorization awaiting its signature.
#[derive(Debug, Clone)]
pub struct UnsignedAuthorization {
    network: String,
    authorization: Eip3009Authorization,
    signing_hash: B256,
}

impl UnsignedAuthorization {
    /// Prepares an authorization paying exactly `maxAmountRequired` from
    /// `from` to `payTo`, valid over `window`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::Requirements`] if the requirements hold an
    /// unusable network, address or amount.
    pub fn prepare(
        registry: &NetworkRegistry,
        requirements: &PaymentRequirements,
        from: Address,
        window: ValidityWindow,
        nonce: B256,
    ) -> Result<Self, AuthorizationError> {
        let chain_id = resolve_chain_id(registry, &requirements.network)
            .map_err(ExactVerifyError::from)?;
        let to = parse_address("payTo", &requirements.pay_to)?;
        let asset = parse_address("asset", &requirements.asset)?;
        let value = parse_uint("maxAmountRequired", &requirements.max_amount_required)?;

        let message = TransferWithAuthorization::new(from, to, value, window, nonce);
        let domain = token_domain(requirements, chain_id, asset);

        let authorization = Eip3009Authorization {
            from: from.to_string(),
            to: to.to_string(),
            value: value.to_string(),
            valid_after: window.valid_after,
            valid_before: window.valid_before,
            nonce: nonce.to_string(),
            r: None,
            s: None,
            v: None,
        };
        Ok(Self {
            network: requirements.network.clone(),
            authorization,
            signing_hash: signing_hash(&message, &domain),
        })
    }

    /// Like [`UnsignedAuthorization::prepare`] with a fresh nonce and a window
    /// opening now and lasting `maxTimeoutSeconds`.
    ///
    /// # Errors
    ///
    /// See [`UnsignedAuthorization::prepare`].
    pub fn prepare_now(
        registry: &NetworkRegistry,
        requirements: &PaymentRequirements,
        from: Address,
    ) -> Result<Self, AuthorizationError> {
        let window = validity_window(requirements.max_timeout_seconds);
        Self::prepare(registry, requirements, from, window, generate_nonce())
    }

    /// The EIP-712 digest to sign.
    #[must_use]
    pub const fn signing_hash(&self) -> B256 {
        self.signing_hash
    }

    /// The authorization as it will appear on the wire.
    #[must_use]
    pub const fn authorization(&self) -> &Eip3009Authorization {
        &self.authorization
    }

    /// Attaches a signature over [`Self::signing_hash`] and builds the header.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::Encode`] if the payload cannot be encoded.
    pub fn attach_signature(self, signature: &Signature) -> Result<PaymentHeader, AuthorizationError> {
        let payload = ExactPayload {
            signature: Some(hex::encode_prefixed(signature.as_bytes())),
            authorization: self.authorization,
        };
        Ok(PaymentHeader::exact(self.network, &payload)?)
    }

    /// Signs with `signer` and builds the header.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::Signing`] if the signer fails.
    pub fn sign_with<S: SignerSync + ?Sized>(
        self,
        signer: &S,
    ) -> Result<PaymentHeader, AuthorizationError> {
        let signature = signer.sign_hash_sync(&self.signing_hash)?;
        self.attach_signature(&signature)
    }
}
