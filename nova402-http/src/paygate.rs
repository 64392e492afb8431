//! Payment gate for x402-protected resources.
//!
//! The [`Paygate`] turns the `X-PAYMENT` header of an incoming request into
//! either a [`PaymentReceipt`] (serve the resource) or a [`PaymentRejection`]
//! (answer with its status and body). It is framework-agnostic: callers pass
//! the raw header value and translate the outcome into their own response
//! type.
//!
//! Lifecycle of one request:
//!
//! 1. decode the header, or answer 402 listing `accepts`
//! 2. pick the requirements matching the header's scheme and network
//! 3. verify offline with [`ExactVerifier`]
//! 4. settle through the [`Facilitator`] when the policy asks for it

use http::{HeaderMap, StatusCode};
use nova402::proto::{
    ErrorReason, Payment402Response, PaymentHeader, PaymentRequirements, SettlementResult,
    VerificationDetails,
};
use nova402_evm::ExactVerifier;
use std::sync::Arc;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::facilitator::Facilitator;
use crate::headers::{encode_payment_response, x_payment_value};

/// When to settle a verified payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettlementPolicy {
    /// Release the resource right after verification; the caller settles
    /// afterwards with [`PaymentReceipt::settle`].
    Optimistic,
    /// Settle first and release only on success.
    #[default]
    SettleBeforeRelease,
}

/// A payment that passed the gate.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    header: PaymentHeader,
    requirements: PaymentRequirements,
    details: VerificationDetails,
    settlement: Option<SettlementResult>,
}

impl PaymentReceipt {
    /// The decoded payment header.
    #[must_use]
    pub const fn header(&self) -> &PaymentHeader {
        &self.header
    }

    /// The requirements the payment was verified against.
    #[must_use]
    pub const fn requirements(&self) -> &PaymentRequirements {
        &self.requirements
    }

    /// Payer, recipient and amount.
    #[must_use]
    pub const fn details(&self) -> &VerificationDetails {
        &self.details
    }

    /// The settlement, once one happened.
    #[must_use]
    pub const fn settlement(&self) -> Option<&SettlementResult> {
        self.settlement.as_ref()
    }

    /// The `X-PAYMENT-RESPONSE` value for the settlement, if settled.
    #[must_use]
    pub fn payment_response_header(&self) -> Option<String> {
        self.settlement.as_ref().map(encode_payment_response)
    }

    /// Settles a receipt issued under [`SettlementPolicy::Optimistic`].
    ///
    /// A receipt that already carries a settlement is returned unchanged.
    pub async fn settle<F: Facilitator>(&mut self, facilitator: &F) -> &SettlementResult {
        if self.settlement.is_none() {
            let result = facilitator.settle(&self.header, &self.requirements).await;
            self.settlement = Some(result);
        }
        self.settlement.get_or_insert_with(SettlementResult::default)
    }
}

/// A request the gate refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRejection {
    status: StatusCode,
    reason: Option<ErrorReason>,
    body: Payment402Response,
}

impl PaymentRejection {
    fn payment_required(accepts: &[PaymentRequirements]) -> Self {
        Self {
            status: StatusCode::PAYMENT_REQUIRED,
            reason: None,
            body: Payment402Response::new(accepts.to_vec()),
        }
    }

    fn rejected(
        status: StatusCode,
        reason: Option<ErrorReason>,
        accepts: &[PaymentRequirements],
        error: String,
    ) -> Self {
        Self {
            status,
            reason,
            body: Payment402Response::new(accepts.to_vec()).with_error(error),
        }
    }

    /// 402 for payment problems, 502 for settlement failures.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable cause; `None` when no payment was offered at all.
    #[must_use]
    pub const fn reason(&self) -> Option<ErrorReason> {
        self.reason
    }

    /// The JSON body to send.
    #[must_use]
    pub const fn body(&self) -> &Payment402Response {
        &self.body
    }

    /// Consumes the rejection, returning status and body.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, Payment402Response) {
        (self.status, self.body)
    }
}

/// Payment gate for enforcing x402 payments on one resource.
#[derive(Debug, Clone)]
pub struct Paygate<F> {
    accepts: Arc<Vec<PaymentRequirements>>,
    verifier: ExactVerifier,
    facilitator: F,
    policy: SettlementPolicy,
}

impl<F> Paygate<F> {
    /// Creates a gate accepting any of `accepts`, settling through
    /// `facilitator` before release and verifying against the built-in
    /// network table.
    pub fn new(accepts: impl Into<Vec<PaymentRequirements>>, facilitator: F) -> Self {
        Self {
            accepts: Arc::new(accepts.into()),
            verifier: ExactVerifier::default(),
            facilitator,
            policy: SettlementPolicy::default(),
        }
    }

    /// Replaces the verifier, e.g. to use a custom network registry.
    #[must_use]
    pub fn with_verifier(mut self, verifier: ExactVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    /// Sets the settlement policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: SettlementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The requirements advertised in 402 responses.
    #[must_use]
    pub fn accepts(&self) -> &[PaymentRequirements] {
        &self.accepts
    }

    /// The facilitator used for settlement.
    pub const fn facilitator(&self) -> &F {
        &self.facilitator
    }

    /// The settlement policy.
    pub const fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    /// Picks the requirements matching the header's scheme and network,
    /// falling back to the first advertised entry.
    fn select_requirements(&self, header: &PaymentHeader) -> Option<&PaymentRequirements> {
        self.accepts
            .iter()
            .find(|req| req.scheme == header.scheme && req.network == header.network)
            .or_else(|| self.accepts.first())
    }
}

impl<F> Paygate<F>
where
    F: Facilitator + Sync,
{
    /// Runs the gate over the raw `X-PAYMENT` value of a request.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentRejection`] with status 402 if the payment is absent,
    /// malformed or invalid, and 502 if settlement fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "x402.paygate.process", skip_all, fields(policy = ?self.policy))
    )]
    pub async fn process(&self, x_payment: Option<&str>) -> Result<PaymentReceipt, PaymentRejection> {
        let Some(raw) = x_payment else {
            return Err(PaymentRejection::payment_required(&self.accepts));
        };

        let header = nova402::decode(raw).map_err(|err| {
            PaymentRejection::rejected(
                StatusCode::PAYMENT_REQUIRED,
                Some(ErrorReason::InvalidPaymentHeader),
                &self.accepts,
                format!("Invalid payment header: {err}"),
            )
        })?;

        let requirements = self.select_requirements(&header).ok_or_else(|| {
            PaymentRejection::rejected(
                StatusCode::PAYMENT_REQUIRED,
                None,
                &self.accepts,
                "Unable to find matching payment requirements".to_owned(),
            )
        })?;

        let verification = self.verifier.verify(&header, requirements);
        let details = match (verification.details(), verification.invalid_reason()) {
            (Some(details), _) => details.clone(),
            (None, reason) => {
                let (code, message) = reason.map_or(
                    (ErrorReason::VerificationError, String::new()),
                    |r| (r.kind(), r.to_string()),
                );
                return Err(PaymentRejection::rejected(
                    StatusCode::PAYMENT_REQUIRED,
                    Some(code),
                    &self.accepts,
                    message,
                ));
            }
        };

        let mut receipt = PaymentReceipt {
            header,
            requirements: requirements.clone(),
            details,
            settlement: None,
        };

        if self.policy == SettlementPolicy::SettleBeforeRelease {
            #[cfg(feature = "telemetry")]
            tracing::debug!("Settling payment before release");

            let settlement = receipt.settle(&self.facilitator).await;
            if !settlement.success {
                let cause = settlement.error.as_deref().unwrap_or("unknown error");
                return Err(PaymentRejection::rejected(
                    StatusCode::BAD_GATEWAY,
                    Some(ErrorReason::SettlementFailed),
                    &self.accepts,
                    format!("Settlement failed: {cause}"),
                ));
            }
        }

        Ok(receipt)
    }

    /// Runs the gate over a request's headers.
    ///
    /// # Errors
    ///
    /// See [`Paygate::process`].
    pub async fn process_headers(
        &self,
        headers: &HeaderMap,
    ) -> Result<PaymentReceipt, PaymentRejection> {
        self.process(x_payment_value(headers)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_signer_local::PrivateKeySigner;
    use nova402::NetworkRegistry;
    use nova402_evm::UnsignedAuthorization;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PAY_TO: &str = "0x209693Bc6afc0C5328bA36FaF03C514EF312287C";

    #[derive(Debug, Default)]
    struct StubFacilitator {
        result: SettlementResult,
        calls: AtomicUsize,
    }

    impl StubFacilitator {
        fn answering(result: SettlementResult) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Facilitator for StubFacilitator {
        async fn settle(
            &self,
            _header: &PaymentHeader,
            _requirements: &PaymentRequirements,
        ) -> SettlementResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn settled() -> SettlementResult {
        SettlementResult {
            success: true,
            tx_hash: Some("0xfeed".into()),
            network_id: Some("base-sepolia".into()),
            block_number: Some(1),
            error: None,
        }
    }

    fn requirements(network: &str, price: &str) -> PaymentRequirements {
        PaymentRequirements::usdc(
            &NetworkRegistry::known(),
            price,
            network,
            PAY_TO,
            "https://api.example.com/premium",
            "Premium data",
        )
        .unwrap()
        .build()
    }

    fn x_payment(requirements: &PaymentRequirements) -> String {
        let signer = PrivateKeySigner::random();
        let header = UnsignedAuthorization::prepare_now(
            &NetworkRegistry::known(),
            requirements,
            signer.address(),
        )
        .unwrap()
        .sign_with(&signer)
        .unwrap();
        nova402::encode(&header)
    }

    #[tokio::test]
    async fn test_missing_header_lists_accepts() {
        let accepts = vec![requirements("base-sepolia", "100000")];
        let gate = Paygate::new(accepts.clone(), StubFacilitator::default());
        let rejection = gate.process(None).await.unwrap_err();
        assert_eq!(rejection.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(rejection.reason(), None);
        assert_eq!(rejection.body().accepts, accepts);
        assert_eq!(rejection.body().error, None);
    }

    #[tokio::test]
    async fn test_malformed_header() {
        let gate = Paygate::new(
            vec![requirements("base-sepolia", "100000")],
            StubFacilitator::default(),
        );
        let rejection = gate.process(Some("%%%")).await.unwrap_err();
        assert_eq!(rejection.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(rejection.reason(), Some(ErrorReason::InvalidPaymentHeader));
        assert!(
            rejection
                .body()
                .error
                .as_deref()
                .unwrap()
                .starts_with("Invalid payment header: ")
        );
    }

    #[tokio::test]
    async fn test_verification_failure_carries_reason() {
        let offered = requirements("base-sepolia", "100000");
        let gate = Paygate::new(
            vec![requirements("base-sepolia", "200000")],
            StubFacilitator::default(),
        );
        let rejection = gate.process(Some(&x_payment(&offered))).await.unwrap_err();
        assert_eq!(rejection.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(rejection.reason(), Some(ErrorReason::InsufficientAmount));
        assert_eq!(rejection.body().error.as_deref(), Some("Insufficient amount"));
        assert_eq!(gate.facilitator().calls(), 0);
    }

    #[tokio::test]
    async fn test_requirements_matched_by_network() {
        let base = requirements("base-mainnet", "100000");
        let sepolia = requirements("base-sepolia", "100000");
        let gate = Paygate::new(
            vec![base, sepolia.clone()],
            StubFacilitator::answering(settled()),
        );
        let receipt = gate.process(Some(&x_payment(&sepolia))).await.unwrap();
        assert_eq!(receipt.requirements(), &sepolia);
    }

    #[tokio::test]
    async fn test_unmatched_network_falls_back_to_first() {
        let base = requirements("base-mainnet", "100000");
        let sepolia = requirements("base-sepolia", "100000");
        let gate = Paygate::new(vec![base], StubFacilitator::answering(settled()));
        let rejection = gate.process(Some(&x_payment(&sepolia))).await.unwrap_err();
        assert_eq!(rejection.reason(), Some(ErrorReason::NetworkMismatch));
        assert_eq!(
            rejection.body().error.as_deref(),
            Some("Network mismatch: expected base-mainnet, got base-sepolia")
        );
    }

    #[tokio::test]
    async fn test_settle_before_release() {
        let req = requirements("base-sepolia", "100000");
        let gate = Paygate::new(vec![req.clone()], StubFacilitator::answering(settled()));
        let receipt = gate.process(Some(&x_payment(&req))).await.unwrap();
        assert_eq!(gate.facilitator().calls(), 1);
        assert_eq!(receipt.settlement(), Some(&settled()));
        assert_eq!(receipt.details().amount, "100000");
        let header = receipt.payment_response_header().unwrap();
        assert_eq!(
            crate::headers::decode_payment_response(&header).unwrap(),
            settled()
        );
    }

    #[tokio::test]
    async fn test_settlement_failure_is_bad_gateway() {
        let req = requirements("base-sepolia", "100000");
        let gate = Paygate::new(
            vec![req.clone()],
            StubFacilitator::answering(SettlementResult::failure("Facilitator returned 500")),
        );
        let rejection = gate.process(Some(&x_payment(&req))).await.unwrap_err();
        assert_eq!(rejection.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(rejection.reason(), Some(ErrorReason::SettlementFailed));
        assert_eq!(
            rejection.body().error.as_deref(),
            Some("Settlement failed: Facilitator returned 500")
        );
    }

    #[tokio::test]
    async fn test_optimistic_defers_settlement() {
        let req = requirements("base-sepolia", "100000");
        let gate = Paygate::new(vec![req.clone()], StubFacilitator::answering(settled()))
            .with_policy(SettlementPolicy::Optimistic);
        let mut receipt = gate.process(Some(&x_payment(&req))).await.unwrap();
        assert_eq!(gate.facilitator().calls(), 0);
        assert!(receipt.settlement().is_none());
        assert!(receipt.payment_response_header().is_none());

        assert!(receipt.settle(gate.facilitator()).await.success);
        assert!(receipt.settle(gate.facilitator()).await.success);
        assert_eq!(gate.facilitator().calls(), 1);
    }

    #[tokio::test]
    async fn test_process_headers() {
        let req = requirements("base-sepolia", "100000");
        let gate = Paygate::new(vec![req.clone()], StubFacilitator::answering(settled()));
        let mut headers = HeaderMap::new();
        assert!(gate.process_headers(&headers).await.is_err());
        headers.insert(
            crate::constants::X_PAYMENT_HEADER,
            x_payment(&req).parse().unwrap(),
        );
        assert!(gate.process_headers(&headers).await.is_ok());
    }
}
