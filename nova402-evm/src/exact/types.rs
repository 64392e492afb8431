//! EIP-712 types of the "exact" scheme.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{Eip712Domain, SolStruct, eip712_domain, sol};
use nova402::proto::PaymentRequirements;
use nova402::timestamp::ValidityWindow;

use crate::chain::ChainId;

/// Default EIP-712 domain name for USDC.
pub const DEFAULT_USDC_NAME: &str = "USD Coin";

/// Default EIP-712 domain version for USDC.
pub const DEFAULT_USDC_VERSION: &str = "2";

sol!(
    /// Solidity-compatible struct definition for ERC-3009 `transferWithAuthorization`.
    ///
    /// This matches the EIP-3009 format used in EIP-712 typed data:
    /// it defines the authorization to transfer tokens from `from` to `to`
    /// for a specific `value`, valid only between `validAfter` and `validBefore`
    /// and identified by a unique `nonce`.
    #[derive(Debug, PartialEq, Eq)]
    struct TransferWithAuthorization {
        address from;
        address to;
        uint256 value;
        uint256 validAfter;
        uint256 validBefore;
        bytes32 nonce;
    }
);

impl TransferWithAuthorization {
    /// Builds the message from parsed authorization fields.
    #[must_use]
    pub fn new(from: Address, to: Address, value: U256, window: ValidityWindow, nonce: B256) -> Self {
        Self {
            from,
            to,
            value,
            validAfter: U256::from(window.valid_after.as_secs()),
            validBefore: U256::from(window.valid_before.as_secs()),
            nonce,
        }
    }
}

/// Builds the token's EIP-712 domain for the given requirements.
///
/// `name` and `version` come from `requirements.extra`, falling back to
/// [`DEFAULT_USDC_NAME`] and [`DEFAULT_USDC_VERSION`].
#[must_use]
pub fn token_domain(
    requirements: &PaymentRequirements,
    chain_id: ChainId,
    asset: Address,
) -> Eip712Domain {
    let name = requirements
        .extra_str("name")
        .unwrap_or(DEFAULT_USDC_NAME)
        .to_owned();
    let version = requirements
        .extra_str("version")
        .unwrap_or(DEFAULT_USDC_VERSION)
        .to_owned();
    eip712_domain! {
        name: name,
        version: version,
        chain_id: chain_id,
        verifying_contract: asset,
    }
}

/// EIP-712 digest a payer signs for `message` under `domain`.
#[must_use]
pub fn signing_hash(message: &TransferWithAuthorization, domain: &Eip712Domain) -> B256 {
    message.eip712_signing_hash(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, keccak256};
    use nova402::timestamp::UnixTimestamp;

    const TYPE_STRING: &str = "TransferWithAuthorization(address from,address to,uint256 value,uint256 validAfter,uint256 validBefore,bytes32 nonce)";

    fn window(after: u64, before: u64) -> ValidityWindow {
        ValidityWindow::new(UnixTimestamp::from_secs(after), UnixTimestamp::from_secs(before))
    }

    fn requirements(asset: Address) -> PaymentRequirements {
        PaymentRequirements::builder("1", asset.to_string(), "base-sepolia", "0x01", "/", "").build()
    }

    #[test]
    fn test_type_string() {
        assert_eq!(TransferWithAuthorization::eip712_encode_type(), TYPE_STRING);
        let message = TransferWithAuthorization::new(
            Address::ZERO,
            Address::ZERO,
            U256::ZERO,
            window(0, 0),
            B256::ZERO,
        );
        assert_eq!(message.eip712_type_hash(), keccak256(TYPE_STRING));
    }

    #[test]
    fn test_domain_defaults_and_overrides() {
        let asset = address!("0x036CbD53842c5426634e7929541eC2318f3dCF7e");
        let domain = token_domain(&requirements(asset), 84532, asset);
        assert_eq!(domain.name.as_deref(), Some("USD Coin"));
        assert_eq!(domain.version.as_deref(), Some("2"));
        assert_eq!(domain.chain_id, Some(U256::from(84532)));
        assert_eq!(domain.verifying_contract, Some(asset));

        let custom = PaymentRequirements::builder("1", asset.to_string(), "base-sepolia", "0x01", "/", "")
            .eip712_domain("USDC", "3")
            .build();
        let domain = token_domain(&custom, 84532, asset);
        assert_eq!(domain.name.as_deref(), Some("USDC"));
        assert_eq!(domain.version.as_deref(), Some("3"));
    }

    #[test]
    fn test_digest_depends_on_every_field() {
        let asset = address!("0x036CbD53842c5426634e7929541eC2318f3dCF7e");
        let domain = token_domain(&requirements(asset), 84532, asset);
        let base = TransferWithAuthorization::new(
            address!("0x857b06519E91e3A54538791bDbb0E22373e36b66"),
            address!("0x209693Bc6afc0C5328bA36FaF03C514EF312287C"),
            U256::from(100_000),
            window(100, 200),
            b256!("0x0101010101010101010101010101010101010101010101010101010101010101"),
        );
        let reference = signing_hash(&base, &domain);

        let mut tampered = base.clone();
        tampered.value = U256::from(100_001);
        assert_ne!(signing_hash(&tampered, &domain), reference);

        let mut tampered = base.clone();
        tampered.validBefore = U256::from(201);
        assert_ne!(signing_hash(&tampered, &domain), reference);

        let mut tampered = base.clone();
        tampered.nonce = B256::ZERO;
        assert_ne!(signing_hash(&tampered, &domain), reference);

        let other_chain = token_domain(&requirements(asset), 8453, asset);
        assert_ne!(signing_hash(&base, &other_chain), reference);
    }
}
