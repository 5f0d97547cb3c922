//! Signature Verifier collaborator contract.
//!
//! An order's signature is checked against the verifying key registered for
//! its strategy — strategies are pluggable sale types, each resolved to its
//! own verifying contract. The engine only sees the trait; the default
//! implementation verifies ed25519 over the order's content hash.

use std::collections::HashMap;

use ed25519_dalek::{Signature as DalekSignature, Signer as _, SigningKey, VerifyingKey};
use mintbay_types::{MarketError, OrderHash, OrderPayload, Result, Signature, StrategyId};

/// Validates an order signature against the order's strategy.
pub trait SignatureVerifier: Send + Sync + 'static {
    /// `Ok(false)` means the signature is well-formed but does not verify;
    /// an unknown strategy is an error.
    fn validate(&self, signature: &Signature, payload: &OrderPayload) -> Result<bool>;
}

/// Produces order signatures. Makers sign the raw order-hash bytes.
pub trait OrderSigner: Send + Sync {
    fn sign(&self, order_hash: &OrderHash) -> Result<Signature>;
}

// ---------------------------------------------------------------------------
// ed25519 implementation
// ---------------------------------------------------------------------------

/// Per-strategy registry of verifying keys.
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    keys: HashMap<StrategyId, VerifyingKey>,
}

impl StrategyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, strategy_id: StrategyId, key: VerifyingKey) {
        self.keys.insert(strategy_id, key);
    }

    pub fn resolve(&self, strategy_id: StrategyId) -> Result<&VerifyingKey> {
        self.keys
            .get(&strategy_id)
            .ok_or(MarketError::UnknownStrategy(strategy_id))
    }
}

/// Default verifier: ed25519 over the order's content hash.
pub struct Ed25519Verifier {
    registry: StrategyRegistry,
}

impl Ed25519Verifier {
    #[must_use]
    pub fn new(registry: StrategyRegistry) -> Self {
        Self { registry }
    }
}

impl SignatureVerifier for Ed25519Verifier {
    fn validate(&self, signature: &Signature, payload: &OrderPayload) -> Result<bool> {
        let key = self.registry.resolve(payload.strategy_id)?;
        let Ok(sig) = DalekSignature::from_slice(signature.as_bytes()) else {
            return Ok(false);
        };
        let message = payload.content_hash();
        Ok(key.verify_strict(message.as_bytes(), &sig).is_ok())
    }
}

/// Signs order hashes with an ed25519 key.
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}

impl OrderSigner for Ed25519Signer {
    fn sign(&self, order_hash: &OrderHash) -> Result<Signature> {
        let sig = self.key.sign(order_hash.as_bytes());
        Ok(Signature(sig.to_bytes().to_vec()))
    }
}

/// A verifier that accepts everything. Tests that exercise state machines
/// rather than signatures use this.
#[cfg(any(test, feature = "test-helpers"))]
pub struct AcceptAllVerifier;

#[cfg(any(test, feature = "test-helpers"))]
impl SignatureVerifier for AcceptAllVerifier {
    fn validate(&self, _signature: &Signature, _payload: &OrderPayload) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mintbay_types::{Address, Amount, TokenId};
    use rand::rngs::OsRng;

    fn setup() -> (Ed25519Signer, Ed25519Verifier) {
        let signing = SigningKey::generate(&mut OsRng);
        let signer = Ed25519Signer::new(signing);
        let mut registry = StrategyRegistry::new();
        registry.register(StrategyId(1), signer.verifying_key());
        (signer, Ed25519Verifier::new(registry))
    }

    #[test]
    fn valid_signature_verifies() {
        let (signer, verifier) = setup();
        let payload = OrderPayload::dummy(Address::dummy(1), TokenId::new(5), Amount::wei(10), 0);
        let sig = signer.sign(&payload.content_hash()).unwrap();
        assert!(verifier.validate(&sig, &payload).unwrap());
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let (signer, verifier) = setup();
        let payload = OrderPayload::dummy(Address::dummy(1), TokenId::new(5), Amount::wei(10), 0);
        let sig = signer.sign(&payload.content_hash()).unwrap();

        let mut tampered = payload;
        tampered.price = Amount::wei(1);
        assert!(!verifier.validate(&sig, &tampered).unwrap());
    }

    #[test]
    fn malformed_signature_is_false_not_error() {
        let (_, verifier) = setup();
        let payload = OrderPayload::dummy(Address::dummy(1), TokenId::new(5), Amount::wei(10), 0);
        let garbage = Signature(vec![1, 2, 3]);
        assert!(!verifier.validate(&garbage, &payload).unwrap());
    }

    #[test]
    fn unknown_strategy_errors() {
        let (signer, verifier) = setup();
        let mut payload =
            OrderPayload::dummy(Address::dummy(1), TokenId::new(5), Amount::wei(10), 0);
        payload.strategy_id = StrategyId(99);
        let sig = signer.sign(&payload.content_hash()).unwrap();
        let err = verifier.validate(&sig, &payload).unwrap_err();
        assert!(matches!(err, MarketError::UnknownStrategy(StrategyId(99))));
    }
}
