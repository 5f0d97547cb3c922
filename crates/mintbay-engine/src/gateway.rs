//! Chain Gateway collaborator contract.
//!
//! The gateway is the engine's only window onto the chain: nonce reads,
//! order-hash computation, transaction submission, receipt awaits, and the
//! `OrderExecuted` event stream. It is injected once at process start and
//! passed to the engines — no module-level singleton.
//!
//! Every call is network-bound from the caller's perspective, so the
//! engines wrap them in [`bounded`], which converts an elapsed timeout into
//! [`MarketError::GatewayTimeout`] instead of hanging a request.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use mintbay_types::{
    Address, MarketError, Nonce, OrderExecuted, OrderHash, OrderPayload, PendingTx, Result,
    Signature, TxReceipt,
};
use tokio::sync::broadcast;

/// Abstract chain access. Implementations talk JSON-RPC to a node; the
/// mock below scripts everything deterministically.
#[async_trait]
pub trait ChainGateway: Send + Sync + 'static {
    /// Current transaction count for an address.
    async fn nonce(&self, address: Address) -> Result<Nonce>;

    /// The canonical hash the exchange contract derives for this order.
    async fn compute_order_hash(&self, payload: &OrderPayload) -> Result<OrderHash>;

    /// Submit a signed order for execution.
    async fn submit_order(
        &self,
        payload: &OrderPayload,
        signature: &Signature,
    ) -> Result<PendingTx>;

    /// Block until the transaction is mined and return its receipt.
    async fn await_receipt(&self, pending: PendingTx) -> Result<TxReceipt>;

    /// Submit an on-chain order cancellation.
    async fn cancel_on_chain(&self, payload: &OrderPayload) -> Result<PendingTx>;

    /// Subscribe to the `OrderExecuted` event stream. Each call returns a
    /// fresh receiver; the listener resubscribes through this after drops.
    fn subscribe(&self) -> broadcast::Receiver<OrderExecuted>;
}

/// Run a gateway future under a timeout bound.
pub async fn bounded<T, F>(op: &'static str, timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(MarketError::GatewayTimeout { op }),
    }
}

// ---------------------------------------------------------------------------
// Mock gateway
// ---------------------------------------------------------------------------

/// Deterministic scripted gateway for tests and local development.
///
/// - Nonces start at zero per address and bump when that address lands a
///   transaction (submit or cancel).
/// - Order hashes are the payload's content hash, so hash identity matches
///   the content-addressing invariant.
/// - Receipts derive their tx hash from the pending-tx id; `fail_next` and
///   `revert_next` script the two failure modes.
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;

    use sha2::{Digest, Sha256};

    use mintbay_types::TxHash;

    use super::*;

    pub struct MockGateway {
        nonces: Mutex<HashMap<Address, Nonce>>,
        tx_counter: AtomicU64,
        fail_next: AtomicBool,
        revert_next: AtomicBool,
        events: broadcast::Sender<OrderExecuted>,
    }

    impl MockGateway {
        #[must_use]
        pub fn new(event_buffer: usize) -> Self {
            let (events, _) = broadcast::channel(event_buffer);
            Self {
                nonces: Mutex::new(HashMap::new()),
                tx_counter: AtomicU64::new(0),
                fail_next: AtomicBool::new(false),
                revert_next: AtomicBool::new(false),
                events,
            }
        }

        /// Make the next submit/cancel fail outright.
        pub fn fail_next(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }

        /// Make the next receipt come back reverted.
        pub fn revert_next(&self) {
            self.revert_next.store(true, Ordering::SeqCst);
        }

        /// Deterministic tx hash for a pending-tx id.
        #[must_use]
        pub fn tx_hash_for(pending: PendingTx) -> TxHash {
            let mut hasher = Sha256::new();
            hasher.update(b"mintbay:mock_tx:");
            hasher.update(pending.0.to_le_bytes());
            let digest = hasher.finalize();
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&digest);
            TxHash::from_bytes(bytes)
        }

        /// Emit an `OrderExecuted` event as if a third party filled the
        /// order on-chain. Returns the tx hash carried by the event.
        pub fn emit_executed(&self, order_hash: OrderHash, taker: Address) -> TxHash {
            let pending = PendingTx(self.tx_counter.fetch_add(1, Ordering::SeqCst));
            let tx_hash = Self::tx_hash_for(pending);
            // Nobody listening is fine; the event is simply dropped.
            let _ = self.events.send(OrderExecuted {
                order_hash,
                taker,
                tx_hash,
            });
            tx_hash
        }

        fn bump_nonce(&self, address: Address) {
            let mut nonces = self.nonces.lock().expect("nonce lock poisoned");
            *nonces.entry(address).or_insert(0) += 1;
        }

        fn take_submission(&self, maker: Address) -> Result<PendingTx> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(MarketError::GatewayFailure {
                    reason: "scripted submission failure".to_string(),
                });
            }
            self.bump_nonce(maker);
            Ok(PendingTx(self.tx_counter.fetch_add(1, Ordering::SeqCst)))
        }
    }

    impl Default for MockGateway {
        fn default() -> Self {
            Self::new(mintbay_types::constants::DEFAULT_EVENT_BUFFER)
        }
    }

    #[async_trait]
    impl ChainGateway for MockGateway {
        async fn nonce(&self, address: Address) -> Result<Nonce> {
            let nonces = self.nonces.lock().expect("nonce lock poisoned");
            Ok(nonces.get(&address).copied().unwrap_or(0))
        }

        async fn compute_order_hash(&self, payload: &OrderPayload) -> Result<OrderHash> {
            Ok(payload.content_hash())
        }

        async fn submit_order(
            &self,
            payload: &OrderPayload,
            _signature: &Signature,
        ) -> Result<PendingTx> {
            self.take_submission(payload.maker)
        }

        async fn await_receipt(&self, pending: PendingTx) -> Result<TxReceipt> {
            Ok(TxReceipt {
                tx_hash: Self::tx_hash_for(pending),
                success: !self.revert_next.swap(false, Ordering::SeqCst),
            })
        }

        async fn cancel_on_chain(&self, payload: &OrderPayload) -> Result<PendingTx> {
            self.take_submission(payload.maker)
        }

        fn subscribe(&self) -> broadcast::Receiver<OrderExecuted> {
            self.events.subscribe()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockGateway;
    use super::*;
    use mintbay_types::{Amount, TokenId};

    #[tokio::test]
    async fn nonce_bumps_after_submission() {
        let gateway = MockGateway::default();
        let maker = Address::dummy(1);
        assert_eq!(gateway.nonce(maker).await.unwrap(), 0);

        let payload = OrderPayload::dummy(maker, TokenId::new(1), Amount::wei(10), 0);
        let sig = Signature(vec![0u8; 64]);
        gateway.submit_order(&payload, &sig).await.unwrap();
        assert_eq!(gateway.nonce(maker).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn mock_hash_matches_content_hash() {
        let gateway = MockGateway::default();
        let payload = OrderPayload::dummy(Address::dummy(1), TokenId::new(1), Amount::wei(10), 0);
        let hash = gateway.compute_order_hash(&payload).await.unwrap();
        assert_eq!(hash, payload.content_hash());
    }

    #[tokio::test]
    async fn scripted_failure_and_revert() {
        let gateway = MockGateway::default();
        let payload = OrderPayload::dummy(Address::dummy(1), TokenId::new(1), Amount::wei(10), 0);
        let sig = Signature(vec![0u8; 64]);

        gateway.fail_next();
        let err = gateway.submit_order(&payload, &sig).await.unwrap_err();
        assert!(matches!(err, MarketError::GatewayFailure { .. }));

        gateway.revert_next();
        let pending = gateway.submit_order(&payload, &sig).await.unwrap();
        let receipt = gateway.await_receipt(pending).await.unwrap();
        assert!(!receipt.success);
    }

    #[tokio::test]
    async fn bounded_maps_timeout() {
        let err = bounded("nonce", Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(0u64)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, MarketError::GatewayTimeout { op: "nonce" }));
    }

    #[tokio::test]
    async fn events_reach_subscribers() {
        let gateway = MockGateway::default();
        let mut rx = gateway.subscribe();
        let hash = OrderHash::from_bytes([3; 32]);
        let tx = gateway.emit_executed(hash, Address::dummy(9));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.order_hash, hash);
        assert_eq!(event.tx_hash, tx);
    }
}
