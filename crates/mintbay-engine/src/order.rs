//! Signed-order lifecycle: create from a listing, execute, cancel.
//!
//! `PENDING --execute--> EXECUTED`
//! `PENDING --cancel---> CANCELLED`
//!
//! Execution talks to the chain, so the terminal transition is a guarded
//! compare-and-swap: the engine and the event listener may both try to mark
//! the same order EXECUTED, and exactly one write applies while the other
//! converges as a no-op. Cancellation checks every precondition before the
//! first chain call — a rejected cancel must leave no on-chain side effect.

use std::sync::Arc;

use chrono::Utc;
use mintbay_store::{ListingStore, OrderStore, StatusCas};
use mintbay_types::{
    Address, EngineConfig, ListingId, ListingStatus, MarketError, Order, OrderFilter, OrderHash,
    OrderPayload, OrderStatus, Page, Result,
};
use tracing::{info, warn};

use crate::gateway::{bounded, ChainGateway};
use crate::verifier::{OrderSigner, SignatureVerifier};

pub struct OrderEngine<S, G, V> {
    store: Arc<S>,
    gateway: Arc<G>,
    verifier: Arc<V>,
    config: EngineConfig,
}

impl<S, G, V> OrderEngine<S, G, V>
where
    S: OrderStore + ListingStore,
    G: ChainGateway,
    V: SignatureVerifier,
{
    #[must_use]
    pub fn new(store: Arc<S>, gateway: Arc<G>, verifier: Arc<V>, config: EngineConfig) -> Self {
        Self {
            store,
            gateway,
            verifier,
            config,
        }
    }

    /// Create a signed order from a live listing.
    ///
    /// 1. The listing must be ACTIVE and unexpired.
    /// 2. Fetch the maker's chain nonce and fold it into the payload; the
    ///    order expires one TTL from now.
    /// 3. Ask the gateway for the canonical order hash and have the maker's
    ///    signer sign it.
    /// 4. Persist the order (unique on the hash) and attach the hash,
    ///    signature, and nonce back onto the listing.
    pub async fn create_order(
        &self,
        listing_id: ListingId,
        signer: &dyn OrderSigner,
    ) -> Result<Order> {
        let mut listing = self
            .store
            .get_listing(listing_id)
            .await?
            .ok_or(MarketError::ListingNotFound(listing_id))?;

        let now = Utc::now();
        if !listing.is_live(now) {
            return Err(MarketError::ListingNotActive(listing_id));
        }

        let timeout = self.config.gateway_timeout();
        let nonce = bounded("nonce", timeout, self.gateway.nonce(listing.maker)).await?;

        let payload = OrderPayload {
            maker: listing.maker,
            taker: listing.taker.unwrap_or(Address::ZERO),
            nft_contract: listing.nft_contract,
            token_id: listing.token_id,
            quantity: listing.quantity,
            price: listing.price,
            payment_token: listing.payment_token,
            strategy_id: listing.strategy_id,
            params: listing.params.clone(),
            nonce,
            expiry: now + self.config.order_ttl(),
        };

        let order_hash = bounded(
            "compute_order_hash",
            timeout,
            self.gateway.compute_order_hash(&payload),
        )
        .await?;
        let signature = signer.sign(&order_hash)?;

        let order = Order {
            payload,
            order_hash,
            signature: signature.clone(),
            status: OrderStatus::Pending,
            tx_hash: None,
            listing_id,
            created_at: now,
        };
        self.store.insert_order(order.clone()).await?;

        listing.order_hash = Some(order_hash);
        listing.signature = Some(signature);
        listing.nonce = Some(nonce);
        listing.updated_at = now;
        self.store.update_listing(listing).await?;

        info!(
            order_hash = %order_hash.short(),
            listing_id = %listing_id,
            "order created"
        );
        Ok(order)
    }

    /// Execute a pending order on-chain.
    ///
    /// 1. The order must be PENDING and unexpired, and its signature must
    ///    verify against its strategy.
    /// 2. Submit and await the receipt; a mined-but-reverted transaction is
    ///    an error and the order stays PENDING.
    /// 3. CAS the order to EXECUTED. If the event listener already did,
    ///    the write converges as a no-op.
    /// 4. Mark the linked listing SOLD.
    pub async fn execute_order(&self, order_hash: OrderHash) -> Result<Order> {
        let order = self.order(order_hash).await?;

        if order.status != OrderStatus::Pending {
            return Err(MarketError::OrderNotPending {
                order_hash,
                status: order.status,
            });
        }
        let now = Utc::now();
        if order.payload.is_expired(now) {
            return Err(MarketError::OrderExpired(order_hash));
        }
        if !self.verifier.validate(&order.signature, &order.payload)? {
            return Err(MarketError::SignatureInvalid(order_hash));
        }

        let timeout = self.config.gateway_timeout();
        let pending = bounded(
            "submit_order",
            timeout,
            self.gateway.submit_order(&order.payload, &order.signature),
        )
        .await?;
        let receipt = bounded("await_receipt", timeout, self.gateway.await_receipt(pending)).await?;
        if !receipt.success {
            return Err(MarketError::TransactionReverted(receipt.tx_hash));
        }

        let cas = self
            .store
            .cas_status(
                order_hash,
                OrderStatus::Pending,
                OrderStatus::Executed,
                Some(receipt.tx_hash),
            )
            .await?;
        if cas == StatusCas::NoOp {
            info!(
                order_hash = %order_hash.short(),
                "order already executed by another writer"
            );
        }

        self.mark_listing_sold(order.listing_id).await;

        info!(
            order_hash = %order_hash.short(),
            tx_hash = %receipt.tx_hash,
            "order executed"
        );
        self.order(order_hash).await
    }

    /// Cancel a pending order, maker-only.
    ///
    /// Every precondition runs before the first chain call: a rejected
    /// cancel must not have touched the chain.
    pub async fn cancel_order(&self, order_hash: OrderHash, requester: Address) -> Result<Order> {
        let order = self.order(order_hash).await?;

        if order.payload.maker != requester {
            return Err(MarketError::NotMaker {
                maker: order.payload.maker,
                requester,
            });
        }
        if order.status != OrderStatus::Pending {
            return Err(MarketError::OrderNotPending {
                order_hash,
                status: order.status,
            });
        }

        let timeout = self.config.gateway_timeout();
        let pending = bounded(
            "cancel_on_chain",
            timeout,
            self.gateway.cancel_on_chain(&order.payload),
        )
        .await?;
        let receipt = bounded("await_receipt", timeout, self.gateway.await_receipt(pending)).await?;
        if !receipt.success {
            return Err(MarketError::TransactionReverted(receipt.tx_hash));
        }

        self.store
            .cas_status(
                order_hash,
                OrderStatus::Pending,
                OrderStatus::Cancelled,
                Some(receipt.tx_hash),
            )
            .await?;

        info!(order_hash = %order_hash.short(), "order cancelled");
        self.order(order_hash).await
    }

    pub async fn order(&self, order_hash: OrderHash) -> Result<Order> {
        self.store
            .get_order(order_hash)
            .await?
            .ok_or(MarketError::OrderNotFound(order_hash))
    }

    /// Filtered, paged order scan. No match means an empty page.
    pub async fn orders(&self, filter: &OrderFilter, page: Page) -> Result<Vec<Order>> {
        self.store.query_orders(filter, page).await
    }

    /// Best-effort listing transition after a confirmed execution. The
    /// order is already terminal; a listing hiccup must not fail the call.
    async fn mark_listing_sold(&self, listing_id: ListingId) {
        match self.store.get_listing(listing_id).await {
            Ok(Some(mut listing)) if !listing.is_terminal() => {
                listing.status = ListingStatus::Sold;
                listing.updated_at = Utc::now();
                if let Err(error) = self.store.update_listing(listing).await {
                    warn!(listing_id = %listing_id, %error, "failed to mark listing sold");
                }
            }
            Ok(_) => {}
            Err(error) => {
                warn!(listing_id = %listing_id, %error, "failed to load listing after execution");
            }
        }
    }
}
