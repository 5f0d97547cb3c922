//! `OrderExecuted` event listener.
//!
//! Orders can execute outside this service — any taker may fill a signed
//! order directly against the exchange contract. The listener folds those
//! executions back into local state through the same guarded status
//! transition the engine uses, so the two writers converge on one terminal
//! row no matter who lands first.

use std::sync::Arc;

use chrono::Utc;
use mintbay_engine::ChainGateway;
use mintbay_store::{ListingStore, OrderStore, StatusCas};
use mintbay_types::{ListingStatus, MarketError, OrderExecuted, OrderStatus, Result};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct ExecutedListener<S, G> {
    store: Arc<S>,
    gateway: Arc<G>,
}

impl<S, G> ExecutedListener<S, G>
where
    S: OrderStore + ListingStore,
    G: ChainGateway,
{
    #[must_use]
    pub fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
        Self { store, gateway }
    }

    /// Fold one execution event into local state.
    ///
    /// Unknown hashes are third-party orders this service never tracked;
    /// they are skipped, not errors. A CANCELLED row that executed on-chain
    /// anyway is real drift and is logged loudly, but the row is left alone
    /// — terminal states never flip.
    pub async fn apply(&self, event: &OrderExecuted) -> Result<()> {
        let Some(order) = self.store.get_order(event.order_hash).await? else {
            debug!(order_hash = %event.order_hash.short(), "execution event for untracked order");
            return Ok(());
        };

        match self
            .store
            .cas_status(
                event.order_hash,
                OrderStatus::Pending,
                OrderStatus::Executed,
                Some(event.tx_hash),
            )
            .await
        {
            Ok(StatusCas::Applied) => {
                info!(
                    order_hash = %event.order_hash.short(),
                    taker = %event.taker.short(),
                    "order executed on-chain, local state updated"
                );
            }
            Ok(StatusCas::NoOp) => {
                debug!(
                    order_hash = %event.order_hash.short(),
                    "order already executed locally"
                );
            }
            Err(MarketError::OrderNotPending { status, .. }) => {
                warn!(
                    order_hash = %event.order_hash.short(),
                    local_status = %status,
                    "chain executed an order this service had cancelled"
                );
                return Ok(());
            }
            Err(other) => return Err(other),
        }

        if let Some(mut listing) = self.store.get_listing(order.listing_id).await? {
            if !listing.is_terminal() {
                listing.status = ListingStatus::Sold;
                listing.updated_at = Utc::now();
                self.store.update_listing(listing).await?;
            }
        }
        Ok(())
    }

    /// Consume the event stream forever. A lagged receiver drops the missed
    /// events and keeps going — the periodic sweep catches what slips
    /// through. A closed stream is a transient gateway drop: the task
    /// resubscribes with capped exponential backoff.
    pub fn spawn(self) -> JoinHandle<()> {
        const INITIAL_BACKOFF: std::time::Duration = std::time::Duration::from_millis(100);
        const MAX_BACKOFF: std::time::Duration = std::time::Duration::from_secs(30);

        tokio::spawn(async move {
            let mut backoff = INITIAL_BACKOFF;
            let mut rx = self.gateway.subscribe();
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        backoff = INITIAL_BACKOFF;
                        if let Err(error) = self.apply(&event).await {
                            warn!(
                                order_hash = %event.order_hash.short(),
                                %error,
                                "failed to apply execution event"
                            );
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "execution event stream lagged");
                    }
                    Err(RecvError::Closed) => {
                        info!(backoff_ms = backoff.as_millis() as u64, "execution event stream closed, resubscribing");
                        tokio::time::sleep(backoff).await;
                        backoff = (backoff * 2).min(MAX_BACKOFF);
                        rx = self.gateway.subscribe();
                    }
                }
            }
        })
    }
}
