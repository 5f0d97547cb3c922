//! Offer and counter-offer lifecycle.
//!
//! Offers are buy-side bids independent of any listing. A counter-offer
//! answers an existing offer with new terms, inheriting the parent's token
//! identity and payment token. Terminal flags (`cancelled`, `executed`) are
//! mutually exclusive; acceptance is idempotent, cancellation of an
//! executed offer is not.

use std::sync::Arc;

use chrono::Utc;
use mintbay_store::OfferStore;
use mintbay_types::{
    Address, EngineConfig, MarketError, NewCounterOffer, NewOffer, Offer, OfferFilter, OfferId,
    Page, Result,
};
use tracing::info;

use crate::gateway::{bounded, ChainGateway};

pub struct OfferEngine<S, G> {
    store: Arc<S>,
    gateway: Arc<G>,
    config: EngineConfig,
}

impl<S: OfferStore, G: ChainGateway> OfferEngine<S, G> {
    #[must_use]
    pub fn new(store: Arc<S>, gateway: Arc<G>, config: EngineConfig) -> Self {
        Self {
            store,
            gateway,
            config,
        }
    }

    /// Create an offer.
    ///
    /// 1. Fetch the offerer's chain nonce for replay protection.
    /// 2. Derive the deterministic offer id from the token identity, the
    ///    offerer, and the creation instant.
    /// 3. Persist.
    pub async fn create_offer(&self, input: NewOffer) -> Result<Offer> {
        let nonce = bounded(
            "nonce",
            self.config.gateway_timeout(),
            self.gateway.nonce(input.offerer),
        )
        .await?;

        let now = Utc::now();
        let offer = Offer {
            id: OfferId::derive(input.nft_contract, input.token_id, input.offerer, now),
            offerer: input.offerer,
            nft_contract: input.nft_contract,
            token_id: input.token_id,
            quantity: input.quantity,
            price: input.price,
            payment_token: input.payment_token,
            expiry: input.expiry,
            nonce,
            is_counter_offer: false,
            cancelled: false,
            executed: false,
            original_offer_id: None,
            created_at: now,
        };
        self.store.insert_offer(offer.clone()).await?;
        info!(offer_id = %offer.id, offerer = %offer.offerer.short(), "offer created");
        Ok(offer)
    }

    /// Create a counter-offer against `parent_id`.
    ///
    /// The parent must exist and still be open; the counter inherits its
    /// nft_contract, token_id, quantity, and payment token.
    pub async fn create_counter_offer(
        &self,
        parent_id: OfferId,
        input: NewCounterOffer,
    ) -> Result<Offer> {
        let parent = self
            .store
            .get_offer(parent_id)
            .await?
            .ok_or(MarketError::ParentOfferNotFound(parent_id))?;

        if parent.cancelled {
            return Err(MarketError::OfferCancelled(parent_id));
        }
        if parent.executed {
            return Err(MarketError::OfferExecuted(parent_id));
        }

        let nonce = bounded(
            "nonce",
            self.config.gateway_timeout(),
            self.gateway.nonce(input.offerer),
        )
        .await?;

        let now = Utc::now();
        let counter = Offer {
            id: OfferId::derive(parent.nft_contract, parent.token_id, input.offerer, now),
            offerer: input.offerer,
            nft_contract: parent.nft_contract,
            token_id: parent.token_id,
            quantity: parent.quantity,
            price: input.price,
            payment_token: parent.payment_token,
            expiry: input.expiry,
            nonce,
            is_counter_offer: true,
            cancelled: false,
            executed: false,
            original_offer_id: Some(parent_id),
            created_at: now,
        };
        self.store.insert_offer(counter.clone()).await?;
        info!(
            offer_id = %counter.id,
            parent_id = %parent_id,
            "counter-offer created"
        );
        Ok(counter)
    }

    /// Accept an offer, marking it executed.
    ///
    /// Accepting an already-executed offer is a no-op success; accepting a
    /// cancelled one is an error. A second acceptance therefore cannot
    /// double-settle.
    pub async fn accept_offer(&self, id: OfferId) -> Result<Offer> {
        let mut offer = self
            .store
            .get_offer(id)
            .await?
            .ok_or(MarketError::OfferNotFound(id))?;

        if offer.cancelled {
            return Err(MarketError::OfferCancelled(id));
        }
        if offer.executed {
            return Ok(offer);
        }

        offer.executed = true;
        self.store.update_offer(offer.clone()).await?;
        info!(offer_id = %id, "offer accepted");
        Ok(offer)
    }

    /// Cancel an offer. Only the offerer may do this, and an executed offer
    /// can no longer be withdrawn. Re-cancelling is a no-op success.
    pub async fn cancel_offer(&self, id: OfferId, requester: Address) -> Result<Offer> {
        let mut offer = self
            .store
            .get_offer(id)
            .await?
            .ok_or(MarketError::OfferNotFound(id))?;

        if offer.offerer != requester {
            return Err(MarketError::NotMaker {
                maker: offer.offerer,
                requester,
            });
        }
        if offer.executed {
            return Err(MarketError::OfferExecuted(id));
        }
        if offer.cancelled {
            return Ok(offer);
        }

        offer.cancelled = true;
        self.store.update_offer(offer.clone()).await?;
        info!(offer_id = %id, "offer cancelled");
        Ok(offer)
    }

    /// Filtered, paged offer scan. No match means an empty page.
    pub async fn offers(&self, filter: &OfferFilter, page: Page) -> Result<Vec<Offer>> {
        self.store.query_offers(filter, page).await
    }
}
