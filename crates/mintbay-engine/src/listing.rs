//! Listing state machine.
//!
//! `ACTIVE --(cancel, maker-authorized)--> CANCELLED`
//! `ACTIVE --(buy-side completion)------> SOLD`
//!
//! Both terminal. Uniqueness of the active listing per
//! (nft_contract, token_id, maker) is enforced by the store's atomic
//! `insert_active`; the engine adds authorization and expiry checks.

use std::sync::Arc;

use chrono::Utc;
use mintbay_store::ListingStore;
use mintbay_types::{
    Address, Listing, ListingId, ListingPatch, ListingStatus, MarketError, NewListing, Result,
    TokenId,
};
use tracing::info;

/// Orchestrates the listing lifecycle against an injected store.
pub struct ListingEngine<S> {
    store: Arc<S>,
}

impl<S: ListingStore> ListingEngine<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a new ACTIVE listing.
    ///
    /// Fails with a conflict if an active listing already exists for the
    /// natural key — two concurrent creates race to exactly one success.
    pub async fn create(&self, input: NewListing) -> Result<Listing> {
        let listing = input.into_listing(Utc::now());
        self.store.insert_active(listing.clone()).await?;
        info!(listing_id = %listing.id, maker = %listing.maker.short(), "listing created");
        Ok(listing)
    }

    /// The ACTIVE, unexpired listing for (nft_contract, token_id).
    pub async fn current_active(
        &self,
        nft_contract: Address,
        token_id: TokenId,
    ) -> Result<Listing> {
        self.store
            .find_active(nft_contract, token_id, Utc::now())
            .await?
            .ok_or(MarketError::NoActiveListing {
                nft_contract,
                token_id,
            })
    }

    /// Partial update. The maker is immutable via this path; status only
    /// moves through [`Self::cancel`] and [`Self::mark_sold`].
    pub async fn update(&self, id: ListingId, patch: ListingPatch) -> Result<Listing> {
        let mut listing = self
            .store
            .get_listing(id)
            .await?
            .ok_or(MarketError::ListingNotFound(id))?;
        patch.apply(&mut listing, Utc::now());
        self.store.update_listing(listing.clone()).await?;
        Ok(listing)
    }

    /// Cancel a listing. Only the maker may do this, and only while the
    /// listing is not already terminal.
    pub async fn cancel(&self, id: ListingId, requester: Address) -> Result<Listing> {
        let mut listing = self
            .store
            .get_listing(id)
            .await?
            .ok_or(MarketError::ListingNotFound(id))?;

        if listing.maker != requester {
            return Err(MarketError::NotMaker {
                maker: listing.maker,
                requester,
            });
        }
        if listing.is_terminal() {
            return Err(MarketError::ListingNotActive(id));
        }

        listing.status = ListingStatus::Cancelled;
        listing.updated_at = Utc::now();
        self.store.update_listing(listing.clone()).await?;
        info!(listing_id = %id, "listing cancelled");
        Ok(listing)
    }

    /// Mark the current active listing for (nft_contract, token_id) as
    /// SOLD. Resolved via [`Self::current_active`], maker-authorized.
    pub async fn mark_sold(
        &self,
        nft_contract: Address,
        token_id: TokenId,
        requester: Address,
    ) -> Result<Listing> {
        let mut listing = self.current_active(nft_contract, token_id).await?;

        if listing.maker != requester {
            return Err(MarketError::NotMaker {
                maker: listing.maker,
                requester,
            });
        }

        listing.status = ListingStatus::Sold;
        listing.updated_at = Utc::now();
        self.store.update_listing(listing.clone()).await?;
        info!(listing_id = %listing.id, "listing sold");
        Ok(listing)
    }
}
