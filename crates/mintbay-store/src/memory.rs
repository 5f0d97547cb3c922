//! Thread-safe in-memory store.
//!
//! Backs tests and local development; production deployments implement the
//! same traits over a real database. All conditional writes run under the
//! single write guard, which makes the check-and-write sequences atomic —
//! the property the unique-index and compare-and-swap contracts require.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mintbay_types::{
    Address, Amount, Auction, AuctionId, Bid, Listing, ListingId, ListingStatus, MarketError,
    Offer, OfferFilter, OfferId, Order, OrderFilter, OrderHash, OrderStatus, Page, Result,
    TokenId, TxHash,
};
use tokio::sync::RwLock;

use crate::interface::{AuctionStore, ListingStore, OfferStore, OrderStore, StatusCas};

#[derive(Debug, Default)]
struct State {
    listings: BTreeMap<ListingId, Listing>,
    offers: BTreeMap<OfferId, Offer>,
    auctions: BTreeMap<AuctionId, Auction>,
    onchain_auctions: BTreeSet<AuctionId>,
    bids: BTreeMap<AuctionId, Vec<Bid>>,
    orders: BTreeMap<OrderHash, Order>,
}

/// In-memory implementation of every store trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<State>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Test helpers. Bypass the store contracts to set up scenarios the public
/// operations would forbid (aging rows, rewriting payloads).
#[cfg(any(test, feature = "test-helpers"))]
impl MemoryStore {
    pub async fn replace_order_for_test(&self, order: Order) {
        let mut state = self.inner.write().await;
        state.orders.insert(order.order_hash, order);
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn insert_active(&self, listing: Listing) -> Result<()> {
        let mut state = self.inner.write().await;
        let key = listing.natural_key();
        let duplicate = state
            .listings
            .values()
            .any(|l| l.status == ListingStatus::Active && l.natural_key() == key);
        if duplicate {
            return Err(MarketError::ActiveListingExists {
                nft_contract: listing.nft_contract,
                token_id: listing.token_id,
                maker: listing.maker,
            });
        }
        state.listings.insert(listing.id, listing);
        Ok(())
    }

    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>> {
        let state = self.inner.read().await;
        Ok(state.listings.get(&id).cloned())
    }

    async fn update_listing(&self, listing: Listing) -> Result<()> {
        let mut state = self.inner.write().await;
        if !state.listings.contains_key(&listing.id) {
            return Err(MarketError::ListingNotFound(listing.id));
        }
        state.listings.insert(listing.id, listing);
        Ok(())
    }

    async fn find_active(
        &self,
        nft_contract: Address,
        token_id: TokenId,
        now: DateTime<Utc>,
    ) -> Result<Option<Listing>> {
        let state = self.inner.read().await;
        Ok(state
            .listings
            .values()
            .find(|l| l.nft_contract == nft_contract && l.token_id == token_id && l.is_live(now))
            .cloned())
    }
}

#[async_trait]
impl OfferStore for MemoryStore {
    async fn insert_offer(&self, offer: Offer) -> Result<()> {
        let mut state = self.inner.write().await;
        if state.offers.contains_key(&offer.id) {
            return Err(MarketError::CasConflict {
                reason: format!("offer {} already exists", offer.id),
            });
        }
        state.offers.insert(offer.id, offer);
        Ok(())
    }

    async fn get_offer(&self, id: OfferId) -> Result<Option<Offer>> {
        let state = self.inner.read().await;
        Ok(state.offers.get(&id).cloned())
    }

    async fn update_offer(&self, offer: Offer) -> Result<()> {
        let mut state = self.inner.write().await;
        if !state.offers.contains_key(&offer.id) {
            return Err(MarketError::OfferNotFound(offer.id));
        }
        state.offers.insert(offer.id, offer);
        Ok(())
    }

    async fn query_offers(&self, filter: &OfferFilter, page: Page) -> Result<Vec<Offer>> {
        let state = self.inner.read().await;
        let hits: Vec<Offer> = state
            .offers
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        Ok(page.slice(&hits))
    }
}

#[async_trait]
impl AuctionStore for MemoryStore {
    async fn register_onchain(&self, auction_id: AuctionId) -> Result<()> {
        let mut state = self.inner.write().await;
        state.onchain_auctions.insert(auction_id);
        Ok(())
    }

    async fn onchain_exists(&self, auction_id: AuctionId) -> Result<bool> {
        let state = self.inner.read().await;
        Ok(state.onchain_auctions.contains(&auction_id))
    }

    async fn mirror(&self, auction: Auction) -> Result<()> {
        let mut state = self.inner.write().await;
        if state.auctions.contains_key(&auction.auction_id) {
            return Err(MarketError::DuplicateAuction(auction.auction_id));
        }
        state.auctions.insert(auction.auction_id, auction);
        Ok(())
    }

    async fn get_auction(&self, auction_id: AuctionId) -> Result<Option<Auction>> {
        let state = self.inner.read().await;
        Ok(state.auctions.get(&auction_id).cloned())
    }

    async fn update_auction(&self, auction: Auction) -> Result<()> {
        let mut state = self.inner.write().await;
        if !state.auctions.contains_key(&auction.auction_id) {
            return Err(MarketError::AuctionNotFound(auction.auction_id));
        }
        state.auctions.insert(auction.auction_id, auction);
        Ok(())
    }

    async fn cas_bid(
        &self,
        auction_id: AuctionId,
        expected_highest: Amount,
        bid: Bid,
    ) -> Result<()> {
        let mut state = self.inner.write().await;
        let auction = state
            .auctions
            .get_mut(&auction_id)
            .ok_or(MarketError::AuctionNotFound(auction_id))?;

        if auction.highest_bid != expected_highest {
            return Err(MarketError::CasConflict {
                reason: format!(
                    "highest_bid moved from {expected_highest} to {}",
                    auction.highest_bid
                ),
            });
        }

        auction.highest_bid = bid.amount;
        auction.highest_bidder = Some(bid.bidder);
        state.bids.entry(auction_id).or_default().push(bid);
        Ok(())
    }

    async fn bids_for(&self, auction_id: AuctionId) -> Result<Vec<Bid>> {
        let state = self.inner.read().await;
        Ok(state.bids.get(&auction_id).cloned().unwrap_or_default())
    }

    async fn all_auctions(&self) -> Result<Vec<Auction>> {
        let state = self.inner.read().await;
        Ok(state.auctions.values().cloned().collect())
    }

    async fn auctions_by_bidder(&self, bidder: Address) -> Result<Vec<Auction>> {
        let state = self.inner.read().await;
        let ids: BTreeSet<AuctionId> = state
            .bids
            .iter()
            .filter(|(_, bids)| bids.iter().any(|b| b.bidder == bidder))
            .map(|(id, _)| *id)
            .collect();
        Ok(state
            .auctions
            .values()
            .filter(|a| ids.contains(&a.auction_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: Order) -> Result<()> {
        let mut state = self.inner.write().await;
        if state.orders.contains_key(&order.order_hash) {
            return Err(MarketError::DuplicateOrder(order.order_hash));
        }
        state.orders.insert(order.order_hash, order);
        Ok(())
    }

    async fn get_order(&self, order_hash: OrderHash) -> Result<Option<Order>> {
        let state = self.inner.read().await;
        Ok(state.orders.get(&order_hash).cloned())
    }

    async fn cas_status(
        &self,
        order_hash: OrderHash,
        expected: OrderStatus,
        next: OrderStatus,
        tx_hash: Option<TxHash>,
    ) -> Result<StatusCas> {
        let mut state = self.inner.write().await;
        let order = state
            .orders
            .get_mut(&order_hash)
            .ok_or(MarketError::OrderNotFound(order_hash))?;

        if order.status == next {
            // Another writer got here first; do not clobber its tx_hash.
            return Ok(StatusCas::NoOp);
        }
        if order.status != expected {
            return Err(MarketError::OrderNotPending {
                order_hash,
                status: order.status,
            });
        }

        order.status = next;
        if tx_hash.is_some() {
            order.tx_hash = tx_hash;
        }
        Ok(StatusCas::Applied)
    }

    async fn query_orders(&self, filter: &OrderFilter, page: Page) -> Result<Vec<Order>> {
        let state = self.inner.read().await;
        let hits: Vec<Order> = state
            .orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        Ok(page.slice(&hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mintbay_types::{Amount, OrderPayload, Signature};

    fn listing(maker: Address, token: u128) -> Listing {
        Listing::dummy(maker, TokenId::new(token), Amount::wei(1000))
    }

    #[tokio::test]
    async fn insert_active_enforces_unique_key() {
        let store = MemoryStore::new();
        let maker = Address::dummy(1);

        store.insert_active(listing(maker, 7)).await.unwrap();
        let err = store.insert_active(listing(maker, 7)).await.unwrap_err();
        assert!(matches!(err, MarketError::ActiveListingExists { .. }));

        // A different maker for the same token is fine.
        store
            .insert_active(listing(Address::dummy(2), 7))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_creates_race_to_one_success() {
        let store = MemoryStore::new();
        let maker = Address::dummy(1);

        let (a, b) = tokio::join!(
            store.insert_active(listing(maker, 7)),
            store.insert_active(listing(maker, 7)),
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1, "exactly one wins");
    }

    #[tokio::test]
    async fn cancelled_listing_frees_the_key() {
        let store = MemoryStore::new();
        let maker = Address::dummy(1);
        let mut first = listing(maker, 7);
        let id = first.id;
        store.insert_active(first.clone()).await.unwrap();

        first.status = ListingStatus::Cancelled;
        store.update_listing(first).await.unwrap();

        store.insert_active(listing(maker, 7)).await.unwrap();
        assert!(store.get_listing(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn find_active_skips_expired() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mut l = listing(Address::dummy(1), 7);
        l.expiry = Some(now - chrono::Duration::seconds(5));
        let contract = l.nft_contract;
        store.insert_active(l).await.unwrap();

        let found = store.find_active(contract, TokenId::new(7), now).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn cas_bid_rejects_stale_expectation() {
        let store = MemoryStore::new();
        let auction = Auction::dummy_running(AuctionId(1), Address::dummy(1));
        store.register_onchain(AuctionId(1)).await.unwrap();
        store.mirror(auction).await.unwrap();

        let bid = |tag: u8, amount: u128| Bid {
            auction_id: AuctionId(1),
            bidder: Address::dummy(tag),
            amount: Amount::wei(amount),
            placed_at: Utc::now(),
        };

        store
            .cas_bid(AuctionId(1), Amount::ZERO, bid(2, 100))
            .await
            .unwrap();

        // A second writer that still thinks the highest is zero loses.
        let err = store
            .cas_bid(AuctionId(1), Amount::ZERO, bid(3, 120))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::CasConflict { .. }));

        // With the fresh expectation it goes through.
        store
            .cas_bid(AuctionId(1), Amount::wei(100), bid(3, 120))
            .await
            .unwrap();

        let bids = store.bids_for(AuctionId(1)).await.unwrap();
        assert_eq!(bids.len(), 2);
        let auction = store.get_auction(AuctionId(1)).await.unwrap().unwrap();
        assert_eq!(auction.highest_bid, Amount::wei(120));
        assert_eq!(auction.highest_bidder, Some(Address::dummy(3)));
    }

    fn order(maker: Address, nonce: u64) -> Order {
        let payload = OrderPayload::dummy(maker, TokenId::new(1), Amount::wei(500), nonce);
        let order_hash = payload.content_hash();
        Order {
            payload,
            order_hash,
            signature: Signature(vec![0u8; 64]),
            status: OrderStatus::Pending,
            tx_hash: None,
            listing_id: ListingId::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_order_hash_conflicts() {
        let store = MemoryStore::new();
        let o = order(Address::dummy(1), 0);
        store.insert_order(o.clone()).await.unwrap();
        let err = store.insert_order(o).await.unwrap_err();
        assert!(matches!(err, MarketError::DuplicateOrder(_)));
    }

    #[tokio::test]
    async fn cas_status_applied_then_noop() {
        let store = MemoryStore::new();
        let o = order(Address::dummy(1), 0);
        let hash = o.order_hash;
        store.insert_order(o).await.unwrap();

        let tx = TxHash::from_bytes([9; 32]);
        let first = store
            .cas_status(hash, OrderStatus::Pending, OrderStatus::Executed, Some(tx))
            .await
            .unwrap();
        assert_eq!(first, StatusCas::Applied);

        // The losing writer converges without clobbering the tx hash.
        let second = store
            .cas_status(
                hash,
                OrderStatus::Pending,
                OrderStatus::Executed,
                Some(TxHash::from_bytes([7; 32])),
            )
            .await
            .unwrap();
        assert_eq!(second, StatusCas::NoOp);

        let stored = store.get_order(hash).await.unwrap().unwrap();
        assert_eq!(stored.tx_hash, Some(tx));
    }

    #[tokio::test]
    async fn cas_status_rejects_cross_transitions() {
        let store = MemoryStore::new();
        let o = order(Address::dummy(1), 0);
        let hash = o.order_hash;
        store.insert_order(o).await.unwrap();

        store
            .cas_status(hash, OrderStatus::Pending, OrderStatus::Cancelled, None)
            .await
            .unwrap();

        // Cancelled may not become executed.
        let err = store
            .cas_status(hash, OrderStatus::Pending, OrderStatus::Executed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::OrderNotPending { .. }));
    }

    #[tokio::test]
    async fn by_bidder_collects_bid_participation() {
        let store = MemoryStore::new();
        for id in 1..=3u64 {
            store
                .mirror(Auction::dummy_running(AuctionId(id), Address::dummy(9)))
                .await
                .unwrap();
        }
        let bidder = Address::dummy(5);
        for (id, amount) in [(1u64, 100u128), (2, 150)] {
            store
                .cas_bid(
                    AuctionId(id),
                    Amount::ZERO,
                    Bid {
                        auction_id: AuctionId(id),
                        bidder,
                        amount: Amount::wei(amount),
                        placed_at: Utc::now(),
                    },
                )
                .await
                .unwrap();
        }

        let auctions = store.auctions_by_bidder(bidder).await.unwrap();
        assert_eq!(auctions.len(), 2);
    }
}
