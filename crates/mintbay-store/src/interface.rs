//! Store collaborator contracts.
//!
//! The engines own no persistent state; everything durable lives behind
//! these traits. Two operations carry atomicity requirements the engines
//! rely on for correctness under concurrent requests:
//!
//! - `ListingStore::insert_active` — create-if-no-active under the natural
//!   key (nft_contract, token_id, maker). Two racing creates must resolve
//!   to exactly one success.
//! - `AuctionStore::cas_bid` and `OrderStore::cas_status` — compare-and-swap
//!   writes. A lost race surfaces as a conflict instead of a lost update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mintbay_types::{
    Address, Amount, Auction, AuctionId, Bid, Listing, ListingId, Offer, OfferFilter, OfferId,
    Order, OrderFilter, OrderHash, OrderStatus, Page, Result, TokenId, TxHash,
};

/// Outcome of a guarded status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCas {
    /// The transition was applied by this caller.
    Applied,
    /// Another writer already moved the order to the target state; nothing
    /// was changed. The two idempotent writers have converged.
    NoOp,
}

/// Persistence for [`Listing`] rows.
#[async_trait]
pub trait ListingStore: Send + Sync + 'static {
    /// Insert a new ACTIVE listing, failing with a conflict if an active
    /// listing already exists for (nft_contract, token_id, maker). The
    /// read-check and the insert are a single atomic step.
    async fn insert_active(&self, listing: Listing) -> Result<()>;

    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>>;

    /// Full-row replace. Fails `NotFound` if the row is absent.
    async fn update_listing(&self, listing: Listing) -> Result<()>;

    /// The ACTIVE, unexpired listing for (nft_contract, token_id), if any.
    async fn find_active(
        &self,
        nft_contract: Address,
        token_id: TokenId,
        now: DateTime<Utc>,
    ) -> Result<Option<Listing>>;
}

/// Persistence for [`Offer`] rows.
#[async_trait]
pub trait OfferStore: Send + Sync + 'static {
    /// Insert a new offer. Fails with a conflict on a duplicate id.
    async fn insert_offer(&self, offer: Offer) -> Result<()>;

    async fn get_offer(&self, id: OfferId) -> Result<Option<Offer>>;

    /// Full-row replace. Fails `NotFound` if the row is absent.
    async fn update_offer(&self, offer: Offer) -> Result<()>;

    /// Filtered, paged scan. An empty result is an empty page, not an error.
    async fn query_offers(&self, filter: &OfferFilter, page: Page) -> Result<Vec<Offer>>;
}

/// Persistence for [`Auction`] rows, their on-chain mirror set, and bid
/// history.
#[async_trait]
pub trait AuctionStore: Send + Sync + 'static {
    /// Record that an on-chain auction exists (fed by the chain indexer).
    async fn register_onchain(&self, auction_id: AuctionId) -> Result<()>;

    async fn onchain_exists(&self, auction_id: AuctionId) -> Result<bool>;

    /// Insert the local mirror row. Fails with a conflict on a duplicate.
    async fn mirror(&self, auction: Auction) -> Result<()>;

    async fn get_auction(&self, auction_id: AuctionId) -> Result<Option<Auction>>;

    /// Full-row replace. Fails `NotFound` if the row is absent.
    async fn update_auction(&self, auction: Auction) -> Result<()>;

    /// Compare-and-swap on `highest_bid`: applies `bid` as the new highest
    /// and appends it to the bid history, but only if the stored highest
    /// bid still equals `expected_highest`. Fails with a CAS conflict
    /// otherwise — the caller re-reads and re-validates.
    async fn cas_bid(&self, auction_id: AuctionId, expected_highest: Amount, bid: Bid)
        -> Result<()>;

    /// All bid records for an auction, in placement order.
    async fn bids_for(&self, auction_id: AuctionId) -> Result<Vec<Bid>>;

    /// Every mirrored auction. The reconciler sweeps this.
    async fn all_auctions(&self) -> Result<Vec<Auction>>;

    /// Auctions the bidder has placed at least one bid on.
    async fn auctions_by_bidder(&self, bidder: Address) -> Result<Vec<Auction>>;
}

/// Persistence for [`Order`] rows, keyed by content hash (unique index).
#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    /// Insert a new order. Fails with a conflict on a duplicate hash.
    async fn insert_order(&self, order: Order) -> Result<()>;

    async fn get_order(&self, order_hash: OrderHash) -> Result<Option<Order>>;

    /// Guarded status transition:
    /// - current == `expected` → apply `next` (and `tx_hash` if given),
    ///   return [`StatusCas::Applied`]
    /// - current == `next` → change nothing, return [`StatusCas::NoOp`]
    /// - anything else → `OrderNotPending`
    async fn cas_status(
        &self,
        order_hash: OrderHash,
        expected: OrderStatus,
        next: OrderStatus,
        tx_hash: Option<TxHash>,
    ) -> Result<StatusCas>;

    /// Filtered, paged scan. An empty result is an empty page, not an error.
    async fn query_orders(&self, filter: &OrderFilter, page: Page) -> Result<Vec<Order>>;
}
