//! Auction mirroring, off-chain bid validation, and settlement.
//!
//! The chain is the source of truth for auction existence; the local row is
//! a mirror used to validate bids before they cost gas. Bid acceptance is a
//! compare-and-swap on `highest_bid`:
//!
//! 1. Read the auction and validate the bid against the window, reserve,
//!    and increment rules in one pass.
//! 2. CAS the new highest bid against the highest bid the validation saw.
//! 3. On a lost race, re-read and re-validate, up to a bounded retry count.
//!
//! The loser of a race is never silently dropped: either its bid still
//! clears the new floor and lands on retry, or the caller gets the precise
//! rejection.

use std::sync::Arc;

use chrono::Utc;
use mintbay_store::AuctionStore;
use mintbay_types::{
    constants, winning_bid, Address, Amount, Auction, AuctionId, AuctionStatus, Bid, MarketError,
    NewAuction, Result,
};
use tracing::{debug, info};

/// Auctions a bidder has touched, split by outcome.
#[derive(Debug, Clone, Default)]
pub struct BidderAuctions {
    /// Ended auctions where the bidder holds the highest bid.
    pub won: Vec<Auction>,
    /// Everything else the bidder has bid on.
    pub participated: Vec<Auction>,
}

/// Outcome of a settlement.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub auction: Auction,
    /// The winning bid, if any bid cleared the reserve during the window.
    pub winner: Option<Bid>,
}

pub struct AuctionEngine<S> {
    store: Arc<S>,
}

impl<S: AuctionStore> AuctionEngine<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Mirror an on-chain auction locally.
    ///
    /// The chain record must already exist — the mirror never leads the
    /// chain. A duplicate mirror is a conflict.
    pub async fn create_auction(&self, input: NewAuction) -> Result<Auction> {
        if !self.store.onchain_exists(input.auction_id).await? {
            return Err(MarketError::AuctionNotOnChain(input.auction_id));
        }

        let auction = input.into_auction(Utc::now());
        self.store.mirror(auction.clone()).await?;
        info!(
            auction_id = %auction.auction_id,
            seller = %auction.seller.short(),
            status = %auction.status,
            "auction mirrored"
        );
        Ok(auction)
    }

    pub async fn auction(&self, auction_id: AuctionId) -> Result<Auction> {
        self.store
            .get_auction(auction_id)
            .await?
            .ok_or(MarketError::AuctionNotFound(auction_id))
    }

    /// Validate and record a bid.
    ///
    /// All three acceptance rules run against a single read of the auction
    /// row; the CAS write then guarantees that read was still current. A
    /// lost race re-validates from scratch rather than accepting a bid
    /// against a stale floor.
    pub async fn place_bid(
        &self,
        auction_id: AuctionId,
        bidder: Address,
        amount: Amount,
    ) -> Result<Bid> {
        for attempt in 0..constants::MAX_BID_CAS_RETRIES {
            let auction = self.auction(auction_id).await?;
            let now = Utc::now();

            if !auction.is_open_for_bids(now) {
                return Err(MarketError::AuctionNotActive(auction_id));
            }
            if amount < auction.reserve_price {
                return Err(MarketError::BidBelowReserve {
                    amount,
                    reserve: auction.reserve_price,
                });
            }
            let min_required = auction.min_acceptable_bid();
            if amount < min_required {
                return Err(MarketError::BidTooLow {
                    amount,
                    min_required,
                });
            }

            let bid = Bid {
                auction_id,
                bidder,
                amount,
                placed_at: now,
            };
            match self
                .store
                .cas_bid(auction_id, auction.highest_bid, bid.clone())
                .await
            {
                Ok(()) => {
                    info!(
                        auction_id = %auction_id,
                        bidder = %bidder.short(),
                        amount = %amount,
                        "bid accepted"
                    );
                    return Ok(bid);
                }
                Err(MarketError::CasConflict { .. }) => {
                    debug!(
                        auction_id = %auction_id,
                        attempt,
                        "highest bid moved, re-validating"
                    );
                }
                Err(other) => return Err(other),
            }
        }

        Err(MarketError::CasConflict {
            reason: format!("bid retries exhausted for {auction_id}"),
        })
    }

    /// Settle an ended auction. Seller-only, exactly once; the winner is
    /// reported, not assigned — transfer happens on-chain.
    pub async fn settle_auction(
        &self,
        auction_id: AuctionId,
        requester: Address,
    ) -> Result<Settlement> {
        let mut auction = self.auction(auction_id).await?;

        if auction.seller != requester {
            return Err(MarketError::NotSeller {
                seller: auction.seller,
                requester,
            });
        }
        if auction.settled {
            return Err(MarketError::AuctionAlreadySettled(auction_id));
        }
        if !auction.can_settle(Utc::now()) {
            return Err(MarketError::AuctionStillRunning(auction_id));
        }

        auction.settled = true;
        auction.status = AuctionStatus::Ended;
        self.store.update_auction(auction.clone()).await?;

        let bids = self.store.bids_for(auction_id).await?;
        let winner = winning_bid(&bids).cloned();
        match &winner {
            Some(bid) => info!(
                auction_id = %auction_id,
                winner = %bid.bidder.short(),
                amount = %bid.amount,
                "auction settled"
            ),
            None => info!(auction_id = %auction_id, "auction settled with no bids"),
        }
        Ok(Settlement { auction, winner })
    }

    /// Everything a bidder has bid on, partitioned into won (ended, holding
    /// the highest bid) and merely participated.
    pub async fn auctions_by_bidder(&self, bidder: Address) -> Result<BidderAuctions> {
        let now = Utc::now();
        let mut result = BidderAuctions::default();
        for auction in self.store.auctions_by_bidder(bidder).await? {
            let ended = auction.status_at(now) == AuctionStatus::Ended;
            if ended && auction.highest_bidder == Some(bidder) {
                result.won.push(auction);
            } else {
                result.participated.push(auction);
            }
        }
        Ok(result)
    }
}
