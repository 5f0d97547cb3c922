//! Auction model.
//!
//! An auction row mirrors an on-chain English auction. Its status is a pure
//! function of (current time, start_time, end_time) — re-evaluating it is
//! always idempotent — except the terminal ENDED-with-settled state, which
//! is sticky.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, AuctionId, TokenId};

/// Time-derived auction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuctionStatus {
    Pending,
    Active,
    Ended,
}

impl std::fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Ended => write!(f, "ENDED"),
        }
    }
}

/// A mirrored auction row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub auction_id: AuctionId,
    pub seller: Address,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub min_bid_increment: Amount,
    pub reserve_price: Amount,
    pub payment_token: Address,
    pub nft_contract: Address,
    pub token_id: TokenId,
    pub quantity: u64,
    pub highest_bidder: Option<Address>,
    /// Monotonically non-decreasing once set; starts at zero.
    pub highest_bid: Amount,
    pub settled: bool,
    pub status: AuctionStatus,
    pub created_at: DateTime<Utc>,
}

impl Auction {
    /// Derive the status from timestamps. Settled auctions are ENDED forever.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> AuctionStatus {
        if self.settled || now.timestamp() > self.end_time.timestamp() {
            AuctionStatus::Ended
        } else if now.timestamp() >= self.start_time.timestamp() {
            AuctionStatus::Active
        } else {
            AuctionStatus::Pending
        }
    }

    /// Bids are accepted only inside the window, before settlement.
    #[must_use]
    pub fn is_open_for_bids(&self, now: DateTime<Utc>) -> bool {
        !self.settled && self.status_at(now) == AuctionStatus::Active
    }

    /// Settlement is legal only after the window elapsed, exactly once.
    #[must_use]
    pub fn can_settle(&self, now: DateTime<Utc>) -> bool {
        !self.settled && now.timestamp() > self.end_time.timestamp()
    }

    /// The lowest acceptable next bid, combining all three rules:
    /// strictly above the current highest, at least one increment above
    /// it, and at least the reserve price.
    #[must_use]
    pub fn min_acceptable_bid(&self) -> Amount {
        let strictly_above = self.highest_bid.saturating_add(Amount::wei(1));
        let with_increment = self.highest_bid.saturating_add(self.min_bid_increment);
        self.reserve_price.max(strictly_above).max(with_increment)
    }
}

/// Input for mirroring an on-chain auction locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuction {
    pub auction_id: AuctionId,
    pub seller: Address,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub min_bid_increment: Amount,
    pub reserve_price: Amount,
    pub payment_token: Address,
    pub nft_contract: Address,
    pub token_id: TokenId,
    pub quantity: u64,
}

impl NewAuction {
    /// Materialize the local mirror row: no bids yet, unsettled, status
    /// derived from the window.
    #[must_use]
    pub fn into_auction(self, now: DateTime<Utc>) -> Auction {
        let mut auction = Auction {
            auction_id: self.auction_id,
            seller: self.seller,
            start_time: self.start_time,
            end_time: self.end_time,
            min_bid_increment: self.min_bid_increment,
            reserve_price: self.reserve_price,
            payment_token: self.payment_token,
            nft_contract: self.nft_contract,
            token_id: self.token_id,
            quantity: self.quantity,
            highest_bidder: None,
            highest_bid: Amount::ZERO,
            settled: false,
            status: AuctionStatus::Pending,
            created_at: now,
        };
        auction.status = auction.status_at(now);
        auction
    }
}

/// A single bid record. The store appends one per accepted bid so the
/// reconciler can recompute the winner from history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub auction_id: AuctionId,
    pub bidder: Address,
    pub amount: Amount,
    pub placed_at: DateTime<Utc>,
}

/// Reduce bid records to the winning bid.
///
/// Strictly-greater comparison: on an exact tie the earliest bid in
/// iteration order keeps the win.
#[must_use]
pub fn winning_bid(bids: &[Bid]) -> Option<&Bid> {
    bids.iter()
        .fold(None, |best: Option<&Bid>, current| match best {
            Some(prev) if current.amount > prev.amount => Some(current),
            Some(prev) => Some(prev),
            None => Some(current),
        })
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Auction {
    /// An auction that opened an hour ago and runs for another hour.
    pub fn dummy_running(auction_id: AuctionId, seller: Address) -> Self {
        let now = Utc::now();
        Self {
            auction_id,
            seller,
            start_time: now - chrono::Duration::hours(1),
            end_time: now + chrono::Duration::hours(1),
            min_bid_increment: Amount::wei(10),
            reserve_price: Amount::wei(100),
            payment_token: Address::dummy(0xEE),
            nft_contract: Address::dummy(0xCC),
            token_id: TokenId::new(1),
            quantity: 1,
            highest_bidder: None,
            highest_bid: Amount::ZERO,
            settled: false,
            status: AuctionStatus::Active,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn status_is_pure_function_of_time() {
        let auction = Auction::dummy_running(AuctionId(1), Address::dummy(1));
        let before = auction.start_time - Duration::hours(1);
        let during = auction.start_time + Duration::minutes(5);
        let after = auction.end_time + Duration::seconds(1);

        assert_eq!(auction.status_at(before), AuctionStatus::Pending);
        assert_eq!(auction.status_at(during), AuctionStatus::Active);
        assert_eq!(auction.status_at(after), AuctionStatus::Ended);
        // Re-evaluation is idempotent.
        assert_eq!(auction.status_at(after), auction.status_at(after));
    }

    #[test]
    fn settled_is_sticky() {
        let mut auction = Auction::dummy_running(AuctionId(1), Address::dummy(1));
        auction.settled = true;
        let during = auction.start_time + Duration::minutes(5);
        assert_eq!(auction.status_at(during), AuctionStatus::Ended);
        assert!(!auction.is_open_for_bids(during));
    }

    #[test]
    fn min_acceptable_combines_reserve_and_increment() {
        let mut auction = Auction::dummy_running(AuctionId(1), Address::dummy(1));
        // No bids yet: reserve (100) dominates the increment floor (10).
        assert_eq!(auction.min_acceptable_bid(), Amount::wei(100));

        auction.highest_bid = Amount::wei(100);
        // With a bid: highest + increment (110) dominates the reserve.
        assert_eq!(auction.min_acceptable_bid(), Amount::wei(110));
    }

    #[test]
    fn winning_bid_first_seen_wins_ties() {
        let now = Utc::now();
        let mk = |tag: u8, amount: u128, secs: i64| Bid {
            auction_id: AuctionId(1),
            bidder: Address::dummy(tag),
            amount: Amount::wei(amount),
            placed_at: now + Duration::seconds(secs),
        };
        let bids = vec![mk(1, 100, 0), mk(2, 150, 1), mk(3, 150, 2), mk(4, 120, 3)];
        let winner = winning_bid(&bids).unwrap();
        // Bidder 2 and 3 tie at 150; the earlier one keeps the win.
        assert_eq!(winner.bidder, Address::dummy(2));
    }

    #[test]
    fn winning_bid_empty() {
        assert!(winning_bid(&[]).is_none());
    }

    #[test]
    fn can_settle_only_after_end() {
        let auction = Auction::dummy_running(AuctionId(1), Address::dummy(1));
        assert!(!auction.can_settle(auction.end_time));
        assert!(auction.can_settle(auction.end_time + Duration::seconds(1)));

        let mut settled = auction;
        settled.settled = true;
        assert!(!settled.can_settle(settled.end_time + Duration::seconds(1)));
    }
}
