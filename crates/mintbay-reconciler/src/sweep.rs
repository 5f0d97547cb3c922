//! Periodic auction sweep.
//!
//! Auction status is a pure function of the clock, so a crashed or skipped
//! sweep costs nothing: the next run recomputes every row from scratch and
//! lands on the same result. For ended auctions the sweep also re-derives
//! the winner from the bid history (strictly-greater, first-seen wins on
//! ties). It never touches `settled`, which belongs to the settlement path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mintbay_store::AuctionStore;
use mintbay_types::{winning_bid, AuctionStatus, Result};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub struct Sweeper<S> {
    store: Arc<S>,
}

impl<S: AuctionStore> Sweeper<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Re-derive every auction's status at `now`, re-derive the winner of
    /// ended auctions from their bid history, and persist the rows that
    /// drifted. Returns how many rows changed. Running twice at the same
    /// instant changes nothing the second time.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut transitions = 0;
        for mut auction in self.store.all_auctions().await? {
            let derived = auction.status_at(now);
            let mut dirty = auction.status != derived;
            if dirty {
                debug!(
                    auction_id = %auction.auction_id,
                    from = %auction.status,
                    to = %derived,
                    "auction status drifted"
                );
                auction.status = derived;
            }

            if derived == AuctionStatus::Ended {
                let bids = self.store.bids_for(auction.auction_id).await?;
                if let Some(win) = winning_bid(&bids) {
                    if auction.highest_bidder != Some(win.bidder)
                        || auction.highest_bid != win.amount
                    {
                        auction.highest_bidder = Some(win.bidder);
                        auction.highest_bid = win.amount;
                        dirty = true;
                    }
                }
            }

            if dirty {
                self.store.update_auction(auction).await?;
                transitions += 1;
            }
        }
        if transitions > 0 {
            info!(transitions, "auction sweep applied transitions");
        }
        Ok(transitions)
    }

    /// Run the sweep forever on a fixed interval. Errors are logged and the
    /// loop keeps going; the next tick retries the whole sweep.
    pub fn spawn(self, interval: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(error) = self.run_once(Utc::now()).await {
                    error!(%error, "auction sweep failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use mintbay_store::MemoryStore;
    use mintbay_types::{Address, Auction, AuctionId, AuctionStatus};

    #[tokio::test]
    async fn sweep_derives_all_three_states() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();

        let mut pending = Auction::dummy_running(AuctionId(1), Address::dummy(1));
        pending.start_time = now + Duration::hours(1);
        pending.end_time = now + Duration::hours(2);
        pending.status = AuctionStatus::Active; // wrong on purpose
        store.mirror(pending).await.unwrap();

        let mut ended = Auction::dummy_running(AuctionId(2), Address::dummy(1));
        ended.end_time = now - Duration::seconds(10);
        store.mirror(ended).await.unwrap();

        let running = Auction::dummy_running(AuctionId(3), Address::dummy(1));
        store.mirror(running).await.unwrap();

        let sweeper = Sweeper::new(Arc::clone(&store));
        let changed = sweeper.run_once(now).await.unwrap();
        assert_eq!(changed, 2);

        let statuses: Vec<AuctionStatus> = {
            let mut all = store.all_auctions().await.unwrap();
            all.sort_by_key(|a| a.auction_id);
            all.iter().map(|a| a.status).collect()
        };
        assert_eq!(
            statuses,
            vec![
                AuctionStatus::Pending,
                AuctionStatus::Ended,
                AuctionStatus::Active
            ]
        );
    }

    #[tokio::test]
    async fn sweep_twice_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let mut ended = Auction::dummy_running(AuctionId(1), Address::dummy(1));
        ended.end_time = now - Duration::seconds(10);
        store.mirror(ended).await.unwrap();

        let sweeper = Sweeper::new(store);
        assert_eq!(sweeper.run_once(now).await.unwrap(), 1);
        assert_eq!(sweeper.run_once(now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sweep_rederives_winner_for_ended_auctions() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let mut auction = Auction::dummy_running(AuctionId(1), Address::dummy(1));
        auction.end_time = now - Duration::seconds(10);
        store.mirror(auction.clone()).await.unwrap();

        store
            .cas_bid(
                AuctionId(1),
                mintbay_types::Amount::ZERO,
                mintbay_types::Bid {
                    auction_id: AuctionId(1),
                    bidder: Address::dummy(2),
                    amount: mintbay_types::Amount::wei(150),
                    placed_at: now,
                },
            )
            .await
            .unwrap();

        // Simulate a row whose winner column drifted from the bid history.
        let mut drifted = store.get_auction(AuctionId(1)).await.unwrap().unwrap();
        drifted.highest_bidder = None;
        store.update_auction(drifted).await.unwrap();

        let sweeper = Sweeper::new(Arc::clone(&store));
        assert_eq!(sweeper.run_once(now).await.unwrap(), 1);

        let repaired = store.get_auction(AuctionId(1)).await.unwrap().unwrap();
        assert_eq!(repaired.status, AuctionStatus::Ended);
        assert_eq!(repaired.highest_bidder, Some(Address::dummy(2)));
        assert_eq!(repaired.highest_bid, mintbay_types::Amount::wei(150));

        assert_eq!(sweeper.run_once(now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sweep_never_clears_settled() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let mut auction = Auction::dummy_running(AuctionId(1), Address::dummy(1));
        auction.settled = true;
        auction.status = AuctionStatus::Ended;
        store.mirror(auction).await.unwrap();

        let sweeper = Sweeper::new(Arc::clone(&store));
        // Settled is sticky: still inside the window, yet the row stays ENDED.
        assert_eq!(sweeper.run_once(now).await.unwrap(), 0);
        let auction = store.get_auction(AuctionId(1)).await.unwrap().unwrap();
        assert!(auction.settled);
        assert_eq!(auction.status, AuctionStatus::Ended);
    }
}
