//! Fixed-price listing model.
//!
//! A listing is a maker's standing sale offer for an NFT. Its natural key
//! is (nft_contract, token_id, maker): at most one listing under that key
//! may be ACTIVE at a time — the store enforces this with an atomic
//! create-if-no-active write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, ListingId, Nonce, OrderHash, Signature, StrategyId, TokenId};

/// Lifecycle status of a listing. CANCELLED and SOLD are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    Active,
    Cancelled,
    Sold,
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Sold => write!(f, "SOLD"),
        }
    }
}

/// A persisted sale listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    /// The seller. Immutable for the lifetime of the listing.
    pub maker: Address,
    /// Optional restricted buyer; `None` means anyone may buy.
    pub taker: Option<Address>,
    pub nft_contract: Address,
    pub token_id: TokenId,
    pub quantity: u64,
    pub price: Amount,
    pub payment_token: Address,
    /// `None` means the listing never expires.
    pub expiry: Option<DateTime<Utc>>,
    pub strategy_id: StrategyId,
    pub status: ListingStatus,
    /// Strategy-specific parameters, passed through to the order hash.
    pub params: serde_json::Value,
    /// Set once a signed order has been attached to this listing.
    pub order_hash: Option<OrderHash>,
    pub signature: Option<Signature>,
    pub nonce: Option<Nonce>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// The natural key for "current active listing" lookups.
    #[must_use]
    pub fn natural_key(&self) -> (Address, TokenId, Address) {
        (self.nft_contract, self.token_id, self.maker)
    }

    /// Whether the listing is ACTIVE and unexpired at `now`.
    ///
    /// Expiry comparison is at second granularity (unix seconds), matching
    /// the unit expiries are exchanged in at the boundary.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.status == ListingStatus::Active
            && self
                .expiry
                .is_none_or(|expiry| expiry.timestamp() >= now.timestamp())
    }

    /// CANCELLED and SOLD admit no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, ListingStatus::Cancelled | ListingStatus::Sold)
    }
}

/// Input for creating a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    pub maker: Address,
    pub taker: Option<Address>,
    pub nft_contract: Address,
    pub token_id: TokenId,
    pub quantity: u64,
    pub price: Amount,
    pub payment_token: Address,
    pub expiry: Option<DateTime<Utc>>,
    pub strategy_id: StrategyId,
    /// Defaults to an empty object when absent.
    pub params: Option<serde_json::Value>,
}

impl NewListing {
    /// Materialize a fresh ACTIVE listing row.
    #[must_use]
    pub fn into_listing(self, now: DateTime<Utc>) -> Listing {
        Listing {
            id: ListingId::new(),
            maker: self.maker,
            taker: self.taker,
            nft_contract: self.nft_contract,
            token_id: self.token_id,
            quantity: self.quantity,
            price: self.price,
            payment_token: self.payment_token,
            expiry: self.expiry,
            strategy_id: self.strategy_id,
            status: ListingStatus::Active,
            params: self.params.unwrap_or_else(|| serde_json::json!({})),
            order_hash: None,
            signature: None,
            nonce: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for [`Listing`]. `maker` and `status` are deliberately
/// absent — the maker is immutable and status only moves through the
/// state-machine operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingPatch {
    pub taker: Option<Option<Address>>,
    pub quantity: Option<u64>,
    pub price: Option<Amount>,
    pub payment_token: Option<Address>,
    pub expiry: Option<Option<DateTime<Utc>>>,
    pub params: Option<serde_json::Value>,
}

impl ListingPatch {
    /// Apply the present fields onto `listing`, bumping `updated_at`.
    pub fn apply(self, listing: &mut Listing, now: DateTime<Utc>) {
        if let Some(taker) = self.taker {
            listing.taker = taker;
        }
        if let Some(quantity) = self.quantity {
            listing.quantity = quantity;
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(payment_token) = self.payment_token {
            listing.payment_token = payment_token;
        }
        if let Some(expiry) = self.expiry {
            listing.expiry = expiry;
        }
        if let Some(params) = self.params {
            listing.params = params;
        }
        listing.updated_at = now;
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Listing {
    pub fn dummy(maker: Address, token_id: TokenId, price: Amount) -> Self {
        let now = Utc::now();
        NewListing {
            maker,
            taker: None,
            nft_contract: Address::dummy(0xCC),
            token_id,
            quantity: 1,
            price,
            payment_token: Address::dummy(0xEE),
            expiry: None,
            strategy_id: StrategyId(1),
            params: None,
        }
        .into_listing(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_listing_starts_active_with_empty_params() {
        let listing = Listing::dummy(Address::dummy(1), TokenId::new(7), Amount::wei(1000));
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.params, serde_json::json!({}));
        assert!(listing.order_hash.is_none());
    }

    #[test]
    fn live_checks_expiry_at_second_granularity() {
        let now = Utc::now();
        let mut listing = Listing::dummy(Address::dummy(1), TokenId::new(7), Amount::wei(1));

        listing.expiry = None;
        assert!(listing.is_live(now));

        // Expiry exactly at `now` (same second) still counts as live.
        listing.expiry = Some(now);
        assert!(listing.is_live(now));

        listing.expiry = Some(now - Duration::seconds(1));
        assert!(!listing.is_live(now));
    }

    #[test]
    fn terminal_states() {
        let mut listing = Listing::dummy(Address::dummy(1), TokenId::new(7), Amount::wei(1));
        assert!(!listing.is_terminal());
        listing.status = ListingStatus::Sold;
        assert!(listing.is_terminal());
        assert!(!listing.is_live(Utc::now()));
    }

    #[test]
    fn patch_leaves_maker_untouched() {
        let maker = Address::dummy(1);
        let mut listing = Listing::dummy(maker, TokenId::new(7), Amount::wei(1));
        let patch = ListingPatch {
            price: Some(Amount::wei(999)),
            taker: Some(Some(Address::dummy(2))),
            ..Default::default()
        };
        patch.apply(&mut listing, Utc::now());
        assert_eq!(listing.maker, maker);
        assert_eq!(listing.price, Amount::wei(999));
        assert_eq!(listing.taker, Some(Address::dummy(2)));
    }
}
