//! Buy-side offer model.
//!
//! An offer is a bid made against a token independent of any listing.
//! A counter-offer answers an existing offer with different terms and
//! inherits the parent's token identity and payment token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, Nonce, OfferId, TokenId};

/// A persisted offer. `executed` and `cancelled` are mutually exclusive
/// terminal flags; the engine only ever sets one of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub offerer: Address,
    pub nft_contract: Address,
    pub token_id: TokenId,
    pub quantity: u64,
    pub price: Amount,
    pub payment_token: Address,
    pub expiry: Option<DateTime<Utc>>,
    /// The offerer's chain nonce at creation time, for replay protection.
    pub nonce: Nonce,
    pub is_counter_offer: bool,
    pub cancelled: bool,
    pub executed: bool,
    /// Present iff `is_counter_offer`; links back to the parent offer.
    pub original_offer_id: Option<OfferId>,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// Whether the offer reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.cancelled || self.executed
    }

    /// Whether the offer is still open at `now`.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        !self.is_terminal()
            && self
                .expiry
                .is_none_or(|expiry| expiry.timestamp() >= now.timestamp())
    }
}

/// Input for creating an offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOffer {
    pub offerer: Address,
    pub nft_contract: Address,
    pub token_id: TokenId,
    pub quantity: u64,
    pub price: Amount,
    pub payment_token: Address,
    pub expiry: Option<DateTime<Utc>>,
}

/// Input for a counter-offer. Token identity, quantity, and payment token
/// come from the parent; only the proposer and terms differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCounterOffer {
    pub offerer: Address,
    pub price: Amount,
    pub expiry: Option<DateTime<Utc>>,
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Offer {
    pub fn dummy(offerer: Address, token_id: TokenId, price: Amount) -> Self {
        let now = Utc::now();
        Self {
            id: OfferId::derive(Address::dummy(0xCC), token_id, offerer, now),
            offerer,
            nft_contract: Address::dummy(0xCC),
            token_id,
            quantity: 1,
            price,
            payment_token: Address::dummy(0xEE),
            expiry: None,
            nonce: 0,
            is_counter_offer: false,
            cancelled: false,
            executed: false,
            original_offer_id: None,
            created_at: now,
        }
    }
}
