//! Filtered, paged query inputs.
//!
//! Every filter is an explicit struct of optional fields — no duck-typed
//! filter blobs. A field that is `None` does not constrain the query.

use serde::{Deserialize, Serialize};

use crate::{constants, Address, Offer, OfferId, Order, OrderStatus, TokenId};

/// Pagination window, clamped to [`constants::MAX_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    #[must_use]
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: limit.min(constants::MAX_PAGE_SIZE),
        }
    }

    /// Apply this window to an already-filtered collection.
    #[must_use]
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset)
            .take(self.limit)
            .cloned()
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: constants::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Filter for offer queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferFilter {
    pub nft_contract: Option<Address>,
    pub token_id: Option<TokenId>,
    pub offerer: Option<Address>,
    pub is_counter_offer: Option<bool>,
    pub original_offer_id: Option<OfferId>,
    /// When false (the default), cancelled offers are excluded.
    pub include_cancelled: bool,
}

impl OfferFilter {
    #[must_use]
    pub fn matches(&self, offer: &Offer) -> bool {
        if !self.include_cancelled && offer.cancelled {
            return false;
        }
        self.nft_contract.is_none_or(|c| offer.nft_contract == c)
            && self.token_id.is_none_or(|t| offer.token_id == t)
            && self.offerer.is_none_or(|o| offer.offerer == o)
            && self
                .is_counter_offer
                .is_none_or(|flag| offer.is_counter_offer == flag)
            && self
                .original_offer_id
                .is_none_or(|id| offer.original_offer_id == Some(id))
    }
}

/// Filter for order queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    pub maker: Option<Address>,
    pub nft_contract: Option<Address>,
    pub token_id: Option<TokenId>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.maker.is_none_or(|m| order.payload.maker == m)
            && self
                .nft_contract
                .is_none_or(|c| order.payload.nft_contract == c)
            && self.token_id.is_none_or(|t| order.payload.token_id == t)
            && self.status.is_none_or(|s| order.status == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amount;

    #[test]
    fn page_clamps_limit() {
        let page = Page::new(0, 10_000);
        assert_eq!(page.limit, constants::MAX_PAGE_SIZE);
    }

    #[test]
    fn page_slices_window() {
        let items: Vec<u32> = (0..10).collect();
        let page = Page::new(3, 4);
        assert_eq!(page.slice(&items), vec![3, 4, 5, 6]);
    }

    #[test]
    fn offer_filter_excludes_cancelled_by_default() {
        let mut offer = Offer::dummy(Address::dummy(1), TokenId::new(1), Amount::wei(10));
        offer.cancelled = true;

        let filter = OfferFilter::default();
        assert!(!filter.matches(&offer));

        let filter = OfferFilter {
            include_cancelled: true,
            ..Default::default()
        };
        assert!(filter.matches(&offer));
    }

    #[test]
    fn offer_filter_by_token() {
        let offer = Offer::dummy(Address::dummy(1), TokenId::new(42), Amount::wei(10));
        let hit = OfferFilter {
            token_id: Some(TokenId::new(42)),
            ..Default::default()
        };
        let miss = OfferFilter {
            token_id: Some(TokenId::new(43)),
            ..Default::default()
        };
        assert!(hit.matches(&offer));
        assert!(!miss.matches(&offer));
    }
}
