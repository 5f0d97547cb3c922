//! Signed-order model.
//!
//! An order is a content-hashed, signed intent to trade: the bridge between
//! off-chain listings and on-chain settlement. Its hash is computed over
//! every content field, so two orders with identical fields address the
//! same row — the store keeps a unique index on the hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    constants, Address, Amount, ListingId, Nonce, OrderHash, Signature, StrategyId, TokenId,
    TxHash,
};

/// Lifecycle status of an order. EXECUTED and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Executed,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Executed => write!(f, "EXECUTED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// The content fields of an order — everything the hash commits to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub maker: Address,
    /// [`Address::ZERO`] denotes an open order fillable by anyone.
    pub taker: Address,
    pub nft_contract: Address,
    pub token_id: TokenId,
    pub quantity: u64,
    pub price: Amount,
    pub payment_token: Address,
    pub strategy_id: StrategyId,
    /// Strategy parameters. `serde_json` keeps object keys sorted, so the
    /// canonical string form is deterministic.
    pub params: serde_json::Value,
    pub nonce: Nonce,
    pub expiry: DateTime<Utc>,
}

impl OrderPayload {
    /// The content address of this order.
    ///
    /// Commits to every field under a domain-separated SHA-256. Identical
    /// payloads hash identically on every node; changing any field changes
    /// the hash.
    #[must_use]
    pub fn content_hash(&self) -> OrderHash {
        let mut hasher = Sha256::new();
        hasher.update(constants::ORDER_HASH_DOMAIN);
        hasher.update(self.maker.as_bytes());
        hasher.update(self.taker.as_bytes());
        hasher.update(self.nft_contract.as_bytes());
        hasher.update(self.token_id.0.to_le_bytes());
        hasher.update(self.quantity.to_le_bytes());
        hasher.update(self.price.as_wei().to_le_bytes());
        hasher.update(self.payment_token.as_bytes());
        hasher.update(self.strategy_id.0.to_le_bytes());
        hasher.update(self.params.to_string().as_bytes());
        hasher.update(self.nonce.to_le_bytes());
        hasher.update(self.expiry.timestamp().to_le_bytes());

        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        OrderHash(hash)
    }

    /// Whether the order may still be executed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.timestamp() < now.timestamp()
    }

    /// An open order has the zero-address taker.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.taker.is_zero()
    }
}

/// A persisted signed order, keyed by its content hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub payload: OrderPayload,
    pub order_hash: OrderHash,
    pub signature: Signature,
    pub status: OrderStatus,
    /// Set when the chain confirms execution.
    pub tx_hash: Option<TxHash>,
    /// The listing this order was created from.
    pub listing_id: ListingId,
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, OrderStatus::Executed | OrderStatus::Cancelled)
    }
}

// ---------------------------------------------------------------------------
// Chain Gateway wire types
// ---------------------------------------------------------------------------

/// Handle to a submitted-but-unconfirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingTx(pub u64);

/// Receipt of a mined transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    /// False when the transaction was mined but reverted.
    pub success: bool,
}

/// Emitted by the chain when an order executes — possibly by a third party
/// outside this service. The listener reconciles local state from these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderExecuted {
    pub order_hash: OrderHash,
    pub taker: Address,
    pub tx_hash: TxHash,
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl OrderPayload {
    pub fn dummy(maker: Address, token_id: TokenId, price: Amount, nonce: Nonce) -> Self {
        Self {
            maker,
            taker: Address::ZERO,
            nft_contract: Address::dummy(0xCC),
            token_id,
            quantity: 1,
            price,
            payment_token: Address::dummy(0xEE),
            strategy_id: StrategyId(1),
            params: serde_json::json!({}),
            nonce,
            expiry: Utc::now() + chrono::Duration::hours(24),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn content_hash_is_deterministic() {
        let payload = OrderPayload::dummy(Address::dummy(1), TokenId::new(5), Amount::wei(10), 3);
        assert_eq!(payload.content_hash(), payload.clone().content_hash());
    }

    #[test]
    fn content_hash_commits_to_every_field() {
        let base = OrderPayload::dummy(Address::dummy(1), TokenId::new(5), Amount::wei(10), 3);
        let base_hash = base.content_hash();

        let mut changed = base.clone();
        changed.price = Amount::wei(11);
        assert_ne!(changed.content_hash(), base_hash);

        let mut changed = base.clone();
        changed.nonce = 4;
        assert_ne!(changed.content_hash(), base_hash);

        let mut changed = base.clone();
        changed.params = serde_json::json!({"royalty_bps": 250});
        assert_ne!(changed.content_hash(), base_hash);

        let mut changed = base.clone();
        changed.expiry = base.expiry + Duration::seconds(1);
        assert_ne!(changed.content_hash(), base_hash);
    }

    #[test]
    fn expiry_is_second_granular() {
        let payload = OrderPayload::dummy(Address::dummy(1), TokenId::new(5), Amount::wei(10), 0);
        assert!(!payload.is_expired(payload.expiry));
        assert!(payload.is_expired(payload.expiry + Duration::seconds(1)));
    }

    #[test]
    fn zero_taker_means_open() {
        let payload = OrderPayload::dummy(Address::dummy(1), TokenId::new(5), Amount::wei(10), 0);
        assert!(payload.is_open());

        let mut restricted = payload;
        restricted.taker = Address::dummy(9);
        assert!(!restricted.is_open());
    }
}
