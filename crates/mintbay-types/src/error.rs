//! Error types for the marketplace transaction engine.
//!
//! All errors use the `MB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Listing errors
//! - 2xx: Offer errors
//! - 3xx: Auction errors
//! - 4xx: Order errors
//! - 5xx: Store / concurrency errors
//! - 6xx: Chain Gateway errors
//! - 7xx: Authorization errors
//! - 9xx: General / internal errors
//!
//! Each error projects onto an [`ErrorKind`] — the transport layer maps
//! kinds to status codes without matching on individual variants.

use thiserror::Error;

use crate::{Address, Amount, AuctionId, ListingId, OfferId, OrderHash, OrderStatus, StrategyId};

/// The transport-facing taxonomy. Engines never swallow state-machine
/// violations; every business failure lands in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Entity or referenced parent missing.
    NotFound,
    /// A state-machine precondition was violated.
    BadRequest,
    /// Requester does not match the maker/seller the operation requires.
    Forbidden,
    /// A unique-key or compare-and-swap write lost a race.
    Conflict,
    /// Unexpected storage/gateway failure — not a business error.
    Internal,
}

/// Central error enum for all marketplace operations.
#[derive(Debug, Error)]
pub enum MarketError {
    // =================================================================
    // Listing Errors (1xx)
    // =================================================================
    /// The requested listing does not exist.
    #[error("MB_ERR_100: Listing not found: {0}")]
    ListingNotFound(ListingId),

    /// No live listing for this (contract, token) pair.
    #[error("MB_ERR_101: No active listing for contract {nft_contract} token {token_id}")]
    NoActiveListing {
        nft_contract: Address,
        token_id: crate::TokenId,
    },

    /// An active listing already exists under the same natural key.
    #[error("MB_ERR_102: Active listing already exists for contract {nft_contract} token {token_id} maker {maker}")]
    ActiveListingExists {
        nft_contract: Address,
        token_id: crate::TokenId,
        maker: Address,
    },

    /// The listing is in a terminal state and cannot transition further.
    #[error("MB_ERR_103: Listing {0} is not active")]
    ListingNotActive(ListingId),

    // =================================================================
    // Offer Errors (2xx)
    // =================================================================
    /// The requested offer does not exist.
    #[error("MB_ERR_200: Offer not found: {0}")]
    OfferNotFound(OfferId),

    /// The counter-offer's parent offer does not exist.
    #[error("MB_ERR_201: Parent offer not found: {0}")]
    ParentOfferNotFound(OfferId),

    /// The offer has already been cancelled.
    #[error("MB_ERR_202: Offer {0} is cancelled")]
    OfferCancelled(OfferId),

    /// The offer has already been executed.
    #[error("MB_ERR_203: Offer {0} is executed")]
    OfferExecuted(OfferId),

    // =================================================================
    // Auction Errors (3xx)
    // =================================================================
    /// No local auction row for this auction id.
    #[error("MB_ERR_300: Auction not found: {0}")]
    AuctionNotFound(AuctionId),

    /// No on-chain auction record exists to mirror.
    #[error("MB_ERR_301: No on-chain record for {0}")]
    AuctionNotOnChain(AuctionId),

    /// A local row for this auction already exists.
    #[error("MB_ERR_302: Auction already mirrored: {0}")]
    DuplicateAuction(AuctionId),

    /// Bids are only accepted inside the auction window, before settlement.
    #[error("MB_ERR_303: Auction {0} is not active")]
    AuctionNotActive(AuctionId),

    /// The bid does not clear the current highest bid plus the increment.
    #[error("MB_ERR_304: Bid too low: {amount} (minimum {min_required})")]
    BidTooLow {
        amount: Amount,
        min_required: Amount,
    },

    /// The bid does not meet the reserve price.
    #[error("MB_ERR_305: Bid below reserve: {amount} (reserve {reserve})")]
    BidBelowReserve { amount: Amount, reserve: Amount },

    /// The auction has already been settled.
    #[error("MB_ERR_306: Auction {0} already settled")]
    AuctionAlreadySettled(AuctionId),

    /// Settlement attempted before the auction window elapsed.
    #[error("MB_ERR_307: Auction {0} has not ended")]
    AuctionStillRunning(AuctionId),

    // =================================================================
    // Order Errors (4xx)
    // =================================================================
    /// No order under this hash.
    #[error("MB_ERR_400: Order not found: {0}")]
    OrderNotFound(OrderHash),

    /// An order with this content hash already exists (unique index).
    #[error("MB_ERR_401: Duplicate order hash: {0}")]
    DuplicateOrder(OrderHash),

    /// Execution attempted after the order's expiry.
    #[error("MB_ERR_402: Order expired: {0}")]
    OrderExpired(OrderHash),

    /// The order already reached a terminal state.
    #[error("MB_ERR_403: Order {order_hash} is {status}, not PENDING")]
    OrderNotPending {
        order_hash: OrderHash,
        status: OrderStatus,
    },

    /// The signature did not verify against the order's strategy.
    #[error("MB_ERR_404: Signature verification failed for order {0}")]
    SignatureInvalid(OrderHash),

    /// No verifying contract registered for this strategy.
    #[error("MB_ERR_405: Unknown strategy: {0}")]
    UnknownStrategy(StrategyId),

    // =================================================================
    // Store / Concurrency Errors (5xx)
    // =================================================================
    /// A compare-and-swap write observed a different current value.
    #[error("MB_ERR_500: Concurrent update lost: {reason}")]
    CasConflict { reason: String },

    // =================================================================
    // Chain Gateway Errors (6xx)
    // =================================================================
    /// The gateway call exceeded its timeout bound.
    #[error("MB_ERR_600: Chain gateway timed out during {op}")]
    GatewayTimeout { op: &'static str },

    /// The gateway reported a failure.
    #[error("MB_ERR_601: Chain gateway failure: {reason}")]
    GatewayFailure { reason: String },

    /// The transaction was mined but reverted.
    #[error("MB_ERR_602: Transaction reverted: {0}")]
    TransactionReverted(crate::TxHash),

    // =================================================================
    // Authorization Errors (7xx)
    // =================================================================
    /// Requester is not the maker of the entity being mutated.
    #[error("MB_ERR_700: Requester {requester} is not the maker {maker}")]
    NotMaker { maker: Address, requester: Address },

    /// Requester is not the seller of the auction being settled.
    #[error("MB_ERR_701: Requester {requester} is not the seller {seller}")]
    NotSeller { seller: Address, requester: Address },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("MB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("MB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// A monetary amount failed to parse as an exact integer.
    #[error("MB_ERR_902: Invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    /// An address failed to parse.
    #[error("MB_ERR_903: Invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    /// Configuration error (invalid values, missing fields, etc.).
    #[error("MB_ERR_904: Configuration error: {0}")]
    Configuration(String),
}

impl MarketError {
    /// Project onto the transport taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ListingNotFound(_)
            | Self::NoActiveListing { .. }
            | Self::OfferNotFound(_)
            | Self::ParentOfferNotFound(_)
            | Self::AuctionNotFound(_)
            | Self::AuctionNotOnChain(_)
            | Self::OrderNotFound(_) => ErrorKind::NotFound,

            Self::ListingNotActive(_)
            | Self::OfferCancelled(_)
            | Self::OfferExecuted(_)
            | Self::AuctionNotActive(_)
            | Self::BidTooLow { .. }
            | Self::BidBelowReserve { .. }
            | Self::AuctionAlreadySettled(_)
            | Self::AuctionStillRunning(_)
            | Self::OrderExpired(_)
            | Self::OrderNotPending { .. }
            | Self::SignatureInvalid(_)
            | Self::UnknownStrategy(_)
            | Self::TransactionReverted(_)
            | Self::InvalidAmount { .. }
            | Self::InvalidAddress { .. } => ErrorKind::BadRequest,

            Self::NotMaker { .. } | Self::NotSeller { .. } => ErrorKind::Forbidden,

            Self::ActiveListingExists { .. }
            | Self::DuplicateAuction(_)
            | Self::DuplicateOrder(_)
            | Self::CasConflict { .. } => ErrorKind::Conflict,

            Self::GatewayTimeout { .. }
            | Self::GatewayFailure { .. }
            | Self::Internal(_)
            | Self::Serialization(_)
            | Self::Configuration(_) => ErrorKind::Internal,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MarketError>;
