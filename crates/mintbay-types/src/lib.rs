//! # mintbay-types
//!
//! Shared types, errors, and configuration for the **mintbay** marketplace
//! transaction engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`TokenId`], [`ListingId`], [`OfferId`], [`AuctionId`], [`OrderHash`], [`TxHash`], [`StrategyId`]
//! - **Money**: [`Amount`] — exact integer wei, decimal-string encoded
//! - **Listing model**: [`Listing`], [`ListingStatus`], [`NewListing`], [`ListingPatch`]
//! - **Offer model**: [`Offer`], [`NewOffer`], [`NewCounterOffer`]
//! - **Auction model**: [`Auction`], [`AuctionStatus`], [`Bid`]
//! - **Order model**: [`Order`], [`OrderPayload`], [`OrderStatus`], [`OrderExecuted`], [`PendingTx`], [`TxReceipt`]
//! - **Queries**: [`OfferFilter`], [`OrderFilter`], [`Page`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`MarketError`] with `MB_ERR_` prefix codes, projected onto [`ErrorKind`]
//! - **Constants**: system-wide limits and defaults

pub mod amount;
pub mod auction;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod listing;
pub mod offer;
pub mod order;
pub mod query;

// Re-export all primary types at crate root for ergonomic imports:
//   use mintbay_types::{Listing, Auction, Order, MarketError, ...};

pub use amount::*;
pub use auction::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use listing::*;
pub use offer::*;
pub use order::*;
pub use query::*;

// Constants are accessed via `mintbay_types::constants::FOO`
// (not re-exported to avoid name collisions).
