//! Marketplace transaction engines.
//!
//! Four state machines over the store traits, plus the collaborator
//! contracts they depend on:
//!
//! - [`ListingEngine`] — fixed-price listings with a unique active listing
//!   per (nft_contract, token_id, maker)
//! - [`OfferEngine`] — offers and counter-offers with terminal
//!   cancelled/executed flags
//! - [`AuctionEngine`] — on-chain auction mirroring and off-chain bid
//!   validation via compare-and-swap
//! - [`OrderEngine`] — content-hashed signed orders bridging listings to
//!   on-chain settlement
//!
//! The engines hold no persistent state and take their collaborators
//! ([`ChainGateway`], [`SignatureVerifier`], the store traits) by injection,
//! so every test runs against in-memory implementations.

pub mod auction;
pub mod gateway;
pub mod listing;
pub mod offer;
pub mod order;
pub mod verifier;

pub use auction::{AuctionEngine, BidderAuctions, Settlement};
pub use gateway::{bounded, ChainGateway};
pub use listing::ListingEngine;
pub use offer::OfferEngine;
pub use order::OrderEngine;
pub use verifier::{Ed25519Signer, Ed25519Verifier, OrderSigner, SignatureVerifier, StrategyRegistry};

#[cfg(any(test, feature = "test-helpers"))]
pub use gateway::mock::MockGateway;
#[cfg(any(test, feature = "test-helpers"))]
pub use verifier::AcceptAllVerifier;
