//! # mintbay-store
//!
//! The Entity Store collaborator: async persistence contracts for listings,
//! offers, auctions, and orders, plus a thread-safe in-memory
//! implementation for tests and local development.
//!
//! ## Atomicity contract
//!
//! Cross-request consistency uses no in-process locks in the engines; it
//! rests entirely on two store guarantees:
//!
//! 1. **Unique keys** — one ACTIVE listing per (nft_contract, token_id,
//!    maker); one order per content hash.
//! 2. **Compare-and-swap** — bid placement swaps on the expected highest
//!    bid; order status transitions are guarded by the expected current
//!    status and converge idempotently on terminal states.

pub mod interface;
pub mod memory;

pub use interface::{AuctionStore, ListingStore, OfferStore, OrderStore, StatusCas};
pub use memory::MemoryStore;
