//! Background reconciliation.
//!
//! Two tasks keep local state converged with the chain and the clock:
//!
//! - [`Sweeper`] — periodic re-derivation of auction statuses. Idempotent;
//!   a missed run is repaired by the next one.
//! - [`ExecutedListener`] — consumes the gateway's `OrderExecuted` stream
//!   and folds third-party executions into local order and listing rows.

pub mod listener;
pub mod sweep;

pub use listener::ExecutedListener;
pub use sweep::Sweeper;
