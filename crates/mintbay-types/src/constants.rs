//! System-wide constants and defaults.

/// Default lifetime of a signed order, in seconds (24 hours).
pub const DEFAULT_ORDER_TTL_SECS: i64 = 24 * 60 * 60;

/// Default upper bound on a single Chain Gateway call, in milliseconds.
pub const DEFAULT_GATEWAY_TIMEOUT_MS: u64 = 30_000;

/// Default interval between reconciler sweeps, in seconds (daily).
pub const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Default capacity of the on-chain event broadcast channel.
pub const DEFAULT_EVENT_BUFFER: usize = 1024;

/// Default page size for filtered queries.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Hard cap on page size; larger requests are clamped.
pub const MAX_PAGE_SIZE: usize = 500;

/// Bounded retries for compare-and-swap bid placement under contention.
pub const MAX_BID_CAS_RETRIES: usize = 3;

/// Domain separator for content-addressed order hashes.
pub const ORDER_HASH_DOMAIN: &[u8] = b"mintbay:order:v2:";

/// Domain separator for deterministic offer ids.
pub const OFFER_ID_DOMAIN: &[u8] = b"mintbay:offer_id:v2:";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_ttl_is_24h() {
        assert_eq!(DEFAULT_ORDER_TTL_SECS, 86_400);
    }

    #[test]
    fn page_bounds_sane() {
        assert!(DEFAULT_PAGE_SIZE <= MAX_PAGE_SIZE);
    }
}
