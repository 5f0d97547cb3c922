//! Identifiers used throughout the marketplace engine.
//!
//! Opaque entity ids use UUIDv7 for time-ordered lexicographic sorting.
//! Content-derived identity (offer ids, order hashes) uses domain-separated
//! SHA-256 so the same inputs always produce the same id on every node.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{constants, MarketError};

/// On-chain account nonce.
pub type Nonce = u64;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account address, displayed as `0x`-prefixed hex.
///
/// [`Address::ZERO`] is the open-taker sentinel: an order whose taker is the
/// zero address may be filled by anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero-address sentinel (open order taker).
    pub const ZERO: Self = Self([0u8; 20]);

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Shortened hex form for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        format!("0x{}…", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| MarketError::InvalidAddress {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| MarketError::InvalidAddress {
                input: s.to_string(),
                reason: "expected 20 bytes".to_string(),
            })?;
        Ok(Self(arr))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// An NFT token id within a contract. Serializes as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct TokenId(pub u128);

impl TokenId {
    #[must_use]
    pub const fn new(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>()
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// ListingId
// ---------------------------------------------------------------------------

/// Opaque listing identifier. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ListingId(pub Uuid);

impl ListingId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ListingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// OfferId
// ---------------------------------------------------------------------------

/// Content-derived offer identifier.
///
/// Deterministic over (nft_contract, token_id, offerer, created_at) so two
/// offers from the same account on the same token at the same instant
/// collide instead of silently duplicating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OfferId(pub Uuid);

impl OfferId {
    #[must_use]
    pub fn derive(
        nft_contract: Address,
        token_id: TokenId,
        offerer: Address,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::OFFER_ID_DOMAIN);
        hasher.update(nft_contract.as_bytes());
        hasher.update(token_id.0.to_le_bytes());
        hasher.update(offerer.as_bytes());
        hasher.update(created_at.timestamp().to_le_bytes());
        let hash = hasher.finalize();
        let bytes: [u8; 16] = hash[..16].try_into().expect("SHA-256 produces 32 bytes");
        Self(Uuid::from_bytes(bytes))
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AuctionId
// ---------------------------------------------------------------------------

/// On-chain auction correlation key. Assigned by the auction contract,
/// mirrored locally as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AuctionId(pub u64);

impl fmt::Display for AuctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auction:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// OrderHash / TxHash
// ---------------------------------------------------------------------------

/// Content-addressed order hash — the natural key of an [`crate::Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct OrderHash(pub [u8; 32]);

impl OrderHash {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for OrderHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for OrderHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OrderHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let stripped = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(stripped).map_err(serde::de::Error::custom)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))?;
        Ok(Self(arr))
    }
}

/// Hash of a confirmed on-chain transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let stripped = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(stripped).map_err(serde::de::Error::custom)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))?;
        Ok(Self(arr))
    }
}

// ---------------------------------------------------------------------------
// StrategyId / Signature
// ---------------------------------------------------------------------------

/// Identifies the pluggable validation/pricing strategy an order trades
/// under. Resolved to a verifying contract by the signature verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct StrategyId(pub u32);

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "strategy:{}", self.0)
    }
}

/// An opaque signature blob produced by a signer and checked by the
/// signature verifier. The engine never interprets its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Helpers for tests across the workspace.
#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    /// A deterministic non-zero address derived from a single byte.
    #[must_use]
    pub fn dummy(tag: u8) -> Self {
        let mut bytes = [0u8; 20];
        bytes[19] = tag;
        bytes[0] = 0xA0;
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn address_round_trip() {
        let addr: Address = "0xa0000000000000000000000000000000000000ff"
            .parse()
            .unwrap();
        assert_eq!(
            addr.to_string(),
            "0xa0000000000000000000000000000000000000ff"
        );
    }

    #[test]
    fn address_rejects_wrong_length() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("not-hex".parse::<Address>().is_err());
    }

    #[test]
    fn zero_address_sentinel() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::dummy(1).is_zero());
    }

    #[test]
    fn listing_ids_are_time_ordered() {
        let a = ListingId::new();
        let b = ListingId::new();
        assert!(a < b);
    }

    #[test]
    fn offer_id_deterministic() {
        let at = chrono::Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let a = OfferId::derive(Address::dummy(1), TokenId::new(7), Address::dummy(2), at);
        let b = OfferId::derive(Address::dummy(1), TokenId::new(7), Address::dummy(2), at);
        assert_eq!(a, b);

        let c = OfferId::derive(Address::dummy(1), TokenId::new(8), Address::dummy(2), at);
        assert_ne!(a, c);
    }

    #[test]
    fn order_hash_serde_hex() {
        let hash = OrderHash::from_bytes([0xAB; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert!(json.starts_with("\"0xabab"));
        let back: OrderHash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, back);
    }

    #[test]
    fn token_id_serde_string() {
        let token = TokenId::new(340_282_366_920_938_463_463);
        let json = serde_json::to_string(&token).unwrap();
        let back: TokenId = serde_json::from_str(&json).unwrap();
        assert_eq!(token, back);
    }
}
