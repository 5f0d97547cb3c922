//! Exact wei-denominated amounts.
//!
//! Prices and bids are large integers in the payment token's smallest
//! denomination (wei). They cross every boundary as decimal strings and are
//! compared with exact integer arithmetic — floating point never touches
//! monetary values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{MarketError, Result};

/// An exact, non-negative wei amount.
///
/// Backed by `u128`, which comfortably holds any wei-denominated value
/// (total ether supply is on the order of 1e26 wei). Serializes as a
/// decimal string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount — the initial `highest_bid` of every auction.
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn wei(value: u128) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_wei(self) -> u128 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition; `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Addition that saturates at `u128::MAX` instead of wrapping.
    ///
    /// Used for the minimum-increment bound, where saturation only makes
    /// an impossible bid even more impossible.
    #[must_use]
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Parse a decimal-string amount as received at the API boundary.
    pub fn parse(input: &str) -> Result<Self> {
        input.parse()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MarketError::InvalidAmount {
                input: s.to_string(),
                reason: "empty string".to_string(),
            });
        }
        trimmed
            .parse::<u128>()
            .map(Self)
            .map_err(|e| MarketError::InvalidAmount {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_decimal() {
        let a = Amount::parse("1000000000000000000").unwrap();
        assert_eq!(a.as_wei(), 1_000_000_000_000_000_000);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Amount::parse("").is_err());
        assert!(Amount::parse("1.5").is_err());
        assert!(Amount::parse("-3").is_err());
        assert!(Amount::parse("0x10").is_err());
        assert!(Amount::parse("1e18").is_err());
    }

    #[test]
    fn exact_comparison_beyond_f64_precision() {
        // Adjacent wei values that a double would conflate.
        let a = Amount::parse("90071992547409920000000001").unwrap();
        let b = Amount::parse("90071992547409920000000002").unwrap();
        assert!(a < b);
        assert_ne!(a, b);
    }

    #[test]
    fn saturating_add_caps() {
        let max = Amount::wei(u128::MAX);
        assert_eq!(max.saturating_add(Amount::wei(1)), max);
    }

    #[test]
    fn serde_round_trips_as_string() {
        let a = Amount::wei(123_456_789);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"123456789\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }

    #[test]
    fn zero_default() {
        assert_eq!(Amount::default(), Amount::ZERO);
        assert!(Amount::ZERO.is_zero());
    }
}
