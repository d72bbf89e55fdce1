//! 64-bit `InnoDB` counters as printed by different engine versions.
//!
//! Older servers print a counter as two decimal 32-bit halves separated by a
//! space (`0 1234567`), newer ones as a single hexadecimal value. Both are
//! normalized to an arbitrary-precision integer: a malformed high half can push
//! the value well past 64 bits and nothing may be lost.

use num_bigint::BigUint;

/// A counter token exactly as it appeared in the report, digits already validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawCounter {
    Hex(BigUint),
    Split { high: BigUint, low: BigUint },
}

impl RawCounter {
    /// Single hexadecimal token.
    #[must_use]
    pub fn hex(digits: &str) -> Option<Self> {
        BigUint::parse_bytes(digits.as_bytes(), 16).map(Self::Hex)
    }

    /// Two decimal halves.
    #[must_use]
    pub fn split(high: &str, low: &str) -> Option<Self> {
        let high = BigUint::parse_bytes(high.as_bytes(), 10)?;
        let low = BigUint::parse_bytes(low.as_bytes(), 10)?;
        Some(Self::Split { high, low })
    }

    /// Token from a pattern's capture groups: a trailing decimal group selects
    /// the split form, otherwise the first group is hexadecimal.
    #[must_use]
    pub fn from_parts(first: &str, second: Option<&str>) -> Option<Self> {
        match second {
            Some(low) => Self::split(first, low),
            None => Self::hex(first),
        }
    }

    #[must_use]
    pub const fn is_split(&self) -> bool {
        matches!(self, Self::Split { .. })
    }

    /// `high * 2^32 + low` for the split form, the hex value otherwise.
    #[must_use]
    pub fn reconstruct(&self) -> BigUint {
        match self {
            Self::Hex(value) => value.clone(),
            Self::Split { high, low } => (high << 32u32) + low,
        }
    }
}

/// Parse and reconstruct in one step; `None` when the digits are malformed.
#[must_use]
pub fn reconstruct(first: &str, second: Option<&str>) -> Option<BigUint> {
    RawCounter::from_parts(first, second).map(|token| token.reconstruct())
}
