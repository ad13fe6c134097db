// src/core/types.rs - Core Type Definitions
//! Core type definitions used throughout the trading engine.
//!
//! Prices are fixed-point integers in hundredths of a currency unit. The
//! matching loop compares prices for exact equality when deciding which side
//! sets the execution price, so a float representation is not an option;
//! cents as an `i64` give exact ordering and exact equality.

use std::fmt::{self, Display};
use std::str::FromStr;

/// Process-wide unique order identifier, strictly increasing in admission order
pub type OrderId = u64;

/// Per-book admission sequence number used for time priority
pub type Sequence = u64;

/// Order quantity in whole units
pub type Quantity = u64;

/// Trading symbol
pub type Symbol = String;

/// A limit price in hundredths of a currency unit.
///
/// `Price` is totally ordered and hashable, which lets it key the book's
/// price ladders directly. Display always renders two fractional digits
/// (`1500` → `"15.00"`), matching the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

/// Error returned when a price literal does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid price literal")]
pub struct ParsePriceError;

impl Price {
    /// Create a price from a raw amount in cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The raw amount in cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Whether the price is strictly positive.
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl FromStr for Price {
    type Err = ParsePriceError;

    /// Parse a decimal literal with at most two fractional digits.
    ///
    /// Accepts `"150"`, `"150.5"`, `"150.50"`, `".50"`, and `"150."` the way
    /// a numeric scanner would; rejects empty input, a bare `.`, non-digit
    /// characters, and more than two fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(ParsePriceError);
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParsePriceError);
        }
        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParsePriceError);
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ParsePriceError)?
        };
        let fraction_cents = match fraction.len() {
            0 => 0,
            1 => i64::from(fraction.as_bytes()[0] - b'0') * 10,
            _ => fraction.parse::<i64>().map_err(|_| ParsePriceError)?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_cents))
            .ok_or(ParsePriceError)?;

        Ok(Self(if negative { -cents } else { cents }))
    }
}
