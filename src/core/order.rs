// src/core/order.rs - Order Domain Model
//! The order value type and its side.
//!
//! An order's identity (id, symbol, side, price, sequence) is fixed at
//! construction; only the residual `quantity` changes while the order rests
//! in a book. All matching logic lives in the book; the order itself is
//! plain state.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::core::types::{OrderId, Price, Quantity, Sequence, Symbol};
use crate::EngineError;

/// Order side - Buy or Sell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Buy order - rests on the bid side
    Buy,
    /// Sell order - rests on the ask side
    Sell,
}

impl Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = EngineError;

    // The wire protocol is case-sensitive: only the exact tokens match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            _ => Err(EngineError::InvalidSide),
        }
    }
}

impl Side {
    /// The opposite side of the book.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// A limit order resting in (or being admitted to) a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Process-wide unique identifier
    pub id: OrderId,
    /// Instrument symbol
    pub symbol: Symbol,
    /// Buy or sell
    pub side: Side,
    /// Limit price, fixed at submission
    pub price: Price,
    /// Residual quantity; decreases as the order fills
    pub quantity: Quantity,
    /// Per-book admission sequence for time priority
    pub sequence: Sequence,
}

impl Order {
    /// Create a new order with its full identity.
    pub fn new(
        id: OrderId,
        symbol: impl Into<Symbol>,
        side: Side,
        price: Price,
        quantity: Quantity,
        sequence: Sequence,
    ) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            side,
            price,
            quantity,
            sequence,
        }
    }

    /// Whether the residual quantity has reached zero.
    pub const fn is_filled(&self) -> bool {
        self.quantity == 0
    }
}
