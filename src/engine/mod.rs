// src/engine/mod.rs - Matching Engine
//! Symbol registry and order-id allocation on top of the per-symbol books.
//!
//! The registry guard covers exactly three things: allocating the next
//! order id, resolving (or lazily creating) the book for a symbol, and
//! drawing the book's admission sequence. It is released before any
//! matching work runs, so admissions on different symbols proceed in
//! parallel; matching on one symbol only ever waits on that symbol's book
//! guard. Registry entries are never removed, which makes a cloned book
//! handle valid for the process lifetime.
//!
//! Lock order is strict: the registry guard is always released before a book
//! guard is acquired, and no thread ever holds two book guards, so no lock
//! cycle is possible.

pub mod book;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::core::{Order, OrderId, Price, Side, Symbol};
use crate::EngineError;
pub use book::{OrderBook, Trade};

/// Routes incoming orders to per-symbol books and allocates order ids.
pub struct MatchingEngine {
    registry: Mutex<Registry>,
}

struct Registry {
    books: HashMap<Symbol, Arc<OrderBook>>,
    next_id: OrderId,
}

impl MatchingEngine {
    /// Create an engine with no books; books appear on first use.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                books: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Admit a limit order and return the session report.
    ///
    /// Validates positivity (the protocol layer pre-validates format, so a
    /// violation here means a misbehaving caller), then allocates identity
    /// under the registry guard and hands the order to its book.
    pub fn submit(
        &self,
        symbol: &str,
        side: Side,
        price: Price,
        quantity: i64,
    ) -> Result<String, EngineError> {
        if !price.is_positive() || quantity <= 0 {
            return Err(EngineError::InvalidArguments);
        }

        let (book, order) = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;

            let book = Arc::clone(
                registry
                    .books
                    .entry(symbol.to_string())
                    .or_insert_with(|| {
                        debug!(symbol, "opening order book");
                        Arc::new(OrderBook::new(symbol))
                    }),
            );
            let sequence = book.allocate_sequence();

            #[allow(clippy::cast_sign_loss)] // positivity checked above
            let order = Order::new(id, symbol, side, price, quantity as u64, sequence);
            (book, order)
        };
        // Registry guard is released here; matching only takes the book guard.

        book.admit(order)
    }

    /// Render the book for `symbol`, or a not-found line if it never traded.
    pub fn snapshot(&self, symbol: &str) -> String {
        let book = self.registry.lock().books.get(symbol).map(Arc::clone);
        match book {
            Some(book) => book.snapshot(),
            None => format!("No orders found for symbol: {symbol}\n"),
        }
    }

    /// Handle to the book for `symbol`, if it exists.
    pub fn book(&self, symbol: &str) -> Option<Arc<OrderBook>> {
        self.registry.lock().books.get(symbol).map(Arc::clone)
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}
