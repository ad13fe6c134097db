// src/engine/book.rs - Per-Symbol Order Book & Matching
//! Price-time priority order book for a single symbol.
//!
//! Each side is an ordered price ladder: a `BTreeMap` keyed by exact
//! fixed-point price, holding a FIFO queue of orders per level. Admissions
//! append to the tail of their level, and sequence numbers only grow, so FIFO
//! within a level *is* time priority. Best bid is the last key of the bid
//! ladder, best ask the first key of the ask ladder.
//!
//! Matching runs on every admission, entirely under the book guard: while
//! the best bid price is at or above the best ask price, the front orders of
//! the two best levels trade against each other. The earlier-sequenced
//! (resting) order is the maker and sets the execution price, so an
//! aggressor that crosses the book gets price improvement. The loop ends
//! when the cross is resolved or a side is exhausted, which keeps the book
//! uncrossed at rest.

use std::collections::{BTreeMap, VecDeque};
use std::fmt::{self, Display, Write as _};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::core::{Order, OrderId, Price, Quantity, Sequence, Side, Symbol};
use crate::EngineError;

/// A single executed match between a resting maker and an incoming taker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    /// Symbol the trade executed on
    pub symbol: Symbol,
    /// Resting order whose limit set the execution price
    pub maker_id: OrderId,
    /// Aggressing order that crossed the book
    pub taker_id: OrderId,
    /// Executed quantity
    pub quantity: Quantity,
    /// Execution price (the maker's limit)
    pub price: Price,
}

impl Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TRADE EXECUTED: {} {} @ ${}",
            self.quantity, self.symbol, self.price
        )
    }
}

/// Order book for a single symbol.
///
/// All mutation happens under the internal guard; the engine hands out
/// `Arc<OrderBook>` handles that stay valid for the process lifetime.
pub struct OrderBook {
    symbol: Symbol,
    // Advanced only while the engine's registry guard is held, so sequences
    // observe the same admission order as the global order ids.
    next_sequence: AtomicU64,
    sides: Mutex<BookSides>,
}

#[derive(Default)]
struct BookSides {
    bids: BTreeMap<Price, VecDeque<Order>>,
    asks: BTreeMap<Price, VecDeque<Order>>,
}

impl OrderBook {
    /// Create an empty book for `symbol`.
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            next_sequence: AtomicU64::new(1),
            sides: Mutex::new(BookSides::default()),
        }
    }

    /// The symbol this book serves.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Draw the next admission sequence number.
    pub(crate) fn allocate_sequence(&self) -> Sequence {
        self.next_sequence.fetch_add(1, Ordering::Relaxed)
    }

    /// Admit an order and match it against the opposite side.
    ///
    /// Returns the textual report for the session: one admission
    /// acknowledgment line followed by one line per executed trade. A fully
    /// filled incoming order still produces the acknowledgment: the report
    /// documents what was submitted, not only what rests.
    pub fn admit(&self, order: Order) -> Result<String, EngineError> {
        if order.symbol != self.symbol {
            return Err(EngineError::SymbolMismatch {
                symbol: order.symbol,
                book: self.symbol.clone(),
            });
        }

        let mut report = format!(
            "Order added: {} {} {} @ ${} (Order ID: {})\n",
            order.side, order.quantity, order.symbol, order.price, order.id
        );

        let mut sides = self.sides.lock();
        debug!(
            order_id = order.id,
            symbol = %self.symbol,
            side = %order.side,
            price = %order.price,
            quantity = order.quantity,
            "order admitted"
        );
        sides.append(order);

        let trades = sides.match_crossed(&self.symbol);
        drop(sides);

        for trade in &trades {
            debug!(
                symbol = %trade.symbol,
                maker_id = trade.maker_id,
                taker_id = trade.taker_id,
                quantity = trade.quantity,
                price = %trade.price,
                "trade executed"
            );
            let _ = writeln!(report, "{trade}");
        }

        Ok(report)
    }

    /// Render both sides in priority order.
    ///
    /// Purely observational; repeated calls without intervening admissions
    /// produce byte-identical output.
    pub fn snapshot(&self) -> String {
        let sides = self.sides.lock();

        let mut out = format!("\n=== {} Order Book ===\n", self.symbol);

        out.push_str("\nBUY ORDERS:\n");
        if sides.bids.is_empty() {
            out.push_str("  No buy orders\n");
        } else {
            for order in sides.bids.values().rev().flatten() {
                let _ = writeln!(
                    out,
                    "  Order #{}: {} @ ${}",
                    order.id, order.quantity, order.price
                );
            }
        }

        out.push_str("\nSELL ORDERS:\n");
        if sides.asks.is_empty() {
            out.push_str("  No sell orders\n");
        } else {
            for order in sides.asks.values().flatten() {
                let _ = writeln!(
                    out,
                    "  Order #{}: {} @ ${}",
                    order.id, order.quantity, order.price
                );
            }
        }

        out.push('\n');
        out
    }

    /// Best resting bid price, if any.
    pub fn best_bid(&self) -> Option<Price> {
        self.sides.lock().bids.last_key_value().map(|(p, _)| *p)
    }

    /// Best resting ask price, if any.
    pub fn best_ask(&self) -> Option<Price> {
        self.sides.lock().asks.first_key_value().map(|(p, _)| *p)
    }

    /// Number of resting orders on each side, `(bids, asks)`.
    pub fn depth(&self) -> (usize, usize) {
        let sides = self.sides.lock();
        (
            sides.bids.values().map(VecDeque::len).sum(),
            sides.asks.values().map(VecDeque::len).sum(),
        )
    }
}

impl BookSides {
    fn append(&mut self, order: Order) {
        let ladder = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        ladder.entry(order.price).or_default().push_back(order);
    }

    /// Trade the front orders of the best levels until the cross resolves.
    fn match_crossed(&mut self, symbol: &str) -> Vec<Trade> {
        let mut trades = Vec::new();

        loop {
            let Some(mut bid_level) = self.bids.last_entry() else {
                break;
            };
            let Some(mut ask_level) = self.asks.first_entry() else {
                break;
            };
            if bid_level.key() < ask_level.key() {
                break;
            }

            // Levels are dropped as soon as they empty, so the fronts exist.
            let buy = bid_level
                .get_mut()
                .front_mut()
                .expect("price level holds at least one order");
            let sell = ask_level
                .get_mut()
                .front_mut()
                .expect("price level holds at least one order");

            // The earlier-sequenced order was resting: it makes the price.
            let (maker_id, taker_id, price) = if buy.sequence < sell.sequence {
                (buy.id, sell.id, buy.price)
            } else {
                (sell.id, buy.id, sell.price)
            };
            let quantity = buy.quantity.min(sell.quantity);

            buy.quantity -= quantity;
            sell.quantity -= quantity;
            let buy_filled = buy.is_filled();
            let sell_filled = sell.is_filled();

            trades.push(Trade {
                symbol: symbol.to_string(),
                maker_id,
                taker_id,
                quantity,
                price,
            });

            if buy_filled {
                bid_level.get_mut().pop_front();
                if bid_level.get().is_empty() {
                    bid_level.remove();
                }
            }
            if sell_filled {
                ask_level.get_mut().pop_front();
                if ask_level.get().is_empty() {
                    ask_level.remove();
                }
            }
        }

        trades
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        s.parse().unwrap()
    }

    fn order(id: OrderId, side: Side, p: &str, quantity: Quantity) -> Order {
        // Tests reuse the id as the sequence; both grow together in practice.
        Order::new(id, "AAPL", side, price(p), quantity, id)
    }

    #[test]
    fn test_rejects_symbol_mismatch() {
        let book = OrderBook::new("AAPL");
        let stray = Order::new(1, "MSFT", Side::Buy, price("100.00"), 10, 1);
        assert_eq!(
            book.admit(stray),
            Err(EngineError::SymbolMismatch {
                symbol: "MSFT".to_string(),
                book: "AAPL".to_string(),
            })
        );
    }

    #[test]
    fn test_rest_only_no_opposite_side() {
        let book = OrderBook::new("AAPL");
        let report = book.admit(order(1, Side::Buy, "150.00", 100)).unwrap();
        assert_eq!(
            report,
            "Order added: BUY 100 AAPL @ $150.00 (Order ID: 1)\n"
        );
        assert_eq!(book.best_bid(), Some(price("150.00")));
        assert_eq!(book.best_ask(), None);
        assert_eq!(book.depth(), (1, 0));
    }

    #[test]
    fn test_exact_match_at_maker_price() {
        let book = OrderBook::new("AAPL");
        book.admit(order(1, Side::Buy, "150.00", 100)).unwrap();
        let report = book.admit(order(2, Side::Sell, "149.00", 100)).unwrap();
        assert_eq!(
            report,
            "Order added: SELL 100 AAPL @ $149.00 (Order ID: 2)\n\
             TRADE EXECUTED: 100 AAPL @ $150.00\n"
        );
        assert_eq!(book.depth(), (0, 0));
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn test_partial_fill_of_aggressor() {
        let book = OrderBook::new("AAPL");
        book.admit(order(1, Side::Sell, "151.00", 30)).unwrap();
        let report = book.admit(order(2, Side::Buy, "152.00", 100)).unwrap();
        assert!(report.contains("TRADE EXECUTED: 30 AAPL @ $151.00\n"));
        assert_eq!(book.depth(), (1, 0));

        let snapshot = book.snapshot();
        assert!(snapshot.contains("  Order #2: 70 @ $152.00\n"));
        assert!(snapshot.contains("  No sell orders\n"));
    }

    #[test]
    fn test_chain_match_walks_the_ladder() {
        let book = OrderBook::new("AAPL");
        book.admit(order(1, Side::Sell, "149.00", 40)).unwrap();
        book.admit(order(2, Side::Sell, "150.00", 40)).unwrap();
        let report = book.admit(order(3, Side::Buy, "151.00", 100)).unwrap();
        assert_eq!(
            report,
            "Order added: BUY 100 AAPL @ $151.00 (Order ID: 3)\n\
             TRADE EXECUTED: 40 AAPL @ $149.00\n\
             TRADE EXECUTED: 40 AAPL @ $150.00\n"
        );
        assert_eq!(book.best_bid(), Some(price("151.00")));
        assert_eq!(book.best_ask(), None);
        assert!(book.snapshot().contains("  Order #3: 20 @ $151.00\n"));
    }

    #[test]
    fn test_time_priority_at_equal_price() {
        let book = OrderBook::new("AAPL");
        book.admit(order(1, Side::Buy, "150.00", 50)).unwrap();
        book.admit(order(2, Side::Buy, "150.00", 50)).unwrap();
        let report = book.admit(order(3, Side::Sell, "150.00", 50)).unwrap();
        assert_eq!(
            report.matches("TRADE EXECUTED").count(),
            1,
            "exactly one trade expected"
        );
        assert!(report.contains("TRADE EXECUTED: 50 AAPL @ $150.00\n"));

        // The earlier bid is consumed; the later one keeps resting.
        let snapshot = book.snapshot();
        assert!(!snapshot.contains("Order #1"));
        assert!(snapshot.contains("  Order #2: 50 @ $150.00\n"));
    }

    #[test]
    fn test_aggressor_pays_maker_price_both_directions() {
        // Resting ask, incoming bid above it: trade at the ask.
        let book = OrderBook::new("AAPL");
        book.admit(order(1, Side::Sell, "150.00", 10)).unwrap();
        let report = book.admit(order(2, Side::Buy, "151.00", 10)).unwrap();
        assert!(report.contains("@ $150.00\n"));

        // Resting bid, incoming ask below it: trade at the bid.
        let book = OrderBook::new("AAPL");
        book.admit(order(1, Side::Buy, "151.00", 10)).unwrap();
        let report = book.admit(order(2, Side::Sell, "150.00", 10)).unwrap();
        assert!(report.contains("@ $151.00\n"));
    }

    #[test]
    fn test_sweep_then_rest_as_new_best() {
        let book = OrderBook::new("AAPL");
        book.admit(order(1, Side::Sell, "149.50", 10)).unwrap();
        book.admit(order(2, Side::Sell, "149.75", 10)).unwrap();
        book.admit(order(3, Side::Sell, "150.00", 10)).unwrap();
        let report = book.admit(order(4, Side::Buy, "150.00", 100)).unwrap();
        assert_eq!(report.matches("TRADE EXECUTED").count(), 3);
        assert_eq!(book.depth(), (1, 0));
        assert_eq!(book.best_bid(), Some(price("150.00")));
        assert!(book.snapshot().contains("  Order #4: 70 @ $150.00\n"));
    }

    #[test]
    fn test_snapshot_empty_book() {
        let book = OrderBook::new("TSLA");
        assert_eq!(
            book.snapshot(),
            "\n=== TSLA Order Book ===\n\nBUY ORDERS:\n  No buy orders\n\nSELL ORDERS:\n  No sell orders\n\n"
        );
    }

    #[test]
    fn test_snapshot_priority_order() {
        let book = OrderBook::new("AAPL");
        book.admit(order(1, Side::Buy, "149.00", 10)).unwrap();
        book.admit(order(2, Side::Buy, "150.00", 20)).unwrap();
        book.admit(order(3, Side::Sell, "151.00", 30)).unwrap();
        book.admit(order(4, Side::Sell, "150.50", 40)).unwrap();
        assert_eq!(
            book.snapshot(),
            "\n=== AAPL Order Book ===\n\
             \nBUY ORDERS:\n\
             \x20 Order #2: 20 @ $150.00\n\
             \x20 Order #1: 10 @ $149.00\n\
             \nSELL ORDERS:\n\
             \x20 Order #4: 40 @ $150.50\n\
             \x20 Order #3: 30 @ $151.00\n\
             \n"
        );
    }

    #[test]
    fn test_snapshot_is_pure() {
        let book = OrderBook::new("AAPL");
        book.admit(order(1, Side::Buy, "150.00", 100)).unwrap();
        assert_eq!(book.snapshot(), book.snapshot());
    }
}
