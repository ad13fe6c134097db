// src/transport/protocol.rs - Wire Protocol Commands & Replies
//! The textual command surface of the engine.
//!
//! One `\n`-terminated request line in, one textual reply out. Commands are
//! case-sensitive, arguments are whitespace-delimited, and trailing extra
//! tokens are ignored the way a token scanner would. Every malformed request
//! maps to a single `ERROR:`-prefixed reply and the session stays open.

use crate::core::{Price, Side};
use crate::engine::MatchingEngine;
use crate::EngineError;

/// Usage hint for `ADD_ORDER`.
pub const ADD_ORDER_USAGE: &str = "ADD_ORDER <BUY|SELL> <SYMBOL> <PRICE> <QUANTITY>";

/// Usage hint for `SHOW_ORDERS`.
pub const SHOW_ORDERS_USAGE: &str = "SHOW_ORDERS <SYMBOL>";

/// A parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Admit a limit order. Quantity is kept signed so positivity is
    /// checked at the engine boundary, not silently during parsing.
    AddOrder {
        /// Order side
        side: Side,
        /// Instrument symbol
        symbol: String,
        /// Limit price
        price: Price,
        /// Submitted quantity
        quantity: i64,
    },
    /// Render the book for a symbol.
    ShowOrders {
        /// Instrument symbol
        symbol: String,
    },
    /// Say goodbye and close the session.
    Disconnect,
}

impl Command {
    /// Parse a request line.
    pub fn parse(line: &str) -> Result<Self, EngineError> {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("ADD_ORDER") => {
                let missing = EngineError::InvalidFormat {
                    usage: ADD_ORDER_USAGE,
                };
                let side_token = tokens.next().ok_or_else(|| missing.clone())?;
                let symbol = tokens.next().ok_or_else(|| missing.clone())?;
                let price_token = tokens.next().ok_or_else(|| missing.clone())?;
                let quantity_token = tokens.next().ok_or_else(|| missing.clone())?;

                let price: Price = price_token.parse().map_err(|_| missing.clone())?;
                let quantity: i64 = quantity_token.parse().map_err(|_| missing)?;
                let side: Side = side_token.parse()?;

                Ok(Self::AddOrder {
                    side,
                    symbol: symbol.to_string(),
                    price,
                    quantity,
                })
            }
            Some("SHOW_ORDERS") => {
                let symbol = tokens.next().ok_or(EngineError::InvalidFormat {
                    usage: SHOW_ORDERS_USAGE,
                })?;
                Ok(Self::ShowOrders {
                    symbol: symbol.to_string(),
                })
            }
            Some("DISCONNECT") => Ok(Self::Disconnect),
            _ => Err(EngineError::InvalidCommand),
        }
    }
}

/// Reply for one request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text to write back, already `\n`-terminated.
    pub text: String,
    /// Whether the server should close the session after writing.
    pub close: bool,
}

impl Reply {
    fn keep_open(text: String) -> Self {
        Self { text, close: false }
    }
}

/// Parse and execute one request line against the engine.
pub fn dispatch(engine: &MatchingEngine, line: &str) -> Reply {
    match Command::parse(line) {
        Ok(Command::AddOrder {
            side,
            symbol,
            price,
            quantity,
        }) => match engine.submit(&symbol, side, price, quantity) {
            Ok(report) => Reply::keep_open(report),
            Err(err) => Reply::keep_open(error_reply(&err)),
        },
        Ok(Command::ShowOrders { symbol }) => Reply::keep_open(engine.snapshot(&symbol)),
        Ok(Command::Disconnect) => Reply {
            text: "OK: Goodbye!\n".to_string(),
            close: true,
        },
        Err(err) => Reply::keep_open(error_reply(&err)),
    }
}

/// Render an error as a protocol reply, with a usage hint where one helps.
pub fn error_reply(err: &EngineError) -> String {
    match err {
        EngineError::InvalidCommand => {
            format!("ERROR: {err}\nAvailable commands: ADD_ORDER, SHOW_ORDERS, DISCONNECT\n")
        }
        EngineError::InvalidFormat { usage } => format!("ERROR: {err}\nUsage: {usage}\n"),
        _ => format!("ERROR: {err}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_order() {
        assert_eq!(
            Command::parse("ADD_ORDER BUY AAPL 150.00 100").unwrap(),
            Command::AddOrder {
                side: Side::Buy,
                symbol: "AAPL".to_string(),
                price: "150.00".parse().unwrap(),
                quantity: 100,
            }
        );
        // Trailing tokens are ignored, leading whitespace tolerated.
        assert!(Command::parse("  ADD_ORDER SELL MSFT 99.95 10 extra").is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Command::parse(""), Err(EngineError::InvalidCommand));
        assert_eq!(Command::parse("add_order"), Err(EngineError::InvalidCommand));
        assert_eq!(
            Command::parse("ADD_ORDER BUY AAPL 150.00"),
            Err(EngineError::InvalidFormat {
                usage: ADD_ORDER_USAGE
            })
        );
        assert_eq!(
            Command::parse("ADD_ORDER BUY AAPL abc 100"),
            Err(EngineError::InvalidFormat {
                usage: ADD_ORDER_USAGE
            })
        );
        assert_eq!(
            Command::parse("ADD_ORDER BUY AAPL 150.00 ten"),
            Err(EngineError::InvalidFormat {
                usage: ADD_ORDER_USAGE
            })
        );
        assert_eq!(
            Command::parse("ADD_ORDER HOLD AAPL 150.00 100"),
            Err(EngineError::InvalidSide)
        );
        assert_eq!(
            Command::parse("SHOW_ORDERS"),
            Err(EngineError::InvalidFormat {
                usage: SHOW_ORDERS_USAGE
            })
        );
    }

    #[test]
    fn test_format_checked_before_side() {
        // An unparseable price reports a format error even when the side
        // token is also bad, matching scanner-order validation.
        assert_eq!(
            Command::parse("ADD_ORDER HOLD AAPL abc 100"),
            Err(EngineError::InvalidFormat {
                usage: ADD_ORDER_USAGE
            })
        );
    }

    #[test]
    fn test_dispatch_rest_and_show() {
        let engine = MatchingEngine::new();

        let reply = dispatch(&engine, "ADD_ORDER BUY AAPL 150.00 100");
        assert_eq!(
            reply.text,
            "Order added: BUY 100 AAPL @ $150.00 (Order ID: 1)\n"
        );
        assert!(!reply.close);

        let reply = dispatch(&engine, "SHOW_ORDERS AAPL");
        assert!(reply.text.contains("=== AAPL Order Book ==="));
        assert!(reply.text.contains("  Order #1: 100 @ $150.00\n"));
        assert!(reply.text.contains("  No sell orders\n"));
    }

    #[test]
    fn test_dispatch_match_report() {
        let engine = MatchingEngine::new();
        dispatch(&engine, "ADD_ORDER BUY AAPL 150.00 100");
        let reply = dispatch(&engine, "ADD_ORDER SELL AAPL 149.00 100");
        assert_eq!(
            reply.text,
            "Order added: SELL 100 AAPL @ $149.00 (Order ID: 2)\n\
             TRADE EXECUTED: 100 AAPL @ $150.00\n"
        );

        let reply = dispatch(&engine, "SHOW_ORDERS AAPL");
        assert!(reply.text.contains("  No buy orders\n"));
        assert!(reply.text.contains("  No sell orders\n"));
    }

    #[test]
    fn test_dispatch_error_replies() {
        let engine = MatchingEngine::new();

        assert_eq!(
            dispatch(&engine, "BOGUS").text,
            "ERROR: Unknown command\nAvailable commands: ADD_ORDER, SHOW_ORDERS, DISCONNECT\n"
        );
        assert_eq!(
            dispatch(&engine, "").text,
            "ERROR: Unknown command\nAvailable commands: ADD_ORDER, SHOW_ORDERS, DISCONNECT\n"
        );
        assert_eq!(
            dispatch(&engine, "ADD_ORDER BUY AAPL 150.00").text,
            format!("ERROR: Invalid command format\nUsage: {ADD_ORDER_USAGE}\n")
        );
        assert_eq!(
            dispatch(&engine, "ADD_ORDER down AAPL 150.00 100").text,
            "ERROR: Invalid side. Use BUY or SELL\n"
        );
        assert_eq!(
            dispatch(&engine, "ADD_ORDER BUY AAPL -150.00 100").text,
            "ERROR: Price and quantity must be positive\n"
        );
        assert_eq!(
            dispatch(&engine, "ADD_ORDER BUY AAPL 150.00 0").text,
            "ERROR: Price and quantity must be positive\n"
        );
        assert_eq!(
            dispatch(&engine, "SHOW_ORDERS").text,
            format!("ERROR: Invalid command format\nUsage: {SHOW_ORDERS_USAGE}\n")
        );
    }

    #[test]
    fn test_dispatch_disconnect() {
        let engine = MatchingEngine::new();
        let reply = dispatch(&engine, "DISCONNECT");
        assert_eq!(reply.text, "OK: Goodbye!\n");
        assert!(reply.close);
    }

    #[test]
    fn test_dispatch_unknown_symbol_snapshot() {
        let engine = MatchingEngine::new();
        assert_eq!(
            dispatch(&engine, "SHOW_ORDERS GOOG").text,
            "No orders found for symbol: GOOG\n"
        );
    }

    #[test]
    fn test_session_survives_errors() {
        let engine = MatchingEngine::new();
        assert!(!dispatch(&engine, "BOGUS").close);
        assert!(!dispatch(&engine, "ADD_ORDER BUY AAPL 0 100").close);
        // The engine still works on the same session afterwards.
        let reply = dispatch(&engine, "ADD_ORDER BUY AAPL 150.00 100");
        assert!(reply.text.starts_with("Order added:"));
    }
}
