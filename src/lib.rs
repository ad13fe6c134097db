// src/lib.rs - Trading Engine Library Root
//! # Trading Engine
//!
//! A multi-symbol limit order book matching engine served over a
//! line-oriented TCP protocol. Clients submit limit orders in BUY or SELL
//! direction for arbitrary instrument symbols; the engine keeps one book per
//! symbol, matches on every admission with price-time priority, and streams
//! textual results back over the session's socket.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  TCP Session │   │  TCP Session │   │  TCP Session │
//! └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!        │                  │                  │
//!        └────────── line protocol ────────────┘
//!                           │
//!             ┌─────────────▼─────────────┐
//!             │      MatchingEngine       │
//!             │  (registry + id counter)  │
//!             └─────────────┬─────────────┘
//!                           │
//!        ┌──────────────────┼──────────────────┐
//!  ┌─────▼─────┐      ┌─────▼─────┐      ┌─────▼─────┐
//!  │ OrderBook │      │ OrderBook │      │ OrderBook │
//!  │   AAPL    │      │   MSFT    │      │    ...    │
//!  └───────────┘      └───────────┘      └───────────┘
//! ```
//!
//! Each accepted connection runs on its own task. The matching core is fully
//! synchronous: the only blocking points are the registry guard and the
//! per-book guard, both short critical sections. Operations on one symbol
//! serialize on that symbol's book; different symbols match concurrently.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

use serde::Deserialize;

pub mod core;
pub mod engine;
pub mod transport;

pub use crate::core::{
    order::{Order, Side},
    types::{OrderId, Price, Quantity, Sequence, Symbol},
};
pub use crate::engine::{book::OrderBook, MatchingEngine};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Errors surfaced at the engine boundary.
///
/// Every variant maps to a single `ERROR:`-prefixed reply; the session stays
/// open after any of them. `SymbolMismatch` is internal wiring protection
/// and is not reachable from well-formed protocol traffic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Command token is not one of the recognized commands.
    #[error("Unknown command")]
    InvalidCommand,

    /// A required argument is missing or does not parse.
    #[error("Invalid command format")]
    InvalidFormat {
        /// Usage line for the command that failed to parse.
        usage: &'static str,
    },

    /// Side token is neither `BUY` nor `SELL`.
    #[error("Invalid side. Use BUY or SELL")]
    InvalidSide,

    /// Price or quantity is not strictly positive.
    #[error("Price and quantity must be positive")]
    InvalidArguments,

    /// An order was routed to a book serving a different symbol.
    #[error("order for {symbol} routed to the {book} book")]
    SymbolMismatch {
        /// Symbol carried by the order.
        symbol: String,
        /// Symbol the receiving book serves.
        book: String,
    },
}

/// Application configuration for the server binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server listener configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format ("json" or "pretty")
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
