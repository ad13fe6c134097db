// src/transport/mod.rs - Network Transport
//! Line-oriented TCP transport for the matching engine.
//!
//! [`protocol`] owns the textual command surface (parsing and reply
//! rendering); [`tcp`] owns the listener and per-connection sessions.

pub mod protocol;
pub mod tcp;

pub use protocol::{dispatch, Command, Reply};
pub use tcp::TcpServer;
