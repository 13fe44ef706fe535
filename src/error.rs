//! Startup error types
//!
//! Request-level failures never surface here: they become HTTP status codes
//! inside the handler. Everything in this module is fatal to the process.

use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("failed to open log files: {0}")]
    Logger(#[source] std::io::Error),

    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("listen tcp {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
