//! Static file server
//!
//! Serves a directory over plain HTTP/1.1: path sanitizing, index documents,
//! directory listings, conditional and byte-range requests, built on
//! tokio + hyper.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
