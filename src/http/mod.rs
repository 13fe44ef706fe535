//! HTTP protocol layer module
//!
//! Protocol helpers used by the file handler: path sanitizing, MIME
//! inference, cache validators, byte ranges, listings and response builders.

pub mod cache;
pub mod listing;
pub mod mime;
pub mod path;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range_header, RangeParseResult};
pub use response::{
    build_304_response, build_405_response, build_416_response, build_error_response,
    build_redirect_response, ResponseBody,
};
