//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, dispatch to
//! the file handler, common headers and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, cache::Conditions, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::body::Body as _;
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw URI path, still percent-encoded
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub conditions: Conditions,
    pub range_header: Option<String>,
}

/// Main entry point for HTTP request handling
///
/// Generic over the request body: file serving never reads it.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    // The body is never read; drop it so only the head is held across awaits
    let (parts, _) = req.into_parts();
    let method = &parts.method;
    let uri = &parts.uri;

    let mut response = if let Some(resp) = check_http_method(method) {
        resp
    } else {
        let ctx = RequestContext {
            path: uri.path(),
            query: uri.query(),
            is_head: *method == Method::HEAD,
            conditions: Conditions::from_headers(&parts.headers),
            range_header: parts
                .headers
                .get(header::RANGE)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string),
        };
        static_files::serve(&ctx, &state).await
    };

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(header::SERVER, server);
    }

    if state.config.logging.access_log {
        let mut entry =
            AccessLogEntry::from_request(peer_addr, method, uri, parts.version, &parts.headers);
        entry.status = response.status().as_u16();
        entry.body_bytes = body_bytes(&response);
        entry.request_time = started.elapsed();
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Bytes the response body will carry
///
/// Streamed file bodies have no exact size hint; their `Content-Length` is
/// authoritative instead.
fn body_bytes(response: &Response<ResponseBody>) -> usize {
    response
        .body()
        .size_hint()
        .exact()
        .or_else(|| {
            response
                .headers()
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        })
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}

/// Only GET and HEAD are served
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            logger::log_debug(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}
