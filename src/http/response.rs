//! HTTP response building module
//!
//! Builders for every response the file server produces.

use std::io;

use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

use super::cache::Validators;
use super::range::ByteRange;

/// Methods the server answers
pub const ALLOWED_METHODS: &str = "GET, HEAD";

/// Body of every response: buffered bytes or a file streamed from disk
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Buffered body
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Stream `length` bytes from the file's current position
pub fn file_body(file: File, length: u64) -> ResponseBody {
    let stream = ReaderStream::new(file.take(length)).map_ok(Frame::data);
    StreamBody::new(stream).boxed_unsync()
}

/// Headers shared by full and partial file responses
#[derive(Debug, Clone)]
pub struct FileHeaders<'a> {
    pub content_type: &'a str,
    pub validators: &'a Validators,
    pub cache_control: Option<&'a str>,
}

/// Build a plain-text error response, e.g. `404 Not Found`
pub fn build_error_response(status: StatusCode) -> Response<ResponseBody> {
    let text = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(full_body(text))
        .unwrap_or_else(|e| fallback(status, &e))
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let mut resp = build_error_response(StatusCode::METHOD_NOT_ALLOWED);
    resp.headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    resp
}

/// Build 304 Not Modified response
pub fn build_304_response(validators: &Validators) -> Response<ResponseBody> {
    let mut builder = Response::builder().status(StatusCode::NOT_MODIFIED);
    if let Some(etag) = &validators.etag {
        builder = builder.header(header::ETAG, etag);
    }
    if let Some(modified) = validators.last_modified_header() {
        builder = builder.header(header::LAST_MODIFIED, modified);
    }
    builder
        .body(empty_body())
        .unwrap_or_else(|e| fallback(StatusCode::NOT_MODIFIED, &e))
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<ResponseBody> {
    let mut resp = build_error_response(StatusCode::RANGE_NOT_SATISFIABLE);
    if let Ok(value) = HeaderValue::from_str(&format!("bytes */{file_size}")) {
        resp.headers_mut().insert(header::CONTENT_RANGE, value);
    }
    resp
}

/// Build 301 redirect response
pub fn build_redirect_response(location: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(header::LOCATION, location)
        .body(empty_body())
        .unwrap_or_else(|e| fallback(StatusCode::MOVED_PERMANENTLY, &e))
}

/// Build 200 response carrying a whole file
///
/// `body` is empty for HEAD; `content_length` is the file size either way.
pub fn build_file_response(
    body: ResponseBody,
    content_length: u64,
    headers: &FileHeaders<'_>,
) -> Response<ResponseBody> {
    file_builder(StatusCode::OK, headers)
        .header(header::CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// Build 206 Partial Content response; `body` yields only the range's bytes
pub fn build_partial_response(
    body: ResponseBody,
    range: ByteRange,
    total_size: u64,
    headers: &FileHeaders<'_>,
) -> Response<ResponseBody> {
    file_builder(StatusCode::PARTIAL_CONTENT, headers)
        .header(header::CONTENT_LENGTH, range.length())
        .header(header::CONTENT_RANGE, range.content_range(total_size))
        .body(body)
        .unwrap_or_else(|e| fallback(StatusCode::PARTIAL_CONTENT, &e))
}

/// Build 200 response for a generated directory listing
pub fn build_listing_response(
    html: String,
    last_modified: Option<String>,
    is_head: bool,
) -> Response<ResponseBody> {
    let content_length = html.len();
    let body = if is_head { empty_body() } else { full_body(html) };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(header::CONTENT_LENGTH, content_length);
    if let Some(modified) = last_modified {
        builder = builder.header(header::LAST_MODIFIED, modified);
    }
    builder
        .body(body)
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

fn file_builder(status: StatusCode, headers: &FileHeaders<'_>) -> hyper::http::response::Builder {
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, headers.content_type)
        .header(header::ACCEPT_RANGES, "bytes");
    if let Some(etag) = &headers.validators.etag {
        builder = builder.header(header::ETAG, etag);
    }
    if let Some(modified) = headers.validators.last_modified_header() {
        builder = builder.header(header::LAST_MODIFIED, modified);
    }
    if let Some(cache_control) = headers.cache_control {
        builder = builder.header(header::CACHE_CONTROL, cache_control);
    }
    builder
}

/// Log a response build error and return a bare response with the same status
fn fallback(status: StatusCode, error: &hyper::http::Error) -> Response<ResponseBody> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut resp = Response::new(empty_body());
    *resp.status_mut() = status;
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn validators() -> Validators {
        Validators {
            etag: Some("\"e1\"".to_string()),
            last_modified: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777)),
        }
    }

    #[test]
    fn test_error_response() {
        let resp = build_error_response(StatusCode::NOT_FOUND);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_405_has_allow() {
        let resp = build_405_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[header::ALLOW], "GET, HEAD");
    }

    #[test]
    fn test_head_keeps_content_length() {
        let v = validators();
        let headers = FileHeaders {
            content_type: "text/plain; charset=utf-8",
            validators: &v,
            cache_control: Some("public, max-age=60"),
        };
        let resp = build_file_response(empty_body(), 5, &headers);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "5");
        assert_eq!(resp.headers()[header::ETAG], "\"e1\"");
        assert_eq!(
            resp.headers()[header::LAST_MODIFIED],
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );
        assert_eq!(resp.headers()[header::CACHE_CONTROL], "public, max-age=60");
    }

    #[test]
    fn test_partial_response_headers() {
        let v = validators();
        let headers = FileHeaders {
            content_type: "image/png",
            validators: &v,
            cache_control: None,
        };
        let range = ByteRange { start: 10, end: 19 };
        let resp = build_partial_response(full_body(vec![0u8; 10]), range, 500, &headers);
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[header::CONTENT_RANGE], "bytes 10-19/500");
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "10");
        assert!(resp.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[tokio::test]
    async fn test_file_body_streams_from_position() {
        use std::io::SeekFrom;
        use tokio::io::AsyncSeekExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digits.txt");
        std::fs::write(&path, "0123456789").unwrap();

        let mut file = File::open(&path).await.unwrap();
        file.seek(SeekFrom::Start(3)).await.unwrap();
        let body = file_body(file, 4).collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"3456");
    }

    #[test]
    fn test_416_content_range() {
        let resp = build_416_response(500);
        assert_eq!(resp.headers()[header::CONTENT_RANGE], "bytes */500");
    }
}
