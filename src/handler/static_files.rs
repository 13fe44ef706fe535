//! Static file serving module
//!
//! Resolves a request path inside the serving root and answers with the
//! file, an index document, a directory listing, a redirect or an error.

use std::fs::Metadata;
use std::io::{self, SeekFrom};
use std::path::Path;

use hyper::{Response, StatusCode};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::config::{AppState, DirectoryPolicy};
use crate::handler::router::RequestContext;
use crate::http::cache::{self, Precondition, Validators};
use crate::http::listing::{self, ListingEntry};
use crate::http::path::{self, PathError};
use crate::http::response::{self, FileHeaders};
use crate::http::{self as proto, mime, RangeParseResult, ResponseBody};
use crate::logger;

const INDEX_PAGE: &str = "/index.html";

/// Serve a GET or HEAD request from the serving root
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    let clean = match path::sanitize(ctx.path) {
        Ok(p) => p,
        Err(PathError::BadEncoding) => {
            return proto::build_error_response(StatusCode::BAD_REQUEST);
        }
        Err(PathError::InvalidCharacter) => {
            return proto::build_error_response(StatusCode::NOT_FOUND);
        }
    };

    // Index documents are only addressed through their directory URL
    if clean.ends_with(INDEX_PAGE) {
        return redirect(ctx, &clean[..=clean.len() - INDEX_PAGE.len()]);
    }

    let root = match fs::canonicalize(&state.root).await {
        Ok(root) => root,
        Err(e) => {
            logger::log_warning(&format!(
                "Serving directory not found or inaccessible '{}': {e}",
                state.root.display()
            ));
            return proto::build_error_response(StatusCode::NOT_FOUND);
        }
    };

    let target = root.join(path::relative(&clean).trim_end_matches('/'));
    let metadata = match fs::metadata(&target).await {
        Ok(m) => m,
        Err(e) => return io_error_response(&target, &e),
    };

    // Symlinks may still point outside the root
    match fs::canonicalize(&target).await {
        Ok(resolved) if resolved.starts_with(&root) => {}
        Ok(resolved) => {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                ctx.path,
                resolved.display()
            ));
            return proto::build_error_response(StatusCode::FORBIDDEN);
        }
        Err(e) => return io_error_response(&target, &e),
    }

    if metadata.is_dir() {
        if !clean.ends_with('/') && clean != "/" {
            return redirect(ctx, &format!("{clean}/"));
        }
        return serve_directory(ctx, state, &target, &metadata).await;
    }

    if clean.ends_with('/') {
        return redirect(ctx, clean.trim_end_matches('/'));
    }

    serve_file(ctx, state, &target).await
}

/// Serve an index document, or apply the directory policy
async fn serve_directory(
    ctx: &RequestContext<'_>,
    state: &AppState,
    dir: &Path,
    metadata: &Metadata,
) -> Response<ResponseBody> {
    for index_file in &state.config.files.index_files {
        let index_path = dir.join(index_file);
        if fs::metadata(&index_path).await.is_ok_and(|m| m.is_file()) {
            return serve_file(ctx, state, &index_path).await;
        }
    }

    match state.config.files.directory_policy {
        DirectoryPolicy::Listing => serve_listing(ctx, dir, metadata).await,
        DirectoryPolicy::Forbidden => proto::build_error_response(StatusCode::FORBIDDEN),
        DirectoryPolicy::NotFound => proto::build_error_response(StatusCode::NOT_FOUND),
    }
}

async fn serve_listing(
    ctx: &RequestContext<'_>,
    dir: &Path,
    metadata: &Metadata,
) -> Response<ResponseBody> {
    let validators = Validators {
        etag: None,
        last_modified: metadata.modified().ok(),
    };
    match cache::evaluate(&ctx.conditions, &validators) {
        Precondition::NotModified => return proto::build_304_response(&validators),
        Precondition::Failed => {
            return proto::build_error_response(StatusCode::PRECONDITION_FAILED);
        }
        Precondition::Proceed => {}
    }

    let entries = match read_entries(dir).await {
        Ok(entries) => entries,
        Err(e) => return io_error_response(dir, &e),
    };

    response::build_listing_response(
        listing::render(entries),
        validators.last_modified_header(),
        ctx.is_head,
    )
}

async fn read_entries(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut read_dir = fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        // Follow symlinks, as request resolution does
        let is_dir = fs::metadata(entry.path()).await.is_ok_and(|m| m.is_dir());
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    Ok(entries)
}

/// Serve a regular file with validators, conditional and range support
///
/// Validators come from the open handle's metadata, so preconditions never
/// read the content. The body is streamed from disk.
async fn serve_file(
    ctx: &RequestContext<'_>,
    state: &AppState,
    file_path: &Path,
) -> Response<ResponseBody> {
    let mut file = match File::open(file_path).await {
        Ok(file) => file,
        Err(e) => return io_error_response(file_path, &e),
    };
    let metadata = match file.metadata().await {
        Ok(m) => m,
        Err(e) => return io_error_response(file_path, &e),
    };
    let total_size = metadata.len();
    let modified = metadata.modified().ok();

    let validators = Validators {
        etag: Some(cache::generate_etag(total_size, modified)),
        last_modified: modified,
    };

    match cache::evaluate(&ctx.conditions, &validators) {
        Precondition::NotModified => return proto::build_304_response(&validators),
        Precondition::Failed => {
            return proto::build_error_response(StatusCode::PRECONDITION_FAILED);
        }
        Precondition::Proceed => {}
    }

    let content_type = match mime::for_path(file_path) {
        Some(content_type) => content_type,
        None => match sniff_file(&mut file).await {
            Ok(content_type) => content_type,
            Err(e) => return io_error_response(file_path, &e),
        },
    };
    let headers = FileHeaders {
        content_type,
        validators: &validators,
        cache_control: state.config.http.cache_control.as_deref(),
    };

    let range_header = ctx
        .range_header
        .as_deref()
        .filter(|_| cache::range_allowed(&ctx.conditions, &validators));

    match proto::parse_range_header(range_header, total_size) {
        RangeParseResult::Valid(range) => {
            match body_from(file, range.start, range.length(), ctx.is_head).await {
                Ok(body) => response::build_partial_response(body, range, total_size, &headers),
                Err(e) => io_error_response(file_path, &e),
            }
        }
        RangeParseResult::NotSatisfiable => proto::build_416_response(total_size),
        RangeParseResult::None => match body_from(file, 0, total_size, ctx.is_head).await {
            Ok(body) => response::build_file_response(body, total_size, &headers),
            Err(e) => io_error_response(file_path, &e),
        },
    }
}

/// Body of `length` bytes starting at `start`; HEAD leaves the content unread
async fn body_from(
    mut file: File,
    start: u64,
    length: u64,
    is_head: bool,
) -> io::Result<ResponseBody> {
    if is_head {
        return Ok(response::empty_body());
    }
    file.seek(SeekFrom::Start(start)).await?;
    Ok(response::file_body(file, length))
}

/// Content-Type from the leading bytes, for files with an unknown extension
async fn sniff_file(file: &mut File) -> io::Result<&'static str> {
    let mut head = Vec::new();
    file.take(mime::SNIFF_LEN).read_to_end(&mut head).await?;
    Ok(mime::sniff(&head))
}

/// Redirect to `location` (a cleaned path), keeping the query string
fn redirect(ctx: &RequestContext<'_>, location: &str) -> Response<ResponseBody> {
    let mut target = path::encode(location);
    if target.is_empty() {
        target.push('/');
    }
    if let Some(query) = ctx.query {
        target.push('?');
        target.push_str(query);
    }
    proto::build_redirect_response(&target)
}

/// Map a filesystem error to a response, logging anything unexpected
fn io_error_response(path: &Path, error: &io::Error) -> Response<ResponseBody> {
    match error.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
            proto::build_error_response(StatusCode::NOT_FOUND)
        }
        io::ErrorKind::PermissionDenied => {
            logger::log_warning(&format!("Permission denied: {}", path.display()));
            proto::build_error_response(StatusCode::FORBIDDEN)
        }
        _ => {
            logger::log_error(&format!("Failed to read '{}': {error}", path.display()));
            proto::build_error_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
