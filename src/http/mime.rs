//! MIME type detection module
//!
//! Maps file extensions to Content-Type, falling back to content sniffing
//! for extensions the table does not know.

use std::path::Path;

/// Get MIME Content-Type based on file extension (case-insensitive)
///
/// # Examples
/// ```
/// use static_file_server::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("html")), Some("text/html; charset=utf-8"));
/// assert_eq!(get_content_type(Some("PNG")), Some("image/png"));
/// assert_eq!(get_content_type(None), None);
/// ```
pub fn get_content_type(extension: Option<&str>) -> Option<&'static str> {
    let ext = extension?.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "txt" | "md" => "text/plain; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "xml" => "text/xml; charset=utf-8",

        // JavaScript/WASM
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "wasm" => "application/wasm",
        "webmanifest" => "application/manifest+json",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mov" => "video/quicktime",

        // Audio
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",

        _ => return None,
    };
    Some(content_type)
}

/// Number of leading bytes read when the extension is unknown
pub const SNIFF_LEN: u64 = 512;

/// Content-Type from a file's extension alone
///
/// `None` means the caller has to [`sniff`] the first [`SNIFF_LEN`] bytes.
pub fn for_path(path: &Path) -> Option<&'static str> {
    get_content_type(path.extension().and_then(|e| e.to_str()))
}

/// Guess a Content-Type from leading bytes
pub fn sniff(content: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(content) {
        return kind.mime_type();
    }
    // Only the first 512 bytes are considered, like browsers do
    let head = &content[..content.len().min(512)];
    if looks_like_text(head) {
        "text/plain; charset=utf-8"
    } else {
        "application/octet-stream"
    }
}

fn looks_like_text(head: &[u8]) -> bool {
    let valid = match std::str::from_utf8(head) {
        Ok(_) => true,
        // A multi-byte sequence cut off at the 512 byte boundary is still text
        Err(e) => e.error_len().is_none(),
    };
    valid
        && !head
            .iter()
            .any(|&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Some("html")), Some("text/html; charset=utf-8"));
        assert_eq!(get_content_type(Some("css")), Some("text/css; charset=utf-8"));
        assert_eq!(get_content_type(Some("js")), Some("text/javascript; charset=utf-8"));
        assert_eq!(get_content_type(Some("json")), Some("application/json"));
        assert_eq!(get_content_type(Some("png")), Some("image/png"));
        assert_eq!(get_content_type(Some("JPG")), Some("image/jpeg"));
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), None);
        assert_eq!(get_content_type(None), None);
    }

    #[test]
    fn test_sniff_fallback() {
        let png_magic = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];
        assert_eq!(sniff(&png_magic), "image/png");
        assert_eq!(sniff(b"plain words\n"), "text/plain; charset=utf-8");
        assert_eq!(sniff(&[0x00, 0x01, 0x02, 0xff]), "application/octet-stream");
    }

    #[test]
    fn test_for_path() {
        assert_eq!(for_path(Path::new("static/notes.TXT")), Some("text/plain; charset=utf-8"));
        assert_eq!(for_path(Path::new("LICENSE")), None);
        assert_eq!(for_path(Path::new("archive.unknownext")), None);
    }
}
