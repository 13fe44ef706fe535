//! Request path sanitizing module
//!
//! Turns the raw URI path into a clean, rooted path that can never climb
//! above `/`, so joining it onto the serving root stays inside the root.

/// Why a request path was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    /// Percent-encoding did not decode to valid UTF-8 (400)
    BadEncoding,
    /// Contains characters no file on disk can be addressed by (404)
    InvalidCharacter,
}

/// Decode and clean a request path.
///
/// # Examples
/// ```
/// use static_file_server::http::path::sanitize;
/// assert_eq!(sanitize("/img/../css/site.css").unwrap(), "/css/site.css");
/// assert_eq!(sanitize("/../../etc/passwd").unwrap(), "/etc/passwd");
/// assert_eq!(sanitize("/a%20b/").unwrap(), "/a b/");
/// ```
pub fn sanitize(raw_path: &str) -> Result<String, PathError> {
    let decoded = urlencoding::decode(raw_path).map_err(|_| PathError::BadEncoding)?;

    if decoded.contains(['\0', '\\']) {
        return Err(PathError::InvalidCharacter);
    }

    if decoded.starts_with('/') {
        Ok(clean(&decoded))
    } else {
        Ok(clean(&format!("/{decoded}")))
    }
}

/// Lexically clean a rooted path.
///
/// Collapses repeated slashes, drops `.` segments, resolves `..` against the
/// previous segment (never above the root) and keeps a trailing slash when
/// the input had one, since trailing slashes drive directory redirects.
pub fn clean(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut out = String::with_capacity(path.len());
    out.push('/');
    out.push_str(&segments.join("/"));

    let wants_trailing = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    if wants_trailing && !segments.is_empty() {
        out.push('/');
    }
    out
}

/// Relative form of a cleaned path, suitable for `Path::join`
pub fn relative(clean_path: &str) -> &str {
    clean_path.trim_start_matches('/')
}

/// Percent-encode a cleaned path for use in a `Location` header
pub fn encode(clean_path: &str) -> String {
    clean_path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_basic() {
        assert_eq!(clean("/"), "/");
        assert_eq!(clean("/index.html"), "/index.html");
        assert_eq!(clean("//img///logo.png"), "/img/logo.png");
        assert_eq!(clean("/a/./b/"), "/a/b/");
    }

    #[test]
    fn test_clean_dot_dot() {
        assert_eq!(clean("/a/b/../c"), "/a/c");
        assert_eq!(clean("/../../etc/passwd"), "/etc/passwd");
        assert_eq!(clean("/a/.."), "/");
        assert_eq!(clean("/a/b/.."), "/a/");
        assert_eq!(clean("/.."), "/");
    }

    #[test]
    fn test_sanitize_decodes_before_cleaning() {
        assert_eq!(sanitize("/%2e%2e/%2e%2e/etc/passwd").unwrap(), "/etc/passwd");
        assert_eq!(sanitize("/docs/My%20File.txt").unwrap(), "/docs/My File.txt");
        assert_eq!(sanitize("relative/path").unwrap(), "/relative/path");
    }

    #[test]
    fn test_sanitize_rejects() {
        assert_eq!(sanitize("/%ff%fe"), Err(PathError::BadEncoding));
        assert_eq!(sanitize("/a%00b"), Err(PathError::InvalidCharacter));
        assert_eq!(sanitize("/..%5c..%5cwindows"), Err(PathError::InvalidCharacter));
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode("/"), "/");
        assert_eq!(encode("/docs/My File.txt"), "/docs/My%20File.txt");
        assert_eq!(encode("/img/"), "/img/");
    }

    #[test]
    fn test_relative() {
        assert_eq!(relative("/"), "");
        assert_eq!(relative("/img/logo.png"), "img/logo.png");
    }
}
