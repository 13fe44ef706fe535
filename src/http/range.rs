//! HTTP Range request parsing module
//!
//! Single `bytes` range parsing (RFC 9110 §14). Multi-range requests are
//! answered with the full representation.

/// Resolved, inclusive byte range within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub const fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a file of `total` bytes
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Satisfiable single range
    Valid(ByteRange),
    /// Well-formed but outside the file - should return 416
    NotSatisfiable,
    /// No Range header, other unit, multi-range or malformed (serve in full)
    None,
}

/// Parse a `Range` header against a file of `file_size` bytes
///
/// Supported forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
///
/// # Examples
/// ```
/// use static_file_server::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=0-99"), 1000);
/// assert_eq!(result, RangeParseResult::Valid(ByteRange { start: 0, end: 99 }));
///
/// let result = parse_range_header(None, 1000);
/// assert_eq!(result, RangeParseResult::None);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };

    if spec.contains(',') {
        return RangeParseResult::None;
    }

    let Some((first, last)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        suffix_range(last, file_size)
    } else {
        bounded_range(first, last, file_size)
    }
}

/// `-N`: the final N bytes
fn suffix_range(suffix: &str, file_size: u64) -> RangeParseResult {
    let Ok(suffix) = suffix.parse::<u64>() else {
        return RangeParseResult::None;
    };

    if suffix == 0 || file_size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: file_size - 1,
    })
}

/// `A-` or `A-B`, with B clamped to the last byte
fn bounded_range(first: &str, last: &str, file_size: u64) -> RangeParseResult {
    let Ok(start) = first.parse::<u64>() else {
        return RangeParseResult::None;
    };

    let end = if last.is_empty() {
        None
    } else {
        match last.parse::<u64>() {
            Ok(end) if end < start => return RangeParseResult::None,
            Ok(end) => Some(end),
            Err(_) => return RangeParseResult::None,
        }
    };

    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let last_byte = file_size - 1;
    RangeParseResult::Valid(ByteRange {
        start,
        end: end.map_or(last_byte, |e| e.min(last_byte)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(start: u64, end: u64) -> RangeParseResult {
        RangeParseResult::Valid(ByteRange { start, end })
    }

    #[test]
    fn test_no_range() {
        assert_eq!(parse_range_header(None, 100), RangeParseResult::None);
        assert_eq!(parse_range_header(Some("items=0-5"), 100), RangeParseResult::None);
    }

    #[test]
    fn test_standard_range() {
        let result = parse_range_header(Some("bytes=0-9"), 100);
        assert_eq!(result, valid(0, 9));
        if let RangeParseResult::Valid(r) = result {
            assert_eq!(r.length(), 10);
            assert_eq!(r.content_range(100), "bytes 0-9/100");
        }
    }

    #[test]
    fn test_open_and_clamped_range() {
        assert_eq!(parse_range_header(Some("bytes=50-"), 100), valid(50, 99));
        assert_eq!(parse_range_header(Some("bytes=90-500"), 100), valid(90, 99));
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(parse_range_header(Some("bytes=-20"), 100), valid(80, 99));
        assert_eq!(parse_range_header(Some("bytes=-500"), 100), valid(0, 99));
    }

    #[test]
    fn test_not_satisfiable() {
        assert_eq!(parse_range_header(Some("bytes=200-"), 100), RangeParseResult::NotSatisfiable);
        assert_eq!(parse_range_header(Some("bytes=-0"), 100), RangeParseResult::NotSatisfiable);
        assert_eq!(parse_range_header(Some("bytes=0-"), 0), RangeParseResult::NotSatisfiable);
    }

    #[test]
    fn test_invalid_format() {
        assert_eq!(parse_range_header(Some("bytes=a-b"), 100), RangeParseResult::None);
        assert_eq!(parse_range_header(Some("bytes=9-0"), 100), RangeParseResult::None);
        assert_eq!(parse_range_header(Some("bytes=0-9,20-29"), 100), RangeParseResult::None);
        assert_eq!(parse_range_header(Some("bytes=5"), 100), RangeParseResult::None);
    }
}
