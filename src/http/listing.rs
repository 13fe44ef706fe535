//! Directory listing module
//!
//! Renders the HTML index page for directories that have no index document.

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Render a listing page. Entries are sorted by name; directories get a
/// trailing `/`.
///
/// # Examples
/// ```
/// use static_file_server::http::listing::{render, ListingEntry};
/// let html = render(vec![ListingEntry { name: "a b.txt".into(), is_dir: false }]);
/// assert!(html.contains("<a href=\"a%20b.txt\">a b.txt</a>"));
/// ```
pub fn render(mut entries: Vec<ListingEntry>) -> String {
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut html = String::from(
        "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
    );
    for entry in &entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        html.push_str(&format!(
            "<a href=\"{}{suffix}\">{}{suffix}</a>\n",
            urlencoding::encode(&entry.name),
            escape_html(&entry.name),
        ));
    }
    html.push_str("</pre>\n");
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
