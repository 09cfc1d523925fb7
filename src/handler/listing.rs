//! Directory listing page for directories without an index file

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write;
use std::io;
use std::path::Path;
use tokio::fs;

/// Characters left unescaped in listing hrefs
const HREF_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

struct ListingEntry {
    sort_key: String,
    display: String,
    href: String,
}

/// Render the HTML listing of `dir`, titled with the decoded request path
pub async fn render_listing(dir: &Path, request_path: &str) -> io::Result<String> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_symlink = entry.file_type().await?.is_symlink();
        // Follows symlinks; a dangling link lists as a plain entry
        let is_dir = fs::metadata(entry.path())
            .await
            .is_ok_and(|m| m.is_dir());

        let sort_key = name.to_lowercase();
        let mut display = name.clone();
        let mut href = name;
        if is_dir {
            display.push('/');
            href.push('/');
        }
        if is_symlink {
            display = format!("{}@", display.trim_end_matches('/'));
        }
        entries.push(ListingEntry {
            sort_key,
            display,
            href,
        });
    }
    entries.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));

    let title = format!(
        "Directory listing for {}",
        escape_html(&percent_decode_str(request_path).decode_utf8_lossy())
    );

    let mut html = String::new();
    html.push_str("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title}</title>\n</head>\n<body>");
    let _ = writeln!(html, "<h1>{title}</h1>\n<hr>\n<ul>");
    for entry in &entries {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            utf8_percent_encode(&entry.href, HREF_SAFE),
            escape_html(&entry.display)
        );
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(html)
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
