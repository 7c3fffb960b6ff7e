//! Best-effort scraping of the HTML snippets editors paste into link fields.
//!
//! These are regex scans, not a parser: they look for the first match and give
//! up quietly on anything else.
use crate::normalize::title::decode_entities;
use regex::Regex;
use std::sync::LazyLock;

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).expect("HREF_RE: hardcoded regex is valid")
});

static ANCHOR_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<a[^>]*>([^<]+)</a>").expect("ANCHOR_TEXT_RE: hardcoded regex is valid")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("TAG_RE: hardcoded regex is valid"));

/// Value of the first `href="..."` / `href='...'` attribute, trimmed.
///
/// ```
/// use bryte_cms::normalize::extract_href;
///
/// let html = r#"<a href="https://x.test">Site</a>"#;
/// assert_eq!(extract_href(Some(html)).as_deref(), Some("https://x.test"));
/// assert_eq!(extract_href(Some("<p>no link</p>")), None);
/// assert_eq!(extract_href(None), None);
/// ```
pub fn extract_href(html: Option<&str>) -> Option<String> {
    let html = html.filter(|h| !h.is_empty())?;
    let caps = HREF_RE.captures(html)?;
    Some(caps.get(1)?.as_str().trim().to_string())
}

/// Text between the first `<a ...>` and `</a>`, trimmed; `None` when blank.
pub fn extract_anchor_text(html: Option<&str>) -> Option<String> {
    let html = html.filter(|h| !h.is_empty())?;
    let caps = ANCHOR_TEXT_RE.captures(html)?;
    let text = caps.get(1)?.as_str().trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Tags stripped, entities decoded, whitespace collapsed.
pub(crate) fn plain_text(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, " ");
    decode_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
