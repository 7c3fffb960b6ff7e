//! Link lists ("resources for parents", tutor resources) from CMS link objects.
//!
//! Each CMS link object carries a display title (on the object or in its
//! metadata) and an HTML snippet holding the real hyperlink. Entries whose title
//! or URL cannot be recovered are dropped; they are expected, not errors.
use crate::normalize::html::{extract_anchor_text, extract_href};
use crate::normalize::title::{clean_title, is_space_like, is_valid_title};
use crate::normalize::value::{non_blank_at, str_at};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LinkEntry {
    pub title: String,
    pub url: String,
}

/// Ordered `title -> url` mapping with unique titles.
///
/// Inserting an existing title replaces its URL but keeps its original
/// position. Serialises as a JSON object in insertion order.
///
/// ```
/// use bryte_cms::normalize::LinksDictionary;
///
/// let mut links = LinksDictionary::new();
/// links.insert("Dup", "https://first.test");
/// links.insert("Other", "https://other.test");
/// links.insert("Dup", "https://second.test");
///
/// assert_eq!(links.get("Dup"), Some("https://second.test"));
/// assert_eq!(links.titles().collect::<Vec<_>>(), ["Dup", "Other"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinksDictionary {
    entries: Vec<LinkEntry>,
}

impl LinksDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; returns the URL previously stored under `title`.
    pub fn insert(&mut self, title: impl Into<String>, url: impl Into<String>) -> Option<String> {
        let title = title.into();
        let url = url.into();
        match self.entries.iter_mut().find(|e| e.title == title) {
            Some(existing) => Some(std::mem::replace(&mut existing.url, url)),
            None => {
                self.entries.push(LinkEntry { title, url });
                None
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.title == title)
            .map(|e| e.url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.title.as_str(), e.url.as_str()))
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.title.as_str())
    }

    pub fn entries(&self) -> &[LinkEntry] {
        &self.entries
    }
}

impl FromIterator<LinkEntry> for LinksDictionary {
    fn from_iter<I: IntoIterator<Item = LinkEntry>>(iter: I) -> Self {
        let mut links = LinksDictionary::new();
        for entry in iter {
            links.insert(entry.title, entry.url);
        }
        links
    }
}

impl Serialize for LinksDictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.title, &entry.url)?;
        }
        map.end()
    }
}

fn usable_url(url: &str) -> bool {
    let visible = url.trim_matches(is_space_like);
    !visible.is_empty() && visible != "#"
}

/// Normalize one CMS link object, or `None` when it should be skipped.
pub fn normalize_link_entry(entry: &Value) -> Option<LinkEntry> {
    let html = str_at(entry, &["metadata", "link"]);
    let candidate = non_blank_at(entry, &["title"])
        .or_else(|| str_at(entry, &["metadata", "title"]))
        .unwrap_or_default();

    let mut title = clean_title(candidate);
    if !is_valid_title(&title) {
        if let Some(anchor) = extract_anchor_text(html) {
            title = clean_title(&anchor);
        }
    }
    if !is_valid_title(&title) {
        tracing::debug!(raw_title=%candidate, "links.entry.dropped.title");
        return None;
    }

    match extract_href(html) {
        Some(url) if usable_url(&url) => Some(LinkEntry { title, url }),
        url => {
            tracing::debug!(%title, ?url, "links.entry.dropped.url");
            None
        }
    }
}

/// Reduce CMS link objects to an ordered dictionary; later duplicates win.
///
/// ```
/// use bryte_cms::normalize::normalize_links;
/// use serde_json::json;
///
/// let links = normalize_links(&[json!({
///     "title": "Site",
///     "metadata": { "link": "<a href=\"https://x.test\">Site</a>" }
/// })]);
/// assert_eq!(links.get("Site"), Some("https://x.test"));
/// assert_eq!(links.len(), 1);
/// ```
pub fn normalize_links(entries: &[Value]) -> LinksDictionary {
    entries.iter().filter_map(normalize_link_entry).collect()
}

/// Links stored under `links` in an object's metadata bag.
pub fn metadata_links(metadata: &Value) -> LinksDictionary {
    metadata
        .get("links")
        .and_then(Value::as_array)
        .map(|entries| normalize_links(entries))
        .unwrap_or_default()
}
