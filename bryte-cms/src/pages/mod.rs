//! Page assembly: fetch raw objects through a [`ContentSource`], normalize them,
//! and fall back to static content when the CMS has nothing usable.
//!
//! Loaders never fail the page for the marketing pages (home, about,
//! resources); CMS errors are logged at `warn` and replaced with fallbacks.
//! Posts surface their errors, since there is nothing sensible to show instead.
//!
//! [`ContentSource`]: crate::ContentSource
pub mod about;
pub mod home;
pub mod posts;
pub mod resources;

pub use about::{AboutItem, AboutPage, load_about};
pub use home::{HomePage, SectionView, default_home_stats, load_home};
pub use posts::{find_post, load_posts};
pub use resources::{ResourceSection, ResourcesPage, load_resources};

use serde_json::Value;

/// The `metadata.sections` array of a page object; empty when absent.
pub(crate) fn page_sections(page: &Value) -> &[Value] {
    page.get("metadata")
        .and_then(|m| m.get("sections"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub(crate) fn section_by_slug<'a>(page: &'a Value, slug: &str) -> Option<&'a Value> {
    page_sections(page)
        .iter()
        .find(|s| s.get("slug").and_then(Value::as_str) == Some(slug))
}
