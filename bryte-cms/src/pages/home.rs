use crate::normalize::{HomeStatItem, SectionImageRef, parse_home_stats, resolve_section_image};
use crate::pages::{page_sections, section_by_slug};
use crate::source::{ContentSource, ObjectQuery};
use serde::Serialize;
use serde_json::Value;

pub const HOME_STATS_SLUG: &str = "home-stats";
const WHY_BRYTE_SLUG: &str = "home-why-bryte";

/// One titled block of page copy with an optional image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub title: String,
    pub body_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<SectionImageRef>,
}

impl SectionView {
    /// `None` when the section carries no metadata at all.
    pub fn from_section(section: &Value, default_title: &str, page_images: &[Value]) -> Option<Self> {
        let meta = section.get("metadata").filter(|m| m.is_object())?;
        let text = |key: &str| meta.get(key).and_then(Value::as_str).unwrap_or_default();
        let title = match text("header").trim() {
            "" => default_title.to_string(),
            header => header.to_string(),
        };
        Some(SectionView {
            slug: section.get("slug").and_then(Value::as_str).map(str::to_string),
            title,
            body_html: text("body_text").to_string(),
            image: resolve_section_image(section, page_images),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomePage {
    pub whats_bryte: Option<SectionView>,
    pub why_bryte: Option<SectionView>,
    pub stats: Vec<HomeStatItem>,
}

/// Stats shown when the CMS provides none.
pub fn default_home_stats() -> Vec<HomeStatItem> {
    vec![
        HomeStatItem::new("170+", "refugee youth in grades K-12", Some("maroon")),
        HomeStatItem::new("& 3,497", "refugee youth in grades K-12", Some("orange")),
    ]
}

fn is_whats_bryte(section: &Value) -> bool {
    let mentions_what = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .is_some_and(|s| s.to_lowercase().contains("what"))
    };
    mentions_what(section.get("slug"))
        || mentions_what(section.get("metadata").and_then(|m| m.get("header")))
}

/// Build the home page from the page object and the standalone stats section.
///
/// Stats come from the standalone section first, then from the page's own
/// `home-stats` section, then from [`default_home_stats`].
pub fn assemble_home(page: Option<&Value>, stats_section: Option<&Value>) -> HomePage {
    let null = Value::Null;
    let page = page.unwrap_or(&null);
    let page_images = page
        .get("metadata")
        .and_then(|m| m.get("images"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut stats = parse_home_stats(stats_section);
    if stats.is_empty() {
        stats = parse_home_stats(section_by_slug(page, HOME_STATS_SLUG));
    }
    if stats.is_empty() {
        tracing::debug!("home.stats.default");
        stats = default_home_stats();
    }

    HomePage {
        whats_bryte: page_sections(page)
            .iter()
            .find(|s| is_whats_bryte(s))
            .and_then(|s| SectionView::from_section(s, "WHAT'S BRYTE?", page_images)),
        why_bryte: section_by_slug(page, WHY_BRYTE_SLUG)
            .and_then(|s| SectionView::from_section(s, "Why BRYTE?", page_images)),
        stats,
    }
}

/// Fetch and assemble the home page; CMS failures degrade to fallbacks.
pub async fn load_home(source: &dyn ContentSource) -> HomePage {
    let page_query = ObjectQuery::of_type("home").slug("home").depth(2);
    let stats_query = ObjectQuery::of_type("sections").slug(HOME_STATS_SLUG);
    let (page, stats) = tokio::join!(source.find_one(&page_query), source.find_one(&stats_query));

    let page = page.unwrap_or_else(|err| {
        tracing::warn!(error=%err, "home.fetch.page_failed");
        None
    });
    let stats = stats.unwrap_or_else(|err| {
        tracing::warn!(error=%err, "home.fetch.stats_failed");
        None
    });

    assemble_home(
        page.map(|p| p.to_value()).as_ref(),
        stats.map(|s| s.to_value()).as_ref(),
    )
}
