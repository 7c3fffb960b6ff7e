//! Blog posts from the posts bucket.
use crate::normalize::image::image_src;
use crate::normalize::title::clean_title;
use crate::normalize::value::{at, non_blank_at, str_at};
use crate::types::RawCmsObject;
use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::Value;

/// CMS object type of blog posts.
pub const POST_TYPE: &str = "posts";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostCategory {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub categories: Vec<PostCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<PostAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<NaiveDate>,
}

/// `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub fn parse_published_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn owned(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn category(raw: &Value) -> Option<PostCategory> {
    let name = non_blank_at(raw, &["metadata", "name"]).or_else(|| non_blank_at(raw, &["title"]))?;
    Some(PostCategory {
        name: clean_title(name),
        color: owned(str_at(raw, &["metadata", "color"])),
    })
}

fn author(raw: &Value) -> Option<PostAuthor> {
    let name = non_blank_at(raw, &["metadata", "name"]).or_else(|| non_blank_at(raw, &["title"]))?;
    Some(PostAuthor {
        name: clean_title(name),
        photo_url: at(raw, &["metadata", "profile_photo"]).and_then(image_src),
        bio: owned(str_at(raw, &["metadata", "bio"])),
    })
}

/// Flatten one posts-bucket object; objects without a slug cannot be linked
/// to and are dropped.
pub fn normalize_post(object: &RawCmsObject) -> Option<PostSummary> {
    let Some(slug) = owned(object.slug.as_deref()) else {
        tracing::debug!(id = ?object.id, "posts.entry.dropped.slug");
        return None;
    };
    let meta = &object.metadata;
    let title = non_blank_at(meta, &["title"])
        .or(object.title.as_deref())
        .map(clean_title)
        .unwrap_or_default();
    let text = |key: &str| str_at(meta, &[key]).unwrap_or_default().to_string();

    Some(PostSummary {
        slug,
        title,
        excerpt: text("excerpt"),
        content: text("content"),
        featured_image: at(meta, &["featured_image"]).and_then(image_src),
        categories: at(meta, &["categories"])
            .and_then(Value::as_array)
            .map(|cats| cats.iter().filter_map(category).collect())
            .unwrap_or_default(),
        author: at(meta, &["author"]).and_then(author),
        published_date: str_at(meta, &["published_date"]).and_then(parse_published_date),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(slug: Option<&str>, metadata: Value) -> RawCmsObject {
        RawCmsObject {
            slug: slug.map(str::to_string),
            title: Some("Envelope Title".into()),
            object_type: Some(POST_TYPE.into()),
            metadata,
            ..Default::default()
        }
    }

    #[test]
    fn full_post_is_flattened() {
        let raw = post(
            Some("spring-gala"),
            json!({
                "title": "Spring&nbsp;Gala",
                "excerpt": "Join us",
                "content": "<p>Details</p>",
                "featured_image": { "url": "https://raw.test/g.jpg", "imgix_url": "https://cdn.test/g.jpg" },
                "categories": [
                    { "slug": "events", "title": "Events", "metadata": { "name": "Events", "color": "#e48d3c" } },
                    { "slug": "broken" },
                ],
                "author": {
                    "title": "Jane Doe",
                    "metadata": { "name": "", "bio": "Tutor since 2019", "profile_photo": { "url": "https://raw.test/j.jpg" } }
                },
                "published_date": "2024-03-15",
            }),
        );
        let summary = normalize_post(&raw).unwrap();
        assert_eq!(summary.slug, "spring-gala");
        assert_eq!(summary.title, "Spring Gala");
        assert_eq!(summary.featured_image.as_deref(), Some("https://cdn.test/g.jpg"));
        assert_eq!(
            summary.categories,
            [PostCategory { name: "Events".into(), color: Some("#e48d3c".into()) }]
        );
        let author = summary.author.unwrap();
        assert_eq!(author.name, "Jane Doe");
        assert_eq!(author.photo_url.as_deref(), Some("https://raw.test/j.jpg"));
        assert_eq!(author.bio.as_deref(), Some("Tutor since 2019"));
        assert_eq!(summary.published_date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn sparse_post_uses_envelope_title_and_defaults() {
        let summary = normalize_post(&post(Some("x"), json!(null))).unwrap();
        assert_eq!(summary.title, "Envelope Title");
        assert_eq!(summary.excerpt, "");
        assert!(summary.categories.is_empty());
        assert!(summary.author.is_none());
        assert!(summary.published_date.is_none());
    }

    #[test]
    fn posts_without_slug_are_dropped() {
        assert!(normalize_post(&post(None, json!({}))).is_none());
        assert!(normalize_post(&post(Some("  "), json!({}))).is_none());
    }

    #[test]
    fn blank_imgix_url_falls_back_to_url() {
        let raw = post(
            Some("x"),
            json!({
                "featured_image": { "imgix_url": "", "url": "https://raw.test/g.jpg" },
                "author": {
                    "title": "Jane",
                    "metadata": { "profile_photo": { "imgix_url": "  ", "url": "https://raw.test/j.jpg" } }
                },
            }),
        );
        let summary = normalize_post(&raw).unwrap();
        assert_eq!(summary.featured_image.as_deref(), Some("https://raw.test/g.jpg"));
        assert_eq!(
            summary.author.and_then(|a| a.photo_url).as_deref(),
            Some("https://raw.test/j.jpg")
        );

        let empty = post(Some("y"), json!({ "featured_image": { "imgix_url": "", "url": "" } }));
        assert!(normalize_post(&empty).unwrap().featured_image.is_none());
    }

    #[test]
    fn published_date_accepts_plain_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2023, 11, 2);
        assert_eq!(parse_published_date("2023-11-02"), expected);
        assert_eq!(parse_published_date("2023-11-02T10:30:00Z"), expected);
        assert_eq!(parse_published_date("2023-11-02T23:30:00-05:00"), expected);
        assert_eq!(parse_published_date("last tuesday"), None);
    }

    #[test]
    fn date_serialises_as_iso_day() {
        let summary = normalize_post(&post(Some("x"), json!({ "published_date": "2024-01-05" }))).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["published_date"], "2024-01-05");
        assert!(json.get("author").is_none());
    }
}
