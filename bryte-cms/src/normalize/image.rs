//! Picks the one image a page section shows.
use crate::normalize::value::{at, non_blank_at, str_at};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionImageRef {
    pub src: String,
    pub alt: String,
}

/// The shapes the first entry of `metadata.images` comes in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageRef<'a> {
    /// Bare ID string pointing into the page-level image list.
    Id(&'a str),
    /// Image object carrying its own `metadata.image` payload.
    Nested {
        id: Option<&'a str>,
        title: Option<&'a str>,
        image: &'a Value,
    },
    /// The element is itself the payload (`url` / `imgix_url`).
    Inline {
        title: Option<&'a str>,
        image: &'a Value,
    },
    /// Object with an `id` and nothing else usable.
    IdOnly { id: &'a str },
    Unknown,
}

impl<'a> ImageRef<'a> {
    pub fn classify(raw: &'a Value) -> Self {
        if let Some(id) = raw.as_str() {
            return ImageRef::Id(id);
        }
        if !raw.is_object() {
            return ImageRef::Unknown;
        }
        let id = non_blank_at(raw, &["id"]);
        let title = str_at(raw, &["title"]);
        if let Some(image) = at(raw, &["metadata", "image"]).filter(|v| v.is_object()) {
            return ImageRef::Nested { id, title, image };
        }
        if raw.get("url").is_some() || raw.get("imgix_url").is_some() {
            return ImageRef::Inline { title, image: raw };
        }
        match id {
            Some(id) => ImageRef::IdOnly { id },
            None => ImageRef::Unknown,
        }
    }
}

/// `imgix_url` if non-empty, else `url`; `None` when neither is usable.
/// `imgix_url`, else `url`; blanks count as absent.
pub(crate) fn image_src(image: &Value) -> Option<String> {
    str_at(image, &["imgix_url"])
        .filter(|s| !s.trim().is_empty())
        .or_else(|| str_at(image, &["url"]))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn lookup<'a>(page_images: &'a [Value], id: &str) -> Option<(&'a Value, Option<&'a str>)> {
    let matched = page_images
        .iter()
        .find(|img| str_at(img, &["id"]) == Some(id))?;
    let image = at(matched, &["metadata", "image"])?;
    Some((image, str_at(matched, &["title"])))
}

/// Resolve a section's first image against the page's image list.
///
/// ```
/// use bryte_cms::normalize::resolve_section_image;
/// use serde_json::json;
///
/// let section = json!({ "metadata": { "header": "Hi", "images": ["img-1"] } });
/// let page_images = [json!({
///     "id": "img-1",
///     "metadata": { "image": { "imgix_url": "https://cdn.test/a.jpg" } }
/// })];
///
/// let image = resolve_section_image(&section, &page_images).unwrap();
/// assert_eq!(image.src, "https://cdn.test/a.jpg");
/// assert_eq!(image.alt, "Hi");
/// assert!(resolve_section_image(&section, &[]).is_none());
/// ```
pub fn resolve_section_image(section: &Value, page_images: &[Value]) -> Option<SectionImageRef> {
    let first = at(section, &["metadata", "images"])?.as_array()?.first()?;

    let (image, title) = match ImageRef::classify(first) {
        ImageRef::Id(id) | ImageRef::IdOnly { id } => lookup(page_images, id)?,
        ImageRef::Nested { image, title, .. } | ImageRef::Inline { image, title } => (image, title),
        ImageRef::Unknown => return None,
    };

    let Some(src) = image_src(image) else {
        tracing::debug!(section = ?str_at(section, &["slug"]), "image.src.empty");
        return None;
    };
    let alt = title
        .filter(|t| !t.is_empty())
        .or_else(|| str_at(section, &["metadata", "header"]))
        .unwrap_or_default()
        .to_string();
    Some(SectionImageRef { src, alt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section(images: Value) -> Value {
        json!({ "slug": "home-why-bryte", "metadata": { "header": "Why BRYTE?", "images": images } })
    }

    fn page_images() -> Vec<Value> {
        vec![
            json!({
                "id": "a1",
                "title": "Tutoring session",
                "metadata": { "image": { "url": "https://raw.test/a.jpg", "imgix_url": "https://cdn.test/a.jpg" } }
            }),
            json!({
                "id": "b2",
                "metadata": { "image": { "url": "https://raw.test/b.jpg" } }
            }),
        ]
    }

    #[test]
    fn missing_or_empty_images_yield_none() {
        assert!(resolve_section_image(&json!({ "metadata": {} }), &page_images()).is_none());
        assert!(resolve_section_image(&section(json!([])), &page_images()).is_none());
        assert!(resolve_section_image(&section(json!("a1")), &page_images()).is_none());
        assert!(resolve_section_image(&json!(null), &page_images()).is_none());
    }

    #[test]
    fn bare_id_is_looked_up_in_page_images() {
        let image = resolve_section_image(&section(json!(["a1"])), &page_images()).unwrap();
        assert_eq!(
            image,
            SectionImageRef {
                src: "https://cdn.test/a.jpg".into(),
                alt: "Tutoring session".into()
            }
        );
    }

    #[test]
    fn unknown_id_yields_none() {
        assert!(resolve_section_image(&section(json!(["zz"])), &page_images()).is_none());
        assert!(resolve_section_image(&section(json!(["a1"])), &[]).is_none());
    }

    #[test]
    fn url_is_used_without_imgix_and_alt_falls_back_to_header() {
        let image = resolve_section_image(&section(json!(["b2"])), &page_images()).unwrap();
        assert_eq!(image.src, "https://raw.test/b.jpg");
        assert_eq!(image.alt, "Why BRYTE?");
    }

    #[test]
    fn nested_object_is_used_directly() {
        let nested = json!([{
            "id": "not-on-page",
            "title": "Family night",
            "metadata": { "image": { "imgix_url": "https://cdn.test/n.jpg" } }
        }]);
        let image = resolve_section_image(&section(nested), &[]).unwrap();
        assert_eq!(image.src, "https://cdn.test/n.jpg");
        assert_eq!(image.alt, "Family night");
    }

    #[test]
    fn inline_payload_is_used_directly() {
        let inline = json!([{ "url": "https://raw.test/i.png" }]);
        let image = resolve_section_image(&section(inline), &[]).unwrap();
        assert_eq!(image.src, "https://raw.test/i.png");
        assert_eq!(image.alt, "Why BRYTE?");
    }

    #[test]
    fn object_with_only_id_is_looked_up() {
        let image = resolve_section_image(&section(json!([{ "id": "a1" }])), &page_images()).unwrap();
        assert_eq!(image.src, "https://cdn.test/a.jpg");
    }

    #[test]
    fn empty_src_means_no_image() {
        let inline = json!([{ "url": "", "imgix_url": "" }]);
        assert!(resolve_section_image(&section(inline), &[]).is_none());
    }

    #[test]
    fn alt_is_empty_without_title_or_header() {
        let bare = json!({ "metadata": { "images": [{ "imgix_url": "https://cdn.test/x.jpg" }] } });
        assert_eq!(resolve_section_image(&bare, &[]).unwrap().alt, "");
    }

    #[test]
    fn classification_covers_every_shape() {
        assert_eq!(ImageRef::classify(&json!("x")), ImageRef::Id("x"));
        assert_eq!(ImageRef::classify(&json!({ "id": "x" })), ImageRef::IdOnly { id: "x" });
        assert_eq!(ImageRef::classify(&json!(3)), ImageRef::Unknown);
        assert_eq!(ImageRef::classify(&json!({})), ImageRef::Unknown);
        assert!(matches!(
            ImageRef::classify(&json!({ "imgix_url": "u" })),
            ImageRef::Inline { title: None, .. }
        ));
        assert!(matches!(
            ImageRef::classify(&json!({ "id": "x", "metadata": { "image": {} } })),
            ImageRef::Nested { id: Some("x"), .. }
        ));
    }
}
