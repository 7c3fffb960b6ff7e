//! Home-page statistic bubbles.
use crate::normalize::html::plain_text;
use crate::normalize::value::scalar_text;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Shown when a stat has a description but no value.
pub const EMPTY_VALUE: &str = "\u{2014}";

const ARRAY_FIELDS: [&str; 4] = ["stats", "stat_items", "items", "entries"];
const TEXT_FIELDS: [&str; 4] = ["body_text", "content", "text", "description"];

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+&\s+").expect("SEPARATOR_RE: hardcoded regex is valid"));

static LEADING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+\+?)\s+(.+)$").expect("LEADING_NUMBER_RE: hardcoded regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeStatItem {
    pub value: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bubble_color: Option<String>,
}

impl HomeStatItem {
    pub fn new(value: &str, description: &str, bubble_color: Option<&str>) -> Self {
        Self {
            value: value.to_string(),
            description: description.to_string(),
            bubble_color: bubble_color.map(str::to_string),
        }
    }
}

/// A structured stat element: fields either on the element or in its `metadata`.
enum StatShape<'a> {
    Flat(&'a Map<String, Value>),
    Nested {
        outer: &'a Map<String, Value>,
        meta: &'a Map<String, Value>,
    },
}

impl<'a> StatShape<'a> {
    fn classify(raw: &'a Value) -> Option<Self> {
        let outer = raw.as_object()?;
        Some(match outer.get("metadata").and_then(Value::as_object) {
            Some(meta) => StatShape::Nested { outer, meta },
            None => StatShape::Flat(outer),
        })
    }

    /// First non-null value for `key`, element before metadata.
    fn field(&self, key: &str) -> Option<&'a Value> {
        let present = |m: &'a Map<String, Value>| m.get(key).filter(|v| !v.is_null());
        match self {
            StatShape::Flat(outer) => present(*outer),
            StatShape::Nested { outer, meta } => present(*outer).or_else(|| present(*meta)),
        }
    }

    fn text(&self, key: &str) -> String {
        self.field(key)
            .and_then(scalar_text)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    fn color(&self) -> Option<String> {
        ["bubble_color", "color"]
            .iter()
            .find_map(|key| self.field(key))
            .and_then(scalar_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

fn parse_stat_item(raw: &Value) -> Option<HomeStatItem> {
    let shape = StatShape::classify(raw)?;
    let value = shape.text("value");
    let description = shape.text("description");
    if value.is_empty() && description.is_empty() {
        return None;
    }
    Some(HomeStatItem {
        value: if value.is_empty() { EMPTY_VALUE.to_string() } else { value },
        description,
        bubble_color: shape.color(),
    })
}

fn structured_stats(meta: &Map<String, Value>) -> Vec<HomeStatItem> {
    ARRAY_FIELDS
        .iter()
        .find_map(|key| meta.get(*key).and_then(Value::as_array).filter(|a| !a.is_empty()))
        .map(|items| items.iter().filter_map(parse_stat_item).collect())
        .unwrap_or_default()
}

/// Parse `"<N> <desc> & <desc>"` style copy into a pair of bubbles.
fn stats_from_text(text: &str) -> Vec<HomeStatItem> {
    let text = plain_text(text);
    let parts: Vec<&str> = SEPARATOR_RE.split(text.trim()).collect();
    let [first, second, ..] = parts.as_slice() else {
        return Vec::new();
    };

    let first = first.trim();
    let lead = match LEADING_NUMBER_RE.captures(first) {
        Some(caps) => HomeStatItem::new(&caps[1], caps[2].trim(), Some("maroon")),
        None => {
            tracing::debug!(text = %first, "stats.text.no_leading_number");
            HomeStatItem::new(EMPTY_VALUE, first, Some("maroon"))
        }
    };
    vec![lead, HomeStatItem::new("&", second.trim(), Some("orange"))]
}

/// Stats for the home page from a `home-stats` section object.
///
/// An empty result means the section had nothing usable; callers pick their
/// own defaults.
///
/// ```
/// use bryte_cms::normalize::parse_home_stats;
/// use serde_json::json;
///
/// let section = json!({ "metadata": { "stats": [{ "value": "5", "description": "kids" }] } });
/// let stats = parse_home_stats(Some(&section));
/// assert_eq!(stats[0].value, "5");
/// assert_eq!(stats[0].bubble_color, None);
/// ```
pub fn parse_home_stats(section: Option<&Value>) -> Vec<HomeStatItem> {
    let Some(meta) = section
        .and_then(|s| s.get("metadata"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    let structured = structured_stats(meta);
    if !structured.is_empty() {
        return structured;
    }

    TEXT_FIELDS
        .iter()
        .find_map(|key| meta.get(*key).and_then(Value::as_str))
        .map(stats_from_text)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stats(meta: Value) -> Vec<HomeStatItem> {
        parse_home_stats(Some(&json!({ "slug": "home-stats", "metadata": meta })))
    }

    #[test]
    fn structured_array_is_read_as_is() {
        assert_eq!(
            stats(json!({ "stats": [{ "value": "5", "description": "kids" }] })),
            [HomeStatItem::new("5", "kids", None)]
        );
    }

    #[test]
    fn aliases_are_tried_in_order() {
        let got = stats(json!({
            "stats": [],
            "stat_items": "not an array",
            "items": [{ "value": "12", "description": "schools" }],
            "entries": [{ "value": "99", "description": "ignored" }],
        }));
        assert_eq!(got, [HomeStatItem::new("12", "schools", None)]);
    }

    #[test]
    fn nested_metadata_and_numbers_are_accepted() {
        let got = stats(json!({ "entries": [
            { "metadata": { "value": 170, "description": " tutors ", "color": "#963e3b" } },
            { "value": "40+", "metadata": { "description": "volunteers", "bubble_color": "orange" } },
        ]}));
        assert_eq!(
            got,
            [
                HomeStatItem::new("170", "tutors", Some("#963e3b")),
                HomeStatItem::new("40+", "volunteers", Some("orange")),
            ]
        );
    }

    #[test]
    fn element_fields_shadow_metadata() {
        let got = stats(json!({ "stats": [
            { "value": "1", "description": "outer", "metadata": { "description": "inner" } },
        ]}));
        assert_eq!(got[0].description, "outer");
    }

    #[test]
    fn bubble_color_wins_over_color() {
        let got = stats(json!({ "stats": [
            { "value": "1", "color": "red", "metadata": { "bubble_color": "maroon" } },
        ]}));
        assert_eq!(got[0].bubble_color.as_deref(), Some("maroon"));
    }

    #[test]
    fn empty_elements_are_skipped_and_blank_values_get_a_dash() {
        let got = stats(json!({ "stats": [
            { "value": "  ", "description": "" },
            "stray",
            { "description": "families", "bubble_color": "  " },
        ]}));
        assert_eq!(got, [HomeStatItem::new(EMPTY_VALUE, "families", None)]);
    }

    #[test]
    fn free_text_is_split_into_two_bubbles() {
        let got = stats(json!({
            "body_text": "170+ refugee youth in grades K-12 & 3,497 refugee youth in grades K-12"
        }));
        assert_eq!(
            got,
            [
                HomeStatItem::new("170+", "refugee youth in grades K-12", Some("maroon")),
                HomeStatItem::new("&", "3,497 refugee youth in grades K-12", Some("orange")),
            ]
        );
    }

    #[test]
    fn free_text_is_used_when_structured_yields_nothing() {
        let got = stats(json!({
            "stats": [{ "value": "", "description": "" }],
            "content": "<p>12 schools &amp; 30 tutors</p>",
        }));
        assert_eq!(got.len(), 2);
        assert_eq!(got[0], HomeStatItem::new("12", "schools", Some("maroon")));
        assert_eq!(got[1].description, "30 tutors");
    }

    #[test]
    fn non_string_text_fields_are_skipped() {
        let got = stats(json!({
            "body_text": { "html": "5 kids & more" },
            "content": null,
            "text": "40+ volunteers & 2 campuses",
        }));
        assert_eq!(got[0], HomeStatItem::new("40+", "volunteers", Some("maroon")));
        assert_eq!(got[1].description, "2 campuses");
    }

    #[test]
    fn free_text_without_leading_number_gets_placeholder() {
        let got = stats(json!({ "text": "Many families & 3,497 youth" }));
        assert_eq!(
            got[0],
            HomeStatItem::new(EMPTY_VALUE, "Many families", Some("maroon"))
        );
        assert_eq!(got[1], HomeStatItem::new("&", "3,497 youth", Some("orange")));
    }

    #[test]
    fn free_text_needs_a_separator() {
        assert!(stats(json!({ "body_text": "170+ refugee youth" })).is_empty());
        assert!(stats(json!({ "body_text": "fish&chips" })).is_empty());
    }

    #[test]
    fn nothing_usable_yields_empty() {
        assert!(stats(json!({})).is_empty());
        assert!(stats(json!({ "description": 5 })).is_empty());
        assert!(parse_home_stats(None).is_empty());
        assert!(parse_home_stats(Some(&json!({ "metadata": "x" }))).is_empty());
    }

    #[test]
    fn bubble_color_is_omitted_when_absent() {
        let json = serde_json::to_value(HomeStatItem::new("5", "kids", None)).unwrap();
        assert_eq!(json, json!({ "value": "5", "description": "kids" }));
    }
}
