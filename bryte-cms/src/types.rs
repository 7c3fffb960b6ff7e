use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A record fetched from the CMS bucket.
///
/// Only the envelope is typed; `metadata` stays an untyped bag because its shape
/// is defined by editors, not by code. Envelope strings are accepted leniently
/// (numbers are stringified, anything else is treated as absent).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCmsObject {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub object_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

impl RawCmsObject {
    /// The object as a JSON value, for normalizers that walk `metadata.*` paths.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    pub fn has_slug(&self, slug: &str) -> bool {
        self.slug.as_deref() == Some(slug)
    }
}

/// Envelope of `GET /v3/buckets/{bucket}/objects`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectsResponse {
    #[serde(default)]
    pub objects: Vec<RawCmsObject>,
    #[serde(default)]
    pub total: Option<u64>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
