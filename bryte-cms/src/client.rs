//! Thin wrapper around the Cosmic object API with site defaults.
//!
//! Every read goes through `GET v3/buckets/{bucket}/objects` with a JSON `query`
//! filter; the read key travels as a query parameter and is redacted by the HTTP
//! layer's logging. The API answers 404 when a filter matches nothing, which is
//! mapped to an empty result rather than an error.
use crate::CmsError;
use crate::source::{ContentSource, ObjectQuery};
use crate::types::{ObjectsResponse, RawCmsObject};
use async_trait::async_trait;
use bryte_http::{Auth, HttpClient, RequestOpts};
use serde_json::json;
use std::borrow::Cow;

const NOT_FOUND: u16 = 404;

#[derive(Clone)]
pub struct CosmicClient {
    http: HttpClient,
    bucket_slug: String,
    read_key: String,
}

impl CosmicClient {
    pub fn new(
        api_base: &str,
        bucket_slug: impl Into<String>,
        read_key: impl Into<String>,
    ) -> Result<Self, CmsError> {
        let bucket_slug = bucket_slug.into();
        if bucket_slug.trim().is_empty() {
            return Err(CmsError::Query("bucket slug must not be empty".into()));
        }
        Ok(Self {
            http: HttpClient::new(api_base)?,
            bucket_slug,
            read_key: read_key.into(),
        })
    }

    /// Replace the underlying HTTP client (tests shorten timeouts/retries).
    pub fn with_http(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    pub fn bucket_slug(&self) -> &str {
        &self.bucket_slug
    }

    async fn fetch(
        &self,
        query: &ObjectQuery,
        limit: Option<u32>,
    ) -> Result<Vec<RawCmsObject>, CmsError> {
        if query.object_type.trim().is_empty() {
            return Err(CmsError::Query("object type must not be empty".into()));
        }

        let mut filter = json!({ "type": query.object_type });
        if let Some(slug) = &query.slug {
            filter["slug"] = json!(slug);
        }

        let path = format!("v3/buckets/{}/objects", self.bucket_slug);
        let mut params: Vec<(&str, Cow<'_, str>)> = vec![
            ("query", filter.to_string().into()),
            ("props", query.props.as_str().into()),
            ("depth", query.depth.to_string().into()),
        ];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string().into()));
        }

        tracing::debug!(
            bucket=%self.bucket_slug,
            object_type=%query.object_type,
            slug=?query.slug,
            depth=query.depth,
            "cms.fetch.start"
        );

        let result = self
            .http
            .get_json::<ObjectsResponse>(
                &path,
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "read_key",
                        value: Cow::Borrowed(self.read_key.as_str()),
                    }),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await;

        match result {
            Ok(resp) => {
                tracing::debug!(
                    object_type=%query.object_type,
                    returned=resp.objects.len(),
                    total=?resp.total,
                    "cms.fetch.done"
                );
                Ok(resp.objects)
            }
            Err(err) if err.status().map(|s| s.as_u16()) == Some(NOT_FOUND) => {
                tracing::debug!(object_type=%query.object_type, slug=?query.slug, "cms.fetch.empty");
                Ok(Vec::new())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl ContentSource for CosmicClient {
    async fn find_one(&self, query: &ObjectQuery) -> Result<Option<RawCmsObject>, CmsError> {
        Ok(self.fetch(query, Some(1)).await?.into_iter().next())
    }

    async fn find(&self, query: &ObjectQuery) -> Result<Vec<RawCmsObject>, CmsError> {
        self.fetch(query, None).await
    }
}
