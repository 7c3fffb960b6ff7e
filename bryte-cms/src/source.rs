use crate::CmsError;
use crate::types::RawCmsObject;
use async_trait::async_trait;

pub const DEFAULT_PROPS: &str = "slug,title,metadata,type";

/// Selector for objects of one type, optionally narrowed to a slug.
///
/// ```
/// use bryte_cms::ObjectQuery;
///
/// let q = ObjectQuery::of_type("sections").slug("home-stats").depth(2);
/// assert_eq!(q.object_type, "sections");
/// assert_eq!(q.slug.as_deref(), Some("home-stats"));
/// assert_eq!(q.props, "slug,title,metadata,type");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectQuery {
    pub object_type: String,
    pub slug: Option<String>,
    pub props: String,
    pub depth: u8,
}

impl ObjectQuery {
    pub fn of_type(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            slug: None,
            props: DEFAULT_PROPS.to_string(),
            depth: 1,
        }
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn props(mut self, props: impl Into<String>) -> Self {
        self.props = props.into();
        self
    }

    pub fn depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }
}

/// Read access to CMS objects. Page assembly only talks to this trait so the
/// pages can be exercised without a live bucket.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First object matching the query, `None` when nothing matches.
    async fn find_one(&self, query: &ObjectQuery) -> Result<Option<RawCmsObject>, CmsError>;

    /// Every object matching the query, in CMS order.
    async fn find(&self, query: &ObjectQuery) -> Result<Vec<RawCmsObject>, CmsError>;
}
