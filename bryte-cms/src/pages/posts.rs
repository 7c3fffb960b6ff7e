use crate::CmsError;
use crate::normalize::posts::POST_TYPE;
use crate::normalize::{PostSummary, normalize_post};
use crate::source::{ContentSource, ObjectQuery};

const POST_PROPS: &str = "id,slug,title,metadata,type,created_at";

fn posts_query() -> ObjectQuery {
    ObjectQuery::of_type(POST_TYPE).props(POST_PROPS)
}

/// Every post in the bucket, in CMS order.
pub async fn load_posts(source: &dyn ContentSource) -> Result<Vec<PostSummary>, CmsError> {
    let objects = source.find(&posts_query()).await?;
    let posts: Vec<_> = objects.iter().filter_map(normalize_post).collect();
    tracing::debug!(fetched = objects.len(), kept = posts.len(), "posts.load.done");
    Ok(posts)
}

/// The post with `slug`; objects of other types sharing the slug are ignored.
pub async fn find_post(
    source: &dyn ContentSource,
    slug: &str,
) -> Result<Option<PostSummary>, CmsError> {
    if slug.trim().is_empty() {
        return Err(CmsError::Query("post slug must not be empty".into()));
    }
    let objects = source.find(&posts_query().slug(slug)).await?;
    Ok(objects
        .iter()
        .filter(|o| o.has_slug(slug) && o.object_type.as_deref() == Some(POST_TYPE))
        .find_map(normalize_post))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::fake::FakeSource;
    use serde_json::json;

    fn source() -> FakeSource {
        FakeSource::with(vec![
            json!({ "slug": "gala", "type": "posts", "title": "Gala", "metadata": { "excerpt": "Come" } }),
            json!({ "slug": "jane", "type": "authors", "title": "Jane" }),
            json!({ "type": "posts", "title": "No slug" }),
            json!({ "slug": "fundraiser", "type": "posts", "metadata": { "title": "Fundraiser" } }),
        ])
    }

    #[tokio::test]
    async fn only_posts_with_slugs_are_listed() {
        let posts = load_posts(&source()).await.unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["gala", "fundraiser"]);
        assert_eq!(posts[1].title, "Fundraiser");
    }

    #[tokio::test]
    async fn find_post_matches_slug_and_type() {
        let source = source();
        assert_eq!(find_post(&source, "gala").await.unwrap().unwrap().excerpt, "Come");
        assert!(find_post(&source, "jane").await.unwrap().is_none());
        assert!(find_post(&source, "missing").await.unwrap().is_none());
        assert!(matches!(find_post(&source, " ").await, Err(CmsError::Query(_))));
    }

    #[tokio::test]
    async fn failures_are_returned() {
        assert!(load_posts(&FakeSource::failing()).await.is_err());
    }
}
