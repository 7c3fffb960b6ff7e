use crate::CmsError;
use crate::normalize::LinksDictionary;
use crate::normalize::links::metadata_links;
use crate::source::{ContentSource, ObjectQuery};
use crate::types::RawCmsObject;
use serde::Serialize;

pub const PARENT_RESOURCES_SLUG: &str = "resources-for-parents";
pub const TUTOR_RESOURCES_TYPE: &str = "tutor-resources";
pub const RESOURCES_ERROR: &str = "Unable to load resources at this time.";

/// One tutor resource group (e.g. "Math", "ESL").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSection {
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    pub links: LinksDictionary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourcesPage {
    pub parent_links: LinksDictionary,
    pub tutor_sections: Vec<ResourceSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn resource_section(object: &RawCmsObject) -> ResourceSection {
    ResourceSection {
        slug: object.slug.clone().unwrap_or_default(),
        title: object.title.clone().unwrap_or_default(),
        info: object
            .metadata
            .get("info")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
        links: metadata_links(&object.metadata),
    }
}

pub fn assemble_resources(parent: Option<&RawCmsObject>, tutors: &[RawCmsObject]) -> ResourcesPage {
    ResourcesPage {
        parent_links: parent
            .map(|p| metadata_links(&p.metadata))
            .unwrap_or_default(),
        tutor_sections: tutors.iter().map(resource_section).collect(),
        error: None,
    }
}

async fn fetch_resources(
    source: &dyn ContentSource,
) -> Result<(Option<RawCmsObject>, Vec<RawCmsObject>), CmsError> {
    let parent = source
        .find_one(
            &ObjectQuery::of_type("sections")
                .slug(PARENT_RESOURCES_SLUG)
                .props("title,metadata"),
        )
        .await?;
    let tutors = source
        .find(&ObjectQuery::of_type(TUTOR_RESOURCES_TYPE).props("slug,title,metadata"))
        .await?;
    Ok((parent, tutors))
}

/// Parent links and tutor sections; any CMS failure empties the page and sets
/// [`RESOURCES_ERROR`].
pub async fn load_resources(source: &dyn ContentSource) -> ResourcesPage {
    match fetch_resources(source).await {
        Ok((parent, tutors)) => assemble_resources(parent.as_ref(), &tutors),
        Err(err) => {
            tracing::warn!(error=%err, "resources.fetch.failed");
            ResourcesPage {
                error: Some(RESOURCES_ERROR.to_string()),
                ..Default::default()
            }
        }
    }
}
