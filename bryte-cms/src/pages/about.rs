use crate::pages::page_sections;
use crate::source::{ContentSource, ObjectQuery};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_ABOUT_TITLE: &str = "About Bryte!";

const MISSION_HTML: &str = "BRYTE's mission is to support the self-empowerment of refugee youth by \
providing academic tutoring and mentoring, as well as by fostering community among students who \
share experiences of resettlement in the United States.";

const VALUES_HTML: &str = "<strong>Whole Child, Whole Families, Whole Care</strong><br>\
We recognize that no child learns in a vacuum. Every child's wellbeing, ability to learn, and life \
at home are deeply intertwined. We provide one-on-one tutoring and mentoring and commit to meeting \
our youth where they are and as they are.<br><br>\
<strong>Student Leadership</strong><br>\
We are a group of undergraduate, medical, and public health students, advised by a board of high \
school-aged alumni of BRYTE.<br><br>\
<strong>Longitudinal Relationships</strong><br>\
We work with both newly-arrived youth and youth who have lived in the United States for some time, \
and form relationships with our students and families that often last long beyond tutoring.<br><br>\
<strong>Self-Reflection and Accountability</strong><br>\
We document our work, are advised by experts, and regularly report our process and outcome \
measures to our supporters.<br><br>\
<strong>Soul</strong><br>\
We embrace emotional honesty, joy, and above all, love.";

/// One collapsible entry of the about page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AboutItem {
    pub id: String,
    pub title: String,
    pub body_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AboutPage {
    pub title: String,
    pub items: Vec<AboutItem>,
}

/// Items shown when the CMS has no about sections.
pub fn fallback_about_items() -> Vec<AboutItem> {
    vec![
        AboutItem {
            id: "item-1".into(),
            title: "Our Mission".into(),
            body_html: MISSION_HTML.into(),
        },
        AboutItem {
            id: "item-2".into(),
            title: "Our Values".into(),
            body_html: VALUES_HTML.into(),
        },
    ]
}

fn about_item(index: usize, section: &Value) -> AboutItem {
    let text = |path: [&str; 2]| {
        section
            .get(path[0])
            .and_then(|m| m.get(path[1]))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let id = section
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("item-{}", index + 1));
    AboutItem {
        id,
        title: text(["metadata", "header"]),
        body_html: text(["metadata", "body_text"]),
    }
}

pub fn assemble_about(page: Option<&Value>) -> AboutPage {
    let sections = page.map(page_sections).unwrap_or_default();
    let items = if sections.is_empty() {
        fallback_about_items()
    } else {
        sections
            .iter()
            .enumerate()
            .map(|(i, s)| about_item(i, s))
            .collect()
    };
    let title = page
        .and_then(|p| p.get("metadata"))
        .and_then(|m| m.get("title"))
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_ABOUT_TITLE)
        .to_string();
    AboutPage { title, items }
}

pub async fn load_about(source: &dyn ContentSource) -> AboutPage {
    let query = ObjectQuery::of_type("about").slug("about").depth(2);
    let page = source.find_one(&query).await.unwrap_or_else(|err| {
        tracing::warn!(error=%err, "about.fetch.failed");
        None
    });
    assemble_about(page.map(|p| p.to_value()).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::fake::FakeSource;
    use serde_json::json;

    #[test]
    fn sections_become_items() {
        let page = json!({ "metadata": { "title": "Who we are", "sections": [
            { "id": "abc", "metadata": { "header": "History", "body_text": "<p>2009</p>" } },
            { "metadata": { "header": "Team" } },
        ]}});
        let about = assemble_about(Some(&page));
        assert_eq!(about.title, "Who we are");
        assert_eq!(
            about.items,
            [
                AboutItem { id: "abc".into(), title: "History".into(), body_html: "<p>2009</p>".into() },
                AboutItem { id: "item-2".into(), title: "Team".into(), body_html: String::new() },
            ]
        );
    }

    #[test]
    fn empty_page_uses_fallbacks() {
        let about = assemble_about(Some(&json!({ "metadata": { "sections": [] } })));
        assert_eq!(about.title, DEFAULT_ABOUT_TITLE);
        assert_eq!(about.items, fallback_about_items());
        assert_eq!(assemble_about(None).items.len(), 2);
    }

    #[tokio::test]
    async fn load_about_survives_cms_failure() {
        let about = load_about(&FakeSource::failing()).await;
        assert_eq!(about.title, DEFAULT_ABOUT_TITLE);
        assert_eq!(about.items[0].title, "Our Mission");
    }

    #[tokio::test]
    async fn load_about_reads_the_about_object() {
        let source = FakeSource::with(vec![json!({
            "slug": "about", "type": "about",
            "metadata": { "sections": [{ "id": "s1", "metadata": { "header": "Mission", "body_text": "x" } }] }
        })]);
        let about = load_about(&source).await;
        assert_eq!(about.items.len(), 1);
        assert_eq!(about.items[0].id, "s1");
    }
}
