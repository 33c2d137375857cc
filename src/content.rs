//! Static site content. The engine only ever sees it as an ordered list of
//! [`ContentItem`]s per section.

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};
use crate::tilt::CardId;

const EMBEDDED: &str = include_str!("../static/content.json");

/// One displayable record, as the animation layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    pub link: Option<String>,
    /// Short highlighted caption (department field, article state, role).
    pub accent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Goals,
    Departments,
    Events,
    Articles,
    Senate,
}

impl Section {
    pub const ALL: [Self; 5] = [Self::Goals, Self::Departments, Self::Events, Self::Articles, Self::Senate];

    /// Element id of the section on the page.
    pub fn anchor(self) -> &'static str {
        match self {
            Self::Goals => "about",
            Self::Departments => "departments",
            Self::Events => "events",
            Self::Articles => "articles",
            Self::Senate => "senate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub title: String,
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub name: String,
    pub field: String,
    pub img: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSpec {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStage {
    pub phase: String,
    pub date: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub tag: String,
    pub title: String,
    pub brief: String,
    #[serde(default)]
    pub pillars: Vec<String>,
    #[serde(default)]
    pub specs: Vec<EventSpec>,
    pub registration: String,
    pub rules: String,
    #[serde(default)]
    pub schedule: Vec<EventStage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub name: String,
    pub state: String,
    pub img: String,
    pub desc: String,
    pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Top,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub name: String,
    pub role: String,
    pub img: String,
    pub email: String,
    pub tier: Tier,
}

impl Member {
    pub fn card_id(&self) -> CardId {
        CardId(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SiteContent {
    pub goals: Vec<Goal>,
    pub departments: Vec<Department>,
    pub events: Vec<Event>,
    pub articles: Vec<Article>,
    pub members: Vec<Member>,
}

impl SiteContent {
    /// The content compiled into the crate from `static/content.json`.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let content: Self =
            serde_json::from_str(json).map_err(|source| MotionError::Decode { what: "site content", source })?;
        let mut ids: Vec<u32> = content.members.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(MotionError::config("member ids must be unique"));
        }
        Ok(content)
    }

    pub fn items(&self, section: Section) -> Vec<ContentItem> {
        match section {
            Section::Goals => self
                .goals
                .iter()
                .map(|g| ContentItem { title: g.title.clone(), body: g.desc.clone(), image: None, link: None, accent: None })
                .collect(),
            Section::Departments => self
                .departments
                .iter()
                .map(|d| ContentItem {
                    title: d.name.clone(),
                    body: d.description.clone(),
                    image: Some(d.img.clone()),
                    link: None,
                    accent: Some(format!("Dept. of {}", d.field)),
                })
                .collect(),
            Section::Events => self
                .events
                .iter()
                .map(|e| ContentItem {
                    title: e.title.clone(),
                    body: e.brief.clone(),
                    image: None,
                    link: Some(e.registration.clone()),
                    accent: Some(e.tag.clone()),
                })
                .collect(),
            Section::Articles => self
                .articles
                .iter()
                .map(|a| ContentItem {
                    title: format!("By {}", a.name),
                    body: a.desc.clone(),
                    image: Some(a.img.clone()),
                    link: Some(a.link.clone()),
                    accent: Some(a.state.clone()),
                })
                .collect(),
            Section::Senate => self
                .members
                .iter()
                .map(|m| ContentItem {
                    title: m.name.clone(),
                    body: m.role.clone(),
                    image: Some(m.img.clone()),
                    link: Some(format!("mailto:{}", m.email)),
                    accent: Some(m.role.clone()),
                })
                .collect(),
        }
    }

    pub fn tier(&self, tier: Tier) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(move |m| m.tier == tier)
    }

    pub fn member(&self, id: CardId) -> Option<&Member> {
        self.members.iter().find(|m| m.card_id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_content_decodes() {
        let content = SiteContent::embedded().unwrap();
        assert_eq!(content.goals.len(), 6);
        assert_eq!(content.departments.len(), 6);
        assert_eq!(content.events.len(), 2);
        assert_eq!(content.articles.len(), 3);
        assert_eq!(content.members.len(), 11);
        assert_eq!(content.tier(Tier::Top).count(), 2);
    }

    #[test]
    fn items_keep_source_order() {
        let content = SiteContent::embedded().unwrap();
        let titles: Vec<_> = content.items(Section::Departments).into_iter().map(|i| i.title).collect();
        assert_eq!(titles.first().map(String::as_str), Some("Panini"));
        assert_eq!(titles.last().map(String::as_str), Some("Aristotle"));
    }

    #[test]
    fn duplicate_member_ids_are_rejected() {
        let json = r#"{ "members": [
            { "id": 1, "name": "A", "role": "r", "img": "a", "email": "a@x", "tier": "top" },
            { "id": 1, "name": "B", "role": "r", "img": "b", "email": "b@x", "tier": "general" }
        ] }"#;
        assert!(SiteContent::from_json(json).is_err());
    }

    #[test]
    fn member_lookup_by_card() {
        let content = SiteContent::embedded().unwrap();
        assert_eq!(content.member(CardId(1)).map(|m| m.role.as_str()), Some("Secretary"));
        assert!(content.member(CardId(99)).is_none());
    }
}
