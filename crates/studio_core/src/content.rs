use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side identifier of a video or article.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,
    Article,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Video => f.write_str("video"),
            ContentKind::Article => f.write_str("article"),
        }
    }
}

/// Names one likeable entity regardless of which copy of it is displayed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: ContentKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn video(id: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Video,
            id: EntityId::new(id),
        }
    }

    pub fn article(id: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Article,
            id: EntityId::new(id),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Like state of the current user on a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Engagement {
    #[serde(default)]
    pub liked_by_current_user: bool,
    #[serde(default)]
    pub like_count: u64,
}

impl Engagement {
    pub fn new(liked_by_current_user: bool, like_count: u64) -> Self {
        Self {
            liked_by_current_user,
            like_count,
        }
    }
}

/// Capability shared by every entity that can be liked.
pub trait EngagementTarget {
    fn entity_ref(&self) -> EntityRef;
    fn engagement(&self) -> &Engagement;
    fn engagement_mut(&mut self) -> &mut Engagement;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(flatten)]
    pub engagement: Engagement,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub duration_secs: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleItem {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(flatten)]
    pub engagement: Engagement,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub excerpt: Option<String>,
}

impl EngagementTarget for VideoItem {
    fn entity_ref(&self) -> EntityRef {
        EntityRef {
            kind: ContentKind::Video,
            id: self.id.clone(),
        }
    }

    fn engagement(&self) -> &Engagement {
        &self.engagement
    }

    fn engagement_mut(&mut self) -> &mut Engagement {
        &mut self.engagement
    }
}

impl EngagementTarget for ArticleItem {
    fn entity_ref(&self) -> EntityRef {
        EntityRef {
            kind: ContentKind::Article,
            id: self.id.clone(),
        }
    }

    fn engagement(&self) -> &Engagement {
        &self.engagement
    }

    fn engagement_mut(&mut self) -> &mut Engagement {
        &mut self.engagement
    }
}

/// One row of the merged feed, tagged with its variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentFeedEntry {
    Video(VideoItem),
    Article(ArticleItem),
}

impl ContentFeedEntry {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentFeedEntry::Video(_) => ContentKind::Video,
            ContentFeedEntry::Article(_) => ContentKind::Article,
        }
    }

    pub fn id(&self) -> &EntityId {
        match self {
            ContentFeedEntry::Video(video) => &video.id,
            ContentFeedEntry::Article(article) => &article.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ContentFeedEntry::Video(video) => &video.title,
            ContentFeedEntry::Article(article) => &article.title,
        }
    }

    pub fn author(&self) -> &str {
        match self {
            ContentFeedEntry::Video(video) => &video.author,
            ContentFeedEntry::Article(article) => &article.author,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            ContentFeedEntry::Video(video) => video.created_at,
            ContentFeedEntry::Article(article) => article.created_at,
        }
    }

    pub fn comment_count(&self) -> u64 {
        match self {
            ContentFeedEntry::Video(video) => video.comment_count,
            ContentFeedEntry::Article(article) => article.comment_count,
        }
    }

    /// Published and not archived.
    pub fn is_publicly_visible(&self) -> bool {
        match self {
            ContentFeedEntry::Video(video) => video.published && !video.archived,
            ContentFeedEntry::Article(article) => article.published && !article.archived,
        }
    }
}

impl EngagementTarget for ContentFeedEntry {
    fn entity_ref(&self) -> EntityRef {
        match self {
            ContentFeedEntry::Video(video) => video.entity_ref(),
            ContentFeedEntry::Article(article) => article.entity_ref(),
        }
    }

    fn engagement(&self) -> &Engagement {
        match self {
            ContentFeedEntry::Video(video) => &video.engagement,
            ContentFeedEntry::Article(article) => &article.engagement,
        }
    }

    fn engagement_mut(&mut self) -> &mut Engagement {
        match self {
            ContentFeedEntry::Video(video) => &mut video.engagement,
            ContentFeedEntry::Article(article) => &mut article.engagement,
        }
    }
}
