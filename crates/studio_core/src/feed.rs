//! Merged video/article feed, pagination and the open detail view.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::content::{
    ArticleItem, ContentFeedEntry, ContentKind, Engagement, EngagementTarget, EntityRef, VideoItem,
};

pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Newest first.
    #[default]
    Recency,
    /// Most liked first.
    LikeCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFilter {
    #[default]
    All,
    Videos,
    Articles,
}

impl ContentFilter {
    fn admits(self, kind: ContentKind) -> bool {
        match self {
            ContentFilter::All => true,
            ContentFilter::Videos => kind == ContentKind::Video,
            ContentFilter::Articles => kind == ContentKind::Article,
        }
    }
}

/// Publicly visible items of both variants, tagged and sorted descending by `sort`.
pub fn merge_feed(
    videos: &[VideoItem],
    articles: &[ArticleItem],
    sort: SortKey,
) -> Vec<ContentFeedEntry> {
    let mut entries: Vec<ContentFeedEntry> = videos
        .iter()
        .cloned()
        .map(ContentFeedEntry::Video)
        .chain(articles.iter().cloned().map(ContentFeedEntry::Article))
        .filter(ContentFeedEntry::is_publicly_visible)
        .collect();
    sort_feed(&mut entries, sort);
    entries
}

pub fn sort_feed(entries: &mut [ContentFeedEntry], sort: SortKey) {
    entries.sort_by(|a, b| compare(a, b, sort));
}

// Ties fall back to recency, then kind and id, so the order never depends on input order.
fn compare(a: &ContentFeedEntry, b: &ContentFeedEntry, sort: SortKey) -> Ordering {
    let primary = match sort {
        SortKey::Recency => Ordering::Equal,
        SortKey::LikeCount => b.engagement().like_count.cmp(&a.engagement().like_count),
    };
    primary
        .then_with(|| b.created_at().cmp(&a.created_at()))
        .then_with(|| a.kind().cmp(&b.kind()))
        .then_with(|| a.id().cmp(b.id()))
}

/// One page of the sorted feed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedPage {
    pub entries: Vec<ContentFeedEntry>,
    pub page: usize,
    pub total_pages: usize,
    pub total_entries: usize,
    pub sort: SortKey,
    pub filter: ContentFilter,
}

/// What happened to the open detail view during a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSync {
    NoneOpen,
    Replaced,
    /// Entity no longer on the server; the last known copy stays open.
    Missing,
}

/// In-memory content collections plus the local UI state derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    videos: Vec<VideoItem>,
    articles: Vec<ArticleItem>,
    sort: SortKey,
    filter: ContentFilter,
    page: usize,
    page_size: usize,
    detail: Option<ContentFeedEntry>,
    generation: u64,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FeedState {
    pub fn new(page_size: usize) -> Self {
        Self {
            videos: Vec::new(),
            articles: Vec::new(),
            sort: SortKey::default(),
            filter: ContentFilter::default(),
            page: 0,
            page_size: page_size.max(1),
            detail: None,
            generation: 0,
        }
    }

    pub fn videos(&self) -> &[VideoItem] {
        &self.videos
    }

    pub fn articles(&self) -> &[ArticleItem] {
        &self.articles
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn filter(&self) -> ContentFilter {
        self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn detail(&self) -> Option<&ContentFeedEntry> {
        self.detail.as_ref()
    }

    /// The merged, filtered and sorted sequence the pages window over.
    pub fn entries(&self) -> Vec<ContentFeedEntry> {
        let filter = self.filter;
        let mut entries = merge_feed(&self.videos, &self.articles, self.sort);
        entries.retain(|entry| filter.admits(entry.kind()));
        entries
    }

    pub fn total_pages(&self) -> usize {
        let total = self.entries().len();
        total.div_ceil(self.page_size).max(1)
    }

    pub fn current_page(&self) -> FeedPage {
        let entries = self.entries();
        let total_entries = entries.len();
        let total_pages = total_entries.div_ceil(self.page_size).max(1);
        let page = self.page.min(total_pages - 1);
        let window = entries
            .into_iter()
            .skip(page * self.page_size)
            .take(self.page_size)
            .collect();
        FeedPage {
            entries: window,
            page,
            total_pages,
            total_entries,
            sort: self.sort,
            filter: self.filter,
        }
    }

    /// Changing the sort key resets to the first page.
    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.page = 0;
    }

    /// Changing the filter resets to the first page.
    pub fn set_filter(&mut self, filter: ContentFilter) {
        self.filter = filter;
        self.page = 0;
    }

    /// Selects a page, clamped to the last one.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.page = page.min(self.total_pages() - 1);
        self.page
    }

    /// Installs refreshed collections and re-resolves the open detail view by id.
    pub fn replace_collections(
        &mut self,
        videos: Vec<VideoItem>,
        articles: Vec<ArticleItem>,
    ) -> DetailSync {
        self.videos = videos;
        self.articles = articles;
        self.generation += 1;
        self.page = self.page.min(self.total_pages() - 1);

        let Some(target) = self.detail.as_ref().map(|entry| entry.entity_ref()) else {
            return DetailSync::NoneOpen;
        };
        match self.lookup(&target) {
            Some(fresh) => {
                self.detail = Some(fresh);
                DetailSync::Replaced
            }
            None => DetailSync::Missing,
        }
    }

    /// Bumped every time refreshed collections replace the loaded copies.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Opens the detail view on a copy of the entity. Returns false if it is not loaded.
    pub fn open_detail(&mut self, target: &EntityRef) -> bool {
        match self.lookup(target) {
            Some(entry) => {
                self.detail = Some(entry);
                true
            }
            None => false,
        }
    }

    pub fn close_detail(&mut self) -> Option<ContentFeedEntry> {
        self.detail.take()
    }

    /// The collection copy of the entity.
    pub fn engagement_mut(&mut self, target: &EntityRef) -> Option<&mut Engagement> {
        match target.kind {
            ContentKind::Video => self
                .videos
                .iter_mut()
                .find(|video| video.id == target.id)
                .map(|video| &mut video.engagement),
            ContentKind::Article => self
                .articles
                .iter_mut()
                .find(|article| article.id == target.id)
                .map(|article| &mut article.engagement),
        }
    }

    /// The detail-view copy, if that entity is the one open.
    pub fn detail_engagement_mut(&mut self, target: &EntityRef) -> Option<&mut Engagement> {
        self.detail
            .as_mut()
            .filter(|entry| &entry.entity_ref() == target)
            .map(|entry| entry.engagement_mut())
    }

    /// Loaded copy of `target`, whether or not it is publicly visible.
    pub fn lookup(&self, target: &EntityRef) -> Option<ContentFeedEntry> {
        match target.kind {
            ContentKind::Video => self
                .videos
                .iter()
                .find(|video| video.id == target.id)
                .cloned()
                .map(ContentFeedEntry::Video),
            ContentKind::Article => self
                .articles
                .iter()
                .find(|article| article.id == target.id)
                .cloned()
                .map(ContentFeedEntry::Article),
        }
    }
}
