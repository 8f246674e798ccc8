mod common;

use common::{article, init_logging, loaded, video};
use pretty_assertions::assert_eq;
use studio_core::{
    merge_feed, update, AppState, ContentFeedEntry, ContentFilter, ContentKind, CoreSettings,
    Effect, EngagementTarget, EntityRef, Msg, SortKey,
};

fn ids(entries: &[ContentFeedEntry]) -> Vec<(ContentKind, String)> {
    entries
        .iter()
        .map(|entry| (entry.kind(), entry.id().to_string()))
        .collect()
}

#[test]
fn merge_excludes_archived_and_unpublished() {
    init_logging();
    let v1 = video("v1", 3, 0);
    let mut v2 = video("v2", 4, 0);
    v2.archived = true;
    let mut v3 = video("v3", 5, 0);
    v3.published = false;
    let a1 = article("a1", 2, 0);

    let forward = merge_feed(
        &[v1.clone(), v2.clone(), v3.clone()],
        &[a1.clone()],
        SortKey::Recency,
    );
    let reversed = merge_feed(&[v3, v2, v1.clone()], &[a1.clone()], SortKey::Recency);

    assert_eq!(
        forward,
        vec![ContentFeedEntry::Video(v1), ContentFeedEntry::Article(a1)]
    );
    assert_eq!(forward, reversed);
}

#[test]
fn like_count_sort_is_descending() {
    init_logging();
    let entries = merge_feed(
        &[video("v1", 1, 3), video("v2", 2, 10)],
        &[article("a1", 3, 1)],
        SortKey::LikeCount,
    );
    let counts: Vec<u64> = entries
        .iter()
        .map(|entry| entry.engagement().like_count)
        .collect();
    assert_eq!(counts, vec![10, 3, 1]);
}

#[test]
fn equal_keys_order_deterministically() {
    init_logging();
    let entries = merge_feed(
        &[video("v2", 1, 4), video("v1", 1, 4)],
        &[article("a1", 1, 4)],
        SortKey::LikeCount,
    );
    assert_eq!(
        ids(&entries),
        vec![
            (ContentKind::Video, "v1".to_string()),
            (ContentKind::Video, "v2".to_string()),
            (ContentKind::Article, "a1".to_string()),
        ]
    );
}

#[test]
fn refresh_is_coalesced_while_in_flight() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RefreshRequested);
    assert_eq!(effects, vec![Effect::FetchFeed]);
    assert!(state.view().refreshing);

    let (state, effects) = update(state, Msg::RefreshRequested);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::FeedLoaded {
            videos: vec![video("v1", 1, 0)],
            articles: vec![],
        },
    );
    assert_eq!(effects, vec![Effect::FetchFeed], "queued refresh runs next");

    let (state, effects) = update(
        state,
        Msg::FeedLoaded {
            videos: vec![video("v1", 1, 0)],
            articles: vec![],
        },
    );
    assert!(effects.is_empty());
    assert!(!state.view().refreshing);
}

#[test]
fn refresh_failure_keeps_last_known_feed() {
    init_logging();
    let state = loaded(vec![video("v1", 1, 2)], vec![article("a1", 2, 0)]);
    let before = state.view().feed;

    let (state, _) = update(state, Msg::RefreshRequested);
    let (state, effects) = update(
        state,
        Msg::FeedLoadFailed {
            reason: "GET /videos -> 500".to_string(),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.feed, before);
    assert_eq!(view.refresh_error.as_deref(), Some("GET /videos -> 500"));

    let (state, _) = update(state, Msg::RefreshRequested);
    let (state, _) = update(
        state,
        Msg::FeedLoaded {
            videos: vec![],
            articles: vec![],
        },
    );
    assert_eq!(state.view().refresh_error, None);
}

#[test]
fn open_detail_follows_refreshed_copy() {
    init_logging();
    let state = loaded(vec![video("v1", 1, 2)], vec![]);
    let (state, _) = update(state, Msg::DetailOpened(EntityRef::video("v1")));

    let mut fresh = video("v1", 1, 9);
    fresh.comment_count = 4;
    let (state, _) = update(state, Msg::RefreshRequested);
    let (state, _) = update(
        state,
        Msg::FeedLoaded {
            videos: vec![fresh.clone()],
            articles: vec![],
        },
    );
    assert_eq!(state.view().detail, Some(ContentFeedEntry::Video(fresh.clone())));

    // Entity vanished server-side: the modal keeps its last copy instead of closing.
    let (state, _) = update(state, Msg::RefreshRequested);
    let (state, _) = update(
        state,
        Msg::FeedLoaded {
            videos: vec![],
            articles: vec![],
        },
    );
    assert_eq!(state.view().detail, Some(ContentFeedEntry::Video(fresh)));

    let (state, _) = update(state, Msg::DetailClosed);
    assert_eq!(state.view().detail, None);
}

#[test]
fn detail_for_unloaded_entity_is_not_opened() {
    init_logging();
    let state = loaded(vec![video("v1", 1, 2)], vec![]);
    let (state, _) = update(state, Msg::DetailOpened(EntityRef::article("v1")));
    assert_eq!(state.view().detail, None);
}

fn paged_state() -> AppState {
    let settings = CoreSettings {
        page_size: 2,
        ..CoreSettings::default()
    };
    let (state, _) = update(AppState::with_settings(settings), Msg::RefreshRequested);
    let (state, _) = update(
        state,
        Msg::FeedLoaded {
            videos: vec![video("v1", 1, 1), video("v2", 2, 5), video("v3", 3, 3)],
            articles: vec![article("a1", 4, 0), article("a2", 5, 2)],
        },
    );
    state
}

#[test]
fn pages_window_the_sorted_feed() {
    init_logging();
    let state = paged_state();
    let view = state.view();
    assert_eq!(view.feed.total_pages, 3);
    assert_eq!(view.feed.total_entries, 5);
    assert_eq!(
        ids(&view.feed.entries),
        vec![
            (ContentKind::Article, "a2".to_string()),
            (ContentKind::Article, "a1".to_string()),
        ]
    );

    let (state, _) = update(state, Msg::PageSelected(2));
    let view = state.view();
    assert_eq!(view.feed.page, 2);
    assert_eq!(ids(&view.feed.entries), vec![(ContentKind::Video, "v1".to_string())]);

    let (state, _) = update(state, Msg::PageSelected(99));
    assert_eq!(state.view().feed.page, 2, "page index clamps to last page");
}

#[test]
fn sort_and_filter_changes_reset_to_first_page() {
    init_logging();
    let state = paged_state();
    let (state, _) = update(state, Msg::PageSelected(1));
    let (state, _) = update(state, Msg::SortChanged(SortKey::LikeCount));
    let view = state.view();
    assert_eq!(view.feed.page, 0);
    assert_eq!(view.feed.sort, SortKey::LikeCount);
    assert_eq!(
        ids(&view.feed.entries),
        vec![
            (ContentKind::Video, "v2".to_string()),
            (ContentKind::Video, "v3".to_string()),
        ]
    );

    let (state, _) = update(state, Msg::PageSelected(1));
    let (state, _) = update(state, Msg::FilterChanged(ContentFilter::Articles));
    let view = state.view();
    assert_eq!(view.feed.page, 0);
    assert_eq!(view.feed.total_entries, 2);
    assert!(view
        .feed
        .entries
        .iter()
        .all(|entry| entry.kind() == ContentKind::Article));
}

#[test]
fn shrinking_refresh_clamps_page() {
    init_logging();
    let state = paged_state();
    let (state, _) = update(state, Msg::PageSelected(2));
    let (state, _) = update(state, Msg::RefreshRequested);
    let (state, _) = update(
        state,
        Msg::FeedLoaded {
            videos: vec![video("v1", 1, 1)],
            articles: vec![],
        },
    );
    let view = state.view();
    assert_eq!(view.feed.page, 0);
    assert_eq!(view.feed.entries.len(), 1);
}
