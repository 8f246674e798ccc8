#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use studio_core::{
    update, AppState, ArticleItem, Effect, Engagement, EntityId, JobId, Msg, SubmissionId,
    SubmitReceipt, UploadPayload, VideoItem,
};

pub fn init_logging() {
    studio_logging::initialize_for_tests();
}

pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
}

pub fn video(id: &str, day: u32, likes: u64) -> VideoItem {
    VideoItem {
        id: EntityId::new(id),
        title: format!("Video {id}"),
        author: "creator".to_string(),
        created_at: at(day),
        published: true,
        archived: false,
        engagement: Engagement::new(false, likes),
        comment_count: 0,
        duration_secs: Some(60),
    }
}

pub fn article(id: &str, day: u32, likes: u64) -> ArticleItem {
    ArticleItem {
        id: EntityId::new(id),
        title: format!("Article {id}"),
        author: "writer".to_string(),
        created_at: at(day),
        published: true,
        archived: false,
        engagement: Engagement::new(false, likes),
        comment_count: 0,
        excerpt: None,
    }
}

pub fn payload(title: &str) -> UploadPayload {
    UploadPayload {
        title: title.to_string(),
        description: None,
        media_path: PathBuf::from("clip.mp4"),
    }
}

pub fn receipt(job: &str) -> SubmitReceipt {
    SubmitReceipt {
        job_id: JobId(job.to_string()),
        subject_id: None,
        status: None,
    }
}

/// Submits an upload and returns the submission id from the `SubmitJob` effect.
pub fn submit(state: AppState, title: &str) -> (AppState, SubmissionId) {
    let (state, effects) = update(
        state,
        Msg::UploadSubmitted {
            payload: payload(title),
            form_key: None,
        },
    );
    let submission = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::SubmitJob { submission, .. } => Some(*submission),
            _ => None,
        })
        .expect("submit effect");
    (state, submission)
}

pub fn loaded(videos: Vec<VideoItem>, articles: Vec<ArticleItem>) -> AppState {
    let (state, _) = update(AppState::new(), Msg::RefreshRequested);
    let (state, _) = update(state, Msg::FeedLoaded { videos, articles });
    state
}
