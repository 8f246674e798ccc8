#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use studio_core::{
    AppState, ArticleItem, CoreSettings, Engagement, EntityId, EntityRef, JobId, JobStatus,
    MemoryStore, RemoteJobState, SubmitReceipt, UploadPayload, VideoItem,
};
use studio_engine::{ApiError, PollSettings, StudioApi, StudioEngine};

/// In-process stand-in for the remote system. Queued responses are served in
/// order; once a queue runs dry the defaults keep the job queued and calls succeeding.
#[derive(Default)]
pub struct ScriptedApi {
    pub receipts: Mutex<VecDeque<Result<SubmitReceipt, ApiError>>>,
    pub statuses: Mutex<VecDeque<Result<JobStatus, ApiError>>>,
    pub likes: Mutex<VecDeque<Result<(), ApiError>>>,
    pub videos: Mutex<Vec<VideoItem>>,
    pub articles: Mutex<Vec<ArticleItem>>,
    pub feed_error: Mutex<Option<ApiError>>,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub like_calls: AtomicUsize,
    pub feed_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_receipt(&self, receipt: Result<SubmitReceipt, ApiError>) {
        self.receipts.lock().unwrap().push_back(receipt);
    }

    pub fn push_status(&self, status: Result<JobStatus, ApiError>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    pub fn push_like(&self, outcome: Result<(), ApiError>) {
        self.likes.lock().unwrap().push_back(outcome);
    }

    pub fn set_feed(&self, videos: Vec<VideoItem>, articles: Vec<ArticleItem>) {
        *self.videos.lock().unwrap() = videos;
        *self.articles.lock().unwrap() = articles;
    }

    pub fn fail_feed(&self, error: ApiError) {
        *self.feed_error.lock().unwrap() = Some(error);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StudioApi for ScriptedApi {
    async fn submit_job(&self, _payload: &UploadPayload) -> Result<SubmitReceipt, ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.receipts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(receipt("job-1")))
    }

    async fn get_job_status(&self, _job_id: &JobId) -> Result<JobStatus, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(JobStatus::new(RemoteJobState::Queued)))
    }

    async fn toggle_like(&self, _target: &EntityRef) -> Result<(), ApiError> {
        self.like_calls.fetch_add(1, Ordering::SeqCst);
        self.likes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn fetch_videos(&self) -> Result<Vec<VideoItem>, ApiError> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.feed_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.videos.lock().unwrap().clone())
    }

    async fn fetch_articles(&self) -> Result<Vec<ArticleItem>, ApiError> {
        Ok(self.articles.lock().unwrap().clone())
    }
}

pub fn init_logging() {
    studio_logging::initialize_for_tests();
}

pub fn engine(api: &Arc<ScriptedApi>) -> StudioEngine<MemoryStore> {
    engine_with(api, PollSettings::default())
}

pub fn engine_with(api: &Arc<ScriptedApi>, poll: PollSettings) -> StudioEngine<MemoryStore> {
    StudioEngine::new(api.clone(), MemoryStore::new(), CoreSettings::default(), poll)
}

/// Drives the engine until `done` holds; fails the test instead of hanging.
pub async fn settle(
    engine: &mut StudioEngine<MemoryStore>,
    done: impl FnMut(&AppState) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(24 * 60 * 60), engine.run_until(done))
        .await
        .expect("engine settled");
}

pub fn receipt(job: &str) -> SubmitReceipt {
    SubmitReceipt {
        job_id: JobId(job.to_string()),
        subject_id: None,
        status: None,
    }
}

pub fn payload(title: &str) -> UploadPayload {
    UploadPayload {
        title: title.to_string(),
        description: None,
        media_path: PathBuf::from("clip.mp4"),
    }
}

pub fn video(id: &str, likes: u64) -> VideoItem {
    VideoItem {
        id: EntityId::new(id),
        title: format!("Video {id}"),
        author: "creator".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        published: true,
        archived: false,
        engagement: Engagement::new(false, likes),
        comment_count: 0,
        duration_secs: None,
    }
}
