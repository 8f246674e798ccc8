use studio_core::{
    ArticleItem, EntityRef, JobId, JobStatus, SubmitReceipt, UploadPayload, VideoItem,
};

use crate::ApiError;

/// Remote collaborators the engine drives. Implemented over HTTP by
/// [`ReqwestApi`](crate::ReqwestApi); tests script their own.
#[async_trait::async_trait]
pub trait StudioApi: Send + Sync {
    /// Accepts a long-running upload and returns its handle immediately.
    async fn submit_job(&self, payload: &UploadPayload) -> Result<SubmitReceipt, ApiError>;

    async fn get_job_status(&self, job_id: &JobId) -> Result<JobStatus, ApiError>;

    /// Same shape for videos and articles; the endpoint differs per kind.
    async fn toggle_like(&self, target: &EntityRef) -> Result<(), ApiError>;

    async fn fetch_videos(&self) -> Result<Vec<VideoItem>, ApiError>;

    async fn fetch_articles(&self) -> Result<Vec<ArticleItem>, ApiError>;
}
