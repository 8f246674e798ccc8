use crate::{ContentFeedEntry, FeedPage, JobId, Notice, NoticeId, SubjectId, SubmissionId, TrackerState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    /// Current notices in display (insertion) order.
    pub notices: Vec<Notice>,
    pub jobs: Vec<JobRowView>,
    pub feed: FeedPage,
    /// Entity shown in the open detail view.
    pub detail: Option<ContentFeedEntry>,
    pub refreshing: bool,
    /// Last refresh failure; the feed keeps showing the last good data.
    pub refresh_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub submission: SubmissionId,
    pub title: String,
    pub state: TrackerState,
    pub job_id: Option<JobId>,
    pub subject_id: Option<SubjectId>,
    pub notice: NoticeId,
}
