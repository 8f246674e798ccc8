use std::time::Duration;

use crate::{
    ArticleItem, ContentFilter, EntityRef, FormKey, JobStatus, MutationId, NoticeId, NoticeKind,
    SortKey, SubmissionId, SubmitReceipt, UploadPayload, VideoItem,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted the upload form. `form_key` names the draft to clear on acceptance.
    UploadSubmitted {
        payload: UploadPayload,
        form_key: Option<FormKey>,
    },
    /// Remote system accepted the job.
    JobAccepted {
        submission: SubmissionId,
        receipt: SubmitReceipt,
    },
    /// The submit call itself failed.
    SubmissionFailed {
        submission: SubmissionId,
        reason: String,
    },
    /// Poll response number `seq` for a job.
    JobStatusReceived {
        submission: SubmissionId,
        seq: u64,
        status: JobStatus,
    },
    /// Poll request number `seq` failed.
    JobPollFailed {
        submission: SubmissionId,
        seq: u64,
        reason: String,
    },
    /// Job did not reach a terminal state before its deadline.
    JobPollTimedOut { submission: SubmissionId },
    /// The view owning the upload trackers went away.
    UploadViewUnmounted,
    /// User toggled a like.
    LikeToggled(EntityRef),
    /// Remote toggle call for a mutation finished.
    LikeResolved {
        mutation: MutationId,
        outcome: Result<(), String>,
    },
    RefreshRequested,
    FeedLoaded {
        videos: Vec<VideoItem>,
        articles: Vec<ArticleItem>,
    },
    FeedLoadFailed { reason: String },
    SortChanged(SortKey),
    FilterChanged(ContentFilter),
    PageSelected(usize),
    DetailOpened(EntityRef),
    DetailClosed,
    /// Generic notice from any feature.
    NoticeAdded {
        kind: NoticeKind,
        message: String,
        description: Option<String>,
        auto_dismiss_after: Option<Duration>,
    },
    /// Explicit close or auto-dismiss timer.
    NoticeDismissed(NoticeId),
    /// Fallback for placeholder wiring.
    NoOp,
}
