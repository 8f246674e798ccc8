//! Studio core: pure state machine for upload tracking, optimistic likes,
//! the merged content feed, notices and drafts.
mod content;
mod draft;
mod effect;
mod engagement;
mod feed;
mod job;
mod msg;
mod notice;
mod state;
mod update;
mod view_model;

pub use content::{
    ArticleItem, ContentFeedEntry, ContentKind, Engagement, EngagementTarget, EntityId, EntityRef,
    VideoItem,
};
pub use draft::{
    DraftBook, DraftError, DraftSnapshot, FormKey, MemoryStore, PersistentStore, StoreError,
};
pub use effect::Effect;
pub use engagement::{
    revert as revert_like, toggle as toggle_like, AppliedToggle, CopyLocation, LikeFailurePolicy,
    LikeLedger, LikeOutcome, MutationId, PendingLike,
};
pub use feed::{
    merge_feed, sort_feed, ContentFilter, DetailSync, FeedPage, FeedState, SortKey,
    DEFAULT_PAGE_SIZE,
};
pub use job::{
    Ignored, JobId, JobStatus, JobTracker, RemoteJobState, SubjectId, SubmissionId,
    SubmitReceipt, TrackerState, UploadPayload, RECEIPT_SEQ,
};
pub use msg::Msg;
pub use notice::{Notice, NoticeBoard, NoticeId, NoticeKind, NoticePatch};
pub use state::{AppState, CoreSettings, NoticeTimings};
pub use update::update;
pub use view_model::{AppViewModel, JobRowView};
