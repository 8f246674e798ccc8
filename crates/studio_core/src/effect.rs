use std::time::Duration;

use crate::{EntityRef, FormKey, JobId, MutationId, NoticeId, SubmissionId, UploadPayload};

/// Side effects requested by `update`, executed by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the remote submit endpoint.
    SubmitJob {
        submission: SubmissionId,
        payload: UploadPayload,
    },
    /// Start the single polling timer for an accepted job. First check is immediate.
    StartPolling {
        submission: SubmissionId,
        job_id: JobId,
    },
    /// Cancel that timer. Emitted at most once per `StartPolling`.
    CancelPolling { submission: SubmissionId },
    /// Deliver `Msg::NoticeDismissed` after `after`.
    ScheduleDismiss { notice: NoticeId, after: Duration },
    /// Call the remote like toggle for an optimistic mutation.
    ToggleRemoteLike {
        mutation: MutationId,
        target: EntityRef,
    },
    /// Re-fetch both content collections.
    FetchFeed,
    ClearDraft { form_key: FormKey },
}
