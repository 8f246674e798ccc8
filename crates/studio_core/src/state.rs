use std::collections::BTreeMap;
use std::time::Duration;

use crate::engagement::{LikeFailurePolicy, LikeLedger};
use crate::feed::{FeedState, DEFAULT_PAGE_SIZE};
use crate::job::{JobTracker, SubmissionId};
use crate::notice::{NoticeBoard, NoticeId, NoticeKind, NoticePatch};
use crate::view_model::{AppViewModel, JobRowView};
use crate::Effect;

/// How long terminal notices stay on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeTimings {
    pub success: Duration,
    pub job_failure: Duration,
    pub poll_error: Duration,
    pub like_failure: Duration,
}

impl Default for NoticeTimings {
    fn default() -> Self {
        Self {
            success: Duration::from_secs(4),
            job_failure: Duration::from_secs(8),
            poll_error: Duration::from_secs(6),
            like_failure: Duration::from_secs(4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreSettings {
    pub page_size: usize,
    pub like_failure_policy: LikeFailurePolicy,
    pub timings: NoticeTimings,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            like_failure_policy: LikeFailurePolicy::default(),
            timings: NoticeTimings::default(),
        }
    }
}

/// The single owned store of all shared client state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) settings: CoreSettings,
    pub(crate) notices: NoticeBoard,
    pub(crate) jobs: BTreeMap<SubmissionId, JobTracker>,
    pub(crate) next_submission: u64,
    pub(crate) feed: FeedState,
    pub(crate) likes: LikeLedger,
    pub(crate) refresh_in_flight: bool,
    pub(crate) refresh_queued: bool,
    pub(crate) refresh_error: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(CoreSettings::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CoreSettings) -> Self {
        Self {
            settings,
            notices: NoticeBoard::new(),
            jobs: BTreeMap::new(),
            next_submission: 0,
            feed: FeedState::new(settings.page_size),
            likes: LikeLedger::default(),
            refresh_in_flight: false,
            refresh_queued: false,
            refresh_error: None,
            dirty: false,
        }
    }

    pub fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn feed(&self) -> &FeedState {
        &self.feed
    }

    pub fn likes(&self) -> &LikeLedger {
        &self.likes
    }

    pub fn job(&self, submission: SubmissionId) -> Option<&JobTracker> {
        self.jobs.get(&submission)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &JobTracker> {
        self.jobs.values()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_in_flight
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            notices: self.notices.iter().cloned().collect(),
            jobs: self
                .jobs
                .values()
                .map(|tracker| JobRowView {
                    submission: tracker.submission(),
                    title: tracker.title().to_owned(),
                    state: tracker.state(),
                    job_id: tracker.job_id().cloned(),
                    subject_id: tracker.subject_id().cloned(),
                    notice: tracker.notice(),
                })
                .collect(),
            feed: self.feed.current_page(),
            detail: self.feed.detail().cloned(),
            refreshing: self.refresh_in_flight,
            refresh_error: self.refresh_error.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// `addNotice`: appends and schedules auto-dismiss when requested.
    pub fn post_notice(
        &mut self,
        kind: NoticeKind,
        message: impl Into<String>,
        description: Option<String>,
        auto_dismiss_after: Option<Duration>,
    ) -> (NoticeId, Option<Effect>) {
        let id = self
            .notices
            .add(kind, message, description, auto_dismiss_after);
        self.mark_dirty();
        let effect = auto_dismiss_after.map(|after| Effect::ScheduleDismiss { notice: id, after });
        (id, effect)
    }

    /// `updateNotice`: no-op when the notice is gone. A deferred removal is
    /// scheduled only when this patch sets one.
    pub fn patch_notice(&mut self, id: NoticeId, patch: NoticePatch) -> Option<Effect> {
        let schedule = patch.auto_dismiss_after;
        self.notices.update(id, patch)?;
        self.mark_dirty();
        schedule.map(|after| Effect::ScheduleDismiss { notice: id, after })
    }

    /// `removeNotice`: idempotent.
    pub fn dismiss_notice(&mut self, id: NoticeId) -> bool {
        let removed = self.notices.remove(id).is_some();
        if removed {
            self.mark_dirty();
        }
        removed
    }

    pub(crate) fn next_submission_id(&mut self) -> SubmissionId {
        self.next_submission += 1;
        SubmissionId(self.next_submission)
    }
}
