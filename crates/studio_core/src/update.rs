use studio_logging::{studio_debug, studio_info, studio_warn};

use crate::engagement::{self, AppliedToggle, CopyLocation, LikeFailurePolicy, PendingLike};
use crate::feed::DetailSync;
use crate::job::{Ignored, JobStatus, JobTracker, SubmissionId, TrackerState};
use crate::{AppState, Effect, EntityRef, FormKey, Msg, NoticeKind, NoticePatch, UploadPayload};

const PREPARING_MESSAGE: &str = "Preparing upload";
const PROCESSING_MESSAGE: &str = "Processing upload";
const QUEUED_DESCRIPTION: &str = "Queued, waiting for a worker";
const RUNNING_DESCRIPTION: &str = "Uploading and transcoding";
const SUCCESS_MESSAGE: &str = "Upload complete";
const FAILURE_MESSAGE: &str = "Upload failed";
const SUBMIT_FAILURE_MESSAGE: &str = "Upload could not be started";
const POLL_ERROR_MESSAGE: &str = "Could not check upload status";
const TIMEOUT_DESCRIPTION: &str = "Gave up waiting for the server to finish";
const ABANDONED_MESSAGE: &str = "Upload continues in the background";
const LIKE_FAILURE_MESSAGE: &str = "Could not update like";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UploadSubmitted { payload, form_key } => begin_upload(&mut state, payload, form_key),
        Msg::JobAccepted {
            submission,
            receipt,
        } => {
            let Some(tracker) = state.jobs.get_mut(&submission) else {
                return ignore_unknown(state, submission, "acceptance");
            };
            match tracker.accept(&receipt) {
                Ok(entered) => {
                    studio_info!(
                        "Upload {} accepted as job {} subject={:?}",
                        submission,
                        receipt.job_id,
                        receipt.subject_id
                    );
                    let mut effects = Vec::new();
                    if let Some(form_key) = tracker.form_key().cloned() {
                        effects.push(Effect::ClearDraft { form_key });
                    }
                    if !entered.is_terminal() {
                        tracker.mark_polling(true);
                        effects.push(Effect::StartPolling {
                            submission,
                            job_id: receipt.job_id.clone(),
                        });
                    }
                    effects.extend(enter_state(&mut state, submission, receipt.status.as_ref()));
                    effects
                }
                Err(ignored) => log_ignored(submission, ignored),
            }
        }
        Msg::SubmissionFailed { submission, reason } => {
            let Some(tracker) = state.jobs.get_mut(&submission) else {
                return ignore_unknown(state, submission, "submission failure");
            };
            match tracker.reject() {
                Ok(_) => {
                    studio_warn!("Upload {} submission failed: {}", submission, reason);
                    let notice = tracker.notice();
                    let after = state.settings.timings.job_failure;
                    state
                        .patch_notice(
                            notice,
                            NoticePatch::default()
                                .kind(NoticeKind::Error)
                                .message(SUBMIT_FAILURE_MESSAGE)
                                .description(Some(reason))
                                .dismiss_after(after),
                        )
                        .into_iter()
                        .collect()
                }
                Err(ignored) => log_ignored(submission, ignored),
            }
        }
        Msg::JobStatusReceived {
            submission,
            seq,
            status,
        } => {
            let Some(tracker) = state.jobs.get_mut(&submission) else {
                return ignore_unknown(state, submission, "status");
            };
            match tracker.apply_status(seq, &status) {
                Ok(entered) => {
                    studio_debug!("Upload {} poll #{} -> {}", submission, seq, entered);
                    enter_state(&mut state, submission, Some(&status))
                }
                Err(ignored) => log_ignored(submission, ignored),
            }
        }
        Msg::JobPollFailed {
            submission,
            seq,
            reason,
        } => poll_error(&mut state, submission, Some(seq), reason),
        Msg::JobPollTimedOut { submission } => poll_error(
            &mut state,
            submission,
            None,
            TIMEOUT_DESCRIPTION.to_string(),
        ),
        Msg::UploadViewUnmounted => unmount_uploads(&mut state),
        Msg::LikeToggled(target) => toggle_like(&mut state, target),
        Msg::LikeResolved { mutation, outcome } => {
            let Some(pending) = state.likes.resolve(mutation, &outcome) else {
                studio_debug!("Ignoring result for unknown like mutation {:?}", mutation);
                return (state, Vec::new());
            };
            match outcome {
                Ok(()) => {
                    studio_debug!("Like on {} confirmed", pending.target);
                    Vec::new()
                }
                Err(reason) => {
                    studio_warn!(
                        "Like on {} failed, reverting {} copies: {}",
                        pending.target,
                        pending.applied.len(),
                        reason
                    );
                    revert_like(&mut state, &pending);
                    match state.settings.like_failure_policy {
                        LikeFailurePolicy::Silent => Vec::new(),
                        LikeFailurePolicy::Notify => {
                            let after = state.settings.timings.like_failure;
                            let (_, effect) = state.post_notice(
                                NoticeKind::Error,
                                LIKE_FAILURE_MESSAGE,
                                Some(reason),
                                Some(after),
                            );
                            effect.into_iter().collect()
                        }
                    }
                }
            }
        }
        Msg::RefreshRequested => request_refresh(&mut state),
        Msg::FeedLoaded { videos, articles } => {
            studio_info!(
                "Feed refreshed: {} videos, {} articles",
                videos.len(),
                articles.len()
            );
            match state.feed.replace_collections(videos, articles) {
                DetailSync::Missing => {
                    studio_warn!("Open detail entity missing after refresh; keeping last copy")
                }
                DetailSync::Replaced | DetailSync::NoneOpen => {}
            }
            state.refresh_error = None;
            state.mark_dirty();
            finish_refresh(&mut state)
        }
        Msg::FeedLoadFailed { reason } => {
            studio_warn!("Feed refresh failed, keeping last known feed: {}", reason);
            state.refresh_error = Some(reason);
            state.mark_dirty();
            finish_refresh(&mut state)
        }
        Msg::SortChanged(sort) => {
            state.feed.set_sort(sort);
            state.mark_dirty();
            Vec::new()
        }
        Msg::FilterChanged(filter) => {
            state.feed.set_filter(filter);
            state.mark_dirty();
            Vec::new()
        }
        Msg::PageSelected(page) => {
            let before = state.feed.page();
            if state.feed.set_page(page) != before {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DetailOpened(target) => {
            if state.feed.open_detail(&target) {
                state.mark_dirty();
            } else {
                studio_warn!("Cannot open detail for {}: not loaded", target);
            }
            Vec::new()
        }
        Msg::DetailClosed => {
            if state.feed.close_detail().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NoticeAdded {
            kind,
            message,
            description,
            auto_dismiss_after,
        } => {
            let (_, effect) = state.post_notice(kind, message, description, auto_dismiss_after);
            effect.into_iter().collect()
        }
        Msg::NoticeDismissed(id) => {
            state.dismiss_notice(id);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn begin_upload(
    state: &mut AppState,
    payload: UploadPayload,
    form_key: Option<FormKey>,
) -> Vec<Effect> {
    let submission = state.next_submission_id();
    let (notice, _) = state.post_notice(
        NoticeKind::Loading,
        PREPARING_MESSAGE,
        Some(payload.title.clone()),
        None,
    );
    state.jobs.insert(
        submission,
        JobTracker::new(submission, payload.title.clone(), notice, form_key),
    );
    studio_info!("Upload {} submitting title={:?}", submission, payload.title);
    vec![Effect::SubmitJob {
        submission,
        payload,
    }]
}

/// Reflects the tracker's current state on its notice.
fn enter_state(
    state: &mut AppState,
    submission: SubmissionId,
    status: Option<&JobStatus>,
) -> Vec<Effect> {
    let Some(tracker) = state.jobs.get(&submission) else {
        return Vec::new();
    };
    let notice = tracker.notice();
    let entered = tracker.state();
    let title = tracker.title().to_owned();
    let timings = state.settings.timings;
    let detail = status.and_then(|status| status.detail.clone());

    let mut effects = Vec::new();
    let patch = match entered {
        TrackerState::Submitting => return effects,
        TrackerState::Queued => NoticePatch::default()
            .kind(NoticeKind::Loading)
            .message(PROCESSING_MESSAGE)
            .description(Some(detail.unwrap_or_else(|| QUEUED_DESCRIPTION.to_string()))),
        TrackerState::Running => NoticePatch::default()
            .kind(NoticeKind::Loading)
            .message(PROCESSING_MESSAGE)
            .description(Some(detail.unwrap_or_else(|| RUNNING_DESCRIPTION.to_string()))),
        TrackerState::Succeeded => {
            let message = status
                .and_then(JobStatus::result_message)
                .unwrap_or(SUCCESS_MESSAGE)
                .to_string();
            studio_info!("Upload {} succeeded: {}", submission, message);
            NoticePatch::default()
                .kind(NoticeKind::Success)
                .message(message)
                .description(Some(title))
                .dismiss_after(timings.success)
        }
        TrackerState::Failed => {
            let message = status
                .and_then(|status| status.error.clone())
                .filter(|error| !error.trim().is_empty())
                .unwrap_or_else(|| FAILURE_MESSAGE.to_string());
            studio_warn!("Upload {} failed: {}", submission, message);
            NoticePatch::default()
                .kind(NoticeKind::Error)
                .message(message)
                .description(Some(title))
                .dismiss_after(timings.job_failure)
        }
        TrackerState::PollError => NoticePatch::default()
            .kind(NoticeKind::Error)
            .message(POLL_ERROR_MESSAGE)
            .dismiss_after(timings.poll_error),
    };

    effects.extend(state.patch_notice(notice, patch));
    if entered.is_terminal() {
        effects.extend(stop_polling(state, submission));
    }
    if entered == TrackerState::Succeeded {
        effects.extend(request_refresh(state));
    }
    effects
}

fn stop_polling(state: &mut AppState, submission: SubmissionId) -> Option<Effect> {
    let tracker = state.jobs.get_mut(&submission)?;
    if !tracker.is_polling() {
        return None;
    }
    tracker.mark_polling(false);
    Some(Effect::CancelPolling { submission })
}

fn poll_error(
    state: &mut AppState,
    submission: SubmissionId,
    seq: Option<u64>,
    reason: String,
) -> Vec<Effect> {
    let Some(tracker) = state.jobs.get_mut(&submission) else {
        studio_debug!("Ignoring poll error for unknown upload {}", submission);
        return Vec::new();
    };
    match tracker.poll_failed(seq) {
        Ok(_) => {
            studio_warn!("Upload {} status check failed: {}", submission, reason);
            let notice = tracker.notice();
            let mut effects: Vec<Effect> = enter_state(state, submission, None);
            effects.extend(state.patch_notice(
                notice,
                NoticePatch::default().description(Some(reason)),
            ));
            effects
        }
        Err(ignored) => log_ignored(submission, ignored),
    }
}

fn unmount_uploads(state: &mut AppState) -> Vec<Effect> {
    let mut effects = Vec::new();
    let submissions: Vec<SubmissionId> = state.jobs.keys().copied().collect();
    for submission in submissions {
        effects.extend(stop_polling(state, submission));
        let Some(tracker) = state.jobs.remove(&submission) else {
            continue;
        };
        if !tracker.state().is_terminal() {
            studio_info!(
                "Upload {} left {} when its view closed",
                submission,
                tracker.state()
            );
            let after = state.settings.timings.success;
            effects.extend(state.patch_notice(
                tracker.notice(),
                NoticePatch::default()
                    .kind(NoticeKind::Info)
                    .message(ABANDONED_MESSAGE)
                    .dismiss_after(after),
            ));
        }
    }
    if !effects.is_empty() {
        state.mark_dirty();
    }
    effects
}

fn toggle_like(state: &mut AppState, target: EntityRef) -> Vec<Effect> {
    let mut applied = Vec::with_capacity(2);
    if let Some(engagement) = state.feed.engagement_mut(&target) {
        applied.push(AppliedToggle {
            location: CopyLocation::Collection,
            count_delta: engagement::toggle(engagement),
        });
    }
    if let Some(engagement) = state.feed.detail_engagement_mut(&target) {
        applied.push(AppliedToggle {
            location: CopyLocation::Detail,
            count_delta: engagement::toggle(engagement),
        });
    }
    if applied.is_empty() {
        studio_debug!("Like on {} has no local copy to update", target);
    } else {
        state.mark_dirty();
    }
    let generation = state.feed.generation();
    let mutation = state.likes.begin(target.clone(), applied, generation);
    vec![Effect::ToggleRemoteLike { mutation, target }]
}

fn revert_like(state: &mut AppState, pending: &PendingLike) {
    let target = &pending.target;
    if pending.generation != state.feed.generation() {
        studio_debug!("Copies of {} were refreshed since the toggle, nothing to revert", target);
        return;
    }
    for toggle in &pending.applied {
        let copy = match toggle.location {
            CopyLocation::Collection => state.feed.engagement_mut(target),
            CopyLocation::Detail => state.feed.detail_engagement_mut(target),
        };
        match copy {
            Some(engagement) => engagement::revert(engagement, toggle.count_delta),
            None => studio_debug!("{:?} copy of {} gone before revert", toggle.location, target),
        }
    }
    if !pending.applied.is_empty() {
        state.mark_dirty();
    }
}

fn request_refresh(state: &mut AppState) -> Vec<Effect> {
    if state.refresh_in_flight {
        state.refresh_queued = true;
        return Vec::new();
    }
    state.refresh_in_flight = true;
    state.mark_dirty();
    vec![Effect::FetchFeed]
}

fn finish_refresh(state: &mut AppState) -> Vec<Effect> {
    state.refresh_in_flight = false;
    if std::mem::take(&mut state.refresh_queued) {
        return request_refresh(state);
    }
    Vec::new()
}

fn ignore_unknown(state: AppState, submission: SubmissionId, what: &str) -> (AppState, Vec<Effect>) {
    studio_debug!("Ignoring {} for unknown upload {}", what, submission);
    (state, Vec::new())
}

fn log_ignored(submission: SubmissionId, ignored: Ignored) -> Vec<Effect> {
    match ignored {
        Ignored::Stale { seq, applied } => studio_debug!(
            "Upload {} discarding stale poll #{} (already applied #{})",
            submission,
            seq,
            applied
        ),
        other => studio_debug!("Upload {} ignoring update: {:?}", submission, other),
    }
    Vec::new()
}
