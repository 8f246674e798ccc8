mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{engine, engine_with, init_logging, payload, settle, video, ScriptedApi};
use serde_json::json;
use studio_core::{
    DraftSnapshot, EngagementTarget, EntityRef, FormKey, JobStatus, NoticeKind, RemoteJobState,
    TrackerState,
};
use studio_engine::{ApiError, FailureKind, PollSettings, MIN_POLL_INTERVAL};
use tokio::time::Instant;

fn tracker_state(
    engine: &studio_engine::StudioEngine<studio_core::MemoryStore>,
    submission: studio_core::SubmissionId,
) -> Option<TrackerState> {
    engine.state().job(submission).map(|job| job.state())
}

#[tokio::test(start_paused = true)]
async fn upload_runs_to_success_and_refreshes_feed() {
    init_logging();
    let api = ScriptedApi::new();
    api.push_status(Ok(JobStatus::new(RemoteJobState::Running)));
    api.push_status(Ok(
        JobStatus::new(RemoteJobState::Succeeded).with_result_message("done")
    ));
    api.set_feed(vec![video("v1", 0)], vec![]);
    let mut engine = engine(&api);

    let submission = engine.submit_upload(payload("clip"), None).unwrap();
    settle(&mut engine, |state| {
        state.job(submission).map(|job| job.state()) == Some(TrackerState::Succeeded)
            && !state.is_refreshing()
    })
    .await;

    let view = engine.view();
    assert_eq!(view.notices.len(), 1);
    assert_eq!(view.notices[0].kind, NoticeKind::Success);
    assert_eq!(view.notices[0].message, "done");
    assert_eq!(view.feed.entries.len(), 1);
    assert_eq!(api.status_calls(), 2);
    assert_eq!(api.feed_calls.load(Ordering::SeqCst), 1);
    assert_eq!(engine.active_pollers(), 0);

    // Success notice auto-dismisses.
    settle(&mut engine, |state| state.notices().is_empty()).await;
}

#[tokio::test(start_paused = true)]
async fn first_status_check_is_immediate() {
    init_logging();
    let api = ScriptedApi::new();
    api.push_status(Ok(JobStatus::new(RemoteJobState::Running)));
    let mut engine = engine(&api);

    let started = Instant::now();
    let submission = engine.submit_upload(payload("clip"), None).unwrap();
    settle(&mut engine, |state| {
        state.job(submission).map(|job| job.state()) == Some(TrackerState::Running)
    })
    .await;

    assert!(started.elapsed() < PollSettings::default().interval);
    assert_eq!(engine.active_pollers(), 1);
}

#[tokio::test(start_paused = true)]
async fn unmount_stops_polling() {
    init_logging();
    let api = ScriptedApi::new();
    let mut engine = engine(&api);

    let submission = engine.submit_upload(payload("clip"), None).unwrap();
    settle(&mut engine, |state| {
        state.job(submission).map(|job| job.state()) == Some(TrackerState::Queued)
    })
    .await;
    assert_eq!(engine.active_pollers(), 1);

    engine.unmount_uploads();
    let calls = api.status_calls();
    assert_eq!(engine.active_pollers(), 0);
    let view = engine.view();
    assert!(view.jobs.is_empty());
    assert_eq!(view.notices[0].kind, NoticeKind::Info);

    tokio::time::sleep(Duration::from_secs(20)).await;
    engine.process_pending();
    assert_eq!(api.status_calls(), calls);
    assert!(engine.view().notices.is_empty(), "background notice dismissed");
}

#[tokio::test(start_paused = true)]
async fn deadline_turns_into_poll_error() {
    init_logging();
    let api = ScriptedApi::new();
    let mut engine = engine_with(
        &api,
        PollSettings {
            interval: Duration::from_secs(2),
            deadline: Some(Duration::from_secs(5)),
        },
    );

    let submission = engine.submit_upload(payload("clip"), None).unwrap();
    settle(&mut engine, |state| {
        state.job(submission).map(|job| job.state()) == Some(TrackerState::PollError)
    })
    .await;

    let notice = &engine.view().notices[0];
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(
        notice.description.as_deref(),
        Some("Gave up waiting for the server to finish")
    );
    assert_eq!(engine.active_pollers(), 0);
    assert_eq!(api.status_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn zero_interval_polls_at_minimum_period() {
    init_logging();
    let api = ScriptedApi::new();
    api.push_status(Ok(JobStatus::new(RemoteJobState::Running)));
    api.push_status(Ok(JobStatus::new(RemoteJobState::Succeeded)));
    let mut engine = engine_with(
        &api,
        PollSettings {
            interval: Duration::ZERO,
            deadline: None,
        },
    );

    let started = Instant::now();
    let submission = engine.submit_upload(payload("clip"), None).unwrap();
    settle(&mut engine, |state| {
        state.job(submission).map(|job| job.state()) == Some(TrackerState::Succeeded)
    })
    .await;

    assert_eq!(api.status_calls(), 2);
    assert!(started.elapsed() >= MIN_POLL_INTERVAL);
    assert_eq!(engine.active_pollers(), 0);
}

#[tokio::test(start_paused = true)]
async fn status_failure_stops_polling() {
    init_logging();
    let api = ScriptedApi::new();
    api.push_status(Err(ApiError::new(FailureKind::Network, "connection reset")));
    let mut engine = engine(&api);

    let submission = engine.submit_upload(payload("clip"), None).unwrap();
    settle(&mut engine, |state| {
        state.job(submission).map(|job| job.state()) == Some(TrackerState::PollError)
    })
    .await;

    assert_eq!(
        engine.view().notices[0].description.as_deref(),
        Some("network error: connection reset")
    );

    tokio::time::sleep(Duration::from_secs(10)).await;
    engine.process_pending();
    assert_eq!(api.status_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_submission_never_polls() {
    init_logging();
    let api = ScriptedApi::new();
    api.push_receipt(Err(ApiError::new(FailureKind::HttpStatus(413), "too large")));
    let mut engine = engine(&api);

    let submission = engine.submit_upload(payload("clip"), None).unwrap();
    settle(&mut engine, |state| {
        state.job(submission).map(|job| job.state()) == Some(TrackerState::Failed)
    })
    .await;

    assert_eq!(api.status_calls(), 0);
    assert_eq!(engine.active_pollers(), 0);
    assert_eq!(engine.view().notices[0].kind, NoticeKind::Error);
}

#[tokio::test(start_paused = true)]
async fn acceptance_clears_saved_draft() {
    init_logging();
    let api = ScriptedApi::new();
    let mut engine = engine(&api);
    let key = FormKey::new("video-create-form");
    engine
        .save_draft(&key, &DraftSnapshot(json!({ "title": "clip" })))
        .unwrap();

    let submission = engine
        .submit_upload(payload("clip"), Some(key.clone()))
        .unwrap();
    assert!(engine.load_draft(&key).is_some(), "kept until accepted");

    settle(&mut engine, |state| {
        state.job(submission).map(|job| job.state()) == Some(TrackerState::Queued)
    })
    .await;
    assert_eq!(engine.load_draft(&key), None);
}

#[tokio::test(start_paused = true)]
async fn failed_like_is_reverted() {
    init_logging();
    let api = ScriptedApi::new();
    api.set_feed(vec![video("v1", 5)], vec![]);
    api.push_like(Err(ApiError::new(FailureKind::HttpStatus(503), "")));
    let mut engine = engine(&api);
    engine.refresh();
    settle(&mut engine, |state| !state.is_refreshing()).await;

    let target = EntityRef::video("v1");
    engine.toggle_like(target.clone());
    let liked = *engine.view().feed.entries[0].engagement();
    assert_eq!((liked.like_count, liked.liked_by_current_user), (6, true));

    settle(&mut engine, |state| state.likes().is_empty()).await;
    let reverted = *engine.view().feed.entries[0].engagement();
    assert_eq!((reverted.like_count, reverted.liked_by_current_user), (5, false));
    assert_eq!(api.like_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_previous_feed() {
    init_logging();
    let api = ScriptedApi::new();
    api.set_feed(vec![video("v1", 1), video("v2", 2)], vec![]);
    let mut engine = engine(&api);
    engine.refresh();
    settle(&mut engine, |state| !state.is_refreshing()).await;
    let before = engine.view().feed;

    api.fail_feed(ApiError::new(FailureKind::Timeout, ""));
    engine.refresh();
    settle(&mut engine, |state| !state.is_refreshing()).await;

    let view = engine.view();
    assert_eq!(view.feed, before);
    assert_eq!(view.refresh_error.as_deref(), Some("timeout"));
}

#[tokio::test(start_paused = true)]
async fn notices_dismiss_on_schedule() {
    init_logging();
    let api = ScriptedApi::new();
    let mut engine = engine(&api);

    let sticky = engine.add_notice(NoticeKind::Info, "Saved", None, None);
    engine.add_notice(
        NoticeKind::Success,
        "Published",
        None,
        Some(Duration::from_secs(3)),
    );
    assert_eq!(engine.view().notices.len(), 2);

    let started = Instant::now();
    settle(&mut engine, |state| state.notices().len() == 1).await;
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert_eq!(engine.view().notices[0].id, sticky);

    engine.remove_notice(sticky);
    engine.remove_notice(sticky);
    assert!(engine.view().notices.is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_drops_late_results() {
    init_logging();
    let api = ScriptedApi::new();
    let mut engine = engine(&api);

    let submission = engine.submit_upload(payload("clip"), None).unwrap();
    engine.shutdown();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(engine.process_pending(), 0);
    assert_eq!(tracker_state(&engine, submission), Some(TrackerState::Submitting));
}
