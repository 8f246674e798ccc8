mod common;

use std::time::Duration;

use common::init_logging;
use studio_core::{update, AppState, Effect, Msg, NoticeId, NoticeKind, NoticePatch};

fn add(state: AppState, message: &str, dismiss: Option<Duration>) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::NoticeAdded {
            kind: NoticeKind::Info,
            message: message.to_string(),
            description: None,
            auto_dismiss_after: dismiss,
        },
    )
}

fn messages(state: &AppState) -> Vec<String> {
    state
        .view()
        .notices
        .into_iter()
        .map(|notice| notice.message)
        .collect()
}

#[test]
fn display_order_is_insertion_order_across_mutations() {
    init_logging();
    let (state, _) = add(AppState::new(), "first", None);
    let (state, _) = add(state, "second", None);
    let (mut state, _) = add(state, "third", None);
    let ids: Vec<NoticeId> = state.notices().iter().map(|notice| notice.id).collect();

    state.patch_notice(ids[0], NoticePatch::default().message("first, updated"));
    state.patch_notice(ids[2], NoticePatch::default().kind(NoticeKind::Success));
    let (state, _) = update(state, Msg::NoticeDismissed(ids[1]));
    let (state, _) = add(state, "fourth", None);

    assert_eq!(messages(&state), vec!["first, updated", "third", "fourth"]);
}

#[test]
fn auto_dismiss_is_scheduled_on_add() {
    init_logging();
    let (state, effects) = add(AppState::new(), "saved", Some(Duration::from_secs(3)));
    let id = state.notices().iter().next().unwrap().id;
    assert_eq!(
        effects,
        vec![Effect::ScheduleDismiss {
            notice: id,
            after: Duration::from_secs(3)
        }]
    );
}

#[test]
fn patching_a_dismissed_notice_is_a_noop() {
    init_logging();
    let (mut state, _) = add(AppState::new(), "gone soon", None);
    let id = state.notices().iter().next().unwrap().id;
    assert!(state.dismiss_notice(id));
    assert!(state.consume_dirty());

    let effect = state.patch_notice(
        id,
        NoticePatch::default()
            .kind(NoticeKind::Error)
            .dismiss_after(Duration::from_secs(1)),
    );
    assert_eq!(effect, None);
    assert!(!state.consume_dirty());
    assert!(!state.dismiss_notice(id));
}

#[test]
fn patch_with_dismiss_schedules_removal() {
    init_logging();
    let mut state = AppState::new();
    let (id, effect) = state.post_notice(NoticeKind::Loading, "working", None, None);
    assert_eq!(effect, None);

    let effect = state.patch_notice(
        id,
        NoticePatch::default()
            .kind(NoticeKind::Success)
            .dismiss_after(Duration::from_secs(2)),
    );
    assert_eq!(
        effect,
        Some(Effect::ScheduleDismiss {
            notice: id,
            after: Duration::from_secs(2)
        })
    );
}
