use std::collections::HashMap;
use std::future::Future;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use studio_core::{
    update, AppState, AppViewModel, ContentFilter, CoreSettings, DraftBook, DraftError,
    DraftSnapshot, Effect, EntityRef, FormKey, JobId, Msg, NoticeId, NoticeKind, NoticePatch,
    PersistentStore, SortKey, SubmissionId, UploadPayload,
};
use studio_logging::{studio_debug, studio_info, studio_warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::poller::{spawn_poller, PollHandle, PollSettings};
use crate::{ConfigError, EngineConfig, StudioApi};

/// Owns the application state and executes the effects `update` asks for.
///
/// Async work runs on tokio tasks and reports back as [`Msg`]s on a single
/// queue; messages are applied one at a time, so state writes never interleave.
/// Must be created inside a tokio runtime.
pub struct StudioEngine<S> {
    state: AppState,
    api: Arc<dyn StudioApi>,
    poll: PollSettings,
    pollers: HashMap<SubmissionId, PollHandle>,
    drafts: DraftBook<S>,
    msg_tx: UnboundedSender<Msg>,
    msg_rx: UnboundedReceiver<Msg>,
    shutdown: CancellationToken,
}

impl<S: PersistentStore> StudioEngine<S> {
    pub fn new(api: Arc<dyn StudioApi>, store: S, core: CoreSettings, poll: PollSettings) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::with_settings(core),
            api,
            poll,
            pollers: HashMap::new(),
            drafts: DraftBook::new(store),
            msg_tx,
            msg_rx,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn from_config(
        config: &EngineConfig,
        api: Arc<dyn StudioApi>,
        store: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            api,
            store,
            config.core_settings(),
            config.poll_settings(),
        ))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    /// Number of polling timers currently owned.
    pub fn active_pollers(&self) -> usize {
        self.pollers.len()
    }

    /// Handle for feeding messages from outside the engine (signals, UI threads).
    pub fn sender(&self) -> UnboundedSender<Msg> {
        self.msg_tx.clone()
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let effects = self.apply(msg);
        self.run_effects(effects);
    }

    /// Applies every message already queued without waiting. Returns how many ran.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.dispatch(msg);
            processed += 1;
        }
        processed
    }

    /// Waits for the next message from a background task and applies it.
    pub async fn next_event(&mut self) -> bool {
        match self.msg_rx.recv().await {
            Some(msg) => {
                self.dispatch(msg);
                true
            }
            None => false,
        }
    }

    /// Applies messages until `done` holds for the state.
    pub async fn run_until(&mut self, mut done: impl FnMut(&AppState) -> bool) {
        while !done(&self.state) {
            if !self.next_event().await {
                break;
            }
        }
    }

    /// Starts an upload. `form_key` names the draft to clear once the job is accepted.
    pub fn submit_upload(
        &mut self,
        payload: UploadPayload,
        form_key: Option<FormKey>,
    ) -> Option<SubmissionId> {
        let effects = self.apply(Msg::UploadSubmitted { payload, form_key });
        let submission = effects.iter().find_map(|effect| match effect {
            Effect::SubmitJob { submission, .. } => Some(*submission),
            _ => None,
        });
        self.run_effects(effects);
        submission
    }

    pub fn unmount_uploads(&mut self) {
        self.dispatch(Msg::UploadViewUnmounted);
    }

    pub fn toggle_like(&mut self, target: EntityRef) {
        self.dispatch(Msg::LikeToggled(target));
    }

    pub fn refresh(&mut self) {
        self.dispatch(Msg::RefreshRequested);
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.dispatch(Msg::SortChanged(sort));
    }

    pub fn set_filter(&mut self, filter: ContentFilter) {
        self.dispatch(Msg::FilterChanged(filter));
    }

    pub fn select_page(&mut self, page: usize) {
        self.dispatch(Msg::PageSelected(page));
    }

    pub fn open_detail(&mut self, target: EntityRef) {
        self.dispatch(Msg::DetailOpened(target));
    }

    pub fn close_detail(&mut self) {
        self.dispatch(Msg::DetailClosed);
    }

    pub fn add_notice(
        &mut self,
        kind: NoticeKind,
        message: impl Into<String>,
        description: Option<String>,
        auto_dismiss_after: Option<Duration>,
    ) -> NoticeId {
        let (id, effect) = self
            .state
            .post_notice(kind, message, description, auto_dismiss_after);
        self.run_effects(effect.into_iter().collect());
        id
    }

    pub fn update_notice(&mut self, id: NoticeId, patch: NoticePatch) {
        let effect = self.state.patch_notice(id, patch);
        self.run_effects(effect.into_iter().collect());
    }

    pub fn remove_notice(&mut self, id: NoticeId) {
        self.dispatch(Msg::NoticeDismissed(id));
    }

    pub fn save_draft(&mut self, key: &FormKey, snapshot: &DraftSnapshot) -> Result<(), DraftError> {
        self.drafts.save_draft(key, snapshot)
    }

    pub fn load_draft(&self, key: &FormKey) -> Option<DraftSnapshot> {
        self.drafts.load_draft(key)
    }

    pub fn clear_draft(&mut self, key: &FormKey) -> Result<(), DraftError> {
        self.drafts.clear_draft(key)
    }

    pub fn drafts(&self) -> &DraftBook<S> {
        &self.drafts
    }

    /// Cancels every timer and in-flight request. Late results are dropped.
    pub fn shutdown(&mut self) {
        self.shutdown.cancel();
        for (_, handle) in self.pollers.drain() {
            handle.cancel();
        }
    }

    fn apply(&mut self, msg: Msg) -> Vec<Effect> {
        let state = mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        effects
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::SubmitJob {
                submission,
                payload,
            } => {
                let api = self.api.clone();
                self.spawn_request(async move {
                    match api.submit_job(&payload).await {
                        Ok(receipt) => Msg::JobAccepted {
                            submission,
                            receipt,
                        },
                        Err(err) => Msg::SubmissionFailed {
                            submission,
                            reason: err.to_string(),
                        },
                    }
                });
            }
            Effect::StartPolling { submission, job_id } => self.start_polling(submission, job_id),
            Effect::CancelPolling { submission } => match self.pollers.remove(&submission) {
                Some(handle) => {
                    handle.cancel();
                    studio_debug!("Cancelled poller for upload {}", submission);
                }
                None => studio_debug!("No poller to cancel for upload {}", submission),
            },
            Effect::ScheduleDismiss { notice, after } => {
                let events = self.msg_tx.clone();
                let shutdown = self.shutdown.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => {}
                        _ = tokio::time::sleep(after) => {
                            let _ = events.send(Msg::NoticeDismissed(notice));
                        }
                    }
                });
            }
            Effect::ToggleRemoteLike { mutation, target } => {
                let api = self.api.clone();
                self.spawn_request(async move {
                    let outcome = api.toggle_like(&target).await.map_err(|err| err.to_string());
                    Msg::LikeResolved { mutation, outcome }
                });
            }
            Effect::FetchFeed => {
                let api = self.api.clone();
                self.spawn_request(async move {
                    match tokio::try_join!(api.fetch_videos(), api.fetch_articles()) {
                        Ok((videos, articles)) => Msg::FeedLoaded { videos, articles },
                        Err(err) => Msg::FeedLoadFailed {
                            reason: err.to_string(),
                        },
                    }
                });
            }
            Effect::ClearDraft { form_key } => {
                if let Err(err) = self.drafts.clear_draft(&form_key) {
                    studio_warn!("Failed to clear draft {}: {}", form_key, err);
                }
            }
        }
    }

    fn start_polling(&mut self, submission: SubmissionId, job_id: JobId) {
        studio_info!("Polling job {} for upload {}", job_id, submission);
        let handle = spawn_poller(
            self.api.clone(),
            submission,
            job_id,
            self.poll,
            self.msg_tx.clone(),
            self.shutdown.child_token(),
        );
        if let Some(previous) = self.pollers.insert(submission, handle) {
            studio_warn!("Replacing existing poller for upload {}", submission);
            previous.cancel();
        }
    }

    /// Runs one remote call and queues its result unless the engine shuts down first.
    fn spawn_request<F>(&self, request: F)
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        let events = self.msg_tx.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {}
                msg = request => {
                    let _ = events.send(msg);
                }
            }
        });
    }
}

impl<S> Drop for StudioEngine<S> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
