//! Cancellable status polling for one accepted job.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use studio_core::{JobId, Msg, SubmissionId};
use studio_logging::{studio_debug, studio_warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::StudioApi;

/// Shortest period the timer runs at; a zero interval is raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Give up once a job has been polled this long without finishing.
    pub deadline: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            deadline: Some(Duration::from_secs(30 * 60)),
        }
    }
}

/// The single polling timer owned per job.
#[derive(Debug)]
pub struct PollHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stops the timer. Consumes the handle so it cannot be cancelled twice.
    pub fn cancel(self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Starts polling `job_id`. The first check fires immediately; responses are
/// tagged with increasing sequence numbers starting at 1.
pub fn spawn_poller(
    api: Arc<dyn StudioApi>,
    submission: SubmissionId,
    job_id: JobId,
    settings: PollSettings,
    events: UnboundedSender<Msg>,
    token: CancellationToken,
) -> PollHandle {
    let task = tokio::spawn(poll_loop(
        api,
        submission,
        job_id,
        settings,
        events,
        token.clone(),
    ));
    PollHandle { token, task }
}

async fn poll_loop(
    api: Arc<dyn StudioApi>,
    submission: SubmissionId,
    job_id: JobId,
    settings: PollSettings,
    events: UnboundedSender<Msg>,
    token: CancellationToken,
) {
    let expiry = settings.deadline.map(|deadline| Instant::now() + deadline);
    let expired = async move {
        match expiry {
            Some(at) => time::sleep_until(at).await,
            None => future::pending::<()>().await,
        }
    };
    tokio::pin!(expired);

    let mut ticker = time::interval(settings.interval.max(MIN_POLL_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seq = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = &mut expired => {
                studio_warn!("Upload {} job {} hit its polling deadline", submission, job_id);
                let _ = events.send(Msg::JobPollTimedOut { submission });
                break;
            }
            _ = ticker.tick() => {}
        }

        seq += 1;
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = &mut expired => {
                studio_warn!("Upload {} job {} hit its polling deadline", submission, job_id);
                let _ = events.send(Msg::JobPollTimedOut { submission });
                break;
            }
            result = api.get_job_status(&job_id) => result,
        };

        let msg = match result {
            Ok(status) => {
                let terminal = status.state.is_terminal();
                studio_debug!(
                    "Upload {} poll #{} reported {:?}",
                    submission,
                    seq,
                    status.state
                );
                if terminal {
                    let _ = events.send(Msg::JobStatusReceived {
                        submission,
                        seq,
                        status,
                    });
                    break;
                }
                Msg::JobStatusReceived {
                    submission,
                    seq,
                    status,
                }
            }
            Err(err) => {
                let _ = events.send(Msg::JobPollFailed {
                    submission,
                    seq,
                    reason: err.to_string(),
                });
                break;
            }
        };
        // Receiver gone means the engine was dropped; nobody can see further updates.
        if events.send(msg).is_err() {
            break;
        }
    }
    studio_debug!("Upload {} poller for job {} stopped", submission, job_id);
}
