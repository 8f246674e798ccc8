//! Remote upload jobs and the local tracker state machine that follows them.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::draft::FormKey;
use crate::notice::NoticeId;

/// Local handle for one upload submission. Exists before the remote job id is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionId(pub u64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Remote job handle returned by the submit call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the entity a job produces (e.g. the video row being created).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unit of work submitted to the remote system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub title: String,
    pub description: Option<String>,
    pub media_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteJobState {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl RemoteJobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RemoteJobState::Succeeded | RemoteJobState::Failed)
    }
}

/// Status as reported by the remote system. Read-only to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub state: RemoteJobState,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobStatus {
    pub fn new(state: RemoteJobState) -> Self {
        Self {
            state,
            detail: None,
            result: None,
            error: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_result_message(mut self, message: impl Into<String>) -> Self {
        self.result = Some(serde_json::json!({ "message": message.into() }));
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// `result.message` when the opaque result carries one.
    pub fn result_message(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|result| result.get("message"))
            .and_then(|message| message.as_str())
            .filter(|message| !message.trim().is_empty())
    }
}

/// What the submit call hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub job_id: JobId,
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
    /// First status, when the server reports one inline.
    #[serde(default)]
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Submitting,
    Queued,
    Running,
    Succeeded,
    Failed,
    PollError,
}

impl TrackerState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TrackerState::Succeeded | TrackerState::Failed | TrackerState::PollError
        )
    }

    fn from_remote(state: RemoteJobState) -> Self {
        match state {
            RemoteJobState::Queued => TrackerState::Queued,
            RemoteJobState::Running => TrackerState::Running,
            RemoteJobState::Succeeded => TrackerState::Succeeded,
            RemoteJobState::Failed => TrackerState::Failed,
        }
    }
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrackerState::Submitting => "submitting",
            TrackerState::Queued => "queued",
            TrackerState::Running => "running",
            TrackerState::Succeeded => "succeeded",
            TrackerState::Failed => "failed",
            TrackerState::PollError => "poll error",
        };
        f.write_str(label)
    }
}

/// Why a reported status was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// Tracker already reached a terminal state.
    Finished(TrackerState),
    /// Response overtaken by one with a higher sequence number.
    Stale { seq: u64, applied: u64 },
    /// Job was not accepted yet, or was accepted twice.
    OutOfOrder(TrackerState),
    /// Remote reported QUEUED after RUNNING.
    Regressed,
}

/// Sequence number used for the status carried inline by a submit receipt.
pub const RECEIPT_SEQ: u64 = 0;

/// Local view of one submission's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTracker {
    submission: SubmissionId,
    title: String,
    notice: NoticeId,
    form_key: Option<FormKey>,
    job_id: Option<JobId>,
    subject_id: Option<SubjectId>,
    state: TrackerState,
    last_seq: Option<u64>,
    polling: bool,
}

impl JobTracker {
    pub fn new(
        submission: SubmissionId,
        title: impl Into<String>,
        notice: NoticeId,
        form_key: Option<FormKey>,
    ) -> Self {
        Self {
            submission,
            title: title.into(),
            notice,
            form_key,
            job_id: None,
            subject_id: None,
            state: TrackerState::Submitting,
            last_seq: None,
            polling: false,
        }
    }

    pub fn submission(&self) -> SubmissionId {
        self.submission
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn notice(&self) -> NoticeId {
        self.notice
    }

    pub fn form_key(&self) -> Option<&FormKey> {
        self.form_key.as_ref()
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn subject_id(&self) -> Option<&SubjectId> {
        self.subject_id.as_ref()
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    /// SUBMITTING -> QUEUED | RUNNING (or terminal, when the receipt says so).
    pub fn accept(&mut self, receipt: &SubmitReceipt) -> Result<TrackerState, Ignored> {
        if self.state != TrackerState::Submitting {
            return Err(Ignored::OutOfOrder(self.state));
        }
        self.job_id = Some(receipt.job_id.clone());
        self.subject_id = receipt.subject_id.clone();
        self.state = TrackerState::Queued;
        match &receipt.status {
            Some(status) => self.apply_status(RECEIPT_SEQ, status),
            None => Ok(self.state),
        }
    }

    /// SUBMITTING -> FAILED. No polling ever starts.
    pub fn reject(&mut self) -> Result<TrackerState, Ignored> {
        if self.state != TrackerState::Submitting {
            return Err(Ignored::OutOfOrder(self.state));
        }
        self.state = TrackerState::Failed;
        Ok(self.state)
    }

    /// Applies a poll response tagged with `seq`.
    pub fn apply_status(&mut self, seq: u64, status: &JobStatus) -> Result<TrackerState, Ignored> {
        self.check_live(seq)?;
        let next = TrackerState::from_remote(status.state);
        if self.state == TrackerState::Running && next == TrackerState::Queued {
            self.last_seq = Some(seq);
            return Err(Ignored::Regressed);
        }
        self.last_seq = Some(seq);
        self.state = next;
        Ok(next)
    }

    /// The status-check call itself failed; terminal for the local poller.
    pub fn poll_failed(&mut self, seq: Option<u64>) -> Result<TrackerState, Ignored> {
        match seq {
            Some(seq) => self.check_live(seq)?,
            None => self.check_accepted()?,
        }
        if let Some(seq) = seq {
            self.last_seq = Some(seq);
        }
        self.state = TrackerState::PollError;
        Ok(self.state)
    }

    pub(crate) fn mark_polling(&mut self, polling: bool) {
        self.polling = polling;
    }

    fn check_accepted(&self) -> Result<(), Ignored> {
        if self.state.is_terminal() {
            return Err(Ignored::Finished(self.state));
        }
        if self.state == TrackerState::Submitting {
            return Err(Ignored::OutOfOrder(self.state));
        }
        Ok(())
    }

    fn check_live(&self, seq: u64) -> Result<(), Ignored> {
        self.check_accepted()?;
        match self.last_seq {
            Some(applied) if seq <= applied => Err(Ignored::Stale { seq, applied }),
            _ => Ok(()),
        }
    }
}
