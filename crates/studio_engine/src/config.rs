use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use studio_core::{CoreSettings, LikeFailurePolicy, NoticeTimings};
use thiserror::Error;

use crate::{ApiSettings, PollSettings};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base_url must not be empty")]
    MissingBaseUrl,
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Everything the engine and core need, flattened for a config file.
///
/// Durations are stored as integer seconds or milliseconds so the file stays
/// readable; `None` deadlines poll until a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub poll_deadline_secs: Option<u64>,
    pub page_size: usize,
    pub like_failure_policy: LikeFailurePolicy,
    pub success_dismiss_ms: u64,
    pub job_failure_dismiss_ms: u64,
    pub poll_error_dismiss_ms: u64,
    pub like_failure_dismiss_ms: u64,
    pub draft_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        let poll = PollSettings::default();
        let core = CoreSettings::default();
        Self {
            base_url: api.base_url,
            auth_token: api.auth_token,
            connect_timeout_secs: api.connect_timeout.as_secs(),
            request_timeout_secs: api.request_timeout.as_secs(),
            poll_interval_ms: millis(poll.interval),
            poll_deadline_secs: poll.deadline.map(|deadline| deadline.as_secs()),
            page_size: core.page_size,
            like_failure_policy: core.like_failure_policy,
            success_dismiss_ms: millis(core.timings.success),
            job_failure_dismiss_ms: millis(core.timings.job_failure),
            poll_error_dismiss_ms: millis(core.timings.poll_error),
            like_failure_dismiss_ms: millis(core.timings.like_failure),
            draft_dir: PathBuf::from("drafts"),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        let positive = [
            ("poll_interval_ms", self.poll_interval_ms),
            ("page_size", self.page_size as u64),
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }
        if self.poll_deadline_secs == Some(0) {
            return Err(ConfigError::Zero("poll_deadline_secs"));
        }
        Ok(())
    }

    pub fn core_settings(&self) -> CoreSettings {
        CoreSettings {
            page_size: self.page_size,
            like_failure_policy: self.like_failure_policy,
            timings: NoticeTimings {
                success: Duration::from_millis(self.success_dismiss_ms),
                job_failure: Duration::from_millis(self.job_failure_dismiss_ms),
                poll_error: Duration::from_millis(self.poll_error_dismiss_ms),
                like_failure: Duration::from_millis(self.like_failure_dismiss_ms),
            },
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            deadline: self.poll_deadline_secs.map(Duration::from_secs),
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            auth_token: self.auth_token.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
