//! Studio engine: remote calls, polling timers, dismiss timers and draft storage
//! behind the pure `studio_core` state machine.
mod api;
mod config;
mod engine;
mod filename;
mod http;
mod persist;
mod poller;
mod types;

pub use api::StudioApi;
pub use config::{ConfigError, EngineConfig};
pub use engine::StudioEngine;
pub use filename::store_filename;
pub use http::{ApiSettings, ReqwestApi};
pub use persist::{ensure_store_dir, AtomicFileWriter, FileStore, PersistError};
pub use poller::{spawn_poller, PollHandle, PollSettings, MIN_POLL_INTERVAL};
pub use types::{ApiError, FailureKind};
