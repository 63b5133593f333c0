pub mod api;
pub mod bulk;
pub mod config;
pub mod constants;
pub mod errors;
pub mod identifiers;
pub mod jobs;
pub mod remote;
pub mod resources;

pub use api::SyncApi;
pub use config::SyncConfig;
pub use errors::{ErrorReporter, Result, SyncError};
pub use jobs::{JobDispatcher, JobPayload, JobQueue};
pub use resources::{ChangeEvent, EventRouter, RecordRef, ResourceAdapter, ResourceRegistry};
