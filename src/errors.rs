use std::sync::Arc;

use thiserror::Error;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, SyncError>;

/// Root error type for the synchronization core
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Missing record: {0}")]
    MissingRecord(String),

    #[error("Duplicate remote match for {record}: {remote_ids:?}")]
    DuplicateRemoteMatch {
        record: String,
        remote_ids: Vec<String>,
    },

    #[error("Remote call failed: {0}")]
    RemoteCallFailure(String),

    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),

    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    #[error("No adapter registered for resource type: {0}")]
    UnknownResourceType(String),
}

/// Collaborator that mirrors errors to an external collector before they
/// surface. Notification never changes whether the error propagates.
pub trait ErrorReporter: Send + Sync {
    fn notify(&self, error: &SyncError);
}

// Mirrors the error when reporting is enabled, then hands it back unchanged.
pub(crate) fn mirror(
    error: SyncError,
    reporter: Option<&Arc<dyn ErrorReporter>>,
    enabled: bool,
) -> SyncError {
    if enabled {
        if let Some(reporter) = reporter {
            reporter.notify(&error);
        }
    }
    error
}
