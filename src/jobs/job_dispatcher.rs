use std::sync::Arc;

use super::job_model::JobPayload;
use super::job_queue::JobQueue;
use crate::bulk::{BulkRequest, BulkSyncPlanner};
use crate::config::SyncConfig;
use crate::errors::{mirror, ErrorReporter, Result};
use crate::identifiers::IdentifierStore;
use crate::remote::RemoteClient;
use crate::resources::{RecordAction, ResourceRegistry};

/// Worker-side switch executing dequeued payloads.
///
/// The worker runtime deserializes a job's payload and hands it here; this
/// is the single dispatch point for every deferred unit the core enqueues.
/// Failed jobs are mirrored to the error reporter when configured, then
/// surface unchanged. Retry policy stays with the worker runtime.
pub struct JobDispatcher {
    registry: Arc<ResourceRegistry>,
    remote: Arc<dyn RemoteClient>,
    identifiers: Arc<dyn IdentifierStore>,
    queue: Arc<dyn JobQueue>,
    config: Arc<SyncConfig>,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl JobDispatcher {
    pub fn new(
        registry: Arc<ResourceRegistry>,
        remote: Arc<dyn RemoteClient>,
        identifiers: Arc<dyn IdentifierStore>,
        queue: Arc<dyn JobQueue>,
        config: Arc<SyncConfig>,
        reporter: Option<Arc<dyn ErrorReporter>>,
    ) -> Self {
        Self {
            registry,
            remote,
            identifiers,
            queue,
            config,
            reporter,
        }
    }

    pub async fn dispatch(&self, payload: JobPayload) -> Result<()> {
        self.run(payload).await.map_err(|error| {
            mirror(error, self.reporter.as_ref(), self.config.report_errors)
        })
    }

    async fn run(&self, payload: JobPayload) -> Result<()> {
        match payload {
            JobPayload::Upsert { record } => {
                RecordAction::new(
                    record,
                    &self.registry,
                    self.remote.clone(),
                    self.identifiers.clone(),
                )?
                .upsert()
                .await
            }
            JobPayload::Destroy { record } => {
                RecordAction::new(
                    record,
                    &self.registry,
                    self.remote.clone(),
                    self.identifiers.clone(),
                )?
                .destroy()
                .await
            }
            JobPayload::ProcessBatch {
                remote_type,
                record_ids,
            } => {
                BulkRequest::new(
                    remote_type,
                    record_ids,
                    self.registry.clone(),
                    self.remote.clone(),
                    self.identifiers.clone(),
                    self.config.clone(),
                )
                .process()
                .await
            }
            JobPayload::ResumeBulkRun { items } => {
                BulkSyncPlanner::from_states(
                    items,
                    self.registry.clone(),
                    self.remote.clone(),
                    self.identifiers.clone(),
                    self.queue.clone(),
                    self.config.clone(),
                )
                .synchronise()
                .await
            }
        }
    }
}
