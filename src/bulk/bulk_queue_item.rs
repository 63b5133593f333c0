use std::sync::Arc;

use super::bulk_request::BulkRequest;
use crate::config::SyncConfig;
use crate::errors::Result;
use crate::identifiers::IdentifierStore;
use crate::jobs::{BulkItemState, JobPayload, JobQueue};
use crate::remote::RemoteClient;
use crate::resources::ResourceRegistry;

/// Lifecycle view over one submitted batch.
///
/// `processing` and `finished` are derived, not stored: a started item is
/// processing while its job is still present under the dedup key, and
/// finished once the job is gone.
///
/// The dedup key is per remote type, not per batch. Two chunks of the same
/// type started at once are indistinguishable by the presence probe; the
/// planner keeps at most one chunk outstanding to stay clear of the
/// ambiguity.
pub struct BulkQueueItem {
    request: BulkRequest,
    started: bool,
    queue: Arc<dyn JobQueue>,
    config: Arc<SyncConfig>,
}

impl BulkQueueItem {
    pub fn new(request: BulkRequest, queue: Arc<dyn JobQueue>, config: Arc<SyncConfig>) -> Self {
        Self {
            request,
            started: false,
            queue,
            config,
        }
    }

    /// Rebuilds an item from its serialized slice, as carried across a
    /// planner reschedule.
    pub fn from_state(
        state: BulkItemState,
        registry: Arc<ResourceRegistry>,
        remote: Arc<dyn RemoteClient>,
        identifiers: Arc<dyn IdentifierStore>,
        queue: Arc<dyn JobQueue>,
        config: Arc<SyncConfig>,
    ) -> Self {
        let request = BulkRequest::new(
            state.remote_type,
            state.record_ids,
            registry,
            remote,
            identifiers,
            config.clone(),
        );
        Self {
            request,
            started: state.started,
            queue,
            config,
        }
    }

    pub fn to_state(&self) -> BulkItemState {
        BulkItemState {
            remote_type: self.request.remote_type().to_string(),
            record_ids: self.request.record_ids().to_vec(),
            started: self.started,
        }
    }

    /// Submits the batch-processing job and marks this item started.
    pub async fn start(&mut self) -> Result<()> {
        self.queue
            .enqueue(
                &self.dedup_key(),
                None,
                JobPayload::ProcessBatch {
                    remote_type: self.request.remote_type().to_string(),
                    record_ids: self.request.record_ids().to_vec(),
                },
            )
            .await?;
        self.started = true;
        Ok(())
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn processing(&self) -> Result<bool> {
        Ok(self.started && self.in_queue()?)
    }

    pub fn finished(&self) -> Result<bool> {
        Ok(self.started && !self.in_queue()?)
    }

    pub fn request(&self) -> &BulkRequest {
        &self.request
    }

    fn in_queue(&self) -> Result<bool> {
        Ok(self.queue.count_pending(&self.dedup_key())? > 0)
    }

    fn dedup_key(&self) -> String {
        format!(
            "{}-bulk-{}",
            self.config.job_key_prefix,
            self.request.remote_type()
        )
    }
}
