use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use log::{info, warn};

use super::bulk_queue_item::BulkQueueItem;
use super::bulk_request::BulkRequest;
use crate::config::SyncConfig;
use crate::constants::{BATCH_CEILING, BULK_POLL_INTERVAL_SECS};
use crate::errors::Result;
use crate::identifiers::IdentifierStore;
use crate::jobs::{BulkItemState, JobPayload, JobQueue};
use crate::remote::RemoteClient;
use crate::resources::ResourceRegistry;

/// Drives a multi-batch bulk run to completion through self-rescheduling.
///
/// Batches run strictly one at a time to respect the remote side's ceiling
/// on concurrent bulk jobs, even though the underlying queue could execute
/// them in parallel.
pub struct BulkSyncPlanner {
    items: Vec<BulkQueueItem>,
    queue: Arc<dyn JobQueue>,
    config: Arc<SyncConfig>,
}

impl BulkSyncPlanner {
    /// Plans a fresh run from a type tag to id-list request.
    ///
    /// Ids are grouped by resolved remote type in registry order (type tags
    /// sharing a remote type are merged), each group is split at the batch
    /// ceiling, and input order is preserved throughout. Tags with no
    /// registered adapter are skipped with a warning, as the original
    /// request may cover types this deployment does not integrate.
    pub fn new(
        ids_by_type: &HashMap<String, Vec<i64>>,
        registry: Arc<ResourceRegistry>,
        remote: Arc<dyn RemoteClient>,
        identifiers: Arc<dyn IdentifierStore>,
        queue: Arc<dyn JobQueue>,
        config: Arc<SyncConfig>,
    ) -> Result<Self> {
        for type_tag in ids_by_type.keys() {
            if !registry.contains(type_tag) {
                warn!("No adapter registered for {}, skipping its ids", type_tag);
            }
        }

        let mut ids_by_remote_type: Vec<(String, Vec<i64>)> = Vec::new();
        for type_tag in registry.type_tags() {
            let ids = match ids_by_type.get(type_tag) {
                Some(ids) if !ids.is_empty() => ids,
                _ => continue,
            };
            let remote_type = registry.adapter(type_tag)?.remote_type().to_string();
            match ids_by_remote_type
                .iter_mut()
                .find(|(existing, _)| *existing == remote_type)
            {
                Some((_, merged)) => merged.extend_from_slice(ids),
                None => ids_by_remote_type.push((remote_type, ids.clone())),
            }
        }

        let mut items = Vec::new();
        for (remote_type, ids) in ids_by_remote_type {
            for chunk in ids.chunks(BATCH_CEILING) {
                let request = BulkRequest::new(
                    remote_type.clone(),
                    chunk.to_vec(),
                    registry.clone(),
                    remote.clone(),
                    identifiers.clone(),
                    config.clone(),
                );
                items.push(BulkQueueItem::new(request, queue.clone(), config.clone()));
            }
        }

        Ok(Self {
            items,
            queue,
            config,
        })
    }

    /// Re-materializes a planner from the item states carried by a
    /// `ResumeBulkRun` payload.
    pub fn from_states(
        states: Vec<BulkItemState>,
        registry: Arc<ResourceRegistry>,
        remote: Arc<dyn RemoteClient>,
        identifiers: Arc<dyn IdentifierStore>,
        queue: Arc<dyn JobQueue>,
        config: Arc<SyncConfig>,
    ) -> Self {
        let items = states
            .into_iter()
            .map(|state| {
                BulkQueueItem::from_state(
                    state,
                    registry.clone(),
                    remote.clone(),
                    identifiers.clone(),
                    queue.clone(),
                    config.clone(),
                )
            })
            .collect();
        Self {
            items,
            queue,
            config,
        }
    }

    /// Runs one step of the bulk run: prunes finished batches, starts the
    /// next batch when none is outstanding, and re-enqueues itself while
    /// any batch has not yet been started.
    ///
    /// Rescheduling stops once every remaining batch has STARTED, not
    /// finished: the last batch's completion is never observed here.
    /// Callers that need the run's true end poll `finished` on the final
    /// item externally.
    pub async fn synchronise(mut self) -> Result<()> {
        if self.items.is_empty() {
            return Ok(());
        }

        let mut remaining = Vec::with_capacity(self.items.len());
        for item in self.items {
            if !item.finished()? {
                remaining.push(item);
            }
        }
        self.items = remaining;

        let mut any_processing = false;
        for item in &self.items {
            if item.processing()? {
                any_processing = true;
                break;
            }
        }

        if !any_processing {
            if let Some(item) = self.items.iter_mut().find(|item| !item.started()) {
                info!(
                    "Starting bulk batch of {} ({} records)",
                    item.request().remote_type(),
                    item.request().record_ids().len()
                );
                item.start().await?;
            }
        }

        if self.items.iter().any(|item| !item.started()) {
            let run_at = Utc::now() + Duration::seconds(BULK_POLL_INTERVAL_SECS);
            let states: Vec<BulkItemState> =
                self.items.iter().map(BulkQueueItem::to_state).collect();
            self.queue
                .enqueue(
                    &self.reschedule_key(),
                    Some(run_at),
                    JobPayload::ResumeBulkRun { items: states },
                )
                .await?;
        }
        Ok(())
    }

    pub fn items(&self) -> &[BulkQueueItem] {
        &self.items
    }

    fn reschedule_key(&self) -> String {
        format!("{}-bulk-run", self.config.job_key_prefix)
    }
}
