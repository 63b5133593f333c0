use std::sync::Arc;

use log::debug;

use super::bulk_response::BulkResponse;
use crate::config::SyncConfig;
use crate::constants::BATCH_CEILING;
use crate::errors::{Result, SyncError};
use crate::identifiers::IdentifierStore;
use crate::remote::RemoteClient;
use crate::resources::{ResourceAdapter, ResourceRegistry};

/// One bounded set of record upserts against the remote service.
///
/// Errors are surfaced as typed values to the caller; there is no retry
/// here. Retry policy belongs to the worker runtime.
pub struct BulkRequest {
    remote_type: String,
    record_ids: Vec<i64>,
    registry: Arc<ResourceRegistry>,
    remote: Arc<dyn RemoteClient>,
    identifiers: Arc<dyn IdentifierStore>,
    config: Arc<SyncConfig>,
}

impl BulkRequest {
    pub fn new(
        remote_type: impl Into<String>,
        record_ids: Vec<i64>,
        registry: Arc<ResourceRegistry>,
        remote: Arc<dyn RemoteClient>,
        identifiers: Arc<dyn IdentifierStore>,
        config: Arc<SyncConfig>,
    ) -> Self {
        Self {
            remote_type: remote_type.into(),
            record_ids,
            registry,
            remote,
            identifiers,
            config,
        }
    }

    pub fn remote_type(&self) -> &str {
        &self.remote_type
    }

    pub fn record_ids(&self) -> &[i64] {
        &self.record_ids
    }

    /// Executes the request, re-chunking at the batch ceiling in case the
    /// request was constructed with more ids than one remote call permits.
    pub async fn process(&self) -> Result<()> {
        let adapter = self.registry.adapter_for_remote_type(&self.remote_type)?.clone();
        for chunk in self.record_ids.chunks(BATCH_CEILING) {
            self.process_chunk(&adapter, chunk).await?;
        }
        Ok(())
    }

    async fn process_chunk(
        &self,
        adapter: &Arc<dyn ResourceAdapter>,
        record_ids: &[i64],
    ) -> Result<()> {
        // Ids whose backing record vanished are dropped; the remaining
        // positions must line up with the response's id list.
        let mut surviving_ids = Vec::with_capacity(record_ids.len());
        let mut field_sets = Vec::with_capacity(record_ids.len());
        for &record_id in record_ids {
            match adapter.prepared_fields(record_id).await? {
                Some(fields) => {
                    surviving_ids.push(record_id);
                    field_sets.push(fields);
                }
                None => debug!(
                    "Skipping vanished record {}/{}",
                    self.remote_type, record_id
                ),
            }
        }

        if field_sets.is_empty() {
            debug!(
                "No backing records left in this chunk of {}, nothing to submit",
                self.remote_type
            );
            return Ok(());
        }

        let raw = self
            .remote
            .bulk_upsert(
                &self.remote_type,
                &field_sets,
                adapter.external_id_field(),
                true,
            )
            .await?;
        let response = BulkResponse::new(raw);

        let remote_ids = response.remote_ids();
        for (index, &record_id) in surviving_ids.iter().enumerate() {
            if self.identifiers.find(&self.remote_type, record_id)?.is_none() {
                if let Some(remote_id) = remote_ids.get(index).and_then(Option::as_deref) {
                    self.identifiers
                        .upsert(&self.remote_type, record_id, remote_id)
                        .await?;
                }
            }
            adapter.after_upsert(record_id).await?;
        }

        if !response.successful() {
            return Err(SyncError::RemoteCallFailure(
                response.error_message(&self.config)?,
            ));
        }
        Ok(())
    }
}
