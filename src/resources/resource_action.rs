use std::sync::Arc;

use log::debug;
use serde_json::Value;

use super::resource_adapter::ResourceAdapter;
use super::resource_model::{FieldMap, RecordRef};
use super::resource_registry::ResourceRegistry;
use crate::errors::{Result, SyncError};
use crate::identifiers::{IdentifierFilter, IdentifierStore};
use crate::remote::RemoteClient;

/// Executes one record's remote call on the worker side.
pub struct RecordAction {
    record: RecordRef,
    adapter: Arc<dyn ResourceAdapter>,
    remote: Arc<dyn RemoteClient>,
    identifiers: Arc<dyn IdentifierStore>,
}

impl RecordAction {
    pub fn new(
        record: RecordRef,
        registry: &ResourceRegistry,
        remote: Arc<dyn RemoteClient>,
        identifiers: Arc<dyn IdentifierStore>,
    ) -> Result<Self> {
        let adapter = registry.adapter(&record.type_tag)?.clone();
        Ok(Self {
            record,
            adapter,
            remote,
            identifiers,
        })
    }

    /// Upserts the record remotely and stores the confirmed remote id.
    ///
    /// An unsynchronised record whose adapter declares a match query is
    /// looked up first: a single match is updated in place instead of
    /// created, and more than one match is ambiguous and fails.
    pub async fn upsert(&self) -> Result<()> {
        let fields = self
            .adapter
            .prepared_fields(self.record.id)
            .await?
            .ok_or_else(|| {
                SyncError::MissingRecord(format!(
                    "{}/{}",
                    self.adapter.remote_type(),
                    self.record.id
                ))
            })?;

        let match_query = if self.remote_id()?.is_some() {
            None
        } else {
            self.adapter.remote_match_query(self.record.id).await?
        };

        let query = match match_query {
            Some(query) => query,
            None => return self.upsert_record(&fields).await,
        };

        let matches = self.remote.query(&query).await?;
        match matches.len() {
            0 => self.upsert_record(&fields).await,
            1 => self.update_record(&matches[0], &fields).await,
            _ => Err(SyncError::DuplicateRemoteMatch {
                record: self.record.to_string(),
                remote_ids: matches.iter().filter_map(match_id).collect(),
            }),
        }
    }

    /// Destroys the remote counterpart and forgets its identifier. A record
    /// that was never synchronised is a no-op.
    pub async fn destroy(&self) -> Result<()> {
        let remote_id = match self.remote_id()? {
            Some(remote_id) => remote_id,
            None => {
                debug!("{} was never synchronised, nothing to destroy", self.record);
                return Ok(());
            }
        };

        self.remote
            .destroy(self.adapter.remote_type(), &remote_id)
            .await?;
        self.identifiers
            .delete_matching(IdentifierFilter::ByRemoteId(remote_id))
            .await?;
        Ok(())
    }

    /// Fetches the remote counterpart, `None` when never synchronised or
    /// absent remotely.
    pub async fn fetch(&self) -> Result<Option<Value>> {
        match self.remote_id()? {
            Some(remote_id) => {
                self.remote
                    .find(self.adapter.remote_type(), &remote_id)
                    .await
            }
            None => Ok(None),
        }
    }

    async fn upsert_record(&self, fields: &FieldMap) -> Result<()> {
        let remote_id = self
            .remote
            .upsert(
                self.adapter.remote_type(),
                self.adapter.external_id_field(),
                fields,
            )
            .await?;
        self.store_remote_id(&remote_id).await?;
        self.adapter.after_upsert(self.record.id).await
    }

    async fn update_record(&self, matched: &Value, fields: &FieldMap) -> Result<()> {
        let remote_id = match_id(matched).ok_or_else(|| {
            SyncError::RemoteCallFailure(format!(
                "remote match for {} carries no Id field",
                self.record
            ))
        })?;
        self.remote
            .update(self.adapter.remote_type(), &remote_id, fields)
            .await?;
        self.store_remote_id(&remote_id).await
    }

    fn remote_id(&self) -> Result<Option<String>> {
        self.identifiers
            .find(self.adapter.remote_type(), self.record.id)
    }

    async fn store_remote_id(&self, remote_id: &str) -> Result<()> {
        if remote_id.is_empty() {
            return Ok(());
        }
        self.identifiers
            .upsert(self.adapter.remote_type(), self.record.id, remote_id)
            .await
    }
}

fn match_id(matched: &Value) -> Option<String> {
    matched
        .get("Id")
        .and_then(Value::as_str)
        .map(str::to_string)
}
