use std::collections::HashMap;
use std::sync::Arc;

use log::warn;
use serde_json::Value;

use crate::bulk::BulkSyncPlanner;
use crate::config::SyncConfig;
use crate::errors::{mirror, ErrorReporter, Result, SyncError};
use crate::identifiers::{IdentifierFilter, IdentifierStore};
use crate::jobs::{JobDispatcher, JobQueue};
use crate::remote::RemoteClient;
use crate::resources::{
    ChangeEvent, EventRouter, RecordAction, RecordRef, RecordSyncQueue, ResourceRegistry,
};

/// Entry surface for the embedding application.
///
/// Holds the wiring once and exposes the event path, the bulk path and the
/// synchronous lookups. Errors from the immediate path propagate to the
/// caller after an optional mirror to the error reporter.
pub struct SyncApi {
    registry: Arc<ResourceRegistry>,
    queue: Arc<dyn JobQueue>,
    identifiers: Arc<dyn IdentifierStore>,
    remote: Arc<dyn RemoteClient>,
    config: Arc<SyncConfig>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    router: EventRouter,
}

impl SyncApi {
    pub fn new(
        registry: Arc<ResourceRegistry>,
        queue: Arc<dyn JobQueue>,
        identifiers: Arc<dyn IdentifierStore>,
        remote: Arc<dyn RemoteClient>,
        config: Arc<SyncConfig>,
        reporter: Option<Arc<dyn ErrorReporter>>,
    ) -> Self {
        let router = EventRouter::new(
            registry.clone(),
            queue.clone(),
            identifiers.clone(),
            config.clone(),
        );
        Self {
            registry,
            queue,
            identifiers,
            remote,
            config,
            reporter,
            router,
        }
    }

    /// Routes one change event into scheduling decisions.
    pub async fn route_event(&self, event: &ChangeEvent) -> Result<()> {
        self.router
            .route(event)
            .await
            .map_err(|error| self.surface(error))
    }

    /// Schedules an immediate upsert for one record, bypassing the debounce
    /// window.
    pub async fn synchronise_now(&self, record: RecordRef) -> Result<()> {
        let record_queue = RecordSyncQueue::new(
            record,
            &self.registry,
            self.queue.clone(),
            self.config.clone(),
        )
        .map_err(|error| self.surface(error))?;
        record_queue
            .schedule_upsert(true)
            .await
            .map_err(|error| self.surface(error))
    }

    /// Plans and kicks off a bulk run for the given ids, grouped by type
    /// tag.
    pub async fn bulk_synchronise(&self, ids_by_type: &HashMap<String, Vec<i64>>) -> Result<()> {
        let planner = self
            .planner(ids_by_type)
            .map_err(|error| self.surface(error))?;
        planner
            .synchronise()
            .await
            .map_err(|error| self.surface(error))
    }

    pub fn is_synchronised(&self, record: &RecordRef) -> Result<bool> {
        Ok(self.remote_id(record)?.is_some())
    }

    pub fn remote_id(&self, record: &RecordRef) -> Result<Option<String>> {
        let remote_type = self.registry.adapter(&record.type_tag)?.remote_type();
        self.identifiers.find(remote_type, record.id)
    }

    /// Console URL of the record's remote counterpart, `None` when the
    /// record was never synchronised.
    pub fn record_url(&self, record: &RecordRef) -> Result<Option<String>> {
        let base = self
            .config
            .remote_console_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                SyncError::ConfigurationMissing(
                    "remote console URL is required to build record URLs".to_string(),
                )
            })?;
        Ok(self
            .remote_id(record)?
            .map(|remote_id| format!("{}/{}", base, remote_id)))
    }

    /// Fetches the record's remote counterpart.
    pub async fn fetch(&self, record: &RecordRef) -> Result<Option<Value>> {
        RecordAction::new(
            record.clone(),
            &self.registry,
            self.remote.clone(),
            self.identifiers.clone(),
        )?
        .fetch()
        .await
    }

    /// Raw query passthrough against the remote service.
    pub async fn query(&self, query: &str) -> Result<Vec<Value>> {
        self.remote.query(query).await
    }

    /// Drops every stored remote identifier, then bulk-synchronises every
    /// record of every registered type from scratch.
    ///
    /// Destructive: intended for filling a sandbox environment, not for
    /// production reconciliation.
    pub async fn platform_reset(&self) -> Result<()> {
        warn!("Resetting remote identifiers for every registered resource type");
        self.identifiers.delete_matching(IdentifierFilter::All).await?;

        let mut ids_by_type = HashMap::new();
        for type_tag in self.registry.type_tags() {
            let adapter = self.registry.adapter(type_tag)?;
            ids_by_type.insert(type_tag.clone(), adapter.record_ids().await?);
        }
        self.bulk_synchronise(&ids_by_type).await
    }

    /// Dispatcher wired to the same collaborators, for the worker runtime.
    pub fn dispatcher(&self) -> JobDispatcher {
        JobDispatcher::new(
            self.registry.clone(),
            self.remote.clone(),
            self.identifiers.clone(),
            self.queue.clone(),
            self.config.clone(),
            self.reporter.clone(),
        )
    }

    fn planner(&self, ids_by_type: &HashMap<String, Vec<i64>>) -> Result<BulkSyncPlanner> {
        BulkSyncPlanner::new(
            ids_by_type,
            self.registry.clone(),
            self.remote.clone(),
            self.identifiers.clone(),
            self.queue.clone(),
            self.config.clone(),
        )
    }

    fn surface(&self, error: SyncError) -> SyncError {
        mirror(error, self.reporter.as_ref(), self.config.report_errors)
    }
}
