use std::sync::Arc;

use log::debug;

use super::resource_model::{ChangeEvent, RecordRef};
use super::resource_queue::RecordSyncQueue;
use super::resource_registry::ResourceRegistry;
use crate::config::SyncConfig;
use crate::errors::{Result, SyncError};
use crate::identifiers::IdentifierStore;
use crate::jobs::JobQueue;

#[derive(Debug, PartialEq, Eq)]
enum EventKind {
    Destroy,
    Upsert,
}

/// Turns named change events into scheduling decisions.
///
/// Destroy events cancel any pending upserts before the destroy job is
/// scheduled. Upsert events pre-schedule immediate upserts for any
/// unsynchronised dependencies, then a debounced upsert for the record
/// itself. Pre-scheduling is a hint: the dependency's job competes for
/// workers like any other, so completion order is not guaranteed.
pub struct EventRouter {
    registry: Arc<ResourceRegistry>,
    queue: Arc<dyn JobQueue>,
    identifiers: Arc<dyn IdentifierStore>,
    config: Arc<SyncConfig>,
}

impl EventRouter {
    pub fn new(
        registry: Arc<ResourceRegistry>,
        queue: Arc<dyn JobQueue>,
        identifiers: Arc<dyn IdentifierStore>,
        config: Arc<SyncConfig>,
    ) -> Self {
        Self {
            registry,
            queue,
            identifiers,
            config,
        }
    }

    pub async fn route(&self, event: &ChangeEvent) -> Result<()> {
        if !self.config.active {
            debug!("Synchronization inactive, ignoring {}", event.event_name);
            return Ok(());
        }

        match self.classify(&event.event_name)? {
            EventKind::Destroy => self.route_destroy(event).await,
            EventKind::Upsert => self.route_upsert(event).await,
        }
    }

    // Destroy suffixes are checked before upsert suffixes; first match wins.
    fn classify(&self, event_name: &str) -> Result<EventKind> {
        if ends_with_any(event_name, &self.config.destroy_event_suffixes) {
            Ok(EventKind::Destroy)
        } else if ends_with_any(event_name, &self.config.upsert_event_suffixes) {
            Ok(EventKind::Upsert)
        } else {
            Err(SyncError::UnknownEventKind(event_name.to_string()))
        }
    }

    async fn route_destroy(&self, event: &ChangeEvent) -> Result<()> {
        let queue = self.record_queue(&event.record)?;
        queue.cancel_upsert().await?;
        queue.schedule_destroy().await
    }

    async fn route_upsert(&self, event: &ChangeEvent) -> Result<()> {
        let adapter = self.registry.adapter(&event.record.type_tag)?;
        if !adapter.requires_upsert(&event.event_name, event.changed_attributes.as_ref()) {
            debug!(
                "Upsert not required for {} on {}",
                event.record, event.event_name
            );
            return Ok(());
        }

        for dependent in adapter.dependent_records(event.record.id).await? {
            let dependent = match dependent {
                Some(dependent) => dependent,
                None => continue,
            };
            if !self.is_synchronised(&dependent)? {
                debug!(
                    "Pre-scheduling dependency {} of {}",
                    dependent, event.record
                );
                self.record_queue(&dependent)?.schedule_upsert(true).await?;
            }
        }

        self.record_queue(&event.record)?.schedule_upsert(false).await
    }

    fn is_synchronised(&self, record: &RecordRef) -> Result<bool> {
        let remote_type = self.registry.adapter(&record.type_tag)?.remote_type();
        Ok(self.identifiers.find(remote_type, record.id)?.is_some())
    }

    fn record_queue(&self, record: &RecordRef) -> Result<RecordSyncQueue> {
        RecordSyncQueue::new(
            record.clone(),
            &self.registry,
            self.queue.clone(),
            self.config.clone(),
        )
    }
}

fn ends_with_any(event_name: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| event_name.ends_with(suffix))
}
