use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::SyncConfig;
use crate::errors::{Result, SyncError};
use crate::identifiers::{IdentifierStore, InMemoryIdentifierStore};
use crate::jobs::{InMemoryJobQueue, JobQueue};
use crate::resources::{
    ChangeEvent, EventRouter, FieldMap, RecordRef, ResourceAdapter, ResourceRegistry,
};

struct OrgAdapter;

#[async_trait]
impl ResourceAdapter for OrgAdapter {
    fn remote_type(&self) -> &str {
        "Account"
    }

    fn external_id_field(&self) -> &str {
        "App_Id__c"
    }

    async fn field_map(&self, record_id: i64) -> Result<Option<FieldMap>> {
        let mut fields = FieldMap::new();
        fields.insert("App_Id__c".to_string(), json!(record_id));
        Ok(Some(fields))
    }

    async fn record_ids(&self) -> Result<Vec<i64>> {
        Ok(Vec::new())
    }
}

struct UserAdapter {
    requires_upsert: bool,
    dependents: Vec<Option<RecordRef>>,
}

impl UserAdapter {
    fn plain() -> Self {
        Self {
            requires_upsert: true,
            dependents: Vec::new(),
        }
    }
}

#[async_trait]
impl ResourceAdapter for UserAdapter {
    fn remote_type(&self) -> &str {
        "Contact"
    }

    fn external_id_field(&self) -> &str {
        "App_Id__c"
    }

    async fn field_map(&self, record_id: i64) -> Result<Option<FieldMap>> {
        let mut fields = FieldMap::new();
        fields.insert("App_Id__c".to_string(), json!(record_id));
        Ok(Some(fields))
    }

    async fn record_ids(&self) -> Result<Vec<i64>> {
        Ok(Vec::new())
    }

    fn requires_upsert(
        &self,
        _event_name: &str,
        _changed_attributes: Option<&HashMap<String, Value>>,
    ) -> bool {
        self.requires_upsert
    }

    async fn dependent_records(&self, _record_id: i64) -> Result<Vec<Option<RecordRef>>> {
        Ok(self.dependents.clone())
    }
}

struct Harness {
    queue: Arc<InMemoryJobQueue>,
    identifiers: Arc<InMemoryIdentifierStore>,
    router: EventRouter,
}

fn harness(user_adapter: UserAdapter, config: SyncConfig) -> Harness {
    let mut registry = ResourceRegistry::new();
    registry.register("user", Arc::new(user_adapter));
    registry.register("org", Arc::new(OrgAdapter));

    let queue = Arc::new(InMemoryJobQueue::new());
    let identifiers = Arc::new(InMemoryIdentifierStore::new());
    let router = EventRouter::new(
        Arc::new(registry),
        queue.clone(),
        identifiers.clone(),
        Arc::new(config),
    );
    Harness {
        queue,
        identifiers,
        router,
    }
}

const USER_DELAYED_KEY: &str = "crm-sync-upsert-Contact-1";
const USER_DESTROY_KEY: &str = "crm-sync-destroy-Contact-1";
const ORG_NOW_KEY: &str = "crm-sync-upsert-Account-9-now";

#[tokio::test]
async fn upsert_event_schedules_a_delayed_upsert() {
    let harness = harness(UserAdapter::plain(), SyncConfig::default());
    let event = ChangeEvent::new("user.updated", RecordRef::new("user", 1));

    harness.router.route(&event).await.unwrap();

    assert_eq!(harness.queue.count_pending(USER_DELAYED_KEY).unwrap(), 1);
    assert_eq!(harness.queue.total_pending(), 1);
}

#[tokio::test]
async fn destroy_event_cancels_pending_upserts_before_scheduling_destroy() {
    let harness = harness(UserAdapter::plain(), SyncConfig::default());

    let update = ChangeEvent::new("user.updated", RecordRef::new("user", 1));
    harness.router.route(&update).await.unwrap();
    assert_eq!(harness.queue.count_pending(USER_DELAYED_KEY).unwrap(), 1);

    let destroy = ChangeEvent::new("user.destroyed", RecordRef::new("user", 1));
    harness.router.route(&destroy).await.unwrap();

    assert_eq!(harness.queue.count_pending(USER_DELAYED_KEY).unwrap(), 0);
    assert_eq!(harness.queue.count_pending(USER_DESTROY_KEY).unwrap(), 1);
}

#[tokio::test]
async fn no_job_is_enqueued_when_upsert_is_not_required() {
    let harness = harness(
        UserAdapter {
            requires_upsert: false,
            dependents: vec![Some(RecordRef::new("org", 9))],
        },
        SyncConfig::default(),
    );
    let event = ChangeEvent::new("user.created", RecordRef::new("user", 1));

    harness.router.route(&event).await.unwrap();

    assert_eq!(harness.queue.total_pending(), 0);
}

#[tokio::test]
async fn unknown_event_suffix_is_rejected() {
    let harness = harness(UserAdapter::plain(), SyncConfig::default());
    let event = ChangeEvent::new("user.archived", RecordRef::new("user", 1));

    let error = harness.router.route(&event).await.unwrap_err();
    assert!(matches!(error, SyncError::UnknownEventKind(_)));
    assert_eq!(harness.queue.total_pending(), 0);
}

#[tokio::test]
async fn unsynchronised_dependency_is_scheduled_immediately() {
    let harness = harness(
        UserAdapter {
            requires_upsert: true,
            dependents: vec![None, Some(RecordRef::new("org", 9))],
        },
        SyncConfig::default(),
    );
    let event = ChangeEvent::new("user.updated", RecordRef::new("user", 1));

    harness.router.route(&event).await.unwrap();

    let org_jobs = harness.queue.jobs_for(ORG_NOW_KEY);
    assert_eq!(org_jobs.len(), 1);
    assert!(org_jobs[0].run_at.is_none());
    assert_eq!(harness.queue.count_pending(USER_DELAYED_KEY).unwrap(), 1);
    // The absent dependency entry contributes nothing.
    assert_eq!(harness.queue.total_pending(), 2);
}

#[tokio::test]
async fn synchronised_dependency_is_not_rescheduled() {
    let harness = harness(
        UserAdapter {
            requires_upsert: true,
            dependents: vec![Some(RecordRef::new("org", 9))],
        },
        SyncConfig::default(),
    );
    harness
        .identifiers
        .upsert("Account", 9, "001-ORG")
        .await
        .unwrap();

    let event = ChangeEvent::new("user.updated", RecordRef::new("user", 1));
    harness.router.route(&event).await.unwrap();

    assert_eq!(harness.queue.count_pending(ORG_NOW_KEY).unwrap(), 0);
    assert_eq!(harness.queue.count_pending(USER_DELAYED_KEY).unwrap(), 1);
}

#[tokio::test]
async fn inactive_configuration_ignores_events() {
    let harness = harness(
        UserAdapter::plain(),
        SyncConfig {
            active: false,
            ..SyncConfig::default()
        },
    );
    let event = ChangeEvent::new("user.updated", RecordRef::new("user", 1));

    harness.router.route(&event).await.unwrap();

    assert_eq!(harness.queue.total_pending(), 0);
}

#[tokio::test]
async fn destroy_suffixes_win_over_upsert_suffixes() {
    let config = SyncConfig {
        destroy_event_suffixes: vec![".removed".to_string()],
        upsert_event_suffixes: vec![".removed".to_string()],
        ..SyncConfig::default()
    };
    let harness = harness(UserAdapter::plain(), config);
    let event = ChangeEvent::new("user.removed", RecordRef::new("user", 1));

    harness.router.route(&event).await.unwrap();

    assert_eq!(harness.queue.count_pending(USER_DESTROY_KEY).unwrap(), 1);
    assert_eq!(harness.queue.count_pending(USER_DELAYED_KEY).unwrap(), 0);
}
