use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crmlink_core::errors::{Result, SyncError};
use crmlink_core::resources::{FieldMap, RecordRef, ResourceAdapter};
use crmlink_core::remote::RemoteClient;

/// One observed remote call, for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Upsert(String, i64),
    BulkUpsert(String, Vec<i64>),
    Destroy(String, String),
}

/// Remote client that records calls and answers deterministically: single
/// upserts return `REMOTE-{id}`, bulk upserts return `BULK-{id}` per record
/// with all-success markers.
pub struct RecordingRemoteClient {
    calls: Mutex<Vec<RemoteCall>>,
    pub fail_bulk: bool,
}

impl RecordingRemoteClient {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_bulk: false,
        }
    }

    pub fn failing_bulk() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_bulk: true,
        }
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn record_id_of(fields: &FieldMap) -> i64 {
    fields
        .get("App_Id__c")
        .and_then(Value::as_i64)
        .expect("field sets carry App_Id__c")
}

#[async_trait]
impl RemoteClient for RecordingRemoteClient {
    async fn upsert(
        &self,
        remote_type: &str,
        _external_id_field: &str,
        fields: &FieldMap,
    ) -> Result<String> {
        let record_id = record_id_of(fields);
        self.calls
            .lock()
            .unwrap()
            .push(RemoteCall::Upsert(remote_type.to_string(), record_id));
        Ok(format!("REMOTE-{}", record_id))
    }

    async fn update(&self, _remote_type: &str, _remote_id: &str, _fields: &FieldMap) -> Result<()> {
        Ok(())
    }

    async fn bulk_upsert(
        &self,
        remote_type: &str,
        field_sets: &[FieldMap],
        _external_id_field: &str,
        _all_or_none: bool,
    ) -> Result<Value> {
        let record_ids: Vec<i64> = field_sets.iter().map(record_id_of).collect();
        self.calls.lock().unwrap().push(RemoteCall::BulkUpsert(
            remote_type.to_string(),
            record_ids.clone(),
        ));

        let marker = if self.fail_bulk { "false" } else { "true" };
        let response: Vec<Value> = record_ids
            .iter()
            .map(|id| json!({ "id": [format!("BULK-{}", id)], "success": [marker] }))
            .collect();
        Ok(json!({ "id": ["750-JOB"], "batches": [{ "response": response }] }))
    }

    async fn destroy(&self, remote_type: &str, remote_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(RemoteCall::Destroy(
            remote_type.to_string(),
            remote_id.to_string(),
        ));
        Ok(())
    }

    async fn find(&self, _remote_type: &str, remote_id: &str) -> Result<Option<Value>> {
        Ok(Some(json!({ "Id": remote_id })))
    }

    async fn query(&self, _query: &str) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }
}

/// Adapter over a fixed set of records, with optional dependencies shared
/// by every record of the type.
pub struct TestAdapter {
    remote_type: &'static str,
    records: HashSet<i64>,
    dependents: Vec<Option<RecordRef>>,
}

impl TestAdapter {
    pub fn new(remote_type: &'static str, records: impl IntoIterator<Item = i64>) -> Self {
        Self {
            remote_type,
            records: records.into_iter().collect(),
            dependents: Vec::new(),
        }
    }

    pub fn with_dependents(mut self, dependents: Vec<Option<RecordRef>>) -> Self {
        self.dependents = dependents;
        self
    }
}

#[async_trait]
impl ResourceAdapter for TestAdapter {
    fn remote_type(&self) -> &str {
        self.remote_type
    }

    fn external_id_field(&self) -> &str {
        "App_Id__c"
    }

    async fn field_map(&self, record_id: i64) -> Result<Option<FieldMap>> {
        if !self.records.contains(&record_id) {
            return Ok(None);
        }
        let mut fields = FieldMap::new();
        fields.insert("App_Id__c".to_string(), json!(record_id));
        fields.insert("Name".to_string(), json!(format!("record {}", record_id)));
        Ok(Some(fields))
    }

    async fn record_ids(&self) -> Result<Vec<i64>> {
        let mut ids: Vec<i64> = self.records.iter().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn dependent_records(&self, _record_id: i64) -> Result<Vec<Option<RecordRef>>> {
        Ok(self.dependents.clone())
    }
}

/// Error reporter that counts notifications.
#[derive(Default)]
pub struct CountingReporter {
    pub notified: Mutex<Vec<String>>,
}

impl crmlink_core::ErrorReporter for CountingReporter {
    fn notify(&self, error: &SyncError) {
        self.notified.lock().unwrap().push(error.to_string());
    }
}

#[allow(dead_code)]
pub fn ids_by_type(entries: &[(&str, Vec<i64>)]) -> HashMap<String, Vec<i64>> {
    entries
        .iter()
        .map(|(tag, ids)| (tag.to_string(), ids.clone()))
        .collect()
}
