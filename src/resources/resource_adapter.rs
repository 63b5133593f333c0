use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::resource_model::{FieldMap, RecordRef};
use crate::errors::Result;

/// Per-type contract between the synchronization core and the embedding
/// application's domain records.
///
/// One adapter is registered per integrated record type. Adapters own
/// record loading and the mapping to remote field sets; the core never
/// touches domain storage directly.
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    /// Name of this resource on the remote service.
    fn remote_type(&self) -> &str;

    /// Name of the external id field on the remote service.
    fn external_id_field(&self) -> &str;

    /// Wire field set for one record, or `None` when the record no longer
    /// exists.
    async fn field_map(&self, record_id: i64) -> Result<Option<FieldMap>>;

    /// Every id of this resource type, for full resynchronisation runs.
    async fn record_ids(&self) -> Result<Vec<i64>>;

    /// Maximum lengths enforced on outgoing field values. A limit of 0
    /// disables truncation for that field.
    fn field_limits(&self) -> HashMap<String, usize> {
        HashMap::new()
    }

    /// Whether this event warrants an upsert. Default is to always upsert;
    /// override to restrict to specific events or changed attributes.
    fn requires_upsert(
        &self,
        _event_name: &str,
        _changed_attributes: Option<&HashMap<String, Value>>,
    ) -> bool {
        true
    }

    /// Records that must exist remotely before this one is upserted.
    /// Absent entries are skipped by the router.
    async fn dependent_records(&self, _record_id: i64) -> Result<Vec<Option<RecordRef>>> {
        Ok(Vec::new())
    }

    /// Remote query locating a pre-existing counterpart of an
    /// unsynchronised record, checked before creating a new remote record.
    /// `None` skips the lookup entirely.
    async fn remote_match_query(&self, _record_id: i64) -> Result<Option<String>> {
        Ok(None)
    }

    /// Invoked after every confirmed upsert of a record.
    async fn after_upsert(&self, _record_id: i64) -> Result<()> {
        Ok(())
    }

    /// Field set with `field_limits` applied.
    async fn prepared_fields(&self, record_id: i64) -> Result<Option<FieldMap>> {
        let fields = match self.field_map(record_id).await? {
            Some(fields) => fields,
            None => return Ok(None),
        };
        let limits = self.field_limits();

        Ok(Some(
            fields
                .into_iter()
                .map(|(name, value)| {
                    let value = match limits.get(&name) {
                        Some(&limit) if limit > 0 => truncate_field(value, limit),
                        _ => value,
                    };
                    (name, value)
                })
                .collect(),
        ))
    }
}

// Text values keep a "..." marker within the limit; numeric values are cut
// plain and become strings once cut. Limits count characters, not bytes.
fn truncate_field(value: Value, limit: usize) -> Value {
    match value {
        Value::String(text) => {
            if text.chars().count() <= limit {
                return Value::String(text);
            }
            if limit > 3 {
                let kept: String = text.chars().take(limit - 3).collect();
                Value::String(format!("{kept}..."))
            } else {
                Value::String(text.chars().take(limit).collect())
            }
        }
        Value::Number(number) => {
            let digits = number.to_string();
            if digits.chars().count() <= limit {
                Value::Number(number)
            } else {
                Value::String(digits.chars().take(limit).collect())
            }
        }
        other => other,
    }
}
