use serde::{Deserialize, Serialize};

use crate::resources::RecordRef;

/// Payload of one deferred unit of work, executed by the worker-side
/// dispatch switch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JobPayload {
    Upsert {
        record: RecordRef,
    },
    Destroy {
        record: RecordRef,
    },
    ProcessBatch {
        remote_type: String,
        record_ids: Vec<i64>,
    },
    /// Continuation of a bulk run; re-materialized into a planner on the
    /// worker side.
    ResumeBulkRun {
        items: Vec<BulkItemState>,
    },
}

/// Serializable slice of a bulk queue item carried across planner
/// reschedules. `finished` is never serialized: it is always re-derived
/// from queue presence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemState {
    pub remote_type: String,
    pub record_ids: Vec<i64>,
    pub started: bool,
}
