use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name to wire value mapping sent to the remote service.
pub type FieldMap = HashMap<String, Value>;

/// Identity of a domain record: its registered type tag plus internal id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct RecordRef {
    pub type_tag: String,
    pub id: i64,
}

impl RecordRef {
    pub fn new(type_tag: impl Into<String>, id: i64) -> Self {
        Self {
            type_tag: type_tag.into(),
            id,
        }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_tag, self.id)
    }
}

/// A change observed on a domain record. Ephemeral, never persisted.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub event_name: String,
    pub record: RecordRef,
    pub changed_attributes: Option<HashMap<String, Value>>,
}

impl ChangeEvent {
    pub fn new(event_name: impl Into<String>, record: RecordRef) -> Self {
        Self {
            event_name: event_name.into(),
            record,
            changed_attributes: None,
        }
    }

    pub fn with_changed_attributes(mut self, changed: HashMap<String, Value>) -> Self {
        self.changed_attributes = Some(changed);
        self
    }
}
