use async_trait::async_trait;
use dashmap::DashMap;

use super::identifier_store::{IdentifierFilter, IdentifierStore};
use crate::errors::Result;

/// In-memory identifier store, keyed by (remote type, internal id).
///
/// Reference implementation for embedding tests and local development.
#[derive(Default)]
pub struct InMemoryIdentifierStore {
    identifiers: DashMap<(String, i64), String>,
}

impl InMemoryIdentifierStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

#[async_trait]
impl IdentifierStore for InMemoryIdentifierStore {
    fn find(&self, remote_type: &str, record_id: i64) -> Result<Option<String>> {
        Ok(self
            .identifiers
            .get(&(remote_type.to_string(), record_id))
            .map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, remote_type: &str, record_id: i64, remote_id: &str) -> Result<()> {
        self.identifiers
            .insert((remote_type.to_string(), record_id), remote_id.to_string());
        Ok(())
    }

    async fn delete_matching(&self, filter: IdentifierFilter) -> Result<usize> {
        match filter {
            IdentifierFilter::All => {
                let deleted = self.identifiers.len();
                self.identifiers.clear();
                Ok(deleted)
            }
            IdentifierFilter::ByRemoteId(remote_id) => {
                let keys: Vec<(String, i64)> = self
                    .identifiers
                    .iter()
                    .filter(|entry| entry.value() == &remote_id)
                    .map(|entry| entry.key().clone())
                    .collect();
                let deleted = keys.len();
                for key in keys {
                    self.identifiers.remove(&key);
                }
                Ok(deleted)
            }
        }
    }
}
