use async_trait::async_trait;

use crate::errors::Result;

/// Selects which stored identifiers a delete targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierFilter {
    All,
    ByRemoteId(String),
}

/// Capability contract for persisted (remote type, internal id) -> remote id
/// mappings.
///
/// A mapping is written only after a confirmed successful remote write.
/// Writes must be idempotent: two jobs storing the same key concurrently
/// resolve last-write-wins.
#[async_trait]
pub trait IdentifierStore: Send + Sync {
    fn find(&self, remote_type: &str, record_id: i64) -> Result<Option<String>>;

    async fn upsert(&self, remote_type: &str, record_id: i64, remote_id: &str) -> Result<()>;

    async fn delete_matching(&self, filter: IdentifierFilter) -> Result<usize>;
}
