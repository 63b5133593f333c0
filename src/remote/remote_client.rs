use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;
use crate::resources::FieldMap;

/// Capability contract for the remote record-keeping service.
///
/// Implementations own transport, authentication and serialization details.
/// Transport failures surface as `SyncError::RemoteCallFailure`.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Creates or updates one remote record, returning its remote id.
    async fn upsert(
        &self,
        remote_type: &str,
        external_id_field: &str,
        fields: &FieldMap,
    ) -> Result<String>;

    /// Updates an existing remote record in place.
    async fn update(&self, remote_type: &str, remote_id: &str, fields: &FieldMap) -> Result<()>;

    /// Submits one bounded batch of field sets, returning the raw batch
    /// result for `BulkResponse` to interpret.
    async fn bulk_upsert(
        &self,
        remote_type: &str,
        field_sets: &[FieldMap],
        external_id_field: &str,
        all_or_none: bool,
    ) -> Result<Value>;

    async fn destroy(&self, remote_type: &str, remote_id: &str) -> Result<()>;

    async fn find(&self, remote_type: &str, remote_id: &str) -> Result<Option<Value>>;

    async fn query(&self, query: &str) -> Result<Vec<Value>>;
}
