use serde_json::Value;

use crate::config::SyncConfig;
use crate::errors::{Result, SyncError};

/// Interprets one raw bulk-call result.
///
/// The wire format nests per-record results under `batches[].response[]`
/// and encodes booleans as the literal strings `"true"` / `"false"`.
/// Per-record `success` and `id` fields are arrays; their flattened order
/// matches the submitted record order and consumers index positionally.
pub struct BulkResponse {
    raw: Value,
}

impl BulkResponse {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// True iff every per-record success marker is the string `"true"`.
    /// A record entry without a marker reads as failure.
    pub fn successful(&self) -> bool {
        self.record_results().iter().all(|result| {
            match result.get("success").and_then(Value::as_array) {
                Some(markers) => markers.iter().all(|marker| marker.as_str() == Some("true")),
                None => false,
            }
        })
    }

    /// Returned remote ids flattened in result order. Entries without an id
    /// stay `None` so positions line up with the submitted records.
    pub fn remote_ids(&self) -> Vec<Option<String>> {
        self.record_results()
            .iter()
            .flat_map(|result| match result.get("id").and_then(Value::as_array) {
                Some(ids) => ids
                    .iter()
                    .map(|id| id.as_str().map(str::to_string))
                    .collect::<Vec<_>>(),
                None => vec![None],
            })
            .collect()
    }

    pub fn job_id(&self) -> Option<&str> {
        self.raw
            .get("id")
            .and_then(Value::as_array)
            .and_then(|ids| ids.first())
            .and_then(Value::as_str)
    }

    /// Diagnostic message pointing at the remote console page for this bulk
    /// job. Requires `remote_console_url` to be configured.
    pub fn error_message(&self, config: &SyncConfig) -> Result<String> {
        let base = config
            .remote_console_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                SyncError::ConfigurationMissing(
                    "remote console URL is required to build a bulk job URL".to_string(),
                )
            })?;
        Ok(format!(
            "Remote bulk call failed, investigate {}/{}",
            base,
            self.job_id().unwrap_or("unknown")
        ))
    }

    fn record_results(&self) -> Vec<&Value> {
        self.raw
            .get("batches")
            .and_then(Value::as_array)
            .map(|batches| {
                batches
                    .iter()
                    .flat_map(|batch| {
                        batch
                            .get("response")
                            .and_then(Value::as_array)
                            .map(|results| results.iter().collect::<Vec<_>>())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
