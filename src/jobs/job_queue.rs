use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::job_model::JobPayload;
use crate::errors::Result;

/// Capability contract for the external durable job queue.
///
/// The queue does not enforce dedup-key uniqueness itself; scheduling
/// components gate on `count_pending` before enqueueing. A job with no
/// `run_at` is eligible as soon as a worker is free.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(
        &self,
        dedup_key: &str,
        run_at: Option<DateTime<Utc>>,
        payload: JobPayload,
    ) -> Result<()>;

    /// Number of jobs still pending or running under the given dedup key.
    fn count_pending(&self, dedup_key: &str) -> Result<i64>;

    /// Deletes every pending job matching any of the given dedup keys.
    /// Jobs already executing are not affected.
    async fn delete_matching(&self, dedup_keys: &[String]) -> Result<usize>;
}
