use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::job_model::JobPayload;
use super::job_queue::JobQueue;
use crate::errors::Result;

/// One queued job as held by [`InMemoryJobQueue`].
#[derive(Debug, Clone)]
pub struct PendingJob {
    pub id: String,
    pub run_at: Option<DateTime<Utc>>,
    pub payload: JobPayload,
}

/// In-memory job queue keyed by dedup key.
///
/// Reference implementation for embedding tests and local development; a
/// production deployment backs [`JobQueue`] with its durable queue instead.
#[derive(Default)]
pub struct InMemoryJobQueue {
    jobs: DashMap<String, Vec<PendingJob>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending jobs under one dedup key, in enqueue order.
    pub fn jobs_for(&self, dedup_key: &str) -> Vec<PendingJob> {
        self.jobs
            .get(dedup_key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Every pending job with its dedup key, in no particular key order.
    pub fn all_jobs(&self) -> Vec<(String, PendingJob)> {
        self.jobs
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .map(|job| (entry.key().clone(), job.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn total_pending(&self) -> usize {
        self.jobs.iter().map(|entry| entry.value().len()).sum()
    }

    /// Removes and returns every pending job, simulating workers draining
    /// the queue.
    pub fn drain(&self) -> Vec<(String, PendingJob)> {
        let keys: Vec<String> = self.jobs.iter().map(|entry| entry.key().clone()).collect();
        let mut drained = Vec::new();
        for key in keys {
            if let Some((_, jobs)) = self.jobs.remove(&key) {
                drained.extend(jobs.into_iter().map(|job| (key.clone(), job)));
            }
        }
        drained
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(
        &self,
        dedup_key: &str,
        run_at: Option<DateTime<Utc>>,
        payload: JobPayload,
    ) -> Result<()> {
        self.jobs
            .entry(dedup_key.to_string())
            .or_default()
            .push(PendingJob {
                id: Uuid::new_v4().to_string(),
                run_at,
                payload,
            });
        Ok(())
    }

    fn count_pending(&self, dedup_key: &str) -> Result<i64> {
        Ok(self
            .jobs
            .get(dedup_key)
            .map(|entry| entry.value().len() as i64)
            .unwrap_or(0))
    }

    async fn delete_matching(&self, dedup_keys: &[String]) -> Result<usize> {
        let mut deleted = 0;
        for key in dedup_keys {
            if let Some((_, jobs)) = self.jobs.remove(key) {
                deleted += jobs.len();
            }
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::RecordRef;

    fn payload(id: i64) -> JobPayload {
        JobPayload::Upsert {
            record: RecordRef::new("user", id),
        }
    }

    #[tokio::test]
    async fn counts_and_deletes_by_key() {
        let queue = InMemoryJobQueue::new();
        queue.enqueue("a", None, payload(1)).await.unwrap();
        queue.enqueue("a", None, payload(2)).await.unwrap();
        queue.enqueue("b", None, payload(3)).await.unwrap();

        assert_eq!(queue.count_pending("a").unwrap(), 2);
        assert_eq!(queue.count_pending("b").unwrap(), 1);
        assert_eq!(queue.count_pending("missing").unwrap(), 0);

        let deleted = queue
            .delete_matching(&["a".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(queue.count_pending("a").unwrap(), 0);
        assert_eq!(queue.total_pending(), 1);
    }

    #[tokio::test]
    async fn drain_empties_the_queue() {
        let queue = InMemoryJobQueue::new();
        queue.enqueue("a", None, payload(1)).await.unwrap();
        queue.enqueue("b", None, payload(2)).await.unwrap();

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(queue.total_pending(), 0);
    }
}
