use std::sync::Arc;

use chrono::Utc;
use log::debug;

use super::resource_model::RecordRef;
use super::resource_registry::ResourceRegistry;
use crate::config::SyncConfig;
use crate::constants::RUN_NOW_KEY_MARKER;
use crate::errors::Result;
use crate::jobs::{JobPayload, JobQueue};

/// Debounced, deduplicated scheduling of one record's upsert and destroy
/// jobs.
///
/// At most one delayed and one run-now upsert job exist per record at any
/// time; uniqueness is gated on the queue's pending count per dedup key.
pub struct RecordSyncQueue {
    record: RecordRef,
    remote_type: String,
    queue: Arc<dyn JobQueue>,
    config: Arc<SyncConfig>,
}

impl RecordSyncQueue {
    pub fn new(
        record: RecordRef,
        registry: &ResourceRegistry,
        queue: Arc<dyn JobQueue>,
        config: Arc<SyncConfig>,
    ) -> Result<Self> {
        let remote_type = registry.adapter(&record.type_tag)?.remote_type().to_string();
        Ok(Self {
            record,
            remote_type,
            queue,
            config,
        })
    }

    /// Schedules an upsert job for this record unless one of the same mode
    /// is already pending. A run-now request supersedes any pending delayed
    /// job, which is cancelled first.
    pub async fn schedule_upsert(&self, run_now: bool) -> Result<()> {
        if run_now && self.upsert_pending(false)? {
            self.cancel_upsert().await?;
        }

        if !self.upsert_pending(run_now)? {
            let run_at = if run_now {
                None
            } else {
                Some(Utc::now() + self.config.debounce_window())
            };
            debug!(
                "Scheduling upsert for {} (run_now: {})",
                self.record, run_now
            );
            self.queue
                .enqueue(
                    &self.upsert_key(run_now),
                    run_at,
                    JobPayload::Upsert {
                        record: self.record.clone(),
                    },
                )
                .await?;
        }
        Ok(())
    }

    /// Deletes every pending upsert job for this record, delayed and
    /// run-now alike.
    pub async fn cancel_upsert(&self) -> Result<usize> {
        self.queue
            .delete_matching(&[self.upsert_key(false), self.upsert_key(true)])
            .await
    }

    /// Enqueues a destroy job unconditionally. Destroy is idempotent on the
    /// remote side, so repeated destroy events enqueue repeated jobs.
    pub async fn schedule_destroy(&self) -> Result<()> {
        debug!("Scheduling destroy for {}", self.record);
        self.queue
            .enqueue(
                &self.destroy_key(),
                None,
                JobPayload::Destroy {
                    record: self.record.clone(),
                },
            )
            .await
    }

    fn upsert_pending(&self, run_now: bool) -> Result<bool> {
        Ok(self.queue.count_pending(&self.upsert_key(run_now))? > 0)
    }

    pub(crate) fn upsert_key(&self, run_now: bool) -> String {
        let mut key = format!(
            "{}-upsert-{}-{}",
            self.config.job_key_prefix, self.remote_type, self.record.id
        );
        if run_now {
            key.push_str(RUN_NOW_KEY_MARKER);
        }
        key
    }

    pub(crate) fn destroy_key(&self) -> String {
        format!(
            "{}-destroy-{}-{}",
            self.config.job_key_prefix, self.remote_type, self.record.id
        )
    }
}
