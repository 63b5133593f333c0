/// Maximum number of records permitted in one remote bulk call.
pub const BATCH_CEILING: usize = 1_000;

/// Delay between bulk planner polls of outstanding batch jobs.
pub const BULK_POLL_INTERVAL_SECS: i64 = 30;

/// Suffix appended to upsert dedup keys when the job should run immediately.
pub const RUN_NOW_KEY_MARKER: &str = "-now";
