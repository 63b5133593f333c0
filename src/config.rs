use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Configuration for the synchronization core, constructed once at startup
/// and passed by reference into each component.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// When false, change events are accepted but never scheduled.
    pub active: bool,
    /// Mirror raised errors to the configured reporter.
    pub report_errors: bool,
    /// Minimum delay between observing a change and its upsert job becoming
    /// eligible to run.
    pub debounce_window_secs: i64,
    /// Namespace prepended to every dedup key this core writes to the queue.
    pub job_key_prefix: String,
    /// Base URL of the remote service's console, used to build diagnostic
    /// and record URLs.
    pub remote_console_url: Option<String>,
    pub destroy_event_suffixes: Vec<String>,
    pub upsert_event_suffixes: Vec<String>,
}

impl SyncConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::seconds(self.debounce_window_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            active: true,
            report_errors: false,
            debounce_window_secs: 60,
            job_key_prefix: "crm-sync".to_string(),
            remote_console_url: None,
            destroy_event_suffixes: vec![".destroy".to_string(), ".destroyed".to_string()],
            upsert_event_suffixes: vec![
                ".save".to_string(),
                ".create".to_string(),
                ".update".to_string(),
                ".saved".to_string(),
                ".created".to_string(),
                ".updated".to_string(),
            ],
        }
    }
}
