pub(crate) mod job_dispatcher;
pub(crate) mod job_model;
pub(crate) mod job_queue;
pub(crate) mod memory_queue;

// Re-export the public interface
pub use job_dispatcher::JobDispatcher;
pub use job_model::{BulkItemState, JobPayload};
pub use job_queue::JobQueue;
pub use memory_queue::{InMemoryJobQueue, PendingJob};
