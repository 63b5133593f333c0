pub(crate) mod bulk_planner;
pub(crate) mod bulk_queue_item;
pub(crate) mod bulk_request;
pub(crate) mod bulk_response;


// Re-export the public interface
pub use bulk_planner::BulkSyncPlanner;
pub use bulk_queue_item::BulkQueueItem;
pub use bulk_request::BulkRequest;
pub use bulk_response::BulkResponse;
