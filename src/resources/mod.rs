pub(crate) mod resource_action;
pub(crate) mod resource_adapter;
pub(crate) mod resource_event;
pub(crate) mod resource_model;
pub(crate) mod resource_queue;
pub(crate) mod resource_registry;

#[cfg(test)]
mod resource_event_tests;

// Re-export the public interface
pub use resource_action::RecordAction;
pub use resource_adapter::ResourceAdapter;
pub use resource_event::EventRouter;
pub use resource_model::{ChangeEvent, FieldMap, RecordRef};
pub use resource_queue::RecordSyncQueue;
pub use resource_registry::ResourceRegistry;
