use std::collections::HashMap;
use std::sync::Arc;

use super::resource_adapter::ResourceAdapter;
use crate::errors::{Result, SyncError};

/// Statically populated mapping of type tags to resource adapters.
///
/// Built once at process start and shared by reference. Registration order
/// is preserved and drives every reverse lookup, so resolution stays
/// deterministic.
#[derive(Default)]
pub struct ResourceRegistry {
    adapters: HashMap<String, Arc<dyn ResourceAdapter>>,
    ordered_type_tags: Vec<String>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under a type tag. Re-registering a tag replaces
    /// the adapter but keeps its original position.
    pub fn register(&mut self, type_tag: impl Into<String>, adapter: Arc<dyn ResourceAdapter>) {
        let type_tag = type_tag.into();
        if self.adapters.insert(type_tag.clone(), adapter).is_none() {
            self.ordered_type_tags.push(type_tag);
        }
    }

    pub fn adapter(&self, type_tag: &str) -> Result<&Arc<dyn ResourceAdapter>> {
        self.adapters
            .get(type_tag)
            .ok_or_else(|| SyncError::UnknownResourceType(type_tag.to_string()))
    }

    /// First registered adapter whose remote type matches, in registration
    /// order.
    pub fn adapter_for_remote_type(&self, remote_type: &str) -> Result<&Arc<dyn ResourceAdapter>> {
        self.ordered_type_tags
            .iter()
            .filter_map(|tag| self.adapters.get(tag))
            .find(|adapter| adapter.remote_type() == remote_type)
            .ok_or_else(|| SyncError::UnknownResourceType(remote_type.to_string()))
    }

    pub fn type_tags(&self) -> &[String] {
        &self.ordered_type_tags
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.adapters.contains_key(type_tag)
    }
}
