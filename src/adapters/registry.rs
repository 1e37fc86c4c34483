//! Explicit source registry.
//!
//! The source-to-adapter mapping is a value constructed by the caller and
//! passed into dispatch, not process-wide state. That keeps partial-source
//! runs and test doubles trivial.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::adapters::SourceAdapter;

#[derive(Default, Clone)]
pub struct SourceRegistry {
    sources: BTreeMap<&'static str, Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration. Keys are unique; registering the same key
    /// twice is a wiring bug.
    pub fn register(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        let previous = self.sources.insert(adapter.key(), adapter);
        debug_assert!(previous.is_none(), "duplicate source key");
        self
    }

    pub fn get(&self, key: &str) -> Option<&Arc<dyn SourceAdapter>> {
        self.sources.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Arc<dyn SourceAdapter>)> {
        self.sources.iter().map(|(key, adapter)| (*key, adapter))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sources.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
