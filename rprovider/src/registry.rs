//! Provider registry for runtime caller lookup and swapping.
//!
//! ```rust
//! use rprovider::{ProviderKind, ProviderRegistry};
//!
//! let registry = ProviderRegistry::new();
//! assert!(registry.is_empty());
//! assert!(!registry.contains(ProviderKind::Gemini));
//! ```

use std::sync::Arc;

use rcommon::Registry;

use crate::{ProviderCaller, ProviderKind};

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    callers: Registry<ProviderKind, Arc<dyn ProviderCaller>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P>(&mut self, caller: P)
    where
        P: ProviderCaller + 'static,
    {
        self.callers.insert(caller.kind(), Arc::new(caller));
    }

    pub fn register_shared(&mut self, caller: Arc<dyn ProviderCaller>) {
        self.callers.insert(caller.kind(), caller);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ProviderCaller>> {
        self.callers.get(&kind).cloned()
    }

    pub fn remove(&mut self, kind: ProviderKind) -> Option<Arc<dyn ProviderCaller>> {
        self.callers.remove(&kind)
    }

    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.callers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.callers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callers.is_empty()
    }
}
