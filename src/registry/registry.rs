//! The hook registry: built once, frozen, selected from at dispatch time.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{HookDescriptor, HookOperation, HookOrdering};
use crate::tags::matches;

/// Immutable catalog of registered hooks, grouped by operation.
#[derive(Debug)]
pub struct HookRegistry {
    hooks: HashMap<HookOperation, Vec<HookDescriptor>>,
    generation: u64,
    built_at: DateTime<Utc>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        HookRegistryBuilder::new().build()
    }
}

impl HookRegistry {
    /// All hooks for one operation, in registration order.
    pub fn hooks_for(&self, operation: HookOperation) -> &[HookDescriptor] {
        self.hooks
            .get(&operation)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Loading generation this registry belongs to; bumped on daemon reload.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When this generation was built.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Applicable hooks for `operation` under `active_tags`, ordered.
    ///
    /// Hooks are partitioned into untagged hooks and hooks whose tag
    /// expression evaluates true; registration order is preserved within
    /// each group, and `ordering` decides which group runs first.
    pub fn select(
        &self,
        operation: HookOperation,
        active_tags: &HashSet<String>,
        ordering: HookOrdering,
    ) -> Vec<HookDescriptor> {
        let mut untagged = Vec::new();
        let mut tagged = Vec::new();
        for descriptor in self.hooks_for(operation) {
            match &descriptor.tag_expression {
                None => untagged.push(descriptor.clone()),
                Some(expr) => {
                    if matches(Some(expr), active_tags) {
                        tagged.push(descriptor.clone());
                    }
                }
            }
        }
        match ordering {
            HookOrdering::UntaggedFirst => {
                untagged.extend(tagged);
                untagged
            }
            HookOrdering::TaggedFirst => {
                tagged.extend(untagged);
                tagged
            }
        }
    }
}

/// Startup-time builder; the only way to put hooks into a registry.
#[derive(Debug, Default)]
pub struct HookRegistryBuilder {
    hooks: HashMap<HookOperation, Vec<HookDescriptor>>,
}

impl HookRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: HookDescriptor) -> &mut Self {
        self.hooks
            .entry(descriptor.operation)
            .or_default()
            .push(descriptor);
        self
    }

    pub fn build(self) -> HookRegistry {
        HookRegistry {
            hooks: self.hooks,
            generation: 0,
            built_at: Utc::now(),
        }
    }
}

/// Atomically replaceable slot holding the current hook registry.
///
/// Readers clone an `Arc` and keep using their snapshot; a daemon-mode
/// reload swaps in a new registry with a bumped generation. Single writer.
#[derive(Clone, Debug)]
pub struct RegistrySlot {
    inner: Arc<RwLock<Arc<HookRegistry>>>,
}

impl RegistrySlot {
    pub fn new(registry: HookRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// Snapshot of the current generation.
    pub fn load(&self) -> Arc<HookRegistry> {
        self.inner.read().clone()
    }

    /// Replace the registry wholesale, bumping the generation id.
    pub fn replace(&self, mut registry: HookRegistry) {
        let mut slot = self.inner.write();
        registry.generation = slot.generation() + 1;
        *slot = Arc::new(registry);
    }
}
