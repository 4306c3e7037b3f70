//! Step implementation registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::CallableError;
use crate::execution::ExecutionInfo;

/// Capability interface for a discovered step implementation.
#[async_trait]
pub trait StepCallable: Send + Sync {
    async fn invoke(
        &self,
        info: &ExecutionInfo,
        parameters: &[Value],
    ) -> Result<(), CallableError>;
}

/// One registered step implementation.
#[derive(Clone)]
pub struct StepImplementation {
    pub callable: Arc<dyn StepCallable>,
    pub step_text: String,
    pub declaring_module: String,
}

impl fmt::Debug for StepImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepImplementation")
            .field("step_text", &self.step_text)
            .field("declaring_module", &self.declaring_module)
            .finish_non_exhaustive()
    }
}

/// Step-text → implementation catalog, frozen after startup.
///
/// Duplicates are tracked rather than rejected: validation requests must be
/// able to report "duplicate implementation" for a step text.
#[derive(Debug, Default)]
pub struct StepRegistry {
    steps: HashMap<String, StepImplementation>,
    duplicates: Vec<String>,
    registration_order: Vec<String>,
}

impl StepRegistry {
    pub fn lookup(&self, step_text: &str) -> Option<&StepImplementation> {
        self.steps.get(step_text)
    }

    pub fn is_implemented(&self, step_text: &str) -> bool {
        self.steps.contains_key(step_text)
    }

    pub fn is_duplicate(&self, step_text: &str) -> bool {
        self.duplicates.iter().any(|text| text == step_text)
    }

    /// All step texts in registration order, for step-name listing.
    pub fn all_step_texts(&self) -> Vec<String> {
        self.registration_order.clone()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct StepRegistryBuilder {
    registry: StepRegistry,
}

impl StepRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, implementation: StepImplementation) -> &mut Self {
        let text = implementation.step_text.clone();
        if self.registry.steps.contains_key(&text) {
            self.registry.duplicates.push(text);
        } else {
            self.registry.registration_order.push(text.clone());
            self.registry.steps.insert(text, implementation);
        }
        self
    }

    pub fn build(self) -> StepRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl StepCallable for Noop {
        async fn invoke(
            &self,
            _info: &ExecutionInfo,
            _parameters: &[Value],
        ) -> Result<(), CallableError> {
            Ok(())
        }
    }

    fn implementation(text: &str) -> StepImplementation {
        StepImplementation {
            callable: Arc::new(Noop),
            step_text: text.to_string(),
            declaring_module: "steps".to_string(),
        }
    }

    #[test]
    fn test_lookup_and_listing() {
        let mut builder = StepRegistryBuilder::new();
        builder
            .register(implementation("Say <greeting>"))
            .register(implementation("Open the cart"));
        let registry = builder.build();

        assert!(registry.is_implemented("Open the cart"));
        assert!(!registry.is_implemented("Close the cart"));
        assert_eq!(
            registry.all_step_texts(),
            vec!["Say <greeting>".to_string(), "Open the cart".to_string()]
        );
    }

    #[test]
    fn test_duplicate_detection() {
        let mut builder = StepRegistryBuilder::new();
        builder
            .register(implementation("Say <greeting>"))
            .register(implementation("Say <greeting>"));
        let registry = builder.build();

        assert_eq!(registry.len(), 1);
        assert!(registry.is_duplicate("Say <greeting>"));
        assert!(!registry.is_duplicate("Open the cart"));
    }
}
