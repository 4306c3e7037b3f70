//! Read-only snapshot of the current execution position.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The spec currently being executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecInfo {
    pub name: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_failed: bool,
}

/// The scenario currently being executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInfo {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_failed: bool,
}

/// The step currently being executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInfo {
    pub text: String,
    /// Row index when the step is driven by a data table.
    #[serde(default)]
    pub table_row_index: Option<usize>,
}

/// Where we are in the run: built fresh from each request envelope and
/// never mutated afterwards. Hooks receive it by shared reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionInfo {
    #[serde(default)]
    pub spec: Option<SpecInfo>,
    #[serde(default)]
    pub scenario: Option<ScenarioInfo>,
    #[serde(default)]
    pub step: Option<StepInfo>,
}

impl ExecutionInfo {
    /// Tags of the current spec, if any.
    pub fn spec_tags(&self) -> HashSet<String> {
        self.spec
            .iter()
            .flat_map(|spec| spec.tags.iter().cloned())
            .collect()
    }

    /// Union of spec and scenario tags; the applicable set for scenario-
    /// and step-level events.
    pub fn scenario_tags(&self) -> HashSet<String> {
        let mut tags = self.spec_tags();
        if let Some(scenario) = &self.scenario {
            tags.extend(scenario.tags.iter().cloned());
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> ExecutionInfo {
        ExecutionInfo {
            spec: Some(SpecInfo {
                name: "Checkout".into(),
                file_name: "checkout.spec".into(),
                tags: vec!["smoke".into(), "payments".into()],
                is_failed: false,
            }),
            scenario: Some(ScenarioInfo {
                name: "Pay by card".into(),
                tags: vec!["slow".into()],
                is_failed: false,
            }),
            step: None,
        }
    }

    #[test]
    fn test_spec_tags() {
        let tags = info().spec_tags();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("smoke"));
        assert!(!tags.contains("slow"));
    }

    #[test]
    fn test_scenario_tags_are_union() {
        let tags = info().scenario_tags();
        assert_eq!(tags.len(), 3);
        assert!(tags.contains("smoke"));
        assert!(tags.contains("slow"));
    }

    #[test]
    fn test_empty_info_has_no_tags() {
        assert!(ExecutionInfo::default().scenario_tags().is_empty());
    }
}
