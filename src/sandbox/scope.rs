//! Scope kinds and the strict scope stack.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DataStore;
use crate::error::ProtocolViolation;

/// Nesting level of an execution scope.
///
/// Kinds are ranked: a new scope must be strictly deeper than the current
/// top of stack. On an empty stack only a suite or a spec may open (the
/// orchestrator drives a single spec without a suite event in some runs);
/// scenarios and steps always need an enclosing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    Suite,
    Spec,
    Scenario,
    Step,
}

impl ScopeKind {
    fn rank(self) -> u8 {
        match self {
            ScopeKind::Suite => 0,
            ScopeKind::Spec => 1,
            ScopeKind::Scenario => 2,
            ScopeKind::Step => 3,
        }
    }
}

/// One entry on the scope stack: a kind plus its private data store.
#[derive(Debug)]
pub struct ExecutionScope {
    pub kind: ScopeKind,
    pub store: DataStore,
}

impl ExecutionScope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            store: DataStore::new(),
        }
    }
}

/// Strict stack of nested execution scopes.
///
/// Not shareable across threads by design; the dispatcher delivers requests
/// strictly sequentially on one session, so the sandbox is owned by the
/// session loop and mutated without synchronization.
#[derive(Debug, Default)]
pub struct Sandbox {
    stack: Vec<ExecutionScope>,
}

impl Sandbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new scope. The new kind must nest strictly under the current
    /// top; on an empty stack only `Suite` or `Spec` may open.
    pub fn start_scope(&mut self, kind: ScopeKind) -> Result<(), ProtocolViolation> {
        let current = self.stack.last().map(|scope| scope.kind);
        let allowed = match current {
            Some(top) => kind.rank() > top.rank(),
            None => kind.rank() <= ScopeKind::Spec.rank(),
        };
        if !allowed {
            return Err(ProtocolViolation::ScopeNesting {
                requested: kind,
                current,
            });
        }
        self.stack.push(ExecutionScope::new(kind));
        Ok(())
    }

    /// Pop the top scope, which must be of the requested kind.
    pub fn end_scope(&mut self, kind: ScopeKind) -> Result<(), ProtocolViolation> {
        match self.stack.last() {
            None => Err(ProtocolViolation::ScopeUnderflow),
            Some(top) if top.kind != kind => Err(ProtocolViolation::ScopeKindMismatch {
                requested: kind,
                current: top.kind,
            }),
            Some(_) => {
                self.stack.pop();
                Ok(())
            }
        }
    }

    pub fn current_scope(&self) -> Option<&ExecutionScope> {
        self.stack.last()
    }

    pub fn current_scope_mut(&mut self) -> Option<&mut ExecutionScope> {
        self.stack.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Read a key with step-scope visibility: the top scope is consulted
    /// first, then its ancestors. Writes always go to the current scope.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.stack
            .iter()
            .rev()
            .find_map(|scope| scope.store.get(key))
    }

    /// Clear the data store of the innermost active scope of `kind`.
    /// Returns false when no such scope is active.
    pub fn clear_store(&mut self, kind: ScopeKind) -> bool {
        for scope in self.stack.iter_mut().rev() {
            if scope.kind == kind {
                scope.store.clear();
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_balanced_push_pop() {
        let mut sandbox = Sandbox::new();
        sandbox.start_scope(ScopeKind::Suite).unwrap();
        sandbox.start_scope(ScopeKind::Spec).unwrap();
        sandbox.start_scope(ScopeKind::Scenario).unwrap();
        sandbox.start_scope(ScopeKind::Step).unwrap();
        assert_eq!(sandbox.depth(), 4);
        sandbox.end_scope(ScopeKind::Step).unwrap();
        sandbox.end_scope(ScopeKind::Scenario).unwrap();
        sandbox.end_scope(ScopeKind::Spec).unwrap();
        sandbox.end_scope(ScopeKind::Suite).unwrap();
        assert!(sandbox.is_empty());
    }

    #[test]
    fn test_spec_may_open_on_empty_stack() {
        let mut sandbox = Sandbox::new();
        sandbox.start_scope(ScopeKind::Spec).unwrap();
        sandbox.start_scope(ScopeKind::Scenario).unwrap();
        sandbox.end_scope(ScopeKind::Scenario).unwrap();
        sandbox.end_scope(ScopeKind::Spec).unwrap();
        assert!(sandbox.is_empty());
    }

    #[test]
    fn test_pop_empty_is_underflow() {
        let mut sandbox = Sandbox::new();
        assert_eq!(
            sandbox.end_scope(ScopeKind::Scenario),
            Err(ProtocolViolation::ScopeUnderflow)
        );
    }

    #[test]
    fn test_pop_wrong_kind_is_mismatch() {
        let mut sandbox = Sandbox::new();
        sandbox.start_scope(ScopeKind::Spec).unwrap();
        assert_eq!(
            sandbox.end_scope(ScopeKind::Scenario),
            Err(ProtocolViolation::ScopeKindMismatch {
                requested: ScopeKind::Scenario,
                current: ScopeKind::Spec,
            })
        );
    }

    #[test]
    fn test_non_nesting_push_rejected() {
        let mut sandbox = Sandbox::new();
        sandbox.start_scope(ScopeKind::Spec).unwrap();
        sandbox.start_scope(ScopeKind::Scenario).unwrap();
        assert_eq!(
            sandbox.start_scope(ScopeKind::Spec),
            Err(ProtocolViolation::ScopeNesting {
                requested: ScopeKind::Spec,
                current: Some(ScopeKind::Scenario),
            })
        );
        // Same kind twice is also rejected: scenarios do not nest.
        assert!(sandbox.start_scope(ScopeKind::Scenario).is_err());
    }

    #[test]
    fn test_only_suite_or_spec_may_open_at_idle() {
        let mut sandbox = Sandbox::new();
        assert_eq!(
            sandbox.start_scope(ScopeKind::Scenario),
            Err(ProtocolViolation::ScopeNesting {
                requested: ScopeKind::Scenario,
                current: None,
            })
        );
        assert!(sandbox.start_scope(ScopeKind::Step).is_err());
        assert!(sandbox.start_scope(ScopeKind::Suite).is_ok());
    }

    #[test]
    fn test_step_scope_reads_through_ancestors() {
        let mut sandbox = Sandbox::new();
        sandbox.start_scope(ScopeKind::Spec).unwrap();
        sandbox
            .current_scope_mut()
            .unwrap()
            .store
            .put("spec-key", json!("spec-value"));
        sandbox.start_scope(ScopeKind::Scenario).unwrap();
        sandbox.start_scope(ScopeKind::Step).unwrap();

        assert_eq!(sandbox.lookup("spec-key"), Some(&json!("spec-value")));

        // Writes stay in the step scope and vanish with it.
        sandbox
            .current_scope_mut()
            .unwrap()
            .store
            .put("step-key", json!(1));
        sandbox.end_scope(ScopeKind::Step).unwrap();
        assert_eq!(sandbox.lookup("step-key"), None);
        assert_eq!(sandbox.lookup("spec-key"), Some(&json!("spec-value")));
    }

    #[test]
    fn test_clear_store_targets_kind() {
        let mut sandbox = Sandbox::new();
        sandbox.start_scope(ScopeKind::Spec).unwrap();
        sandbox
            .current_scope_mut()
            .unwrap()
            .store
            .put("k", json!(true));
        sandbox.start_scope(ScopeKind::Scenario).unwrap();

        assert!(sandbox.clear_store(ScopeKind::Spec));
        assert_eq!(sandbox.lookup("k"), None);
        assert!(!sandbox.clear_store(ScopeKind::Suite));
    }
}
