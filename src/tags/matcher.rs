//! Pure evaluation of tag expressions against the active tag set.

use std::collections::HashSet;

use super::TagExpression;

/// Decide whether a hook with tag expression `expr` applies under `active`.
///
/// `None` means the hook is untagged and applies unconditionally. A literal
/// matches iff it is present in `active` (case-sensitive); an unknown tag
/// simply evaluates false. AND/OR short-circuit.
pub fn matches(expr: Option<&TagExpression>, active: &HashSet<String>) -> bool {
    match expr {
        None => true,
        Some(expr) => evaluate(expr, active),
    }
}

fn evaluate(expr: &TagExpression, active: &HashSet<String>) -> bool {
    match expr {
        TagExpression::Literal { tag } => active.contains(tag),
        TagExpression::And { left, right } => {
            evaluate(left, active) && evaluate(right, active)
        }
        TagExpression::Or { left, right } => {
            evaluate(left, active) || evaluate(right, active)
        }
        TagExpression::Not { inner } => !evaluate(inner, active),
    }
}
