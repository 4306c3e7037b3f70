//! Tag expressions and the hook applicability matcher.
//!
//! - [`TagExpression`] — Boolean expression tree over tag literals.
//! - [`parse_tag_expression`] — Infix parser for `a & !b | c` style strings.
//! - [`matches`] — Pure evaluator deciding whether a hook applies.

pub mod expression;
pub mod matcher;

pub use expression::{parse_tag_expression, TagExpression, TagParseError};
pub use matcher::matches;
