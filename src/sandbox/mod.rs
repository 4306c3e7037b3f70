//! Execution scope management (the sandbox).
//!
//! Scopes form a strict stack entered and left in lockstep with lifecycle
//! events. Each scope owns a private [`DataStore`]; step scopes read through
//! their ancestors so step code can see spec/scenario state without being
//! able to outlive it.

pub mod data_store;
pub mod scope;

pub use data_store::DataStore;
pub use scope::{ExecutionScope, Sandbox, ScopeKind};
