//! Hook and step registries.
//!
//! Both registries are populated exactly once at startup by the external
//! project loader, frozen behind `Arc`, and read without synchronization for
//! the rest of the session. Daemon-mode reload swaps the whole hook registry
//! through a [`RegistrySlot`] so readers observe either the old or the new
//! generation, never a partial one.

pub mod hook;
pub mod registry;
pub mod step;

pub use hook::{CallableError, HookCallable, HookDescriptor, HookOperation, HookOrdering};
pub use registry::{HookRegistry, HookRegistryBuilder, RegistrySlot};
pub use step::{StepCallable, StepImplementation, StepRegistry, StepRegistryBuilder};
