//! Test execution engine
//!
//! Provides fail-fast unit groups, the guard that serializes runs of a
//! shared group, and named tests.

mod group;
mod guard;
mod named;

pub use group::UnitGroup;
pub use guard::{BackgroundRun, GuardError, UnitThread};
pub use named::NamedTest;
