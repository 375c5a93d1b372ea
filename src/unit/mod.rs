//! Units of work
//!
//! A unit is anything that can be run and then asked why it failed. Single
//! execution units, groups of units and guarded groups all share this
//! capability, which is what lets groups nest.

mod comparator;
mod execution;

use parking_lot::Mutex;
use std::sync::Arc;

use crate::models::ErrorRecord;

pub use comparator::{
    Comparator, Comparison, IsDifferent, IsEqual, IsGreater, IsGreaterOrEqual, IsLesser,
    IsLesserOrEqual,
};
pub use execution::{make_unit, make_unit_with, make_void_unit, Unit, VoidUnit};

/// Runnable with an inspectable error
pub trait Runnable: Send {
    /// Runs the unit. Returns false if an error occurred.
    fn run(&mut self) -> bool;

    /// The record left by the most recent `run()`, or the default `NoError`
    /// record if the unit never ran.
    fn error(&self) -> ErrorRecord;
}

impl<U: Runnable + ?Sized> Runnable for Box<U> {
    fn run(&mut self) -> bool {
        (**self).run()
    }

    fn error(&self) -> ErrorRecord {
        (**self).error()
    }
}

/// Shared, lock-protected handle to a unit
///
/// Groups hold their members through this handle so the caller can keep a
/// reference to inspect a member after the group ran.
pub type SharedUnit = Arc<Mutex<dyn Runnable>>;

/// Wraps a unit into a [`SharedUnit`].
pub fn shared<U: Runnable + 'static>(unit: U) -> SharedUnit {
    Arc::new(Mutex::new(unit))
}
