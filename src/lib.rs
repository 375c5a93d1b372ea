//! atest - minimal unit-test execution library
//!
//! Runs units of work against an expected outcome, records why they failed,
//! and composes them into fail-fast groups that can be shared between
//! threads behind a guard.
//!
//! ## Features
//!
//! - Execution units comparing a callable's result through a pluggable
//!   comparator, with errors and panics captured as distinct failures
//! - Ordered, fail-fast unit groups that nest
//! - A guard allowing at most one run of a shared group at a time
//! - Serializable result snapshots for named tests
//!
//! ## Usage
//!
//! ```
//! use atest::{ErrorKind, IsGreater, NamedTest, Runnable, Unit, VoidUnit};
//!
//! fn add(a: i32, b: i32) -> i32 {
//!     a + b
//! }
//!
//! let mut test = NamedTest::new("arithmetic");
//! test.add_unit(Unit::new(5, || add(2, 3)));
//! test.add_unit(Unit::with_comparator(0, IsGreater, || add(1, 1)));
//! test.add_unit(VoidUnit::new(|| {}));
//!
//! assert!(test.run());
//! assert_eq!(test.error().kind(), ErrorKind::NoError);
//! ```
//!
//! Sharing a group between threads:
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use atest::{Unit, UnitGroup, UnitThread};
//!
//! let mut group = UnitGroup::new();
//! group.add_unit(Unit::new(4, || 2 * 2));
//!
//! let guard = Arc::new(UnitThread::with_group(group));
//! assert!(guard.try_run());
//!
//! let other = Arc::clone(&guard);
//! let handle = std::thread::spawn(move || other.run_for(Duration::from_secs(1)));
//! assert!(handle.join().unwrap());
//! ```

pub mod config;
pub mod executor;
pub mod models;
pub mod unit;
pub mod utils;

pub use config::{GuardConfig, HarnessConfig};
pub use executor::{BackgroundRun, GuardError, NamedTest, UnitGroup, UnitThread};
pub use models::{ErrorKind, ErrorRecord, TestResult, TestStatus};
pub use unit::{
    make_unit, make_unit_with, make_void_unit, shared, Comparator, Comparison, IsDifferent,
    IsEqual, IsGreater, IsGreaterOrEqual, IsLesser, IsLesserOrEqual, Runnable, SharedUnit, Unit,
    VoidUnit,
};
