//! Fail-fast unit groups
//!
//! A [`UnitGroup`] runs its members strictly in registration order and stops
//! at the first member that fails. Members are stored in a `Vec`: the order
//! of registration is the order of execution, and "the first failure" is
//! only meaningful because of that.

use tracing::{debug, info};

use crate::models::{ErrorKind, ErrorRecord};
use crate::unit::{shared, Runnable, SharedUnit};

const NULL_SUBUNIT: &str = "UnitGroup holds a null subunit.";
const SUBUNIT_FAILED: &str = "A subunit has returned an error.";
const SUBUNIT_UNWOUND: &str = "A subunit panicked outside its callable.";

/// Ordered, fail-fast collection of units
///
/// A group is itself [`Runnable`], so groups can be nested. A group must not
/// be added to itself through a shared handle: running it would deadlock on
/// the handle's lock.
///
/// Not thread-safe on its own; use [`UnitThread`](super::UnitThread) to share
/// one between threads.
#[derive(Default)]
pub struct UnitGroup {
    members: Vec<Option<SharedUnit>>,
    error: ErrorRecord,
    failed: Option<SharedUnit>,
    failed_index: Option<usize>,
    completed: usize,
}

impl UnitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a unit and returns the handle the group holds for it.
    pub fn add_unit<U: Runnable + 'static>(&mut self, unit: U) -> SharedUnit {
        let handle = shared(unit);
        self.members.push(Some(handle.clone()));
        handle
    }

    /// Appends an existing handle. The same handle may be added twice, in
    /// which case the unit runs twice.
    pub fn add_shared(&mut self, unit: SharedUnit) {
        self.members.push(Some(unit));
    }

    /// Appends a possibly absent member. An absent member is not rejected
    /// here; it fails the group with [`ErrorKind::NullSubUnit`] when run.
    pub fn add_member(&mut self, member: Option<SharedUnit>) {
        self.members.push(member);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of members that completed in the most recent run.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// The member that stopped the most recent run, if a member failed.
    pub fn failed_unit(&self) -> Option<SharedUnit> {
        self.failed.clone()
    }

    /// Position of the member that stopped the most recent run, including
    /// an absent member.
    pub fn failed_index(&self) -> Option<usize> {
        self.failed_index
    }

    /// The failed member's own error record.
    pub fn failed_error(&self) -> Option<ErrorRecord> {
        self.failed.as_ref().map(|unit| unit.lock().error())
    }

    fn reset(&mut self) {
        self.error = ErrorRecord::none();
        self.failed = None;
        self.failed_index = None;
        self.completed = 0;
    }

    fn stop(&mut self, index: usize, error: ErrorRecord, failed: Option<SharedUnit>) {
        debug!(
            "Unit group stopped at member {} of {}: {}",
            index + 1,
            self.members.len(),
            error.message()
        );
        self.error = error;
        self.failed = failed;
        self.failed_index = Some(index);
    }
}

impl Runnable for UnitGroup {
    fn run(&mut self) -> bool {
        self.reset();

        for index in 0..self.members.len() {
            let Some(member) = self.members[index].clone() else {
                self.stop(
                    index,
                    ErrorRecord::new(ErrorKind::NullSubUnit, NULL_SUBUNIT),
                    None,
                );
                return false;
            };

            // Left in place if the member unwinds out of run()
            self.error = ErrorRecord::new(ErrorKind::ReturnedError, SUBUNIT_UNWOUND);
            self.failed = Some(member.clone());
            self.failed_index = Some(index);

            let passed = member.lock().run();
            if !passed {
                self.stop(
                    index,
                    ErrorRecord::new(ErrorKind::ReturnedError, SUBUNIT_FAILED),
                    Some(member),
                );
                return false;
            }

            self.error = ErrorRecord::none();
            self.failed = None;
            self.failed_index = None;
            self.completed += 1;
        }

        info!("Unit group completed: {} units passed", self.completed);
        true
    }

    fn error(&self) -> ErrorRecord {
        self.error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Unit, VoidUnit};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Unit that records how many times it ran.
    fn counting(calls: &Arc<AtomicUsize>, pass: bool) -> VoidUnit {
        let calls = Arc::clone(calls);
        VoidUnit::try_new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            if pass {
                Ok(())
            } else {
                Err(anyhow::anyhow!("unit failed on purpose"))
            }
        })
    }

    #[test]
    fn test_empty_group_succeeds() {
        let mut group = UnitGroup::new();
        assert!(group.is_empty());
        assert!(group.run());
        assert_eq!(group.error().kind(), ErrorKind::NoError);
        assert_eq!(group.completed(), 0);
    }

    #[test]
    fn test_all_members_pass() {
        let mut group = UnitGroup::new();
        group.add_unit(Unit::new(2, || 1 + 1));
        group.add_unit(Unit::new("ok", || "ok"));
        group.add_unit(VoidUnit::new(|| {}));

        assert_eq!(group.len(), 3);
        assert!(group.run());
        assert_eq!(group.completed(), 3);
        assert!(group.failed_unit().is_none());
        assert!(group.failed_index().is_none());
    }

    #[test]
    fn test_stops_at_first_failure() {
        let a_calls = Arc::new(AtomicUsize::new(0));
        let b_calls = Arc::new(AtomicUsize::new(0));
        let c_calls = Arc::new(AtomicUsize::new(0));

        let mut group = UnitGroup::new();
        group.add_unit(counting(&a_calls, true));
        let b = group.add_unit(counting(&b_calls, false));
        group.add_unit(counting(&c_calls, true));

        assert!(!group.run());

        let error = group.error();
        assert_eq!(error.kind(), ErrorKind::ReturnedError);
        assert_eq!(error.message(), SUBUNIT_FAILED);
        assert_eq!(group.completed(), 1);
        assert_eq!(group.failed_index(), Some(1));

        let failed = group.failed_unit().unwrap();
        assert!(Arc::ptr_eq(&failed, &b));
        assert_eq!(
            group.failed_error().unwrap().message(),
            "unit failed on purpose"
        );

        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_runs_in_registration_order() {
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut group = UnitGroup::new();

        for id in [3, 1, 4, 1, 5, 9, 2, 6] {
            let order = Arc::clone(&order);
            group.add_unit(VoidUnit::new(move || order.lock().push(id)));
        }

        assert!(group.run());
        assert_eq!(*order.lock(), vec![3, 1, 4, 1, 5, 9, 2, 6]);
    }

    #[test]
    fn test_null_member_stops_group() {
        let after = Arc::new(AtomicUsize::new(0));

        let mut group = UnitGroup::new();
        group.add_unit(Unit::new(1, || 1));
        group.add_unit(Unit::new(2, || 2));
        group.add_member(None);
        group.add_unit(counting(&after, true));

        assert!(!group.run());
        assert_eq!(group.error().kind(), ErrorKind::NullSubUnit);
        assert_eq!(group.error().message(), NULL_SUBUNIT);
        assert_eq!(group.failed_index(), Some(2));
        assert_eq!(group.completed(), 2);
        assert!(group.failed_unit().is_none());
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_null_member_wins_over_later_failure() {
        let mut group = UnitGroup::new();
        group.add_member(None);
        group.add_unit(Unit::without_callable(0));

        assert!(!group.run());
        assert_eq!(group.error().kind(), ErrorKind::NullSubUnit);
        assert_eq!(group.failed_index(), Some(0));
    }

    #[test]
    fn test_rerun_resets_state() {
        let broken = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&broken);

        let mut group = UnitGroup::new();
        group.add_unit(Unit::new(1, || 1));
        group.add_unit(VoidUnit::try_new(move || {
            if flag.load(Ordering::SeqCst) {
                anyhow::bail!("still broken");
            }
            Ok(())
        }));

        assert!(!group.run());
        assert_eq!(group.completed(), 1);
        assert!(group.failed_unit().is_some());

        broken.store(false, Ordering::SeqCst);

        assert!(group.run());
        assert_eq!(group.error(), ErrorRecord::none());
        assert_eq!(group.completed(), 2);
        assert!(group.failed_unit().is_none());
        assert!(group.failed_index().is_none());
    }

    #[test]
    fn test_error_inspection_is_stable() {
        let mut group = UnitGroup::new();
        group.add_unit(Unit::new(1, || 2));
        group.run();

        let first = group.error();
        assert_eq!(group.error(), first);
        assert_eq!(group.error(), first);
    }

    #[test]
    fn test_nested_groups() {
        let mut inner = UnitGroup::new();
        inner.add_unit(Unit::new(1, || 1));
        inner.add_unit(Unit::new(2, || 3));

        let mut outer = UnitGroup::new();
        outer.add_unit(Unit::new(0, || 0));
        let inner = outer.add_unit(inner);

        assert!(!outer.run());
        assert_eq!(outer.completed(), 1);
        assert!(Arc::ptr_eq(&outer.failed_unit().unwrap(), &inner));
        assert_eq!(
            outer.failed_error().unwrap().kind(),
            ErrorKind::ReturnedError
        );
    }

    #[test]
    fn test_panicking_comparator_leaves_failure_recorded() {
        let mut group = UnitGroup::new();
        group.add_unit(Unit::new(1, || 1));
        group.add_unit(Unit::with_comparator(
            1,
            |_: &i32, _: &i32| -> bool { panic!("comparator exploded") },
            || 1,
        ));
        group.add_unit(Unit::new(2, || 2));

        let outcome =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| group.run()));
        assert!(outcome.is_err());

        assert_eq!(group.error().kind(), ErrorKind::ReturnedError);
        assert_eq!(group.error().message(), SUBUNIT_UNWOUND);
        assert_eq!(group.failed_index(), Some(1));
        assert_eq!(group.completed(), 1);
        assert!(group.failed_unit().is_some());
    }

    #[test]
    fn test_same_handle_added_twice_runs_twice() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut group = UnitGroup::new();
        let handle = group.add_unit(counting(&calls, true));
        group.add_shared(handle);

        assert!(group.run());
        assert_eq!(group.completed(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
