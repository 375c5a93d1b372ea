//! Named tests
//!
//! A [`NamedTest`] gives a label to one [`UnitGroup`] and forwards to it.

use chrono::Utc;
use tracing::info;

use super::group::UnitGroup;
use crate::models::{ErrorRecord, TestResult, TestStatus};
use crate::unit::{Runnable, SharedUnit};
use crate::utils::Timer;

/// A labelled unit group
#[derive(Default)]
pub struct NamedTest {
    name: String,
    group: UnitGroup,
}

impl NamedTest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: UnitGroup::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &UnitGroup {
        &self.group
    }

    pub fn add_unit<U: Runnable + 'static>(&mut self, unit: U) -> SharedUnit {
        self.group.add_unit(unit)
    }

    pub fn add_shared(&mut self, unit: SharedUnit) {
        self.group.add_shared(unit)
    }

    pub fn add_member(&mut self, member: Option<SharedUnit>) {
        self.group.add_member(member)
    }

    /// Returns the stored error as an `Err` if the last run failed, so the
    /// test can be driven from `Result`-based code with `?`.
    pub fn check(&self) -> Result<(), ErrorRecord> {
        self.group.error().into_result()
    }

    /// Runs the test and snapshots the outcome.
    pub fn execute(&mut self) -> TestResult {
        let timer = Timer::start(self.name.as_str());
        self.group.run();
        let duration_ms = timer.stop().as_millis() as u64;

        let error = self.group.error();
        let result = TestResult {
            name: self.name.clone(),
            status: TestStatus::from_kind(error.kind()),
            duration_ms,
            completed_units: self.group.completed(),
            total_units: self.group.len(),
            failed_index: self.group.failed_index(),
            cause: self.group.failed_error(),
            error,
            finished_at: Utc::now(),
        };

        info!("{}", result);
        result
    }
}

impl Runnable for NamedTest {
    fn run(&mut self) -> bool {
        self.group.run()
    }

    fn error(&self) -> ErrorRecord {
        self.group.error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorKind;
    use crate::unit::{Unit, VoidUnit};

    fn square(x: i64) -> i64 {
        x * x
    }

    #[test]
    fn test_forwards_to_group() {
        let mut test = NamedTest::new("squares");
        test.add_unit(Unit::new(4, || square(2)));
        test.add_unit(Unit::new(9, || square(3)));

        assert_eq!(test.name(), "squares");
        assert!(test.run());
        assert_eq!(test.error().kind(), ErrorKind::NoError);
        assert!(test.check().is_ok());
        assert_eq!(test.group().completed(), 2);
    }

    #[test]
    fn test_check_returns_stored_error() {
        let mut test = NamedTest::new("broken");
        test.add_unit(Unit::new(5, || square(2)));

        assert!(!test.run());
        let err = test.check().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReturnedError);
        assert_eq!(err.to_string(), "A subunit has returned an error.");
    }

    #[test]
    fn test_check_composes_with_question_mark() {
        fn drive(test: &mut NamedTest) -> anyhow::Result<()> {
            test.run();
            test.check()?;
            Ok(())
        }

        let mut test = NamedTest::new("question mark");
        test.add_unit(VoidUnit::without_callable());
        assert!(drive(&mut test).is_err());
    }

    #[test]
    fn test_execute_snapshots_failure() {
        let mut test = NamedTest::new("mixed");
        test.add_unit(Unit::new(1, || square(1)));
        test.add_unit(Unit::new(16, || square(3)));
        test.add_unit(Unit::new(25, || square(5)));

        let result = test.execute();
        assert_eq!(result.name, "mixed");
        assert_eq!(result.status, TestStatus::Fail);
        assert_eq!(result.completed_units, 1);
        assert_eq!(result.total_units, 3);
        assert_eq!(result.failed_index, Some(1));
        assert_eq!(result.error.kind(), ErrorKind::ReturnedError);
        assert_eq!(
            result.cause.as_ref().map(|c| c.kind()),
            Some(ErrorKind::ResultInvalid)
        );
    }

    #[test]
    fn test_execute_snapshots_null_member() {
        let mut test = NamedTest::new("malformed");
        test.add_member(None);

        let result = test.execute();
        assert_eq!(result.status, TestStatus::Error);
        assert_eq!(result.error.kind(), ErrorKind::NullSubUnit);
        assert!(result.cause.is_none());
    }

    #[test]
    fn test_execute_snapshots_success() {
        let mut test = NamedTest::new("ok");
        test.add_shared(crate::unit::make_unit(0, || square(0)));

        let result = test.execute();
        assert!(result.status.is_success());
        assert_eq!(result.completed_units, 1);
        assert!(result.failed_index.is_none());
        assert!(result.message().is_none());
    }
}
