//! Test result models
//!
//! A [`TestResult`] is the serializable snapshot of one named test run, for
//! whatever reporter sits on top of the harness.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{ErrorKind, ErrorRecord};

/// Test execution status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Every unit completed.
    Pass,
    /// A unit reported an error.
    Fail,
    /// The test itself is malformed (it holds an absent unit).
    Error,
}

impl TestStatus {
    pub fn from_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoError => TestStatus::Pass,
            ErrorKind::NullSubUnit => TestStatus::Error,
            ErrorKind::ResultInvalid | ErrorKind::NoCallable | ErrorKind::ReturnedError => {
                TestStatus::Fail
            }
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TestStatus::Pass => "✓",
            TestStatus::Fail => "✗",
            TestStatus::Error => "!",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TestStatus::Pass)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Pass => write!(f, "PASS"),
            TestStatus::Fail => write!(f, "FAIL"),
            TestStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of a single named test run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub completed_units: usize,
    pub total_units: usize,
    /// Position of the unit that stopped the run
    pub failed_index: Option<usize>,
    /// Aggregate record of the group
    pub error: ErrorRecord,
    /// The failed unit's own record
    pub cause: Option<ErrorRecord>,
    pub finished_at: DateTime<Utc>,
}

impl TestResult {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// The most specific message available: the failed unit's own message,
    /// or the aggregate one.
    pub fn message(&self) -> Option<&str> {
        if self.status.is_success() {
            return None;
        }
        let message = self
            .cause
            .as_ref()
            .map(|cause| cause.message())
            .unwrap_or_else(|| self.error.message());
        Some(message)
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.status.symbol(),
            self.name,
            self.duration_ms
        )?;
        if let Some(index) = self.failed_index {
            write!(f, " - unit {} of {}", index + 1, self.total_units)?;
        }
        if let Some(msg) = self.message() {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}
