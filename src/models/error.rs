//! Error records produced by units and groups
//!
//! Every `run()` in this crate stores one of these instead of returning an
//! `Err`, so the record is the only failure channel a caller has to read.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of failure recorded by the last run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The run succeeded (or nothing has run yet).
    #[default]
    NoError,
    /// The callable finished but its result was rejected by the comparator.
    ResultInvalid,
    /// The unit has no callable bound.
    NoCallable,
    /// The callable failed, or a group member reported a failure.
    ReturnedError,
    /// A group holds an absent member.
    NullSubUnit,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::NoError => "NoError",
            ErrorKind::ResultInvalid => "ResultInvalid",
            ErrorKind::NoCallable => "NoCallable",
            ErrorKind::ReturnedError => "ReturnedError",
            ErrorKind::NullSubUnit => "NullSubUnit",
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, ErrorKind::NoError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed failure descriptor: kind plus diagnostic message
///
/// The default value is `{NoError, ""}`. Records built by the library for any
/// other kind always carry a non-empty message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ErrorRecord {
    kind: ErrorKind,
    message: String,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The success record.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_ok(&self) -> bool {
        !self.kind.is_error()
    }

    /// `Ok(())` for `NoError`, the record itself otherwise.
    pub fn into_result(self) -> Result<(), ErrorRecord> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
