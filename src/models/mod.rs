//! Data models
//!
//! Error records produced by runs and the result snapshots built from them.

mod error;
mod test_result;

pub use error::{ErrorKind, ErrorRecord};
pub use test_result::{TestResult, TestStatus};
