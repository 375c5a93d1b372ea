//! Single execution units
//!
//! A [`Unit`] binds one callable, the value it is expected to produce and the
//! comparator that judges the produced value. A [`VoidUnit`] binds a callable
//! whose only success criterion is finishing without an error.
//!
//! Arguments are bound by capturing them in the closure.
//!
//! Neither type is thread-safe for concurrent use; wrap them in a
//! [`SharedUnit`] to share them.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use super::comparator::{Comparator, IsEqual};
use super::{shared, Runnable, SharedUnit};
use crate::models::{ErrorKind, ErrorRecord};

const NO_CALLABLE: &str = "No callable for test unit.";
const RESULT_INVALID: &str = "Result is invalid but function happened well.";
const EMPTY_ERROR: &str = "Callable returned an error without a message.";
const EMPTY_PANIC: &str = "Callable panicked without a message.";

type Callable<R> = Box<dyn FnMut() -> anyhow::Result<R> + Send>;

fn boxed<R, F>(mut f: F) -> Callable<R>
where
    F: FnMut() -> R + Send + 'static,
{
    Box::new(move || Ok(f()))
}

fn boxed_fallible<R, E, F>(mut f: F) -> Callable<R>
where
    E: Into<anyhow::Error>,
    F: FnMut() -> Result<R, E> + Send + 'static,
{
    Box::new(move || f().map_err(Into::into))
}

/// Invokes the callable once, turning an `Err` or a panic into its message.
///
/// This is the only place in the crate where unwinding is caught.
fn invoke<R>(callable: &mut Callable<R>) -> Result<R, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| callable())) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            let message = format!("{err:#}");
            if message.is_empty() {
                Err(EMPTY_ERROR.to_string())
            } else {
                Err(message)
            }
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("Unit callable panicked: {}", message);
            Err(message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        String::new()
    };

    if message.is_empty() {
        EMPTY_PANIC.to_string()
    } else {
        message
    }
}

/// A callable with an expected result
pub struct Unit<R, C = IsEqual> {
    callable: Option<Callable<R>>,
    expected: R,
    comparator: C,
    result: Option<R>,
    ran: bool,
    errored: bool,
    error: ErrorRecord,
}

impl<R> Unit<R, IsEqual>
where
    R: PartialEq + Send + 'static,
{
    /// Creates a unit comparing the callable's result for equality.
    pub fn new<F>(expected: R, f: F) -> Self
    where
        F: FnMut() -> R + Send + 'static,
    {
        Self::build(expected, IsEqual, Some(boxed(f)))
    }

    /// Creates a unit whose callable may fail.
    pub fn try_new<E, F>(expected: R, f: F) -> Self
    where
        E: Into<anyhow::Error>,
        F: FnMut() -> Result<R, E> + Send + 'static,
    {
        Self::build(expected, IsEqual, Some(boxed_fallible(f)))
    }

    /// Creates a unit with nothing to call. Running it always reports
    /// [`ErrorKind::NoCallable`].
    pub fn without_callable(expected: R) -> Self {
        Self::build(expected, IsEqual, None)
    }
}

impl<R, C> Unit<R, C>
where
    R: Send + 'static,
    C: Comparator<R>,
{
    /// Creates a unit judged by `comparator` instead of equality.
    pub fn with_comparator<F>(expected: R, comparator: C, f: F) -> Self
    where
        F: FnMut() -> R + Send + 'static,
    {
        Self::build(expected, comparator, Some(boxed(f)))
    }

    /// Fallible counterpart of [`Unit::with_comparator`].
    pub fn try_with_comparator<E, F>(expected: R, comparator: C, f: F) -> Self
    where
        E: Into<anyhow::Error>,
        F: FnMut() -> Result<R, E> + Send + 'static,
    {
        Self::build(expected, comparator, Some(boxed_fallible(f)))
    }

    fn build(expected: R, comparator: C, callable: Option<Callable<R>>) -> Self {
        Self {
            callable,
            expected,
            comparator,
            result: None,
            ran: false,
            errored: false,
            error: ErrorRecord::none(),
        }
    }

    pub fn expected(&self) -> &R {
        &self.expected
    }

    /// The value produced by the last successful invocation.
    pub fn last_result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    /// True once the callable has been invoked by the last `run()`.
    pub fn has_run(&self) -> bool {
        self.ran
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }

    fn record(&mut self, ran: bool, error: ErrorRecord) {
        self.ran = ran;
        self.errored = error.kind().is_error();
        if self.errored {
            debug!("Unit failed ({}): {}", error.kind(), error.message());
        }
        self.error = error;
    }
}

impl<R, C> Runnable for Unit<R, C>
where
    R: Send + 'static,
    C: Comparator<R>,
{
    fn run(&mut self) -> bool {
        let Some(callable) = self.callable.as_mut() else {
            self.result = None;
            self.record(false, ErrorRecord::new(ErrorKind::NoCallable, NO_CALLABLE));
            return false;
        };

        match invoke(callable) {
            Ok(value) => {
                let error = if self.comparator.compare(&value, &self.expected) {
                    ErrorRecord::none()
                } else {
                    ErrorRecord::new(ErrorKind::ResultInvalid, RESULT_INVALID)
                };
                self.result = Some(value);
                self.record(true, error);
            }
            Err(message) => {
                self.result = None;
                self.record(true, ErrorRecord::new(ErrorKind::ReturnedError, message));
            }
        }

        !self.errored
    }

    fn error(&self) -> ErrorRecord {
        self.error.clone()
    }
}

impl<R: fmt::Debug, C> fmt::Debug for Unit<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("has_callable", &self.callable.is_some())
            .field("expected", &self.expected)
            .field("result", &self.result)
            .field("ran", &self.ran)
            .field("error", &self.error)
            .finish()
    }
}

/// A callable without a result to compare
///
/// Succeeds whenever the callable returns without an error.
pub struct VoidUnit {
    callable: Option<Callable<()>>,
    ran: bool,
    errored: bool,
    error: ErrorRecord,
}

impl VoidUnit {
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::build(Some(boxed(f)))
    }

    pub fn try_new<E, F>(f: F) -> Self
    where
        E: Into<anyhow::Error>,
        F: FnMut() -> Result<(), E> + Send + 'static,
    {
        Self::build(Some(boxed_fallible(f)))
    }

    pub fn without_callable() -> Self {
        Self::build(None)
    }

    fn build(callable: Option<Callable<()>>) -> Self {
        Self {
            callable,
            ran: false,
            errored: false,
            error: ErrorRecord::none(),
        }
    }

    pub fn has_run(&self) -> bool {
        self.ran
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }
}

impl Runnable for VoidUnit {
    fn run(&mut self) -> bool {
        let (ran, error) = match self.callable.as_mut() {
            None => (false, ErrorRecord::new(ErrorKind::NoCallable, NO_CALLABLE)),
            Some(callable) => match invoke(callable) {
                Ok(()) => (true, ErrorRecord::none()),
                Err(message) => (true, ErrorRecord::new(ErrorKind::ReturnedError, message)),
            },
        };

        self.ran = ran;
        self.errored = error.kind().is_error();
        if self.errored {
            debug!("Void unit failed ({}): {}", error.kind(), error.message());
        }
        self.error = error;

        !self.errored
    }

    fn error(&self) -> ErrorRecord {
        self.error.clone()
    }
}

impl fmt::Debug for VoidUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoidUnit")
            .field("has_callable", &self.callable.is_some())
            .field("ran", &self.ran)
            .field("error", &self.error)
            .finish()
    }
}

/// Creates a shared unit comparing `f()` to `expected` for equality.
pub fn make_unit<R, F>(expected: R, f: F) -> SharedUnit
where
    R: PartialEq + Send + 'static,
    F: FnMut() -> R + Send + 'static,
{
    shared(Unit::new(expected, f))
}

/// Creates a shared unit judged by `comparator`.
pub fn make_unit_with<R, C, F>(expected: R, comparator: C, f: F) -> SharedUnit
where
    R: Send + 'static,
    C: Comparator<R> + 'static,
    F: FnMut() -> R + Send + 'static,
{
    shared(Unit::with_comparator(expected, comparator, f))
}

/// Creates a shared unit for a callable without a result.
pub fn make_void_unit<F>(f: F) -> SharedUnit
where
    F: FnMut() + Send + 'static,
{
    shared(VoidUnit::new(f))
}
