//! Guarded unit groups
//!
//! [`UnitThread`] wraps a shared [`UnitGroup`] so that several threads can
//! try to trigger it while at most one run is ever in flight. The right to
//! run is taken with a single compare-and-swap on the running flag; the run
//! itself happens under the group's mutex, which is also the lock every
//! mutation of the group goes through.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use super::group::UnitGroup;
use crate::config::GuardConfig;
use crate::models::ErrorRecord;
use crate::unit::{Runnable, SharedUnit};

/// Errors from dispatching a background run
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("No unit group is set")]
    NoGroup,

    #[error("A run is already in progress")]
    AlreadyRunning,

    #[error("No tokio runtime available: {0}")]
    NoRuntime(#[from] TryCurrentError),

    #[error("Background run failed: {0}")]
    Join(#[from] JoinError),
}

/// Clears the running flag when dropped, including during unwinding.
struct RunningFlag<'a>(&'a AtomicBool);

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owned form of [`RunningFlag`] for background runs. It is moved into the
/// spawned closure, so the flag is cleared even if the task is dropped
/// without ever running.
struct OwnedRunningFlag(Arc<UnitThread>);

impl Drop for OwnedRunningFlag {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::Release);
    }
}

/// Mutually exclusive runner around a shared unit group
///
/// The group is held through an `Arc`, so the guard and any caller can keep
/// it alive. Anyone holding a clone of that `Arc` must go through its mutex,
/// which keeps mutation serialized with the guarded run.
#[derive(Default)]
pub struct UnitThread {
    group: Option<Arc<Mutex<UnitGroup>>>,
    running: AtomicBool,
    config: GuardConfig,
}

impl UnitThread {
    /// Creates a guard with no group. Every run attempt fails until a group
    /// is set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(group: UnitGroup) -> Self {
        Self::from_shared(Arc::new(Mutex::new(group)))
    }

    pub fn from_shared(group: Arc<Mutex<UnitGroup>>) -> Self {
        Self {
            group: Some(group),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: GuardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_group(&mut self, group: Arc<Mutex<UnitGroup>>) {
        self.group = Some(group);
    }

    /// Shared handle to the wrapped group.
    pub fn group(&self) -> Option<Arc<Mutex<UnitGroup>>> {
        self.group.clone()
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Non-blocking snapshot of the running flag.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn try_set_running(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    fn acquire(&self) -> Option<RunningFlag<'_>> {
        self.try_set_running().then(|| RunningFlag(&self.running))
    }

    /// Runs the group unless a run is already in progress or no group is set.
    ///
    /// Never waits: a refused attempt returns false immediately without
    /// touching the group.
    pub fn try_run(&self) -> bool {
        let Some(group) = self.group.as_ref() else {
            debug!("Run refused: no unit group set");
            return false;
        };

        let Some(_flag) = self.acquire() else {
            debug!("Run refused: a run is already in progress");
            return false;
        };

        let passed = group.lock().run();
        debug!("Guarded run finished: passed={}", passed);
        passed
    }

    /// Waits up to `max_wait` for an in-flight run to finish, then tries to
    /// run. Returns false without running if the wait times out.
    ///
    /// Only the wait is bounded; the run itself is never interrupted. Another
    /// caller may still win the run right once the flag clears, in which case
    /// this call returns false like [`UnitThread::try_run`].
    pub fn run_for(&self, max_wait: Duration) -> bool {
        if !max_wait.is_zero() && !self.wait_until_idle(max_wait) {
            warn!(
                "Gave up waiting for the running unit group after {}ms",
                max_wait.as_millis()
            );
            return false;
        }

        self.try_run()
    }

    /// [`UnitThread::run_for`] with the configured default wait.
    pub fn run_with_default_wait(&self) -> bool {
        self.run_for(self.config.default_wait())
    }

    /// Polls the running flag until it clears or `max_wait` elapses.
    /// Returns true if the guard became idle in time.
    pub fn wait_until_idle(&self, max_wait: Duration) -> bool {
        let start = Instant::now();
        let poll_interval = self.config.poll_interval();

        while self.is_running() {
            if start.elapsed() >= max_wait {
                return false;
            }
            if poll_interval.is_zero() {
                std::hint::spin_loop();
            } else {
                std::thread::sleep(poll_interval);
            }
        }

        true
    }

    /// Adds a unit to the wrapped group under the run lock. Returns `None`
    /// if no group is set.
    pub fn add_unit<U: Runnable + 'static>(&self, unit: U) -> Option<SharedUnit> {
        self.group.as_ref().map(|group| group.lock().add_unit(unit))
    }

    /// Adds an existing handle under the run lock. Returns false if no group
    /// is set.
    pub fn add_shared(&self, unit: SharedUnit) -> bool {
        match self.group.as_ref() {
            Some(group) => {
                group.lock().add_shared(unit);
                true
            }
            None => false,
        }
    }

    /// Adds a possibly absent member under the run lock.
    pub fn add_member(&self, member: Option<SharedUnit>) -> bool {
        match self.group.as_ref() {
            Some(group) => {
                group.lock().add_member(member);
                true
            }
            None => false,
        }
    }

    /// Takes the run right and runs the group on tokio's blocking pool.
    ///
    /// The right is taken before this returns, so a second call made while
    /// the first run is in flight fails with [`GuardError::AlreadyRunning`].
    pub fn spawn_run(self: &Arc<Self>) -> Result<BackgroundRun, GuardError> {
        let group = self.group.clone().ok_or(GuardError::NoGroup)?;
        let runtime = Handle::try_current()?;

        if !self.try_set_running() {
            return Err(GuardError::AlreadyRunning);
        }

        let flag = OwnedRunningFlag(Arc::clone(self));
        let handle = runtime.spawn_blocking(move || {
            let _flag = flag;
            let passed = group.lock().run();
            debug!("Background run finished: passed={}", passed);
            passed
        });

        Ok(BackgroundRun { handle })
    }
}

impl Runnable for UnitThread {
    fn run(&mut self) -> bool {
        self.try_run()
    }

    /// Reads the group's error under the run lock, so this blocks while a
    /// run is in flight.
    fn error(&self) -> ErrorRecord {
        self.group
            .as_ref()
            .map(|group| group.lock().error())
            .unwrap_or_default()
    }
}

/// Handle to a run dispatched by [`UnitThread::spawn_run`]
#[derive(Debug)]
pub struct BackgroundRun {
    handle: JoinHandle<bool>,
}

impl BackgroundRun {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the run and returns the group's result.
    pub async fn wait(self) -> Result<bool, GuardError> {
        Ok(self.handle.await?)
    }
}
