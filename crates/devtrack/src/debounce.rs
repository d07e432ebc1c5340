//! Cancellable delayed task on the tokio runtime.
//!
//! A `Debouncer` holds at most one pending task. Scheduling a new task aborts
//! the previous one, so a burst of schedules runs only the last task, once the
//! quiet interval has elapsed without another schedule.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Single-slot debounce timer.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Create a debouncer that waits `quiet` before running a task.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Replace any pending task with `task`, to run after the quiet interval.
    ///
    /// Returns the task back if no tokio runtime is active on this thread;
    /// nothing is scheduled in that case.
    pub fn schedule<F>(&mut self, task: F) -> Result<(), F>
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => return Err(task),
        };

        let deadline = tokio::time::Instant::now() + self.quiet;
        self.pending = Some(handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            task();
        }));
        Ok(())
    }

    /// Abort the pending task. Returns true if a task had not yet run.
    ///
    /// On a multi-thread runtime a task that has already started keeps
    /// running to completion; abort only stops it at its next await point.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let live = !handle.is_finished();
                handle.abort();
                live
            }
            None => false,
        }
    }

    /// Whether a scheduled task is still waiting to run.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
