//! Cancellable driver for pending lifecycle transitions.
//!
//! The state machine itself is poll-based; [`spawn_countdown`] supplies the
//! polls. The spawned task sleeps until the next pending transition and
//! polls the shared lifecycle with that exact instant, so the observed
//! stages match the wall clock regardless of scheduling jitter. Cancelling
//! the task (or dropping its handle) merely stops future polls: it is not a
//! destruction event, and a later poll from anywhere else still observes
//! the correct stage.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Lifecycle, LifecycleStage, OpenError, SaveError};
use crate::payload::LogicalPayload;

/// Clonable handle over one message's lifecycle, shared with the countdown
/// task.
#[derive(Clone, Debug)]
pub struct SharedLifecycle(Arc<Mutex<Lifecycle>>);

impl SharedLifecycle {
    /// Wrap a lifecycle for shared access.
    #[must_use]
    pub fn new(lifecycle: Lifecycle) -> Self { Self(Arc::new(Mutex::new(lifecycle))) }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the message, cloning out the payload.
    ///
    /// # Errors
    ///
    /// Propagates [`OpenError`] from [`Lifecycle::open_at`].
    pub fn open_at(&self, now: Instant) -> Result<LogicalPayload, OpenError> {
        self.lock().open_at(now).map(Clone::clone)
    }

    /// Open the message using the current clock.
    ///
    /// # Errors
    ///
    /// Propagates [`OpenError`] from [`Lifecycle::open_at`].
    pub fn open(&self) -> Result<LogicalPayload, OpenError> { self.open_at(Instant::now()) }

    /// Advance time-derived transitions with an explicit clock reading.
    pub fn poll_at(&self, now: Instant) -> LifecycleStage { self.lock().poll_at(now) }

    /// Advance time-derived transitions using the current clock.
    pub fn poll(&self) -> LifecycleStage { self.poll_at(Instant::now()) }

    /// Dismiss the viewing session with an explicit clock reading.
    pub fn dismiss_at(&self, now: Instant) -> LifecycleStage { self.lock().dismiss_at(now) }

    /// Dismiss the viewing session using the current clock.
    pub fn dismiss(&self) -> LifecycleStage { self.dismiss_at(Instant::now()) }

    /// Persist the message at the viewer's explicit request.
    ///
    /// # Errors
    ///
    /// Propagates [`SaveError`] from [`Lifecycle::save_at`].
    pub fn save_at(&self, now: Instant) -> Result<(), SaveError> { self.lock().save_at(now) }

    /// Instant of the next pending time-derived transition.
    #[must_use]
    pub fn next_transition_at(&self) -> Option<Instant> { self.lock().next_transition_at() }
}

/// Handle over a spawned countdown task.
///
/// Dropping the handle cancels the pending transition polls without side
/// effects; the lifecycle's wall-clock anchors are untouched.
#[derive(Debug)]
pub struct CountdownHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    /// Cancel the pending transition polls.
    pub fn cancel(&self) { self.token.cancel(); }

    /// Report whether the task has exited (completed or cancelled).
    #[must_use]
    pub fn is_finished(&self) -> bool { self.task.is_finished() }

    /// Wait for the task to exit.
    pub async fn join(mut self) { let _ = (&mut self.task).await; }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) { self.token.cancel(); }
}

/// Spawn a task that drives `shared` through its pending transitions.
///
/// The task exits on its own once no transition is pending — for read-once
/// and permanent messages that is immediately, for countdown messages after
/// destruction completes.
#[must_use]
pub fn spawn_countdown(shared: SharedLifecycle) -> CountdownHandle {
    let token = CancellationToken::new();
    let task_token = token.clone();
    let task = tokio::spawn(async move {
        loop {
            let Some(wake) = shared.next_transition_at() else { return };
            tokio::select! {
                () = task_token.cancelled() => return,
                () = tokio::time::sleep_until(wake.into()) => {
                    shared.poll_at(wake);
                }
            }
        }
    });
    CountdownHandle { token, task }
}
