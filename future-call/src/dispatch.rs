//! This module defines the context on which enqueued callbacks are
//! dispatched, and implementations of it over common executor backends.
//!
//! When a future has no dispatch context configured, callbacks run
//! synchronously on whichever thread the transport completes on.

use futures_util::task::{Spawn, SpawnExt};
use log::warn;
use std::fmt;
use std::sync::{Arc, Mutex};

#[cfg(feature = "tokio")]
pub use self::tokio_impl::TokioDispatch;

/// An executor of callback tasks.
///
/// A task handed to `dispatch` must eventually run exactly once, possibly
/// asynchronously and on a different thread than the caller.
pub trait Dispatch: Send + Sync {
    /// Schedules `task` for execution.
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>);
}

impl<T: ?Sized + Dispatch> Dispatch for Arc<T> {
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>) {
        (**self).dispatch(task)
    }
}

/// Runs `task` on the given context, or inline when none is configured.
pub(crate) fn run(dispatch: &Option<Arc<dyn Dispatch>>, task: Box<dyn FnOnce() + Send>) {
    match dispatch {
        Some(dispatch) => dispatch.dispatch(task),
        None => task(),
    }
}

/// A dispatch context backed by any `futures` executor, e.g. a
/// `futures_executor::ThreadPool`.
///
/// If the executor has shut down the task is run inline instead, so that
/// exactly-once callback delivery still holds.
pub struct SpawnDispatch<S> {
    spawner: S,
}

impl<S: Spawn + Send + Sync> SpawnDispatch<S> {
    /// Creates a dispatch context which spawns callback tasks on `spawner`.
    pub fn new(spawner: S) -> Self {
        SpawnDispatch { spawner }
    }
}

impl<S: Spawn + Send + Sync> Dispatch for SpawnDispatch<S> {
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>) {
        // The task is parked in a shared slot so it can be recovered (and
        // run inline) if the executor rejects the spawn.
        let slot = Arc::new(Mutex::new(Some(task)));
        let spawned = Arc::clone(&slot);

        let spawn_result = self.spawner.spawn(async move {
            if let Some(task) = take_task(&spawned) {
                task();
            }
        });

        if spawn_result.is_err() {
            warn!("dispatch executor unavailable, running callback task inline");
            if let Some(task) = take_task(&slot) {
                task();
            }
        }
    }
}

fn take_task(slot: &Mutex<Option<Box<dyn FnOnce() + Send>>>) -> Option<Box<dyn FnOnce() + Send>> {
    slot.lock().ok().and_then(|mut task| task.take())
}

impl<S> fmt::Debug for SpawnDispatch<S> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("SpawnDispatch").finish()
    }
}

#[cfg(feature = "tokio")]
mod tokio_impl {
    use super::Dispatch;
    use std::fmt;
    use tokio::runtime::Handle;

    /// A dispatch context which runs callback tasks on a tokio runtime.
    ///
    /// The handle must belong to a runtime which outlives the futures
    /// dispatching through it.
    #[derive(Clone)]
    pub struct TokioDispatch {
        handle: Handle,
    }

    impl TokioDispatch {
        /// Creates a dispatch context spawning onto the runtime behind
        /// `handle`.
        pub fn new(handle: Handle) -> Self {
            TokioDispatch { handle }
        }
    }

    impl Dispatch for TokioDispatch {
        fn dispatch(&self, task: Box<dyn FnOnce() + Send>) {
            let _ = self.handle.spawn(async move { task() });
        }
    }

    impl fmt::Debug for TokioDispatch {
        fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt.debug_struct("TokioDispatch").finish()
        }
    }
}
