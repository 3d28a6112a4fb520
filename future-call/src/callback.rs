//! This module defines the consumer-facing callback interface along with
//! wrappers which weaken or lifecycle-scope its delivery.

use std::fmt;
use std::sync::{Arc, Weak};

/// A consumer of the terminal outcome of a future.
///
/// Exactly one of the two methods is invoked, at most once, per future,
/// unless a lifecycle guard suppressed delivery entirely, in which case
/// neither fires.
pub trait Callback<T>: Send + Sync {
    /// Invoked with the status code, status message, and result of a
    /// delivered response.
    ///
    /// The result may be absent, e.g. when a filter intercepted the
    /// envelope or the response carried no body.
    fn on_response(&self, code: i32, message: &str, result: Option<T>);

    /// Invoked when the request failed at the transport level.
    fn on_error(&self);
}

impl<T, C: ?Sized + Callback<T>> Callback<T> for Box<C> {
    fn on_response(&self, code: i32, message: &str, result: Option<T>) {
        (**self).on_response(code, message, result)
    }

    fn on_error(&self) {
        (**self).on_error()
    }
}

/// A callback wrapper which holds its target weakly.
///
/// If the target has been dropped by the time a delivery arrives, the
/// delivery is silently discarded. Holding a `WeakCallback` never keeps the
/// target (or anything the target references) alive.
pub struct WeakCallback<C> {
    target: Weak<C>,
}

impl<C> WeakCallback<C> {
    /// Creates a weak wrapper around `target`.
    pub fn new(target: &Arc<C>) -> Self {
        WeakCallback {
            target: Arc::downgrade(target),
        }
    }
}

impl<T, C: Callback<T>> Callback<T> for WeakCallback<C> {
    fn on_response(&self, code: i32, message: &str, result: Option<T>) {
        if let Some(target) = self.target.upgrade() {
            target.on_response(code, message, result);
        }
    }

    fn on_error(&self) {
        if let Some(target) = self.target.upgrade() {
            target.on_error();
        }
    }
}

impl<C> fmt::Debug for WeakCallback<C> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("WeakCallback").finish()
    }
}

/// An interface for checking whether the logical owner of a callback is
/// still within its lifetime.
///
/// Typically implemented by (a handle onto) an externally managed object,
/// such as a view or a session. The check is re-evaluated at every
/// delivery.
pub trait Liveness: Send + Sync {
    /// Indicates whether the owner is still alive.
    fn is_alive(&self) -> bool;
}

/// A callback guard which drops deliveries once its owner's lifecycle has
/// ended.
///
/// Both the owner handle and the target callback are held weakly: the guard
/// extends neither lifetime, so parking one inside a long-running future
/// cannot leak the owner's object graph. A delivery is forwarded only when
/// the owner is still allocated and reports itself alive; otherwise it is
/// dropped silently and neither `on_response` nor `on_error` fires.
pub struct LiveCallback<O, C> {
    owner: Weak<O>,
    target: WeakCallback<C>,
}

impl<O, C> LiveCallback<O, C> {
    /// Creates a guard forwarding deliveries to `target` while `owner` is
    /// alive.
    pub fn new(owner: &Arc<O>, target: &Arc<C>) -> Self {
        LiveCallback {
            owner: Arc::downgrade(owner),
            target: WeakCallback::new(target),
        }
    }
}

impl<O: Liveness, C> LiveCallback<O, C> {
    fn owner_alive(&self) -> bool {
        self.owner.upgrade().map_or(false, |owner| owner.is_alive())
    }
}

impl<T, O: Liveness, C: Callback<T>> Callback<T> for LiveCallback<O, C> {
    fn on_response(&self, code: i32, message: &str, result: Option<T>) {
        if self.owner_alive() {
            self.target.on_response(code, message, result);
        }
    }

    fn on_error(&self) {
        if self.owner_alive() {
            self.target.on_error();
        }
    }
}

impl<O, C> fmt::Debug for LiveCallback<O, C> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("LiveCallback").finish()
    }
}
