//! This module defines the future variants which adapt a callback-driven
//! call into blocking and callback consumption modes, together with the
//! capability trait they all share.
//!
//! `ResponseFuture` is the primitive: it owns the single-assignment result
//! slot and bridges the transport's one terminal completion signal into
//! both a stored result (for blocking retrieval) and a forwarded callback.
//! The remaining variants are decorators which transform the result on
//! delivery and delegate all waiting and cancellation to the future they
//! wrap.

use crate::callback::Callback;
use crate::error::CallError;
use std::time::Duration;

mod body;
mod envelope;
mod payload;
mod response_future;
mod result_cell;

pub use self::body::BodyFuture;
pub use self::envelope::{EnvelopeFuture, Filter, FilterChain};
pub use self::payload::PayloadFuture;
pub use self::response_future::ResponseFuture;

pub(crate) use self::result_cell::ResultCell;

/// The consumption surface shared by every future variant.
///
/// A future is single use for submission purposes: `enqueue` may be called
/// at most once, and only on a future that has not executed yet. Blocking
/// retrieval may be repeated freely; once the outcome is available, every
/// call observes the same cached result without blocking again. To re-issue
/// the same logical request, clone the future: each variant's `Clone`
/// produces a fresh, unexecuted future around a fresh copy of the
/// underlying call, sharing no state with the original.
pub trait FutureCall<T>: Send + Sync {
    /// Starts the underlying call without waiting for its result.
    ///
    /// Submission is idempotent with respect to an already started call: a
    /// repeated submission operates on a fresh copy of the operation rather
    /// than re-using the spent one. Either way the first completion to
    /// arrive wins.
    fn submit(&self) -> &Self;

    /// Registers `callback` to fire exactly once with the terminal outcome,
    /// starting the underlying call in the process.
    ///
    /// This never blocks: the callback fires later, on the configured
    /// dispatch context, or on the transport's completion thread when none
    /// was configured. Fails with `CallError::AlreadyExecuted` if this
    /// future has already executed.
    fn enqueue(&self, callback: Box<dyn Callback<T>>) -> Result<&Self, CallError>;

    /// Blocks until the result is available, `timeout` elapses (`None`
    /// waits indefinitely), or the wait itself fails.
    ///
    /// Returns immediately if the result is already available, and starts
    /// the underlying call if it has not been started yet. On timeout the
    /// result degrades to `Ok(None)` unless `error_on_timeout` is set, in
    /// which case `CallError::TimedOut` is reported instead. A timeout
    /// never cancels the underlying call: a completion arriving later still
    /// satisfies any subsequent retrieval.
    ///
    /// A transport failure is not an error here: it surfaces through the
    /// result channel as the reserved-code response, or as an absent result
    /// in the unwrapping variants.
    fn get_within(
        &self,
        timeout: Option<Duration>,
        error_on_timeout: bool,
    ) -> Result<Option<T>, CallError>;

    /// Blocks until the result is available.
    fn get(&self) -> Result<Option<T>, CallError> {
        self.get_within(None, false)
    }

    /// Blocks until the result is available or `timeout` elapses, in which
    /// case the result degrades to `Ok(None)`.
    fn get_timeout(&self, timeout: Duration) -> Result<Option<T>, CallError> {
        self.get_within(Some(timeout), false)
    }

    /// Whether this future ever started its underlying call.
    fn is_executed(&self) -> bool;

    /// Requests cancellation of the underlying call.
    ///
    /// Best effort: a completion signal already in flight may still land,
    /// and callers should treat such a late outcome as a normal, if
    /// unwanted, result.
    fn cancel(&self);

    /// Whether the underlying call was canceled.
    fn is_canceled(&self) -> bool;
}
