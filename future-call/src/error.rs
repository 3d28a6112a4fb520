//! A module defining the errors that may be reported directly to callers.
//!
//! Transport-level failures deliberately do not appear here: they are
//! surfaced as data, through a synthesized response tagged with
//! `CODE_FAILED_REQUEST`, so that blocking and callback consumers observe
//! them through the same channel as any other response.

use failure_derive::Fail;
use std::time::Duration;

/// An error reported by the consumption methods of a future.
#[derive(Clone, Copy, Debug, Eq, Fail, PartialEq)]
pub enum CallError {
    /// The future was already submitted or enqueued.
    ///
    /// Futures are single use: once a callback has been registered (or the
    /// underlying call otherwise started) registering another one is a bug
    /// in the caller. Clone the future to re-issue the request instead.
    #[fail(display = "future already executed")]
    AlreadyExecuted,

    /// The blocking wait elapsed before a completion arrived.
    ///
    /// Only reported when the caller opted in; otherwise a timeout degrades
    /// to an absent result. A timeout does not cancel the underlying call,
    /// so a later completion still satisfies a fresh wait.
    #[fail(display = "timed out after {:?}", _0)]
    TimedOut(Duration),

    /// A thread panicked while completing or awaiting this future.
    ///
    /// This is the closest analog to an interrupted wait: the result slot
    /// was poisoned and the stored outcome can no longer be trusted. It is
    /// reported distinctly so callers never conflate it with a timeout or
    /// with a transport failure.
    #[fail(display = "result slot poisoned by a panicked thread")]
    Poisoned,
}

/// A configuration error detected while selecting a wrapping strategy.
///
/// These are reported at registration time, never at call time.
#[derive(Clone, Copy, Debug, Eq, Fail, PartialEq)]
pub enum AdapterError {
    /// A shape which structurally requires a type parameter had none,
    /// e.g. a bare `Response` instead of `Response<Foo>`.
    #[fail(display = "{} must be parameterized, e.g. {}<Foo>", _0, _0)]
    Unparameterized(&'static str),
}
