use crate::response::Response;
use failure::Error;

/// The handler a `Call` invokes exactly once when it reaches a terminal
/// state, carrying either the transport response or the failure cause.
pub type Completion<T> = Box<dyn FnOnce(Result<Response<T>, Error>) + Send>;

/// A single asynchronous client operation, as exposed by the transport
/// collaborator.
///
/// Implementations are expected to be cheap handles onto the transport's own
/// request machinery: `start` must return promptly and deliver exactly one
/// terminal `Completion` invocation later, from whatever thread the
/// transport uses. The operation must run to completion independently of
/// this handle's lifetime, i.e. dropping the handle after `start` must not
/// abort the request.
///
/// An operation is spent once started. `duplicate` produces an equivalent,
/// fresh operation so the same logical request can be issued again.
pub trait Call<T>: Send + Sync {
    /// Starts the operation, arranging for `completion` to be invoked
    /// exactly once with the terminal outcome.
    fn start(&self, completion: Completion<T>);

    /// Whether `start` has ever been invoked on this operation.
    fn is_started(&self) -> bool;

    /// Requests cancellation of the operation.
    ///
    /// Best effort only: a completion signal already in flight may still be
    /// delivered after this returns.
    fn cancel(&self);

    /// Whether the operation was canceled.
    fn is_canceled(&self) -> bool;

    /// Creates a fresh, unstarted operation equivalent to this one.
    fn duplicate(&self) -> Box<dyn Call<T>>;
}
