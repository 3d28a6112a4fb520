use crate::callback::Callback;
use crate::error::CallError;
use crate::future::{FutureCall, ResponseFuture};
use crate::response::Response;
use std::fmt;
use std::time::Duration;

/// A future delivering the deserialized transport body with no envelope or
/// filter layer in between.
///
/// Used when no envelope type is configured, or when the declared result
/// type matches neither the raw response nor the envelope: the caller gets
/// the body and nothing else. A synthesized failed-request response has no
/// body, so failures surface as an absent result on the blocking path and
/// as `on_error` on the callback path.
pub struct BodyFuture<T: 'static> {
    inner: ResponseFuture<T>,
}

impl<T> BodyFuture<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a body-extracting future around `inner`.
    pub fn new(inner: ResponseFuture<T>) -> Self {
        BodyFuture { inner }
    }
}

impl<T> FutureCall<T> for BodyFuture<T>
where
    T: Clone + Send + 'static,
{
    fn submit(&self) -> &Self {
        self.inner.submit();
        self
    }

    fn enqueue(&self, callback: Box<dyn Callback<T>>) -> Result<&Self, CallError> {
        self.inner.enqueue(Box::new(BodyCallback { callback }))?;
        Ok(self)
    }

    fn get_within(
        &self,
        timeout: Option<Duration>,
        error_on_timeout: bool,
    ) -> Result<Option<T>, CallError> {
        match self.inner.get_within(timeout, error_on_timeout)? {
            Some(response) => Ok(response.into_body()),
            None => Ok(None),
        }
    }

    fn is_executed(&self) -> bool {
        self.inner.is_executed()
    }

    fn cancel(&self) {
        self.inner.cancel()
    }

    fn is_canceled(&self) -> bool {
        self.inner.is_canceled()
    }
}

impl<T> Clone for BodyFuture<T>
where
    T: Clone + Send + 'static,
{
    fn clone(&self) -> Self {
        BodyFuture {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> fmt::Debug for BodyFuture<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("BodyFuture")
            .field("inner", &self.inner)
            .finish()
    }
}

struct BodyCallback<T: 'static> {
    callback: Box<dyn Callback<T>>,
}

impl<T: 'static> Callback<Response<T>> for BodyCallback<T> {
    fn on_response(&self, code: i32, message: &str, result: Option<Response<T>>) {
        self.callback
            .on_response(code, message, result.and_then(Response::into_body));
    }

    fn on_error(&self) {
        self.callback.on_error()
    }
}
