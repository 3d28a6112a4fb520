use crate::callback::Callback;
use crate::error::CallError;
use crate::future::{FutureCall, ResponseFuture};
use crate::response::{Envelope, Response, CODE_INTERCEPTED};
use log::debug;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A predicate which may suppress delivery of an envelope.
///
/// Filters are configured once, on the adapter, and shared read-only across
/// every future it creates. They run in registration order on the callback
/// delivery path; the first filter to report interception wins and no
/// further filters are consulted. A filter may annotate the envelope before
/// delivery (hence the mutable access) even when it does not intercept.
pub trait Filter<P>: Send + Sync {
    /// Returns `true` when `envelope` should be suppressed rather than
    /// delivered.
    fn intercept(&self, envelope: &mut P) -> bool;
}

/// The shared, read-only list of filters an adapter hands to the futures it
/// creates.
pub type FilterChain<P> = Arc<Vec<Arc<dyn Filter<P>>>>;

/// A future delivering the application envelope unwrapped from the
/// transport response.
///
/// On the callback path, a successful response has its envelope run through
/// the filter chain before delivery; an intercepted envelope is replaced by
/// an absent result tagged `CODE_INTERCEPTED`. On the blocking path the
/// envelope is returned as-is, without consulting filters; blocking
/// callers inspect the envelope status themselves. A synthesized
/// failed-request response yields an absent result on both paths.
pub struct EnvelopeFuture<P: 'static> {
    inner: ResponseFuture<P>,
    filters: FilterChain<P>,
}

impl<P> EnvelopeFuture<P>
where
    P: Envelope + Clone + Send + 'static,
{
    /// Creates an envelope-unwrapping future around `inner`.
    pub fn new(inner: ResponseFuture<P>, filters: FilterChain<P>) -> Self {
        EnvelopeFuture { inner, filters }
    }
}

impl<P> FutureCall<P> for EnvelopeFuture<P>
where
    P: Envelope + Clone + Send + 'static,
{
    fn submit(&self) -> &Self {
        self.inner.submit();
        self
    }

    fn enqueue(&self, callback: Box<dyn Callback<P>>) -> Result<&Self, CallError> {
        self.inner.enqueue(Box::new(EnvelopeCallback {
            callback,
            filters: Arc::clone(&self.filters),
        }))?;
        Ok(self)
    }

    fn get_within(
        &self,
        timeout: Option<Duration>,
        error_on_timeout: bool,
    ) -> Result<Option<P>, CallError> {
        match self.inner.get_within(timeout, error_on_timeout)? {
            None => Ok(None),
            Some(response) => {
                if response.is_failed_request() {
                    Ok(None)
                } else {
                    Ok(response.into_body())
                }
            }
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

impl<P> Clone for EnvelopeFuture<P>
where
    P: Envelope + Clone + Send + 'static,
{
    fn clone(&self) -> Self {
        EnvelopeFuture {
            inner: self.inner.clone(),
            filters: Arc::clone(&self.filters),
        }
    }
}

impl<P: 'static> fmt::Debug for EnvelopeFuture<P> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("EnvelopeFuture")
            .field("inner", &self.inner)
            .field("filters", &self.filters.len())
            .finish()
    }
}

struct EnvelopeCallback<P: 'static> {
    callback: Box<dyn Callback<P>>,
    filters: FilterChain<P>,
}

impl<P: 'static> EnvelopeCallback<P> {
    fn intercepts(&self, envelope: &mut P) -> bool {
        for (index, filter) in self.filters.iter().enumerate() {
            if filter.intercept(envelope) {
                debug!("envelope intercepted by filter {}", index);
                return true;
            }
        }
        false
    }
}

impl<P: Envelope + 'static> Callback<Response<P>> for EnvelopeCallback<P> {
    fn on_response(&self, code: i32, message: &str, result: Option<Response<P>>) {
        let response = match result {
            Some(response) => response,
            None => {
                self.callback.on_error();
                return;
            }
        };

        if !response.is_successful() {
            self.callback.on_error();
            return;
        }

        match response.into_body() {
            Some(mut envelope) => {
                if self.intercepts(&mut envelope) {
                    self.callback
                        .on_response(CODE_INTERCEPTED, "envelope intercepted", None);
                } else {
                    self.callback.on_response(code, message, Some(envelope));
                }
            }
            None => self.callback.on_response(code, message, None),
        }
    }

    fn on_error(&self) {
        self.callback.on_error()
    }
}
