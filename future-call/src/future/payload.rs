use crate::callback::Callback;
use crate::error::CallError;
use crate::future::{EnvelopeFuture, FutureCall};
use crate::response::Envelope;
use std::fmt;
use std::time::Duration;

/// A future delivering only the payload extracted from the application
/// envelope, discarding the envelope metadata.
///
/// On successful delivery the callback fires with the envelope's own status
/// code and message, not the transport's. Transport failures and filter
/// interceptions pass through unchanged in kind, payload-shaped: an
/// interception still arrives as `CODE_INTERCEPTED` with an absent result.
pub struct PayloadFuture<P: Envelope + 'static>
where
    P::Payload: 'static,
{
    inner: EnvelopeFuture<P>,
}

impl<P> PayloadFuture<P>
where
    P: Envelope + Clone + Send + 'static,
    P::Payload: 'static,
{
    /// Creates a payload-extracting future around `inner`.
    pub fn new(inner: EnvelopeFuture<P>) -> Self {
        PayloadFuture { inner }
    }
}

impl<P> FutureCall<P::Payload> for PayloadFuture<P>
where
    P: Envelope + Clone + Send + 'static,
    P::Payload: 'static,
{
    fn submit(&self) -> &Self {
        self.inner.submit();
        self
    }

    fn enqueue(&self, callback: Box<dyn Callback<P::Payload>>) -> Result<&Self, CallError> {
        self.inner.enqueue(Box::new(PayloadCallback::<P> { callback }))?;
        Ok(self)
    }

    fn get_within(
        &self,
        timeout: Option<Duration>,
        error_on_timeout: bool,
    ) -> Result<Option<P::Payload>, CallError> {
        match self.inner.get_within(timeout, error_on_timeout)? {
            Some(envelope) => Ok(envelope.into_payload()),
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

impl<P> Clone for PayloadFuture<P>
where
    P: Envelope + Clone + Send + 'static,
    P::Payload: 'static,
{
    fn clone(&self) -> Self {
        PayloadFuture {
            inner: self.inner.clone(),
        }
    }
}

impl<P> fmt::Debug for PayloadFuture<P>
where
    P: Envelope + 'static,
    P::Payload: 'static,
{
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("PayloadFuture")
            .field("inner", &self.inner)
            .finish()
    }
}

struct PayloadCallback<P: Envelope>
where
    P::Payload: 'static,
{
    callback: Box<dyn Callback<P::Payload>>,
}

impl<P> Callback<P> for PayloadCallback<P>
where
    P: Envelope,
    P::Payload: 'static,
{
    fn on_response(&self, code: i32, message: &str, result: Option<P>) {
        match result {
            Some(envelope) => {
                let code = envelope.code();
                let message = envelope.message().to_owned();
                self.callback.on_response(code, &message, envelope.into_payload());
            }
            None => self.callback.on_response(code, message, None),
        }
    }

    fn on_error(&self) {
        self.callback.on_error()
    }
}
