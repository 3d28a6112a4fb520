use crate::call::{Call, Completion};
use crate::callback::Callback;
use crate::dispatch::{self, Dispatch};
use crate::error::CallError;
use crate::future::{FutureCall, ResultCell};
use crate::response::Response;
use log::warn;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The primitive future: adapts one callback-driven call into a
/// thread-safely observable result.
///
/// The transport's terminal completion signal is written into a
/// single-assignment cell (releasing any threads blocked in `get_within`)
/// and simultaneously forwarded to the enqueued callback, if one was
/// registered. A transport failure never surfaces as an error: it is
/// synthesized into a response tagged `CODE_FAILED_REQUEST` so both
/// consumption modes observe it through the ordinary result channel, while
/// the callback consumer is additionally notified through `on_error`.
///
/// All other future variants are decorators around this type and delegate
/// their waiting and cancellation behavior to it.
pub struct ResponseFuture<T: 'static> {
    call: Box<dyn Call<T>>,
    dispatch: Option<Arc<dyn Dispatch>>,
    cell: Arc<ResultCell<Response<T>>>,
}

impl<T> ResponseFuture<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a future around `call`, delivering callbacks through
    /// `dispatch` when one is given.
    pub fn new(call: Box<dyn Call<T>>, dispatch: Option<Arc<dyn Dispatch>>) -> Self {
        ResponseFuture {
            call,
            dispatch,
            cell: Arc::new(ResultCell::new()),
        }
    }

    fn completion(&self, callback: Option<Box<dyn Callback<Response<T>>>>) -> Completion<T> {
        let cell = Arc::clone(&self.cell);
        let dispatch = self.dispatch.clone();

        Box::new(move |outcome| {
            let (response, failed) = match outcome {
                Ok(response) => (response, false),
                Err(cause) => {
                    warn!("request failed: {}", cause);
                    (Response::failed(cause), true)
                }
            };

            match callback {
                None => {
                    cell.write(response);
                }
                Some(callback) => {
                    let delivered = response.clone();
                    cell.write(response);
                    dispatch::run(
                        &dispatch,
                        Box::new(move || {
                            if failed {
                                callback.on_error();
                            } else {
                                let code = delivered.code();
                                let message = delivered.message().to_owned();
                                callback.on_response(code, &message, Some(delivered));
                            }
                        }),
                    );
                }
            }
        })
    }

    fn start_call(&self) {
        if self.call.is_started() {
            // The original call is spent; fire an equivalent fresh copy.
            // Its completion still lands in this future's cell, where the
            // first write wins.
            self.call.duplicate().start(self.completion(None));
        } else {
            self.call.start(self.completion(None));
        }
    }
}

impl<T> FutureCall<Response<T>> for ResponseFuture<T>
where
    T: Clone + Send + 'static,
{
    fn submit(&self) -> &Self {
        self.start_call();
        self
    }

    fn enqueue(&self, callback: Box<dyn Callback<Response<T>>>) -> Result<&Self, CallError> {
        if self.call.is_started() {
            return Err(CallError::AlreadyExecuted);
        }
        self.call.start(self.completion(Some(callback)));
        Ok(self)
    }

    fn get_within(
        &self,
        timeout: Option<Duration>,
        error_on_timeout: bool,
    ) -> Result<Option<Response<T>>, CallError> {
        if let Some(response) = self.cell.peek()? {
            return Ok(Some(response));
        }

        if !self.call.is_started() {
            self.start_call();
        }

        match (self.cell.wait(timeout)?, timeout) {
            (Some(response), _) => Ok(Some(response)),
            (None, Some(timeout)) if error_on_timeout => Err(CallError::TimedOut(timeout)),
            (None, _) => Ok(None),
        }
    }

    fn is_executed(&self) -> bool {
        self.call.is_started()
    }

    fn cancel(&self) {
        self.call.cancel()
    }

    fn is_canceled(&self) -> bool {
        self.call.is_canceled()
    }
}

impl<T> Clone for ResponseFuture<T>
where
    T: Clone + Send + 'static,
{
    /// Produces a fresh, unexecuted future around a fresh copy of the
    /// underlying call. Neither the result cell nor the execution state is
    /// shared with the original, so completing one never affects the other.
    fn clone(&self) -> Self {
        ResponseFuture {
            call: self.call.duplicate(),
            dispatch: self.dispatch.clone(),
            cell: Arc::new(ResultCell::new()),
        }
    }
}

impl<T: 'static> fmt::Debug for ResponseFuture<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("ResponseFuture")
            .field("started", &self.call.is_started())
            .field("canceled", &self.call.is_canceled())
            .finish()
    }
}
