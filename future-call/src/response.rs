use failure::Error;
use std::fmt;
use std::sync::Arc;

/// Status code of the synthesized response produced when the underlying
/// call fails at the transport level (connectivity, protocol error, etc.).
///
/// Failures are surfaced through the normal result channel instead of an
/// error so that blocking and callback consumers observe them uniformly.
pub const CODE_FAILED_REQUEST: i32 = 499;

/// Status code delivered when a filter intercepted an otherwise successful
/// envelope and suppressed its delivery.
pub const CODE_INTERCEPTED: i32 = 498;

/// A transport-level response carrying a status code, a status message, and
/// an optional deserialized body.
///
/// Instances are normally produced by the transport collaborator. The one
/// exception is `Response::failed`, which synthesizes the reserved-code
/// response used to funnel transport failures through the result channel.
#[derive(Clone, Debug)]
pub struct Response<T> {
    code: i32,
    message: String,
    body: Option<T>,
    cause: Option<Arc<Error>>,
}

impl<T> Response<T> {
    /// Creates a response with the given status code, message, and body.
    pub fn new<M: Into<String>>(code: i32, message: M, body: Option<T>) -> Self {
        Response {
            code,
            message: message.into(),
            body,
            cause: None,
        }
    }

    /// Synthesizes the response which represents a failed request.
    ///
    /// The result carries `CODE_FAILED_REQUEST`, no body, and retains the
    /// failure cause for later inspection.
    pub fn failed(cause: Error) -> Self {
        Response {
            code: CODE_FAILED_REQUEST,
            message: "request failed".to_owned(),
            body: None,
            cause: Some(Arc::new(cause)),
        }
    }

    /// The status code of this response.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// The status message of this response.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// A reference to the body, if one is present.
    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    /// Consumes the response and returns its body, if one is present.
    pub fn into_body(self) -> Option<T> {
        self.body
    }

    /// Whether the status code denotes success, i.e. lies in `200..300`.
    pub fn is_successful(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// Whether this is a synthesized failed-request response.
    pub fn is_failed_request(&self) -> bool {
        self.code == CODE_FAILED_REQUEST
    }

    /// The failure which caused this response to be synthesized, if any.
    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_ref().map(|c| &**c)
    }
}

impl<T> fmt::Display for Response<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{} {}", self.code, self.message)
    }
}

/// An application-level envelope wrapped around a payload.
///
/// Services which wrap every payload in a common envelope (a status code, a
/// human readable message, and the business data itself) implement this
/// trait on the envelope type; the envelope and payload future variants use
/// it to inspect and unwrap results on delivery.
pub trait Envelope {
    /// The business-data value carried inside the envelope.
    type Payload;

    /// The application status code of the envelope.
    fn code(&self) -> i32;

    /// The application status message of the envelope.
    fn message(&self) -> &str;

    /// Consumes the envelope and extracts its payload, if one is present.
    fn into_payload(self) -> Option<Self::Payload>;
}
