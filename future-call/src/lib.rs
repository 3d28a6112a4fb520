//! A library for adapting asynchronous, callback-driven client calls into
//! futures. Each future supports three consumption modes: fire-and-forget
//! submission, callback notification on a configurable dispatch context, and
//! blocking retrieval with an optional timeout.
//!
//! The entry point is usually a `FutureAdapter`, which inspects the declared
//! result shape of a client operation and wraps it in one of four future
//! variants: the raw transport response, the application envelope, the
//! payload extracted from that envelope, or the plain response body. All
//! variants share the same waiting/cancellation machinery and differ only in
//! how they transform the result on delivery.

#![deny(missing_copy_implementations)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![deny(trivial_casts)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]

pub mod adapter;
pub mod callback;
pub mod dispatch;
pub mod error;
pub mod future;

mod call;
mod response;

pub use self::call::{Call, Completion};
pub use self::callback::Callback;
pub use self::error::{AdapterError, CallError};
pub use self::future::FutureCall;
pub use self::response::{Envelope, Response, CODE_FAILED_REQUEST, CODE_INTERCEPTED};
