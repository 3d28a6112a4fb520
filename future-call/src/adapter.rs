//! This module decides, at registration time, how a declared result type is
//! wrapped into a future, and constructs the chosen decorator chain.
//!
//! Rust offers no runtime reflection over a service definition's return
//! types, so the declared shape is described explicitly through
//! `TypeShape`. An adapter classifies the shape once per registered
//! operation, never per call, and the resulting `Selection` records both
//! the wrapping strategy and the (possibly synthesized) type the
//! deserialization collaborator must target.

use crate::call::Call;
use crate::dispatch::Dispatch;
use crate::error::AdapterError;
use crate::future::{BodyFuture, EnvelopeFuture, Filter, FilterChain, PayloadFuture, ResponseFuture};
use crate::response::Envelope;
use std::fmt;
use std::sync::Arc;
use void::Void;

/// A structural description of a declared result type.
///
/// `Response` and `Envelope` mark the raw transport-response wrapper and
/// the configured application envelope; their parameter is `None` when the
/// declaration was left unparameterized (a configuration error wherever a
/// parameter is structurally required). `Payload` names a structured
/// business-data type, and `Array`/`Collection` describe one level of
/// aggregation around another shape. Anything else is `Other`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeShape {
    /// The raw transport-response type, possibly parameterized.
    Response(Option<Box<TypeShape>>),
    /// The configured envelope type, possibly parameterized.
    Envelope(Option<Box<TypeShape>>),
    /// A named structured payload type.
    Payload(String),
    /// An array of some element shape.
    Array(Box<TypeShape>),
    /// A parameterized collection of some element shape.
    Collection(Box<TypeShape>),
    /// Any other type, referenced by name.
    Other(String),
}

impl TypeShape {
    /// A `Response` shape parameterized by `inner`.
    pub fn response(inner: TypeShape) -> Self {
        TypeShape::Response(Some(Box::new(inner)))
    }

    /// An `Envelope` shape parameterized by `inner`.
    pub fn envelope(inner: TypeShape) -> Self {
        TypeShape::Envelope(Some(Box::new(inner)))
    }

    /// A structured payload type called `name`.
    pub fn payload<N: Into<String>>(name: N) -> Self {
        TypeShape::Payload(name.into())
    }

    /// An array of `element` shapes.
    pub fn array(element: TypeShape) -> Self {
        TypeShape::Array(Box::new(element))
    }

    /// A collection of `element` shapes.
    pub fn collection(element: TypeShape) -> Self {
        TypeShape::Collection(Box::new(element))
    }

    /// Any other type, called `name`.
    pub fn other<N: Into<String>>(name: N) -> Self {
        TypeShape::Other(name.into())
    }

    /// Whether this shape is a structured payload, or one level of
    /// aggregation around one: the shapes eligible for payload extraction.
    fn is_payload_bearing(&self) -> bool {
        match self {
            TypeShape::Payload(_) => true,
            TypeShape::Array(element) | TypeShape::Collection(element) => {
                matches!(**element, TypeShape::Payload(_))
            }
            _ => false,
        }
    }
}

/// The wrapping strategy chosen for a declared result type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Strategy {
    /// Deliver the plain deserialized body; no envelope layer at all.
    Body,
    /// Deliver the raw transport response.
    Raw,
    /// Deliver the application envelope, filtered but not extracted.
    Envelope,
    /// Deliver the payload extracted from the application envelope.
    Payload,
}

/// The outcome of classifying a declared result type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selection {
    /// Which decorator chain to build.
    pub strategy: Strategy,
    /// The type the deserialization collaborator must produce; for the
    /// payload strategy this is the synthesized envelope-of-payload shape.
    pub response_target: TypeShape,
}

/// A factory which classifies declared result types and builds the matching
/// future variant around each client call.
///
/// The envelope type parameter `P` is the application envelope the service
/// wraps its payloads in; adapters created through `plain` have no envelope
/// configured and wrap nothing (`Void` marks the parameter unused). Filters
/// and the callback dispatch context are configured up front and shared by
/// every future the adapter creates.
pub struct FutureAdapter<P: 'static = Void> {
    dispatch: Option<Arc<dyn Dispatch>>,
    filters: FilterChain<P>,
    envelope_configured: bool,
}

impl FutureAdapter<Void> {
    /// Creates an adapter with no envelope type configured: every declared
    /// result type is delivered as the plain body.
    pub fn plain() -> Self {
        FutureAdapter {
            dispatch: None,
            filters: Arc::new(Vec::new()),
            envelope_configured: false,
        }
    }
}

impl<P: 'static> FutureAdapter<P> {
    /// Creates an adapter which unwraps responses through the envelope type
    /// `P`.
    pub fn with_envelope() -> Self
    where
        P: Envelope,
    {
        FutureAdapter {
            dispatch: None,
            filters: Arc::new(Vec::new()),
            envelope_configured: true,
        }
    }

    /// Configures the context callbacks are dispatched on.
    ///
    /// Without one, callbacks run synchronously on the transport's
    /// completion thread.
    pub fn dispatch_on<D: Dispatch + 'static>(mut self, dispatch: D) -> Self {
        self.dispatch = Some(Arc::new(dispatch));
        self
    }

    /// Appends `filter` to the interception chain.
    ///
    /// Filters run in the order they were added, and only affect futures
    /// created after the filter was added.
    pub fn add_filter<F: Filter<P> + 'static>(mut self, filter: F) -> Self {
        let mut filters = Vec::clone(&self.filters);
        filters.push(Arc::new(filter));
        self.filters = Arc::new(filters);
        self
    }

    /// Classifies `declared` and decides the wrapping strategy, in
    /// precedence order:
    ///
    /// 1. no envelope configured: plain body, no wrapping at all;
    /// 2. the raw response type: raw delivery, targeting its parameter;
    /// 3. the envelope type itself: envelope delivery, no extraction;
    /// 4. a payload-bearing shape: payload extraction, targeting a
    ///    synthesized envelope-of-payload;
    /// 5. anything else: plain body, targeting the declaration verbatim.
    ///
    /// Fails when a shape which structurally requires a type parameter was
    /// declared without one.
    pub fn select(&self, declared: &TypeShape) -> Result<Selection, AdapterError> {
        if !self.envelope_configured {
            return Ok(Selection {
                strategy: Strategy::Body,
                response_target: declared.clone(),
            });
        }

        match declared {
            TypeShape::Response(Some(inner)) => Ok(Selection {
                strategy: Strategy::Raw,
                response_target: (**inner).clone(),
            }),
            TypeShape::Response(None) => Err(AdapterError::Unparameterized("Response")),
            TypeShape::Envelope(Some(_)) => Ok(Selection {
                strategy: Strategy::Envelope,
                response_target: declared.clone(),
            }),
            TypeShape::Envelope(None) => Err(AdapterError::Unparameterized("the envelope type")),
            shape if shape.is_payload_bearing() => Ok(Selection {
                strategy: Strategy::Payload,
                response_target: TypeShape::envelope(declared.clone()),
            }),
            _ => Ok(Selection {
                strategy: Strategy::Body,
                response_target: declared.clone(),
            }),
        }
    }

    /// Wraps `call` for raw transport-response delivery.
    pub fn adapt_raw<T>(&self, call: Box<dyn Call<T>>) -> ResponseFuture<T>
    where
        T: Clone + Send + 'static,
    {
        ResponseFuture::new(call, self.dispatch.clone())
    }

    /// Wraps `call` for plain body delivery.
    pub fn adapt_body<T>(&self, call: Box<dyn Call<T>>) -> BodyFuture<T>
    where
        T: Clone + Send + 'static,
    {
        BodyFuture::new(ResponseFuture::new(call, self.dispatch.clone()))
    }
}

impl<P> FutureAdapter<P>
where
    P: Envelope + Clone + Send + 'static,
{
    /// Wraps `call` for envelope delivery through the configured filters.
    pub fn adapt_envelope(&self, call: Box<dyn Call<P>>) -> EnvelopeFuture<P> {
        EnvelopeFuture::new(
            ResponseFuture::new(call, self.dispatch.clone()),
            Arc::clone(&self.filters),
        )
    }

    /// Wraps `call` for payload extraction through the configured filters.
    pub fn adapt_payload(&self, call: Box<dyn Call<P>>) -> PayloadFuture<P>
    where
        P::Payload: 'static,
    {
        PayloadFuture::new(self.adapt_envelope(call))
    }
}

impl<P: 'static> fmt::Debug for FutureAdapter<P> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("FutureAdapter")
            .field("envelope_configured", &self.envelope_configured)
            .field("filters", &self.filters.len())
            .finish()
    }
}
