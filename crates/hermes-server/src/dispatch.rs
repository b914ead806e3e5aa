//! Type-erased dispatch units.
//!
//! Registration turns every typed handler into a [`DispatchUnit`]: a closure
//! that takes the built [`ServiceContext`] and the [`DecodedInput`] and
//! returns a finished response. Decoding the typed input, calling the handler
//! and encoding the output all happen inside that closure, so the router only
//! stores one concrete type.

use std::future::Future;
use std::sync::Arc;

use futures_core::TryStream;
use hermes_core::{
    AuthRequirement, Endpoint, EndpointDescriptor, HermesError, HermesResult, Response,
    ServiceContext,
};
use hermes_extract::{encode_json, no_content, DecodeInput, DecodedInput};
use hermes_middleware::BoxFuture;
use hermes_sse::{sse_response, SseConfig, SseItem};
use serde::Serialize;

/// The future a dispatch unit returns.
pub type HandlerFuture = BoxFuture<'static, HermesResult<Response>>;

/// A type-erased handler invocation.
pub type ErasedHandler = Arc<dyn Fn(ServiceContext, DecodedInput) -> HandlerFuture + Send + Sync>;

/// One routed operation: its descriptor plus the erased handler.
#[derive(Clone)]
pub struct DispatchUnit {
    descriptor: EndpointDescriptor,
    handler: ErasedHandler,
}

impl DispatchUnit {
    pub(crate) fn new(descriptor: EndpointDescriptor, handler: ErasedHandler) -> Self {
        Self {
            descriptor,
            handler,
        }
    }

    /// Returns the endpoint's descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &EndpointDescriptor {
        &self.descriptor
    }

    /// Returns the endpoint's auth requirement.
    #[must_use]
    pub fn auth(&self) -> AuthRequirement {
        self.descriptor.auth()
    }

    /// Runs the handler.
    ///
    /// Handler errors are returned unchanged for the middleware chain to
    /// translate.
    pub fn call(
        &self,
        ctx: ServiceContext,
        input: DecodedInput,
    ) -> HandlerFuture {
        (self.handler)(ctx, input)
    }
}

impl std::fmt::Debug for DispatchUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchUnit")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Erases a handler whose output is encoded as JSON with status 200.
pub(crate) fn value_handler<E, H, Fut>(handler: H) -> ErasedHandler
where
    E: Endpoint,
    E::Input: DecodeInput,
    E::Output: Serialize,
    H: Fn(ServiceContext, E::Input) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HermesResult<E::Output>> + Send + 'static,
{
    let handler = Arc::new(handler);
    Arc::new(move |ctx: ServiceContext, input: DecodedInput| -> HandlerFuture {
        let handler = Arc::clone(&handler);
        Box::pin(async move {
            let input = E::Input::decode(&input)?;
            let output = handler(ctx, input).await?;
            encode_json(&output)
        })
    })
}

/// Erases a handler that answers `204 No Content` on success.
pub(crate) fn empty_handler<E, H, Fut>(handler: H) -> ErasedHandler
where
    E: Endpoint,
    E::Input: DecodeInput,
    H: Fn(ServiceContext, E::Input) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HermesResult<()>> + Send + 'static,
{
    let handler = Arc::new(handler);
    Arc::new(move |ctx: ServiceContext, input: DecodedInput| -> HandlerFuture {
        let handler = Arc::clone(&handler);
        Box::pin(async move {
            let input = E::Input::decode(&input)?;
            handler(ctx, input).await?;
            Ok::<_, HermesError>(no_content())
        })
    })
}

/// Erases a handler that returns a lazy event source.
///
/// Errors raised before the source is returned propagate like any other
/// handler error; errors yielded by the source end the stream instead.
pub(crate) fn stream_handler<E, H, Fut, S, Err>(handler: H, config: SseConfig) -> ErasedHandler
where
    E: Endpoint,
    E::Input: DecodeInput,
    H: Fn(ServiceContext, E::Input) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HermesResult<S>> + Send + 'static,
    S: TryStream<Error = Err> + Send + 'static,
    S::Ok: Into<SseItem> + Send,
    Err: std::fmt::Display + Send + 'static,
{
    let handler = Arc::new(handler);
    Arc::new(move |ctx: ServiceContext, input: DecodedInput| -> HandlerFuture {
        let handler = Arc::clone(&handler);
        let config = config.clone();
        Box::pin(async move {
            let input = E::Input::decode(&input)?;
            let source = handler(ctx, input).await?;
            Ok::<_, HermesError>(sse_response(source, config))
        })
    })
}
