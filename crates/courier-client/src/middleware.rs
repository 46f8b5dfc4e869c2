//! The middleware contract.
//!
//! A middleware receives the current request and a [`Next`] continuation.
//! Invoking the continuation delegates to the rest of the chain with the
//! (possibly replaced) request; returning without invoking it terminates
//! the pipeline and makes this middleware's return value the final result.
//!
//! # Invariants
//!
//! - `Next` is consumed by [`Next::run`], so the continuation can be invoked
//!   at most once per middleware.
//! - Running the continuation past the end of the stack fails with
//!   [`Error::PipelineExhausted`].
//! - A `Next` value is scoped to a single dispatch; continuations never leak
//!   between concurrent `send` calls.
//!
//! # Example
//!
//! ```rust
//! use courier_client::{BoxFuture, Middleware, Next};
//! use courier_core::{Request, Response, Result};
//!
//! struct AuthMiddleware {
//!     token: String,
//! }
//!
//! impl Middleware for AuthMiddleware {
//!     fn name(&self) -> &'static str {
//!         "auth"
//!     }
//!
//!     fn handle<'a>(&'a self, request: Request, next: Next) -> BoxFuture<'a, Result<Response>> {
//!         Box::pin(async move {
//!             let request = request.header("authorization", &self.token);
//!             next.run(request).await
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use courier_core::{Error, Request, Response, Result};

pub use courier_core::BoxFuture;

/// A single stage of the request pipeline.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in dispatch traces.
    fn name(&self) -> &'static str {
        "middleware"
    }

    /// Processes the request, delegating downstream through `next` or
    /// terminating the pipeline by returning a response directly.
    fn handle<'a>(&'a self, request: Request, next: Next) -> BoxFuture<'a, Result<Response>>;
}

/// The continuation to the remaining middleware chain.
///
/// Built fresh for every dispatch over an immutable snapshot of the
/// registered stack, so concurrent dispatches on one client are fully
/// independent.
pub struct Next {
    stack: Arc<[Arc<dyn Middleware>]>,
    index: usize,
}

impl Next {
    /// Creates the entry-point continuation for one dispatch.
    pub(crate) fn new(stack: Arc<[Arc<dyn Middleware>]>) -> Self {
        Self { stack, index: 0 }
    }

    /// Invokes the next middleware in the chain with the given request.
    ///
    /// Consumes `self`, so the continuation can be invoked at most once.
    /// Fails with [`Error::PipelineExhausted`] if no middleware remains.
    pub async fn run(self, request: Request) -> Result<Response> {
        match self.stack.get(self.index) {
            Some(middleware) => {
                let middleware = Arc::clone(middleware);
                tracing::trace!(middleware = middleware.name(), "dispatching");
                let next = Self {
                    stack: self.stack,
                    index: self.index + 1,
                };
                middleware.handle(request, next).await
            }
            None => Err(Error::PipelineExhausted),
        }
    }
}

/// A middleware defined by a closure.
///
/// Lets simple stages be written without a named type:
///
/// ```rust
/// use courier_client::{FnMiddleware, Next};
/// use courier_core::Request;
///
/// let trace = FnMiddleware::new("trace", |request: Request, next: Next| async move {
///     next.run(request).await
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(&'a self, request: Request, next: Next) -> BoxFuture<'a, Result<Response>> {
        Box::pin((self.func)(request, next))
    }
}
