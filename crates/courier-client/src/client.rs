//! The pipeline dispatcher.
//!
//! [`RestClient`] orders registered middleware and drives one dispatch per
//! [`send`](RestClient::send) call. The continuation chain is rebuilt for
//! every call over an immutable snapshot of the stack, so a client can be
//! shared and dispatched on concurrently without coordination.

use std::future::Future;
use std::sync::Arc;

use courier_core::{Body, Error, Request, Response, Result};

use crate::middleware::{FnMiddleware, Middleware, Next};

/// An HTTP client assembled from an ordered middleware stack.
///
/// The client is inert on its own: every behavior, including the terminal
/// network exchange, comes from registered middleware. Dispatch order equals
/// registration order, and exactly one middleware must terminate the chain.
///
/// # Example
///
/// ```rust,ignore
/// let client = RestClient::new()
///     .with(JsonMiddleware::new())
///     .with(HttpTerminator::new());
///
/// let body = client.checked_send(Request::get("http://localhost:8080/users")).await?;
/// ```
#[derive(Default)]
pub struct RestClient {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl RestClient {
    /// Creates a client with an empty middleware stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client from an ordered middleware collection.
    #[must_use]
    pub fn with_middleware(stack: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Self {
        Self {
            middleware: stack.into_iter().collect(),
        }
    }

    /// Appends a middleware to the stack.
    #[must_use]
    pub fn with<M: Middleware>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Appends a closure-based middleware to the stack.
    #[must_use]
    pub fn with_fn<F, Fut>(self, name: &'static str, func: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        self.with(FnMiddleware::new(name, func))
    }

    /// Returns the number of registered middleware.
    #[must_use]
    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }

    /// Dispatches a request through the middleware chain.
    ///
    /// Returns whatever the first terminal middleware returns, unmodified.
    /// Fails with [`Error::PipelineExhausted`] if no middleware terminates
    /// the chain.
    pub async fn send(&self, request: Request) -> Result<Response> {
        // A fresh continuation per call: concurrent sends never share state
        // beyond the read-only stack snapshot.
        let chain = Next::new(Arc::from(self.middleware.as_slice()));
        tracing::trace!(
            method = %request.method,
            url = %request.url,
            stages = self.middleware.len(),
            "send"
        );
        chain.run(request).await
    }

    /// Dispatches a request and extracts the response body, validating the
    /// success indication.
    ///
    /// Resolves with the body unless the response's success indication is
    /// explicitly false, in which case it fails with
    /// [`Error::ResponseRejected`] carrying pretty-printed renderings of
    /// both the request and the response.
    pub async fn checked_send(&self, request: Request) -> Result<Option<Body>> {
        let mut response = self.send(request).await?;
        if !response.is_success() {
            return Err(Error::response_rejected(response));
        }
        Ok(response.body.take())
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn stub_response(request: Request) -> Response {
        Response {
            status: StatusCode::OK,
            success: None,
            message: "OK".to_string(),
            headers: HeaderMap::new(),
            body: None,
            request,
        }
    }

    /// A middleware that records its invocation order.
    struct OrderTracking {
        name: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
        terminal: bool,
    }

    impl Middleware for OrderTracking {
        fn name(&self) -> &'static str {
            self.name
        }

        fn handle<'a>(
            &'a self,
            request: Request,
            next: Next,
        ) -> crate::BoxFuture<'a, Result<Response>> {
            Box::pin(async move {
                self.order.lock().unwrap().push(self.name);
                if self.terminal {
                    Ok(stub_response(request))
                } else {
                    next.run(request).await
                }
            })
        }
    }

    #[tokio::test]
    async fn test_send_with_no_middleware_is_exhausted() {
        let client = RestClient::new();
        let result = client.send(Request::get("http://x/")).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Reached end of pipeline. Use a middleware which terminates the pipeline."
        );
    }

    #[tokio::test]
    async fn test_send_without_terminal_middleware_is_exhausted() {
        let client = RestClient::new()
            .with_fn("passthrough", |request: Request, next: Next| async move {
                next.run(request).await
            });
        let result = client.send(Request::get("http://x/")).await;
        assert!(matches!(result, Err(Error::PipelineExhausted)));
    }

    #[tokio::test]
    async fn test_middleware_runs_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let client = RestClient::new()
            .with(OrderTracking {
                name: "first",
                order: Arc::clone(&order),
                terminal: false,
            })
            .with(OrderTracking {
                name: "second",
                order: Arc::clone(&order),
                terminal: false,
            })
            .with(OrderTracking {
                name: "third",
                order: Arc::clone(&order),
                terminal: true,
            });

        client.send(Request::get("http://x/")).await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_middleware_after_terminal_never_runs() {
        let called = Arc::new(AtomicUsize::new(0));
        let called_clone = Arc::clone(&called);

        let client = RestClient::new()
            .with_fn("terminal", |request: Request, _next: Next| async move {
                Ok(stub_response(request))
            })
            .with_fn("after", move |request: Request, next: Next| {
                called_clone.fetch_add(1, Ordering::SeqCst);
                async move { next.run(request).await }
            });

        client.send(Request::get("http://x/")).await.unwrap();
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_middleware_can_replace_request() {
        let client = RestClient::new()
            .with_fn("replace", |_request: Request, next: Next| async move {
                next.run(Request::get("http://replaced/")).await
            })
            .with_fn("terminal", |request: Request, _next: Next| async move {
                Ok(stub_response(request))
            });

        let response = client.send(Request::get("http://original/")).await.unwrap();
        assert_eq!(response.request.url, "http://replaced/");
    }

    #[tokio::test]
    async fn test_forwarded_request_is_preserved() {
        let client = RestClient::new()
            .with_fn("forward", |request: Request, next: Next| async move {
                next.run(request).await
            })
            .with_fn("terminal", |request: Request, _next: Next| async move {
                Ok(stub_response(request))
            });

        let response = client
            .send(Request::get("http://original/").header("x-marker", "kept"))
            .await
            .unwrap();
        assert_eq!(response.request.headers.get("x-marker").unwrap(), "kept");
    }

    #[tokio::test]
    async fn test_with_middleware_constructor() {
        let stack: Vec<Arc<dyn Middleware>> = vec![Arc::new(FnMiddleware::new(
            "terminal",
            |request: Request, _next: Next| async move { Ok(stub_response(request)) },
        ))];

        let client = RestClient::with_middleware(stack);
        assert_eq!(client.middleware_count(), 1);
        client.send(Request::get("http://x/")).await.unwrap();
    }

    #[tokio::test]
    async fn test_checked_send_returns_body() {
        let client = RestClient::new().with_fn(
            "terminal",
            |request: Request, _next: Next| async move {
                let mut response = stub_response(request);
                response.body = Some("body".into());
                Ok(response)
            },
        );

        let body = client
            .checked_send(Request::get("http://x/"))
            .await
            .unwrap();
        assert_eq!(body.unwrap().as_text(), Some("body"));
    }

    #[tokio::test]
    async fn test_checked_send_accepts_unset_success() {
        let client = RestClient::new().with_fn(
            "terminal",
            |request: Request, _next: Next| async move {
                let mut response = stub_response(request);
                response.success = None;
                Ok(response)
            },
        );

        assert!(client.checked_send(Request::get("http://x/")).await.is_ok());
    }

    #[tokio::test]
    async fn test_checked_send_rejects_explicit_failure() {
        let client = RestClient::new().with_fn(
            "terminal",
            |request: Request, _next: Next| async move {
                let mut response = stub_response(request);
                response.success = Some(false);
                response.body = Some(serde_json::json!(true).into());
                Ok(response)
            },
        );

        let error = client
            .checked_send(Request::delete(""))
            .await
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Response does not indicate success\n\n\
             Request: {\n  \"method\": \"DELETE\"\n}\n\n\
             Response: {\n  \"success\": false,\n  \"status\": 200,\n  \"message\": \"OK\",\n  \"body\": true\n}"
        );
    }

    #[tokio::test]
    async fn test_concurrent_sends_are_independent() {
        let client = Arc::new(RestClient::new().with_fn(
            "terminal",
            |request: Request, _next: Next| async move { Ok(stub_response(request)) },
        ));

        let mut handles = Vec::new();
        for i in 0..8 {
            let client = Arc::clone(&client);
            handles.push(tokio::spawn(async move {
                client
                    .send(Request::get(format!("http://x/{i}")))
                    .await
                    .unwrap()
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            let response = handle.await.unwrap();
            assert_eq!(response.request.url, format!("http://x/{i}"));
        }
    }
}
