//! # Courier JSON
//!
//! JSON body (de)serialization for the courier HTTP client.
//!
//! Two pure transforms - [`serialize_request`] and [`deserialize_response`] -
//! plus [`JsonMiddleware`], which applies them around its continuation:
//! structured request bodies are serialized on the way out, textual JSON
//! response bodies are parsed on the way back.
//!
//! Both transforms are strict no-ops when their preconditions do not hold:
//! the *same owned value* is returned, nothing is rebuilt or copied. Callers
//! may rely on that identity to detect no-op passes.

#![doc(html_root_url = "https://docs.rs/courier-json/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use courier_client::{BoxFuture, Middleware, Next};
use courier_core::{Body, Request, Response, Result};
use http::header::CONTENT_TYPE;
use http::HeaderValue;

/// The content type written by the serializer.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// Serializes a structured request body to JSON text.
///
/// Applies only when the body is a structured value and no `content-type`
/// header is set; the serialized body replaces the structured one and the
/// `content-type` header is set to [`JSON_CONTENT_TYPE`]. In every other
/// case the request passes through untouched.
///
/// # Errors
///
/// Fails if the structured value cannot be rendered as JSON text.
pub fn serialize_request(mut request: Request) -> Result<Request> {
    match request.body.take() {
        Some(Body::Json(value)) if !request.headers.contains_key(CONTENT_TYPE) => {
            let text = serde_json::to_string(&value)?;
            request
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
            request.body = Some(Body::Text(text));
            Ok(request)
        }
        body => {
            request.body = body;
            Ok(request)
        }
    }
}

/// Parses a textual JSON response body into a structured value.
///
/// Applies only when the body is text and the `content-type` header value
/// contains `json`, compared case-insensitively (header *names* are
/// case-insensitive by construction). In every other case the response
/// passes through untouched.
///
/// # Errors
///
/// Fails if the body claims to be JSON but does not parse.
pub fn deserialize_response(mut response: Response) -> Result<Response> {
    let declares_json = response
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("json"));

    match response.body.take() {
        Some(Body::Text(text)) if declares_json => {
            let value: serde_json::Value = serde_json::from_str(&text)?;
            response.body = Some(Body::Json(value));
            Ok(response)
        }
        body => {
            response.body = body;
            Ok(response)
        }
    }
}

/// Middleware applying JSON serialization around its continuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMiddleware;

impl JsonMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for JsonMiddleware {
    fn name(&self) -> &'static str {
        "json"
    }

    fn handle<'a>(&'a self, request: Request, next: Next) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            let request = serialize_request(request)?;
            let response = next.run(request).await?;
            deserialize_response(response)
        })
    }
}
