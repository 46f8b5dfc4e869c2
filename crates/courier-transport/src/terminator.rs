//! The terminal middleware performing the network exchange.
//!
//! [`HttpTerminator`] never calls its continuation: it is the end of every
//! pipeline it is registered in. One invocation issues exactly one exchange
//! through an injected [`Transport`]; concurrent invocations share nothing
//! beyond the transports themselves.
//!
//! # Cancellation
//!
//! When the request carries an abort signal, the exchange - including
//! response-body buffering - runs inside a race against that signal. The
//! race settles exactly once: an abort rejects with
//! [`Error::Aborted`](courier_core::Error::Aborted) and drops the in-flight
//! exchange, so no later transport or stream event can be observed; a
//! completion wins the race and makes a later abort a no-op.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, StreamExt};
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, HOST};
use http::{HeaderMap, HeaderValue, StatusCode, Uri};
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;

use courier_client::{BoxFuture, Middleware, Next};
use courier_core::{
    is_success, AbortSignal, Body, BodyStream, BoxError, Error, Request, Response, ResponseMode,
    Result, TextEncoding, Transport, WireBody,
};

use crate::connect::{RustlsTransport, TcpTransport};
use crate::decode;

/// Terminal middleware that performs the HTTP exchange.
///
/// # Example
///
/// ```rust,ignore
/// let client = RestClient::new()
///     .with(JsonMiddleware::new())
///     .with(HttpTerminator::new());
/// ```
pub struct HttpTerminator {
    plain: Arc<dyn Transport>,
    secure: Arc<dyn Transport>,
}

impl HttpTerminator {
    /// Creates a terminator with the default per-exchange transports.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transports(Arc::new(TcpTransport::new()), Arc::new(RustlsTransport::new()))
    }

    /// Creates a terminator with explicit plain and secure transports.
    ///
    /// This is the seam tests and embedders use to substitute fake or
    /// pooled transports.
    #[must_use]
    pub fn with_transports(plain: Arc<dyn Transport>, secure: Arc<dyn Transport>) -> Self {
        Self { plain, secure }
    }

    async fn execute(&self, mut request: Request) -> Result<Response> {
        let uri = match request.url.parse::<Uri>() {
            Ok(uri) => uri,
            Err(error) => return Err(Error::transport(anyhow::Error::new(error), request)),
        };
        let secure = uri.scheme_str() == Some("https");

        if !request.headers.contains_key(HOST) {
            if let Some(host) = uri.host() {
                let authority = match uri.port_u16() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                };
                match HeaderValue::from_str(&authority) {
                    Ok(value) => {
                        request.headers.insert(HOST, value);
                    }
                    Err(error) => {
                        return Err(Error::transport(anyhow::Error::new(error), request))
                    }
                }
            }
        }

        // Materialize the body. Buffered bodies get a content-length and are
        // retained on the request back-reference; streams go out as-is with
        // chunked transfer encoding.
        let wire_body = match request.body.take() {
            None => empty_body(),
            Some(Body::Stream(body)) => streaming_body(body),
            Some(Body::Text(text)) => {
                let bytes = Bytes::from(text);
                request
                    .headers
                    .insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
                request.body = Some(Body::Bytes(bytes.clone()));
                buffered_body(bytes)
            }
            Some(Body::Bytes(bytes)) => {
                request
                    .headers
                    .insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
                request.body = Some(Body::Bytes(bytes.clone()));
                buffered_body(bytes)
            }
            Some(body @ Body::Json(_)) => {
                request.body = Some(body);
                return Err(Error::invalid_body(request));
            }
        };

        let transport = if secure {
            request
                .https_agent
                .clone()
                .unwrap_or_else(|| Arc::clone(&self.secure))
        } else {
            request
                .http_agent
                .clone()
                .unwrap_or_else(|| Arc::clone(&self.plain))
        };

        let mut wire_request = http::Request::new(wire_body);
        *wire_request.method_mut() = request.method.clone();
        *wire_request.uri_mut() = uri;
        *wire_request.headers_mut() = request.headers.clone();

        tracing::debug!(method = %request.method, url = %request.url, "issuing exchange");

        let abort = request.abort.clone();
        let exchange = run_exchange(
            transport,
            wire_request,
            request.mode,
            request.encoding,
            abort.clone(),
        );

        // Settle-once: the abort signal and the exchange race; the loser is
        // dropped, so late events for this exchange are unobservable.
        let outcome = match abort {
            Some(signal) => {
                tokio::select! {
                    () = signal.aborted() => {
                        tracing::debug!(url = %request.url, "exchange aborted");
                        return Err(Error::Aborted);
                    }
                    outcome = exchange => outcome,
                }
            }
            None => exchange.await,
        };

        let (status, headers, body) = match outcome {
            Ok(materialized) => materialized,
            Err(error) => {
                tracing::warn!(url = %request.url, error = %error, "exchange failed");
                return Err(Error::transport(anyhow::Error::from_boxed(error), request));
            }
        };

        let success = is_success(&request.method, Some(status));
        tracing::debug!(status = %status, success = success.is_none(), "exchange completed");

        Ok(Response {
            status,
            success,
            message: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
            request,
        })
    }
}

impl Default for HttpTerminator {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for HttpTerminator {
    fn name(&self) -> &'static str {
        "http"
    }

    fn handle<'a>(&'a self, request: Request, _next: Next) -> BoxFuture<'a, Result<Response>> {
        Box::pin(self.execute(request))
    }
}

/// Issues the exchange and materializes the response per the request mode.
async fn run_exchange(
    transport: Arc<dyn Transport>,
    request: http::Request<WireBody>,
    mode: ResponseMode,
    encoding: TextEncoding,
    abort: Option<AbortSignal>,
) -> std::result::Result<(StatusCode, HeaderMap, Option<Body>), BoxError> {
    let response = transport.exchange(request).await?;
    let (parts, body) = response.into_parts();
    let status = parts.status;
    let mut headers = parts.headers;

    let mut body_stream = wire_stream(body);
    if declares_compression(&headers) && status != StatusCode::NO_CONTENT {
        body_stream = decode::decode_stream(body_stream);
        // Downstream consumers must observe already-decoded bytes.
        headers.remove(CONTENT_ENCODING);
    }

    let body = match mode {
        ResponseMode::Stream => {
            let body_stream = match abort {
                Some(signal) => abortable_stream(body_stream, signal),
                None => body_stream,
            };
            Some(Body::Stream(body_stream))
        }
        ResponseMode::Bytes => Some(Body::Bytes(collect(body_stream).await?)),
        ResponseMode::Text => {
            let bytes = collect(body_stream).await?;
            Some(Body::Text(encoding.decode(&bytes)))
        }
    };

    Ok((status, headers, body))
}

fn declares_compression(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .is_some_and(decode::is_supported_encoding)
}

/// Flattens a wire body into a stream of data chunks.
fn wire_stream(body: WireBody) -> BodyStream {
    BodyStream::new(
        http_body_util::BodyStream::new(body).filter_map(|frame| async move {
            match frame {
                Ok(frame) => frame.into_data().ok().map(Ok),
                Err(error) => Some(Err(error)),
            }
        }),
    )
}

async fn collect(mut stream: BodyStream) -> std::result::Result<Bytes, BoxError> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk?);
    }
    Ok(buffer.freeze())
}

/// Ends a handed-back stream with an error once the abort signal fires.
fn abortable_stream(body: BodyStream, signal: AbortSignal) -> BodyStream {
    BodyStream::new(stream::unfold(
        (body.into_inner(), signal, false),
        |(mut inner, signal, done)| async move {
            if done {
                return None;
            }
            tokio::select! {
                // Abort wins over a simultaneously-ready chunk.
                biased;
                () = signal.aborted() => {
                    let error: BoxError = Box::new(std::io::Error::other("Aborted"));
                    Some((Err(error), (inner, signal, true)))
                }
                item = inner.next() => item.map(|item| (item, (inner, signal, false))),
            }
        },
    ))
}

fn empty_body() -> WireBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

fn buffered_body(bytes: Bytes) -> WireBody {
    Full::new(bytes)
        .map_err(|never| match never {})
        .boxed_unsync()
}

fn streaming_body(body: BodyStream) -> WireBody {
    StreamBody::new(body.into_inner().map(|chunk| chunk.map(Frame::data))).boxed_unsync()
}
