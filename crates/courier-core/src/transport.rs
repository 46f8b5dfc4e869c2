//! The transport seam.
//!
//! A [`Transport`] performs exactly one wire exchange: it receives a fully
//! prepared `http` request and resolves with the raw `http` response. It is
//! the injectable boundary between the terminal middleware and the network -
//! production transports open sockets, test transports fabricate responses -
//! and doubles as the opaque per-request connection handle a caller can
//! attach to a [`Request`](crate::Request).
//!
//! Transports own their connection strategy entirely. Courier's defaults
//! open one connection per exchange; a pooling transport is free to reuse
//! connections behind the same interface.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;

use crate::body::BoxError;

/// A boxed future, the async return type at trait seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The body type exchanged with transports: boxed, streaming-capable.
pub type WireBody = UnsyncBoxBody<Bytes, BoxError>;

/// Performs a single HTTP exchange.
///
/// The request carries an absolute URI; the transport is responsible for
/// connection establishment (including TLS where it applies) and for
/// rewriting the target into the form its protocol needs.
pub trait Transport: Send + Sync {
    /// Sends the request and resolves with the response.
    ///
    /// Errors are connection- or protocol-level failures; HTTP error
    /// statuses are ordinary responses, not errors.
    fn exchange(
        &self,
        request: http::Request<WireBody>,
    ) -> BoxFuture<'static, Result<http::Response<WireBody>, BoxError>>;
}
