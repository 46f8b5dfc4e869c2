//! Request and response body representations.
//!
//! A [`Body`] is one of the recognized representations an exchange can carry:
//! UTF-8 text, a raw byte buffer, a structured JSON value awaiting
//! serialization, or a live byte stream. The enum variant *is* the
//! classification - constructing a `Body` through the provided `From`
//! conversions is how a value's kind is decided, and the terminal middleware
//! matches on the variant to know how to transmit it.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};

/// A boxed error usable across async and stream boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A request or response body.
pub enum Body {
    /// UTF-8 text.
    Text(String),
    /// A raw byte buffer.
    Bytes(Bytes),
    /// A structured value that has not been serialized yet.
    ///
    /// Serialization middleware turns this into [`Body::Text`] before the
    /// request reaches the wire; a `Json` body arriving at the terminal
    /// middleware un-serialized is a validation failure.
    Json(serde_json::Value),
    /// A live byte stream, transmitted without buffering.
    Stream(BodyStream),
}

impl Body {
    /// Returns the text content if this is a [`Body::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the byte content if this is a [`Body::Bytes`].
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the structured value if this is a [`Body::Json`].
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if this is a [`Body::Stream`].
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Consumes the body and returns its text content, if any.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Consumes the body and returns its byte content, if any.
    #[must_use]
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Consumes the body and returns its structured value, if any.
    #[must_use]
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the body and returns its stream, if any.
    #[must_use]
    pub fn into_stream(self) -> Option<BodyStream> {
        match self {
            Self::Stream(stream) => Some(stream),
            _ => None,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Body {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<BodyStream> for Body {
    fn from(stream: BodyStream) -> Self {
        Self::Stream(stream)
    }
}

/// A boxed stream of byte chunks.
///
/// Used both for streaming request bodies (sent with chunked transfer
/// encoding) and for streaming response bodies handed back to the caller.
/// No internal buffering or flow control is added here; backpressure is
/// whatever the underlying stream provides.
pub struct BodyStream {
    inner: BoxStream<'static, Result<Bytes, BoxError>>,
}

impl BodyStream {
    /// Wraps a stream of byte chunks.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, BoxError>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    /// Builds a stream from a fixed sequence of chunks.
    ///
    /// Primarily useful in tests and for adapting already-buffered data.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        Self::new(stream::iter(chunks.into_iter().map(Ok)))
    }

    /// Unwraps the inner boxed stream.
    #[must_use]
    pub fn into_inner(self) -> BoxStream<'static, Result<Bytes, BoxError>> {
        self.inner
    }
}

impl Stream for BodyStream {
    type Item = Result<Bytes, BoxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BodyStream(..)")
    }
}
