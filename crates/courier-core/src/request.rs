//! The outbound exchange description.
//!
//! A [`Request`] describes one exchange: method, target URL, headers, an
//! optional [`Body`], how the response body should be materialized, and the
//! optional per-request transport overrides and abort signal. Requests move
//! through the middleware pipeline by value - a middleware that wants to
//! change a request passes a different value to its continuation; nothing is
//! mutated in place behind another middleware's back.
//!
//! # Example
//!
//! ```rust
//! use courier_core::Request;
//! use serde_json::json;
//!
//! let request = Request::post("http://localhost:8080/users")
//!     .header("x-request-id", "42")
//!     .body(json!({"name": "Alice"}));
//!
//! assert_eq!(request.method, http::Method::POST);
//! ```

use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::abort::AbortSignal;
use crate::body::Body;
use crate::transport::Transport;

/// How the terminal middleware materializes the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Buffer the body and decode it to text (the default).
    #[default]
    Text,
    /// Buffer the body and keep the raw bytes.
    Bytes,
    /// Hand back the live stream without buffering.
    Stream,
}

impl ResponseMode {
    /// Returns the mode's name, as used in diagnostics output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Stream => "stream",
        }
    }
}

/// The decoding applied when a buffered response body becomes text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8; invalid sequences decode to U+FFFD (the default).
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per character.
    Latin1,
}

impl TextEncoding {
    /// Returns the encoding's name, as used in diagnostics output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin1",
        }
    }

    /// Decodes a byte buffer into text.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }
}

/// Describes one outbound exchange.
pub struct Request {
    /// The HTTP method.
    pub method: Method,
    /// The absolute target URL.
    pub url: String,
    /// Request headers. Header names compare case-insensitively.
    pub headers: HeaderMap,
    /// The request body, if any.
    pub body: Option<Body>,
    /// How the response body should be materialized.
    pub mode: ResponseMode,
    /// Text decoding hint for the default materialization mode.
    pub encoding: TextEncoding,
    /// Per-request transport override for plain (`http`) targets.
    pub http_agent: Option<Arc<dyn Transport>>,
    /// Per-request transport override for secure (`https`) targets.
    pub https_agent: Option<Arc<dyn Transport>>,
    /// Cancellation signal for the in-flight exchange.
    pub abort: Option<AbortSignal>,
}

impl Request {
    /// Creates a request with the given method and URL.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            mode: ResponseMode::default(),
            encoding: TextEncoding::default(),
            http_agent: None,
            https_agent: None,
            abort: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Creates a HEAD request.
    #[must_use]
    pub fn head(url: impl Into<String>) -> Self {
        Self::new(Method::HEAD, url)
    }

    /// Sets a header on the request.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref()).expect("valid header name");
        let value = HeaderValue::try_from(value.as_ref()).expect("valid header value");
        self.headers.insert(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the response materialization mode.
    #[must_use]
    pub fn mode(mut self, mode: ResponseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the text decoding hint.
    #[must_use]
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Overrides the transport used for plain (`http`) targets.
    #[must_use]
    pub fn http_agent(mut self, agent: Arc<dyn Transport>) -> Self {
        self.http_agent = Some(agent);
        self
    }

    /// Overrides the transport used for secure (`https`) targets.
    #[must_use]
    pub fn https_agent(mut self, agent: Arc<dyn Transport>) -> Self {
        self.https_agent = Some(agent);
        self
    }

    /// Attaches an abort signal to the request.
    #[must_use]
    pub fn abort(mut self, signal: AbortSignal) -> Self {
        self.abort = Some(signal);
        self
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new(Method::GET, "")
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("mode", &self.mode)
            .field("encoding", &self.encoding)
            .field("http_agent", &self.http_agent.is_some())
            .field("https_agent", &self.https_agent.is_some())
            .field("abort", &self.abort.is_some())
            .finish()
    }
}

// The diagnostics view embedded in validation errors: only fields a reader
// can act on, defaults and unserializable fields omitted.
impl Serialize for Request {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("method", self.method.as_str())?;
        if !self.url.is_empty() {
            map.serialize_entry("url", &self.url)?;
        }
        if !self.headers.is_empty() {
            map.serialize_entry("headers", &HeadersView(&self.headers))?;
        }
        match &self.body {
            Some(Body::Text(text)) => map.serialize_entry("body", text)?,
            Some(Body::Json(value)) => map.serialize_entry("body", value)?,
            _ => {}
        }
        if self.mode != ResponseMode::default() {
            map.serialize_entry("mode", self.mode.as_str())?;
        }
        if self.encoding != TextEncoding::default() {
            map.serialize_entry("encoding", self.encoding.as_str())?;
        }
        map.end()
    }
}

/// Serializes a header map as a name → string-value object.
pub(crate) struct HeadersView<'a>(pub(crate) &'a HeaderMap);

impl Serialize for HeadersView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.0 {
            map.serialize_entry(name.as_str(), value.to_str().unwrap_or("<binary>"))?;
        }
        map.end()
    }
}
