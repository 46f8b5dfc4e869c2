//! Error types for courier.
//!
//! All failures surface through the single [`Error`] enum. Several variants
//! carry the originating [`Request`] (and, for validation failures, the full
//! [`Response`]) so a failure can be diagnosed or re-driven at a higher layer
//! without extra context. No error is retried or suppressed anywhere in the
//! pipeline.
//!
//! The display strings of [`Error::PipelineExhausted`], [`Error::InvalidBody`],
//! [`Error::Aborted`] and [`Error::ResponseRejected`] are stable contract:
//! callers match on them across implementations.

use serde::Serialize;
use thiserror::Error;

use crate::request::Request;
use crate::response::Response;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The error type surfaced by the dispatcher and its middleware.
#[derive(Debug, Error)]
pub enum Error {
    /// Dispatch ran past the last middleware without any of them producing
    /// a response.
    #[error("Reached end of pipeline. Use a middleware which terminates the pipeline.")]
    PipelineExhausted,

    /// The request body is not one of the transmittable representations.
    #[error("Body must be a string, Buffer, ArrayBuffer or Stream")]
    InvalidBody {
        /// The request carrying the offending body.
        request: Box<Request>,
    },

    /// A connection-, protocol- or body-stream-level failure.
    #[error("{source}")]
    Transport {
        /// The underlying failure.
        #[source]
        source: anyhow::Error,
        /// The request whose exchange failed.
        request: Box<Request>,
    },

    /// The exchange was cancelled through its abort signal.
    #[error("Aborted")]
    Aborted,

    /// The response's success indication was explicitly false.
    ///
    /// Raised only by the dispatcher's validating entry point. The message
    /// embeds pretty-printed renderings of both the originating request and
    /// the response.
    #[error("{message}")]
    ResponseRejected {
        /// The rendered diagnostic message.
        message: String,
        /// The rejected response (its request back-reference included).
        response: Box<Response>,
    },

    /// JSON (de)serialization of a body failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates an [`Error::InvalidBody`] carrying the originating request.
    #[must_use]
    pub fn invalid_body(request: Request) -> Self {
        Self::InvalidBody {
            request: Box::new(request),
        }
    }

    /// Creates an [`Error::Transport`] carrying the originating request.
    #[must_use]
    pub fn transport(source: anyhow::Error, request: Request) -> Self {
        Self::Transport {
            source,
            request: Box::new(request),
        }
    }

    /// Creates an [`Error::ResponseRejected`] from a response that did not
    /// indicate success.
    #[must_use]
    pub fn response_rejected(response: Response) -> Self {
        let message = format!(
            "Response does not indicate success\n\nRequest: {}\n\nResponse: {}",
            to_pretty_json(&response.request),
            to_pretty_json(&response),
        );
        Self::ResponseRejected {
            message,
            response: Box::new(response),
        }
    }

    /// Returns the originating request, for variants that carry one.
    #[must_use]
    pub fn request(&self) -> Option<&Request> {
        match self {
            Self::InvalidBody { request } | Self::Transport { request, .. } => Some(request),
            Self::ResponseRejected { response, .. } => Some(&response.request),
            _ => None,
        }
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
