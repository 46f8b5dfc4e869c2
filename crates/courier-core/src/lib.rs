//! # Courier Core
//!
//! Core types and traits for the courier HTTP client.
//!
//! This crate defines the data model shared by every other courier crate:
//!
//! - [`Request`] and [`Response`] - the description of an outbound exchange
//!   and its result, including the response's back-reference to the request
//!   that produced it.
//! - [`Body`] - the recognized body representations (text, bytes, structured
//!   JSON value, live stream).
//! - [`Error`] - the single error type surfaced by the pipeline, carrying the
//!   originating request where one exists.
//! - [`is_success`] - the pure method/status success classifier.
//! - [`AbortSignal`] - cooperative cancellation for in-flight exchanges.
//! - [`Transport`] - the injectable seam a terminal middleware uses to put
//!   bytes on the wire.
//!
//! The crate holds no I/O of its own; network execution lives in
//! `courier-transport` and dispatch in `courier-client`.

#![doc(html_root_url = "https://docs.rs/courier-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod abort;
pub mod body;
pub mod error;
pub mod request;
pub mod response;
pub mod success;
pub mod transport;

// Re-export main types at crate root
pub use abort::AbortSignal;
pub use body::{Body, BodyStream, BoxError};
pub use error::{Error, Result};
pub use request::{Request, ResponseMode, TextEncoding};
pub use response::Response;
pub use success::is_success;
pub use transport::{BoxFuture, Transport, WireBody};
