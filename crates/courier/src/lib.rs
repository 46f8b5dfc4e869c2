//! # Courier
//!
//! **Extensible middleware-pipeline HTTP client**
//!
//! Courier composes a request/response exchange out of two pieces:
//!
//! - a **pipeline dispatcher** - an ordered middleware stack where each
//!   stage may inspect or replace the request, delegate downstream, or
//!   terminate the chain with a response, and
//! - a **transport terminator** - the terminal middleware that puts bytes
//!   on the wire, transparently decompresses response bodies, and honors
//!   cooperative cancellation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> courier::Result<()> {
//!     let client = courier::default_client();
//!
//!     let body = client
//!         .checked_send(Request::get("http://localhost:8080/users"))
//!         .await?;
//!
//!     println!("{body:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! send(request) → json serializer → … → http terminator ─→ network
//!                                                │
//! response ← json deserializer ← … ←─────────────┘
//! ```
//!
//! Every behavior is a middleware; the client itself only orders and
//! invokes them. Retries, caching and connection pooling are not built
//! in - they are middleware or transports a caller layers on.

#![doc(html_root_url = "https://docs.rs/courier/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use courier_core as core;

// Re-export the dispatcher
pub use courier_client as client;

// Re-export the transport layer
pub use courier_transport as transport;

// Re-export the JSON middleware
pub use courier_json as json;

pub use courier_core::{Error, Result};

/// Builds a ready-to-use client: JSON body handling over the default
/// HTTP terminator.
///
/// Equivalent to:
///
/// ```rust,ignore
/// RestClient::new()
///     .with(JsonMiddleware::new())
///     .with(HttpTerminator::new())
/// ```
#[must_use]
pub fn default_client() -> courier_client::RestClient {
    courier_client::RestClient::new()
        .with(courier_json::JsonMiddleware::new())
        .with(courier_transport::HttpTerminator::new())
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use courier_client::{FnMiddleware, Middleware, Next, RestClient};
    pub use courier_core::{
        is_success, AbortSignal, Body, BodyStream, Error, Request, Response, ResponseMode,
        TextEncoding, Transport,
    };
    pub use courier_json::JsonMiddleware;
    pub use courier_transport::{HttpTerminator, RustlsTransport, TcpTransport};
}
