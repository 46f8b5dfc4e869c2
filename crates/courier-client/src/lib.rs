//! # Courier Client
//!
//! The middleware pipeline dispatcher for the courier HTTP client.
//!
//! A [`RestClient`] holds an ordered stack of [`Middleware`]. Dispatching a
//! request walks the stack in registration order; each middleware may
//! inspect or replace the request, delegate downstream through its [`Next`]
//! continuation, transform the response on the way back up, or return a
//! response directly without delegating - *terminating* the pipeline.
//!
//! ```text
//! send(request) → middleware 1 → middleware 2 → … → terminal middleware
//!                      ↑              ↑                      │
//! response ←───────────┴──────────────┴──────────────────────┘
//! ```
//!
//! The dispatcher itself performs no I/O, no retries and no mutation of
//! shared state; a terminal middleware (typically the HTTP terminator from
//! `courier-transport`) produces the response.
//!
//! ## Example
//!
//! ```rust
//! use courier_client::{Next, RestClient};
//! use courier_core::{Request, Response};
//! use http::{HeaderMap, StatusCode};
//!
//! # async fn demo() -> courier_core::Result<()> {
//! let client = RestClient::new().with_fn("stub", |request: Request, _next: Next| async move {
//!     Ok(Response {
//!         status: StatusCode::OK,
//!         success: None,
//!         message: "OK".to_string(),
//!         headers: HeaderMap::new(),
//!         body: Some("hello".into()),
//!         request,
//!     })
//! });
//!
//! let response = client.send(Request::get("http://localhost/")).await?;
//! assert!(response.is_success());
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/courier-client/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod client;
pub mod middleware;

// Re-export main types at crate root
pub use client::RestClient;
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
