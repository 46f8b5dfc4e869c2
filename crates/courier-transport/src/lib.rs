//! # Courier Transport
//!
//! The transport execution layer of the courier HTTP client.
//!
//! [`HttpTerminator`] is the terminal middleware that turns a
//! [`Request`](courier_core::Request) into bytes on the wire and a
//! [`Response`](courier_core::Response) back:
//!
//! 1. materializes non-stream bodies into byte buffers (setting
//!    `content-length`); streaming bodies go out chunked,
//! 2. selects a plain or secure [`Transport`](courier_core::Transport) from
//!    the target scheme, honoring per-request overrides,
//! 3. races the exchange against the request's abort signal - whichever
//!    settles first wins, later events are discarded,
//! 4. transparently decompresses `gzip`/`compress`/`deflate` response bodies
//!    (and removes the `content-encoding` header) unless the status is 204,
//! 5. materializes the response body as decoded text, raw bytes, or a live
//!    stream, as the request asked.
//!
//! The default transports open one connection per exchange - connection
//! pooling is deliberately out of scope and belongs in a caller-supplied
//! [`Transport`](courier_core::Transport).

#![doc(html_root_url = "https://docs.rs/courier-transport/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod connect;
pub mod decode;
pub mod terminator;

// Re-export main types at crate root
pub use connect::{RustlsTransport, TcpTransport};
pub use decode::decode_stream;
pub use terminator::HttpTerminator;
