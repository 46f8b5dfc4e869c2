//! Default transports: one connection per exchange.
//!
//! Both transports follow the same shape: open a socket to the target,
//! perform an HTTP/1.1 handshake, drive the connection on a background task
//! and issue the single exchange. Nothing is pooled or reused - connection
//! management beyond one exchange belongs in a caller-supplied
//! [`Transport`].

use std::fmt;
use std::sync::Arc;

use http::Uri;
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use courier_core::{BoxError, BoxFuture, Transport, WireBody};

use http_body_util::BodyExt;

/// Plain-TCP transport for `http` targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport;

impl TcpTransport {
    /// Creates the transport.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Transport for TcpTransport {
    fn exchange(
        &self,
        request: http::Request<WireBody>,
    ) -> BoxFuture<'static, Result<http::Response<WireBody>, BoxError>> {
        Box::pin(async move {
            let (host, port) = target(request.uri(), 80)?;
            tracing::debug!(%host, port, "connecting");
            let stream = TcpStream::connect((host.as_str(), port)).await?;
            send_over(stream, request).await
        })
    }
}

/// TLS transport for `https` targets, backed by rustls with the
/// webpki root store.
#[derive(Clone)]
pub struct RustlsTransport {
    connector: TlsConnector,
}

impl RustlsTransport {
    /// Creates the transport with a fresh client configuration.
    ///
    /// The root store is built once here and shared by every exchange this
    /// transport performs.
    #[must_use]
    pub fn new() -> Self {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        Self {
            connector: TlsConnector::from(Arc::new(config)),
        }
    }
}

impl Default for RustlsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RustlsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RustlsTransport")
    }
}

impl Transport for RustlsTransport {
    fn exchange(
        &self,
        request: http::Request<WireBody>,
    ) -> BoxFuture<'static, Result<http::Response<WireBody>, BoxError>> {
        let connector = self.connector.clone();
        Box::pin(async move {
            let (host, port) = target(request.uri(), 443)?;
            let server_name = ServerName::try_from(host.clone())?;
            tracing::debug!(%host, port, "connecting with TLS");
            let stream = TcpStream::connect((host.as_str(), port)).await?;
            let stream = connector.connect(server_name, stream).await?;
            send_over(stream, request).await
        })
    }
}

/// Extracts the connect target from an absolute URI.
fn target(uri: &Uri, default_port: u16) -> Result<(String, u16), BoxError> {
    match uri.host() {
        Some(host) => Ok((host.to_string(), uri.port_u16().unwrap_or(default_port))),
        None => Err("request URL has no host".into()),
    }
}

/// Performs the handshake and single exchange over an established stream.
async fn send_over<S>(
    stream: S,
    request: http::Request<WireBody>,
) -> Result<http::Response<WireBody>, BoxError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let io = TokioIo::new(stream);
    let (mut sender, connection) = hyper::client::conn::http1::handshake(io).await?;

    // The connection task must keep running while the exchange is in flight
    // and while a streaming response body is being consumed.
    tokio::spawn(async move {
        if let Err(error) = connection.await {
            tracing::debug!(%error, "connection task ended with error");
        }
    });

    let request = into_origin_form(request)?;
    let response = sender.send_request(request).await?;
    Ok(response.map(|body| body.map_err(|error| Box::new(error) as BoxError).boxed_unsync()))
}

/// Rewrites an absolute-form target into origin form for the request line.
fn into_origin_form(
    request: http::Request<WireBody>,
) -> Result<http::Request<WireBody>, BoxError> {
    let (mut parts, body) = request.into_parts();
    let origin = match parts.uri.path_and_query() {
        Some(path_and_query) if !path_and_query.as_str().is_empty() => {
            path_and_query.as_str().to_string()
        }
        _ => "/".to_string(),
    };
    parts.uri = origin.parse::<Uri>()?;
    Ok(http::Request::from_parts(parts, body))
}
